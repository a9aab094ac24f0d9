//! Run settings, read once from `settings.yaml` and never changed during a run.
use crate::errors::{LoadError, LoadResult};
use crate::partition::DocMethod;
use crate::routing::LateralLag;
use crate::surface::{BuildUp, WashOff};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How default initial soil concentrations are keyed in `init.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum InitType {
    /// One row per soil type.
    #[serde(rename = "soil")]
    Soil,
    /// One row per land use.
    #[serde(rename = "lu")]
    LandUse,
    /// One row per soil type and land use pair.
    #[serde(rename = "soil-lu")]
    SoilLandUse,
}

impl Default for InitType {
    fn default() -> Self {
        InitType::Soil
    }
}

fn yes() -> bool {
    true
}

/// Which days and rows end up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OutputWindow {
    /// First reported day, defaults to the simulation start.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Last reported day, defaults to the simulation end.
    #[serde(default)]
    pub end: Option<NaiveDate>,
    /// Write land unit rows.
    #[serde(default = "yes")]
    pub hru: bool,
    /// Write DOC rows.
    #[serde(default = "yes")]
    pub doc: bool,
}

impl Default for OutputWindow {
    fn default() -> Self {
        OutputWindow {
            start: None,
            end: None,
            hru: true,
            doc: true,
        }
    }
}

/// Immutable configuration of one simulation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    /// First simulated day.
    pub start: NaiveDate,
    /// Last simulated day, inclusive.
    pub end: NaiveDate,
    /// Reporting window and toggles.
    #[serde(default)]
    pub output: OutputWindow,
    /// Build-up family.
    pub buildup: BuildUp,
    /// Wash-off family.
    pub washoff: WashOff,
    /// How soil-water DOC is derived.
    #[serde(default)]
    pub doc_method: DocMethod,
    /// Add river-surface deposition to the reach loads.
    #[serde(default)]
    pub river_flux: bool,
    /// Keying of the default initial-condition table.
    #[serde(default)]
    pub init_type: InitType,
    /// Soil type whose soil mass decays at the water rate.
    #[serde(default)]
    pub water_soil: Option<String>,
    /// Lateral flow routing.
    #[serde(default)]
    pub lateral_lag: LateralLag,
}

impl RunConfig {
    /// Configuration with default options over the given calendar.
    pub fn new(start: NaiveDate, end: NaiveDate, buildup: BuildUp, washoff: WashOff) -> Self {
        RunConfig {
            start,
            end,
            output: OutputWindow::default(),
            buildup,
            washoff,
            doc_method: DocMethod::default(),
            river_flux: false,
            init_type: InitType::default(),
            water_soil: None,
            lateral_lag: LateralLag::default(),
        }
    }

    /// Read and validate settings from a yaml file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: RunConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate settings from a yaml string.
    pub fn from_yaml(text: &str) -> LoadResult<Self> {
        let config: RunConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the calendar and the output window.
    pub fn validate(&self) -> LoadResult<()> {
        if self.end < self.start {
            return Err(LoadError::config(format!(
                "simulation ends ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        let (first, last) = self.output_bounds();
        if first > last {
            return Err(LoadError::config("output window is empty"));
        }
        if first < self.start || last > self.end {
            return Err(LoadError::config(format!(
                "output window {} to {} lies outside the simulation period",
                first, last
            )));
        }
        Ok(())
    }

    /// First and last reported day.
    pub fn output_bounds(&self) -> (NaiveDate, NaiveDate) {
        (
            self.output.start.unwrap_or(self.start),
            self.output.end.unwrap_or(self.end),
        )
    }

    /// Every simulated day in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// Number of simulated days, zero when `end` precedes `start`.
    pub fn days(&self) -> usize {
        let span = (self.end - self.start).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }

    /// Whether rows for `date` are written.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        let (first, last) = self.output_bounds();
        date >= first && date <= last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_settings() {
        let text = "
start: 2010-01-01
end: 2010-01-31
output:
  start: 2010-01-10
  doc: false
buildup: half_saturation
washoff: rating_curve
doc_method: mass_balance
river_flux: true
init_type: soil-lu
water_soil: WATR
";
        let config = RunConfig::from_yaml(text).unwrap();
        assert_eq!(config.buildup, BuildUp::HalfSaturation);
        assert_eq!(config.washoff, WashOff::RatingCurve);
        assert_eq!(config.doc_method, DocMethod::MassBalance);
        assert_eq!(config.init_type, InitType::SoilLandUse);
        assert_eq!(config.lateral_lag, LateralLag::PassThrough);
        assert_eq!(config.water_soil.as_deref(), Some("WATR"));
        assert!(config.output.hru);
        assert!(!config.output.doc);
        assert_eq!(config.days(), 31);
        assert_eq!(config.dates().len(), 31);
        assert!(!config.in_window(ymd(2010, 1, 9)));
        assert!(config.in_window(ymd(2010, 1, 31)));
    }

    #[test]
    fn reversed_calendar_is_rejected() {
        let config = RunConfig::new(
            ymd(2010, 2, 1),
            ymd(2010, 1, 1),
            BuildUp::Power,
            WashOff::Exponential,
        );
        assert!(config.validate().is_err());
        assert_eq!(config.days(), 0);
        assert!(config.dates().is_empty());
    }

    #[test]
    fn output_window_must_fit() {
        let mut config = RunConfig::new(
            ymd(2010, 1, 1),
            ymd(2010, 1, 5),
            BuildUp::Power,
            WashOff::Exponential,
        );
        config.output.end = Some(ymd(2010, 1, 6));
        assert!(config.validate().is_err());
        config.output.end = Some(ymd(2010, 1, 5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_method_is_an_error() {
        let text = "start: 2010-01-01\nend: 2010-01-02\nbuildup: linear\nwashoff: exponential\n";
        assert!(RunConfig::from_yaml(text).is_err());
    }
}
