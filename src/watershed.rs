//! Subbasins, land units and the daily hydrology that drives them.
use crate::aquifer::AquiferParams;
use crate::channel::{Outcrop, ReachFlux};
use crate::errors::{LoadError, LoadResult};
use crate::partition::SoilColumn;
use crate::registry::{SoilCoefficients, SurfaceCoefficients};
use crate::routing::{LagGeometry, LateralGeometry};
use crate::state::{ReachTotals, StateVariables};
use crate::utils;
use chrono::NaiveDate;
use serde::Deserialize;

/// Row of the subbasin geometry table.
#[derive(Debug, Clone, Deserialize)]
pub struct SubbasinRecord {
    /// Subbasin id.
    #[serde(rename = "SUB")]
    pub id: u32,
    /// Subbasin area (km2).
    #[serde(rename = "SUB_KM")]
    pub area: f64,
    /// Longest tributary channel length (km).
    #[serde(rename = "CH_L1")]
    pub ch_l1: f64,
    /// Tributary channel slope (m/m).
    #[serde(rename = "CH_S1")]
    pub ch_s1: f64,
    /// Tributary channel Manning's n.
    #[serde(rename = "CH_N1")]
    pub ch_n1: f64,
    /// Main channel width (m).
    #[serde(rename = "CH_W2")]
    pub ch_w2: f64,
    /// Main channel length (km).
    #[serde(rename = "CH_L2")]
    pub ch_l2: f64,
}

/// Row of the land unit table.
#[derive(Debug, Clone, Deserialize)]
pub struct HruRecord {
    /// Subbasin id.
    #[serde(rename = "SUB")]
    pub sub: u32,
    /// Watershed-wide land unit id.
    #[serde(rename = "HRU")]
    pub id: u32,
    /// Land use code.
    #[serde(rename = "LANDUSE")]
    pub landuse: String,
    /// Soil code.
    #[serde(rename = "SOIL")]
    pub soil: String,
    /// Fraction of the subbasin area.
    #[serde(rename = "HRU_FR")]
    pub hru_fr: f64,
    /// Average slope (m/m).
    #[serde(rename = "HRU_SLP")]
    pub hru_slp: f64,
    /// Lateral flow slope length (m).
    #[serde(rename = "SLSOIL")]
    pub slsoil: f64,
    /// Overland slope length (m).
    #[serde(rename = "SLSUBBSN")]
    pub slsubbsn: f64,
    /// Lateral flow travel time (days), zero to derive it.
    #[serde(rename = "LAT_TTIME")]
    pub lat_ttime: f64,
    /// Surface runoff lag coefficient.
    #[serde(rename = "SURLAG")]
    pub surlag: f64,
    /// Overland Manning's n.
    #[serde(rename = "OV_N")]
    pub ov_n: f64,
    /// Groundwater delay (days).
    #[serde(rename = "GW_DELAY")]
    pub gw_delay: f64,
    /// Deep aquifer percolation fraction.
    #[serde(rename = "RCHRG_DP")]
    pub rchrg_dp: f64,
}

/// One soil layer of a land unit.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerRecord {
    /// Land unit id.
    #[serde(rename = "HRU")]
    pub hru: u32,
    /// Depth from the surface to the bottom of the layer (mm).
    #[serde(rename = "DEPTH")]
    pub depth: f64,
    /// Moist bulk density (g/cm3).
    #[serde(rename = "SOLBD")]
    pub solbd: f64,
    /// Saturated hydraulic conductivity (mm/h).
    #[serde(rename = "KSAT")]
    pub ksat: f64,
    /// Organic carbon (weight %).
    #[serde(rename = "ORGC")]
    pub orgc: f64,
    /// Rock fragments (volume %).
    #[serde(rename = "ROCK")]
    pub rock: f64,
}

/// Depth-weighted properties of a soil profile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoilProfile {
    /// Profile depth (mm).
    pub depth: f64,
    /// Bulk density (g/cm3).
    pub solbd: f64,
    /// Saturated hydraulic conductivity (mm/h).
    pub ksat: f64,
    /// Organic carbon (weight %).
    pub orgc: f64,
    /// Rock fragments (volume %).
    pub rock: f64,
}

impl SoilProfile {
    /// Average a profile from its layers, shallowest first.
    pub fn from_layers(layers: &[LayerRecord]) -> Self {
        let depths: Vec<f64> = layers.iter().map(|l| l.depth).collect();
        let avg = |f: fn(&LayerRecord) -> f64| {
            let vals: Vec<f64> = layers.iter().map(f).collect();
            utils::depth_weighted(&depths, &vals)
        };
        SoilProfile {
            depth: depths.iter().cloned().fold(0.0, f64::max),
            solbd: avg(|l| l.solbd),
            ksat: avg(|l| l.ksat),
            orgc: avg(|l| l.orgc),
            rock: avg(|l| l.rock),
        }
    }
}

/// Hydrology of one land unit on one day (depths in mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct HruDay {
    /// Simulated day.
    #[serde(rename = "DATE")]
    pub date: NaiveDate,
    /// Land unit id.
    #[serde(rename = "HRU")]
    pub hru: u32,
    /// Precipitation.
    #[serde(rename = "PRECIP")]
    pub precip: f64,
    /// Snowmelt.
    #[serde(rename = "SNOMELT")]
    pub snomelt: f64,
    /// Surface runoff generated.
    #[serde(rename = "SURQ")]
    pub surq: f64,
    /// Surface runoff reaching the channel.
    #[serde(rename = "SURQRCH")]
    pub surq_rch: f64,
    /// Percolation out of the soil profile.
    #[serde(rename = "PERC")]
    pub perc: f64,
    /// Soil water at the end of the day.
    #[serde(rename = "SWEND")]
    pub sw_end: f64,
    /// Lateral flow generated.
    #[serde(rename = "LATQ")]
    pub latq: f64,
    /// Lateral flow reaching the channel.
    #[serde(rename = "LATQRCH")]
    pub latq_rch: f64,
    /// Water yield.
    #[serde(rename = "WYLD")]
    pub wyld: f64,
    /// Revap from the shallow aquifer.
    #[serde(rename = "REVAP")]
    pub revap: f64,
    /// Shallow aquifer storage.
    #[serde(rename = "SAST")]
    pub sa_st: f64,
    /// Deep aquifer storage.
    #[serde(rename = "DAST")]
    pub da_st: f64,
    /// Shallow groundwater flow to the channel.
    #[serde(rename = "GWQ")]
    pub gw_q: f64,
    /// Deep groundwater flow to the channel.
    #[serde(rename = "DGWQ")]
    pub gw_q_d: f64,
}

impl HruDay {
    /// Precipitation plus snowmelt reaching the surface.
    pub fn wat(&self) -> f64 {
        self.precip + self.snomelt
    }
}

/// Reach-level forcing of one subbasin on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct SubDay {
    /// Simulated day.
    #[serde(rename = "DATE")]
    pub date: NaiveDate,
    /// Subbasin id.
    #[serde(rename = "SUB")]
    pub sub: u32,
    /// Subbasin precipitation (mm).
    #[serde(rename = "PRECIP")]
    pub precip: f64,
    /// Reach discharge (m3/s).
    #[serde(rename = "FLOW")]
    pub flow: f64,
    /// Air temperature (degrees Celsius).
    #[serde(rename = "TMP")]
    pub tmp: f64,
}

/// Smallest simulated area: one land use on one soil and slope.
#[derive(Debug, Clone)]
pub struct LandUnit {
    /// Owning subbasin.
    pub sub: u32,
    /// Land unit id.
    pub id: u32,
    /// Land use after conflict remapping.
    pub landuse: String,
    /// Soil after conflict remapping.
    pub soil: String,
    /// Area (km2).
    pub area: f64,
    /// Depth-weighted soil properties.
    pub profile: SoilProfile,
    /// Soil column derived from the profile.
    pub column: SoilColumn,
    /// Surface runoff lag geometry.
    pub lag: LagGeometry,
    /// Lateral flow geometry.
    pub lateral: LateralGeometry,
    /// Aquifer recharge parameters.
    pub aquifer: AquiferParams,
    /// Soil mass decays at the water rate.
    pub open_water: bool,
    /// Build-up and wash-off coefficients, one per pollutant slot.
    pub surface: Vec<SurfaceCoefficients>,
    /// Soil coefficients, one per pollutant slot.
    pub soilcoef: Vec<SoilCoefficients>,
    /// Daily hydrology over the run.
    pub series: Vec<HruDay>,
    /// State per pollutant slot.
    pub state: Vec<StateVariables>,
}

impl LandUnit {
    /// Build a land unit and its derived soil column from table rows.
    pub fn new(rec: &HruRecord, sub: &SubbasinRecord, layers: &[LayerRecord]) -> LoadResult<Self> {
        if layers.is_empty() {
            return Err(LoadError::missing("soil_layers", rec.id.to_string()));
        }
        let area = sub.area * rec.hru_fr;
        if area <= 0.0 {
            return Err(LoadError::config(format!(
                "land unit {} has no area",
                rec.id
            )));
        }
        let profile = SoilProfile::from_layers(layers);
        // km2 * mm = 1000 m3
        let vsoil = area * profile.depth * 1000.0;
        // g/cm3 = t/m3
        let msolid = 1000.0 * vsoil * profile.solbd * (1.0 - profile.rock / 100.0);
        let column = SoilColumn {
            area,
            vsoil,
            msolid,
            morgc: msolid * profile.orgc / 100.0,
            orgc: profile.orgc,
        };
        Ok(LandUnit {
            sub: rec.sub,
            id: rec.id,
            landuse: rec.landuse.clone(),
            soil: rec.soil.clone(),
            area,
            profile,
            column,
            lag: LagGeometry {
                surlag: rec.surlag,
                slope_length: rec.slsubbsn,
                slope: rec.hru_slp,
                ov_n: rec.ov_n,
                area,
                channel_length: sub.ch_l1 * rec.hru_fr,
                channel_slope: sub.ch_s1,
                channel_n: sub.ch_n1,
            },
            lateral: LateralGeometry {
                slope_length: rec.slsoil,
                ksat: profile.ksat,
                travel_time: rec.lat_ttime,
            },
            aquifer: AquiferParams {
                gw_delay: rec.gw_delay,
                rchrg_dp: rec.rchrg_dp,
            },
            open_water: false,
            surface: Vec::new(),
            soilcoef: Vec::new(),
            series: Vec::new(),
            state: Vec::new(),
        })
    }
}

/// A subbasin draining to one channel reach.
#[derive(Debug, Clone)]
pub struct Subbasin {
    /// Subbasin id.
    pub id: u32,
    /// Area (km2).
    pub area: f64,
    /// Main channel width (m).
    pub width: f64,
    /// Main channel length (km).
    pub length: f64,
    /// River water surface (m2).
    pub watsurf: f64,
    /// Land units draining to the reach.
    pub units: Vec<LandUnit>,
    /// Deposition rates, one per pollutant slot.
    pub flux: Vec<ReachFlux>,
    /// Outcrop parameters, one per pollutant slot.
    pub outcrop: Vec<Option<Outcrop>>,
    /// Daily reach forcing over the run.
    pub series: Vec<SubDay>,
    /// Daily channel accumulators, one per pollutant slot.
    pub totals: Vec<ReachTotals>,
}

impl Subbasin {
    /// Build an empty subbasin from its geometry row.
    pub fn new(rec: &SubbasinRecord) -> Self {
        Subbasin {
            id: rec.id,
            area: rec.area,
            width: rec.ch_w2,
            length: rec.ch_l2,
            watsurf: rec.ch_w2 * rec.ch_l2 * 1000.0,
            units: Vec::new(),
            flux: Vec::new(),
            outcrop: Vec::new(),
            series: Vec::new(),
            totals: Vec::new(),
        }
    }

    /// Whether any pollutant erodes from channel-bed outcrops here.
    pub fn has_outcrop(&self) -> bool {
        self.outcrop.iter().any(|o| o.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sub() -> SubbasinRecord {
        SubbasinRecord {
            id: 1,
            area: 10.0,
            ch_l1: 4.0,
            ch_s1: 0.01,
            ch_n1: 0.014,
            ch_w2: 12.0,
            ch_l2: 3.0,
        }
    }

    fn hru() -> HruRecord {
        HruRecord {
            sub: 1,
            id: 7,
            landuse: "FRST".to_string(),
            soil: "LOAM".to_string(),
            hru_fr: 0.25,
            hru_slp: 0.05,
            slsoil: 30.0,
            slsubbsn: 60.0,
            lat_ttime: 0.0,
            surlag: 4.0,
            ov_n: 0.14,
            gw_delay: 31.0,
            rchrg_dp: 0.05,
        }
    }

    fn layer(depth: f64, solbd: f64, orgc: f64) -> LayerRecord {
        LayerRecord {
            hru: 7,
            depth,
            solbd,
            ksat: 10.0,
            orgc,
            rock: 10.0,
        }
    }

    #[test]
    fn derived_soil_column() {
        let layers = vec![layer(300.0, 1.2, 3.0), layer(1000.0, 1.5, 1.0)];
        let unit = LandUnit::new(&hru(), &sub(), &layers).unwrap();
        assert_relative_eq!(unit.area, 2.5);
        assert_relative_eq!(unit.profile.depth, 1000.0);
        let bd = (1.2 * 300.0 + 1.5 * 700.0) / 1000.0;
        let orgc = (3.0 * 300.0 + 1.0 * 700.0) / 1000.0;
        assert_relative_eq!(unit.column.vsoil, 2.5e6);
        assert_relative_eq!(unit.column.msolid, 1000.0 * 2.5e6 * bd * 0.9, epsilon = 1e-3);
        assert_relative_eq!(
            unit.column.morgc,
            unit.column.msolid * orgc / 100.0,
            epsilon = 1e-3
        );
        assert_relative_eq!(unit.lag.channel_length, 1.0);
    }

    #[test]
    fn land_unit_needs_layers() {
        assert!(LandUnit::new(&hru(), &sub(), &[]).is_err());
    }

    #[test]
    fn river_surface_area() {
        let s = Subbasin::new(&sub());
        assert_relative_eq!(s.watsurf, 36_000.0);
        assert!(!s.has_outcrop());
    }
}
