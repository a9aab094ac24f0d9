//! Daily report rows and the sinks that receive them.
use crate::errors::LoadResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column order of the land unit report.
pub const HRU_HEADER: [&str; 14] = [
    "DATE",
    "SUB",
    "HRU",
    "POLLUTANT",
    "MTkg",
    "MSURkg",
    "MLATkg",
    "MGWkg",
    "MDGWkg",
    "CTng/L",
    "CLATng/L",
    "CGWng/L",
    "CDGWng/L",
    "CTSOILng/L",
];

/// Column order of the subbasin report.
pub const SUB_HEADER: [&str; 10] = [
    "DATE",
    "SUB",
    "POLLUTANT",
    "MTkg",
    "MSURkg",
    "MLATkg",
    "MGWkg",
    "MDGWkg",
    "MFLUXkg",
    "MOCPkg",
];

/// Loads of one pollutant delivered by one land unit on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HruRow {
    /// Simulated day.
    pub date: NaiveDate,
    /// Subbasin id.
    pub sub: u32,
    /// Land unit id.
    pub hru: u32,
    /// Pollutant name.
    pub pollutant: String,
    /// Total load to the reach (kg).
    pub mt: f64,
    /// Surface runoff load (kg).
    pub msur: f64,
    /// Lateral flow load (kg).
    pub mlat: f64,
    /// Shallow groundwater load (kg).
    pub mgw: f64,
    /// Deep groundwater load (kg).
    pub mdgw: f64,
    /// Concentration in water yield (ng/L).
    pub ct: f64,
    /// Concentration in lateral flow (ng/L).
    pub clat: f64,
    /// Shallow groundwater concentration (ng/L).
    pub cgw: f64,
    /// Deep groundwater concentration (ng/L).
    pub cdgw: f64,
    /// Total soil concentration (ng/L).
    pub ctsoil: f64,
}

/// Loads of one pollutant entering one reach on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubRow {
    /// Simulated day.
    pub date: NaiveDate,
    /// Subbasin id.
    pub sub: u32,
    /// Pollutant name.
    pub pollutant: String,
    /// Total load into the reach (kg).
    pub mt: f64,
    /// Surface runoff load (kg).
    pub msur: f64,
    /// Lateral flow load (kg).
    pub mlat: f64,
    /// Shallow groundwater load (kg).
    pub mgw: f64,
    /// Deep groundwater load (kg).
    pub mdgw: f64,
    /// River-surface deposition (kg).
    pub mflux: f64,
    /// Outcrop erosion (kg).
    pub mocp: f64,
}

/// Progress of a running simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Days completed so far.
    pub day: usize,
    /// Days in the run.
    pub days: usize,
    /// Last completed day.
    pub date: NaiveDate,
}

impl Progress {
    /// Completed share of the run.
    pub fn fraction(&self) -> f64 {
        if self.days == 0 {
            1.0
        } else {
            self.day as f64 / self.days as f64
        }
    }
}

/// Receiver of report rows, in the order the simulation produces them.
pub trait Report {
    /// Accept a land unit row.
    fn hru(&mut self, row: &HruRow) -> LoadResult<()>;
    /// Accept a subbasin row.
    fn sub(&mut self, row: &SubRow) -> LoadResult<()>;
    /// Called once after the last day.
    fn finish(&mut self) -> LoadResult<()> {
        Ok(())
    }
}

/// Every row goes to both reports.
impl<A: Report, B: Report> Report for (A, B) {
    fn hru(&mut self, row: &HruRow) -> LoadResult<()> {
        self.0.hru(row)?;
        self.1.hru(row)
    }

    fn sub(&mut self, row: &SubRow) -> LoadResult<()> {
        self.0.sub(row)?;
        self.1.sub(row)
    }

    fn finish(&mut self) -> LoadResult<()> {
        self.0.finish()?;
        self.1.finish()
    }
}

/// Rows collected in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReport {
    /// Land unit rows in write order.
    pub hru: Vec<HruRow>,
    /// Subbasin rows in write order.
    pub sub: Vec<SubRow>,
}

impl MemoryReport {
    /// An empty report.
    pub fn new() -> Self {
        MemoryReport::default()
    }

    /// Daily total load of a pollutant into a reach.
    pub fn sub_series(&self, sub: u32, pollutant: &str) -> Vec<(NaiveDate, f64)> {
        self.sub
            .iter()
            .filter(|r| r.sub == sub && r.pollutant == pollutant)
            .map(|r| (r.date, r.mt))
            .collect()
    }
}

impl Report for MemoryReport {
    fn hru(&mut self, row: &HruRow) -> LoadResult<()> {
        self.hru.push(row.clone());
        Ok(())
    }

    fn sub(&mut self, row: &SubRow) -> LoadResult<()> {
        self.sub.push(row.clone());
        Ok(())
    }
}

/// Rows written as two comma-separated streams.
pub struct CsvReport<W: Write> {
    hru: csv::Writer<W>,
    sub: csv::Writer<W>,
}

impl CsvReport<File> {
    /// Create (or truncate) the two report files.
    pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(hru: P, sub: Q) -> LoadResult<Self> {
        CsvReport::from_writers(File::create(hru)?, File::create(sub)?)
    }
}

impl<W: Write> CsvReport<W> {
    /// Wrap two writers and emit the header lines.
    pub fn from_writers(hru: W, sub: W) -> LoadResult<Self> {
        let mut hru = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(hru);
        let mut sub = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sub);
        hru.write_record(&HRU_HEADER)?;
        sub.write_record(&SUB_HEADER)?;
        Ok(CsvReport { hru, sub })
    }

    /// Flush and hand back the underlying writers.
    pub fn into_writers(self) -> LoadResult<(W, W)> {
        let hru = self
            .hru
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        let sub = self
            .sub
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        Ok((hru, sub))
    }
}

impl<W: Write> Report for CsvReport<W> {
    fn hru(&mut self, row: &HruRow) -> LoadResult<()> {
        self.hru.serialize(row)?;
        Ok(())
    }

    fn sub(&mut self, row: &SubRow) -> LoadResult<()> {
        self.sub.serialize(row)?;
        Ok(())
    }

    fn finish(&mut self) -> LoadResult<()> {
        self.hru.flush()?;
        self.sub.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2001, 3, 4).unwrap()
    }

    #[test]
    fn csv_headers_and_rows() {
        let mut report = CsvReport::from_writers(Vec::new(), Vec::new()).unwrap();
        report
            .sub(&SubRow {
                date: date(),
                sub: 2,
                pollutant: "PHE".to_string(),
                mt: 1.5,
                msur: 0.5,
                mlat: 0.25,
                mgw: 0.25,
                mdgw: 0.0,
                mflux: 0.5,
                mocp: 0.0,
            })
            .unwrap();
        report.finish().unwrap();
        let (hru, sub) = report.into_writers().unwrap();
        let hru = String::from_utf8(hru).unwrap();
        let sub = String::from_utf8(sub).unwrap();
        assert_eq!(
            hru.trim_end(),
            "DATE,SUB,HRU,POLLUTANT,MTkg,MSURkg,MLATkg,MGWkg,MDGWkg,CTng/L,CLATng/L,CGWng/L,CDGWng/L,CTSOILng/L"
        );
        let lines: Vec<&str> = sub.lines().collect();
        assert_eq!(
            lines[0],
            "DATE,SUB,POLLUTANT,MTkg,MSURkg,MLATkg,MGWkg,MDGWkg,MFLUXkg,MOCPkg"
        );
        assert_eq!(lines[1], "2001-03-04,2,PHE,1.5,0.5,0.25,0.25,0.0,0.5,0.0");
    }

    #[test]
    fn memory_series_filters() {
        let mut report = MemoryReport::new();
        for (sub, p) in &[(1, "DOC"), (1, "PHE"), (2, "PHE")] {
            report
                .sub(&SubRow {
                    date: date(),
                    sub: *sub,
                    pollutant: p.to_string(),
                    mt: f64::from(*sub),
                    msur: 0.0,
                    mlat: 0.0,
                    mgw: 0.0,
                    mdgw: 0.0,
                    mflux: 0.0,
                    mocp: 0.0,
                })
                .unwrap();
        }
        assert_eq!(report.sub_series(2, "PHE"), vec![(date(), 2.0)]);
        assert!(report.sub_series(3, "PHE").is_empty());
    }

    #[test]
    fn paired_reports_see_the_same_rows() {
        let mut pair = (MemoryReport::new(), MemoryReport::new());
        let row = SubRow {
            date: date(),
            sub: 1,
            pollutant: "DOC".to_string(),
            mt: 1.0,
            msur: 1.0,
            mlat: 0.0,
            mgw: 0.0,
            mdgw: 0.0,
            mflux: 0.0,
            mocp: 0.0,
        };
        pair.sub(&row).unwrap();
        pair.finish().unwrap();
        assert_eq!(pair.0.sub, pair.1.sub);
        assert_eq!(pair.1.sub.len(), 1);
    }

    #[test]
    fn progress_fraction() {
        let p = Progress {
            day: 5,
            days: 10,
            date: date(),
        };
        assert_eq!(p.fraction(), 0.5);
    }
}
