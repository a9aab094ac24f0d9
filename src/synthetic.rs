//! Randomly generated watersheds for benchmarks and property tests.
//!
//! Create a generator using a builder pattern, then draw a watershed from any [`Rng`]:
//!
//! ```
//! use loadings::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut sim = Synthetic::new()
//!     .subbasins(2)
//!     .units(3)
//!     .days(10)
//!     .rain(0.4, 8.0)?
//!     .simulation(&mut rng)?;
//! let mut report = MemoryReport::new();
//! sim.run(&mut report, |_| {})?;
//! assert_eq!(report.sub.len(), 2 * 10 * 3);
//! # Ok::<(), LoadError>(())
//! ```
use crate::config::RunConfig;
use crate::errors::{LoadError, LoadResult};
use crate::registry::{LandUseRecord, PollutantRecord, Registry, SoilRecord};
use crate::simulation::Simulation;
use crate::surface::{BuildUp, WashOff};
use crate::watershed::{HruDay, HruRecord, LandUnit, LayerRecord, SubDay, Subbasin, SubbasinRecord};
use chrono::NaiveDate;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// Builder for synthetic watersheds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synthetic {
    subbasins: usize,
    units: usize,
    days: usize,
    wet: f64,
    /// Mean depth of a wet day (mm).
    mean: f64,
    buildup: BuildUp,
    washoff: WashOff,
}

impl Default for Synthetic {
    fn default() -> Self {
        Synthetic::new()
    }
}

impl Synthetic {
    /// One subbasin with one land unit over 30 days, wet on a third of them.
    pub fn new() -> Self {
        Synthetic {
            subbasins: 1,
            units: 1,
            days: 30,
            wet: 0.3,
            mean: 10.0,
            buildup: BuildUp::Power,
            washoff: WashOff::FlowExponential,
        }
    }

    /// Number of subbasins.
    pub fn subbasins(mut self, n: usize) -> Self {
        self.subbasins = n;
        self
    }

    /// Land units per subbasin.
    pub fn units(mut self, n: usize) -> Self {
        self.units = n;
        self
    }

    /// Number of simulated days.
    pub fn days(mut self, n: usize) -> Self {
        self.days = n;
        self
    }

    /// Rain falls on a share `wet` of days with exponentially distributed depths of mean `mean` mm.
    pub fn rain(mut self, wet: f64, mean: f64) -> LoadResult<Self> {
        if !(0.0..=1.0).contains(&wet) {
            return Err(LoadError::config(format!("wet-day share {} is not a probability", wet)));
        }
        rain_depth(mean)?;
        self.mean = mean;
        self.wet = wet;
        Ok(self)
    }

    /// Build-up and wash-off families.
    pub fn methods(mut self, buildup: BuildUp, washoff: WashOff) -> Self {
        self.buildup = buildup;
        self.washoff = washoff;
        self
    }

    /// DOC plus a light and a heavy hydrophobic compound.
    pub fn registry() -> LoadResult<Registry> {
        let pollutants = vec![
            record("DOC", 1e6, 1e6, 0.0, 0.0, None, None),
            record("PHE", 5.0, 60.0, 40.0, 15.0, Some(4.2), Some(3.7)),
            record("BAP", 20.0, 400.0, 5.0, 2.0, Some(6.0), Some(5.0)),
        ];
        let mut landuse = Vec::new();
        let mut soils = Vec::new();
        for (i, p) in ["DOC", "PHE", "BAP"].iter().enumerate() {
            let scale = 1.0 / (1.0 + i as f64);
            landuse.push(LandUseRecord {
                landuse: "AGRL".to_string(),
                pollutant: p.to_string(),
                bmax: 4.0 * scale,
                kbu: 0.5,
                nbu: 0.6,
                kwov: 0.05,
                nwov: 1.0,
                kwoh: 0.2,
                nwoh: 1.2,
            });
            soils.push(SoilRecord {
                soil: "LOAM".to_string(),
                pollutant: p.to_string(),
                fdoc: 0.01,
                cbase: 50.0 * scale,
                geoflx: 0.5 * scale,
            });
        }
        Registry::new(&pollutants, &landuse, &soils)
    }

    /// Calendar covering the generated days.
    pub fn config(&self) -> LoadResult<RunConfig> {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1)
            .ok_or_else(|| LoadError::config("invalid start date"))?;
        if self.days == 0 {
            return Err(LoadError::config("a run needs at least one day"));
        }
        let end = start
            .iter_days()
            .nth(self.days - 1)
            .ok_or_else(|| LoadError::config("calendar overflow"))?;
        Ok(RunConfig::new(start, end, self.buildup, self.washoff))
    }

    /// Draw subbasins, land units and daily hydrology.
    pub fn watershed<R: Rng>(&self, rng: &mut R, registry: &Registry) -> LoadResult<Vec<Subbasin>> {
        let dates = self.config()?.dates();
        let depth = rain_depth(self.mean)?;
        let unit = Uniform::new(0.0, 1.0);
        let mut subs = Vec::with_capacity(self.subbasins);
        let mut hru_id = 0;
        for s in 0..self.subbasins {
            let srec = SubbasinRecord {
                id: s as u32 + 1,
                area: 2.0 + 20.0 * unit.sample(rng),
                ch_l1: 1.0 + 5.0 * unit.sample(rng),
                ch_s1: 0.002 + 0.02 * unit.sample(rng),
                ch_n1: 0.014,
                ch_w2: 3.0 + 10.0 * unit.sample(rng),
                ch_l2: 1.0 + 4.0 * unit.sample(rng),
            };
            let mut sub = Subbasin::new(&srec);
            let rain: Vec<f64> = dates
                .iter()
                .map(|_| {
                    if unit.sample(rng) < self.wet {
                        depth.sample(rng)
                    } else {
                        0.0
                    }
                })
                .collect();
            sub.series = dates
                .iter()
                .zip(&rain)
                .map(|(date, precip)| SubDay {
                    date: *date,
                    sub: srec.id,
                    precip: *precip,
                    flow: 1.0 + 5.0 * precip + 20.0 * unit.sample(rng),
                    tmp: 5.0 + 20.0 * unit.sample(rng),
                })
                .collect();

            for _ in 0..self.units {
                hru_id += 1;
                let hrec = HruRecord {
                    sub: srec.id,
                    id: hru_id,
                    landuse: "AGRL".to_string(),
                    soil: "LOAM".to_string(),
                    hru_fr: 1.0 / self.units as f64,
                    hru_slp: 0.01 + 0.1 * unit.sample(rng),
                    slsoil: 20.0 + 60.0 * unit.sample(rng),
                    slsubbsn: 20.0 + 60.0 * unit.sample(rng),
                    lat_ttime: 0.0,
                    surlag: 4.0,
                    ov_n: 0.1,
                    gw_delay: 30.0 * unit.sample(rng),
                    rchrg_dp: 0.05,
                };
                let layers = vec![
                    LayerRecord {
                        hru: hru_id,
                        depth: 300.0,
                        solbd: 1.3,
                        ksat: 5.0 + 20.0 * unit.sample(rng),
                        orgc: 0.5 + 3.0 * unit.sample(rng),
                        rock: 5.0,
                    },
                    LayerRecord {
                        hru: hru_id,
                        depth: 1000.0,
                        solbd: 1.5,
                        ksat: 2.0 + 10.0 * unit.sample(rng),
                        orgc: 0.2 + unit.sample(rng),
                        rock: 10.0,
                    },
                ];
                let mut lu = LandUnit::new(&hrec, &srec, &layers)?;
                for p in registry.pollutants() {
                    lu.surface.push(registry.landuse(&lu.landuse, &p.name)?);
                    lu.soilcoef.push(registry.soil(&lu.soil, &p.name)?);
                }
                lu.series = dates
                    .iter()
                    .zip(&rain)
                    .map(|(date, precip)| hydrology(rng, &unit, *date, hru_id, *precip))
                    .collect();
                sub.units.push(lu);
            }
            subs.push(sub);
        }
        Ok(subs)
    }

    /// A ready-to-run simulation over a fresh synthetic watershed.
    pub fn simulation<R: Rng>(&self, rng: &mut R) -> LoadResult<Simulation> {
        let registry = Synthetic::registry()?;
        let subs = self.watershed(rng, &registry)?;
        Simulation::new(self.config()?, registry, subs)
    }
}

fn rain_depth(mean: f64) -> LoadResult<Exp<f64>> {
    Exp::new(1.0 / mean)
        .map_err(|e| LoadError::config(format!("mean rain depth {}: {:?}", mean, e)))
}

fn record(
    name: &str,
    hlw: f64,
    hls: f64,
    cprep: f64,
    riverflux: f64,
    logkoc: Option<f64>,
    logkdoc: Option<f64>,
) -> PollutantRecord {
    PollutantRecord {
        name: name.to_string(),
        hlw,
        hls,
        cprep,
        riverflux,
        logkoc,
        logkdoc,
    }
}

fn hydrology<R: Rng>(rng: &mut R, unit: &Uniform<f64>, date: NaiveDate, hru: u32, precip: f64) -> HruDay {
    let surq = precip * 0.4 * unit.sample(rng);
    let infil = precip - surq;
    let perc = infil * 0.3 * unit.sample(rng);
    let latq = infil * 0.1 * unit.sample(rng);
    let gw_q = 0.5 * unit.sample(rng);
    let gw_q_d = 0.1 * unit.sample(rng);
    HruDay {
        date,
        hru,
        precip,
        snomelt: 0.0,
        surq,
        surq_rch: surq * 0.8,
        perc,
        sw_end: 20.0 + 130.0 * unit.sample(rng),
        latq,
        latq_rch: latq,
        wyld: surq * 0.8 + latq + gw_q + gw_q_d,
        revap: 0.2 * unit.sample(rng),
        sa_st: 50.0 * unit.sample(rng),
        da_st: 200.0 * unit.sample(rng),
        gw_q,
        gw_q_d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_same_watershed() {
        let reg = Synthetic::registry().unwrap();
        let gen = Synthetic::new().subbasins(2).units(2).days(5);
        let a = gen.watershed(&mut StdRng::seed_from_u64(1), &reg).unwrap();
        let b = gen.watershed(&mut StdRng::seed_from_u64(1), &reg).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].units[1].id, 4);
        assert_eq!(a[0].units[0].series, b[0].units[0].series);
        assert_eq!(a[1].series.len(), 5);
    }

    #[test]
    fn bad_settings() {
        assert!(Synthetic::new().rain(1.5, 5.0).is_err());
        assert!(Synthetic::new().rain(0.5, -5.0).is_err());
        assert!(Synthetic::new().days(0).config().is_err());
    }

    #[test]
    fn doc_leads_the_registry() {
        let reg = Synthetic::registry().unwrap();
        let names: Vec<&str> = reg.pollutants().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["DOC", "PHE", "BAP"]);
    }
}
