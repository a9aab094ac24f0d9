//! Immutable per-run parameter tables: pollutants, land uses and soils.
use crate::errors::{LoadError, LoadResult};
use crate::utils;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;

/// Name of the mandatory dissolved organic carbon species.
pub const DOC: &str = "DOC";

/// Pollutant-specific fate behaviour, chosen once when the registry is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kinetics {
    /// Dissolved organic carbon: no phase partitioning, baseline groundwater.
    Doc,
    /// Hydrophobic organic pollutant partitioning onto soil carbon and DOC.
    Hydrophobic {
        /// Organic carbon-water partition coefficient (L/kg).
        koc: f64,
        /// DOC-water partition coefficient (L/kg).
        kdoc: f64,
    },
}

impl Kinetics {
    /// True for the dissolved organic carbon variant.
    pub fn is_doc(&self) -> bool {
        matches!(self, Kinetics::Doc)
    }

    /// Whether channel-bed outcrops release this pollutant.
    pub fn erodes(&self) -> bool {
        !self.is_doc()
    }
}

/// Row of the pollutant table.
#[derive(Debug, Clone, Deserialize)]
pub struct PollutantRecord {
    /// Pollutant name; `DOC` is reserved.
    #[serde(rename = "POLLUTANT")]
    pub name: String,
    /// Half-life in water (days).
    pub hlw: f64,
    /// Half-life in soil (days).
    pub hls: f64,
    /// Concentration in precipitation (ng/L).
    pub cprep: f64,
    /// Dry flux to surface water (ug/(m2 yr)).
    pub riverflux: f64,
    /// log10 of the organic carbon partition coefficient (L/kg). Required except for DOC.
    #[serde(default)]
    pub logkoc: Option<f64>,
    /// log10 of the DOC partition coefficient (L/kg). Required except for DOC.
    #[serde(default)]
    pub logkdoc: Option<f64>,
}

/// A simulated pollutant species.
#[derive(Debug, Clone, PartialEq)]
pub struct Pollutant {
    /// Pollutant name.
    pub name: String,
    /// Decay rate in surface water (1/day).
    pub dwat: f64,
    /// Decay rate in soil and soil water (1/day).
    pub dsoil: f64,
    /// Concentration in precipitation (ng/L).
    pub cprep: f64,
    /// Dry flux to the river surface (ug/(m2 yr)).
    pub flux: f64,
    /// Soil partitioning behaviour.
    pub kinetics: Kinetics,
}

impl Pollutant {
    /// Build a pollutant from its table row.
    pub fn from_record(rec: &PollutantRecord) -> LoadResult<Self> {
        if rec.hlw <= 0.0 || rec.hls <= 0.0 {
            return Err(LoadError::config(format!(
                "half-lives of {} must be positive",
                rec.name
            )));
        }
        let kinetics = if rec.name == DOC {
            Kinetics::Doc
        } else {
            let logkoc = rec
                .logkoc
                .ok_or_else(|| LoadError::missing("pollutants.logkoc", rec.name.clone()))?;
            let logkdoc = rec
                .logkdoc
                .ok_or_else(|| LoadError::missing("pollutants.logkdoc", rec.name.clone()))?;
            Kinetics::Hydrophobic {
                koc: 10f64.powf(logkoc),
                kdoc: 10f64.powf(logkdoc),
            }
        };
        Ok(Pollutant {
            name: rec.name.clone(),
            dwat: utils::decay_rate(rec.hlw),
            dsoil: utils::decay_rate(rec.hls),
            cprep: rec.cprep,
            flux: rec.riverflux,
            kinetics,
        })
    }

    /// True for the dissolved organic carbon species.
    pub fn is_doc(&self) -> bool {
        self.kinetics.is_doc()
    }
}

/// Build-up and wash-off coefficients of one pollutant on one surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceCoefficients {
    /// Maximum build-up (kg/km2).
    pub bmax: f64,
    /// Build-up rate constant.
    pub kbu: f64,
    /// Build-up exponent.
    pub nbu: f64,
    /// Wash-off into infiltrating water.
    pub kwov: f64,
    /// Infiltration wash-off exponent.
    pub nwov: f64,
    /// Wash-off into surface runoff.
    pub kwoh: f64,
    /// Runoff wash-off exponent.
    pub nwoh: f64,
}

/// Soil-type coefficients of one pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoilCoefficients {
    /// DOC fraction of soil organic carbon (kg/L).
    pub fdoc: f64,
    /// Baseline groundwater concentration (ng/L).
    pub cbase: f64,
    /// Geologic leakage flux into the soil column (ug/(m2 yr)).
    pub geoflx: f64,
}

/// Row of the land-use table.
#[derive(Debug, Clone, Deserialize)]
pub struct LandUseRecord {
    /// Land use code.
    #[serde(rename = "LANDUSE")]
    pub landuse: String,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// Maximum build-up (kg/km2).
    pub bmax: f64,
    /// Build-up rate constant.
    pub kbu: f64,
    /// Build-up exponent.
    pub nbu: f64,
    /// Infiltration wash-off coefficient.
    pub kwov: f64,
    /// Infiltration wash-off exponent.
    pub nwov: f64,
    /// Runoff wash-off coefficient.
    pub kwoh: f64,
    /// Runoff wash-off exponent.
    pub nwoh: f64,
}

impl LandUseRecord {
    /// Coefficients carried by this row.
    pub fn coef(&self) -> SurfaceCoefficients {
        SurfaceCoefficients {
            bmax: self.bmax,
            kbu: self.kbu,
            nbu: self.nbu,
            kwov: self.kwov,
            nwov: self.nwov,
            kwoh: self.kwoh,
            nwoh: self.nwoh,
        }
    }
}

/// Row of the soil table.
#[derive(Debug, Clone, Deserialize)]
pub struct SoilRecord {
    /// Soil code.
    #[serde(rename = "SOIL")]
    pub soil: String,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// DOC fraction of soil organic carbon (kg/L).
    pub fdoc: f64,
    /// Baseline groundwater concentration (ng/L).
    pub cbase: f64,
    /// Geologic leakage flux (ug/(m2 yr)), zero when the column is absent.
    #[serde(default)]
    pub geoflx: f64,
}

impl SoilRecord {
    /// Coefficients carried by this row.
    pub fn coef(&self) -> SoilCoefficients {
        SoilCoefficients {
            fdoc: self.fdoc,
            cbase: self.cbase,
            geoflx: self.geoflx,
        }
    }
}

/// The immutable parameter registry of a run.
#[derive(Debug, Clone)]
pub struct Registry {
    pollutants: Vec<Pollutant>,
    landuse: HashMap<(String, String), SurfaceCoefficients>,
    soils: HashMap<(String, String), SoilCoefficients>,
}

impl Registry {
    /// Build the registry from raw table rows.
    /// DOC is mandatory in both the pollutant and the soil table and always takes slot zero,
    /// since every other pollutant reads its soil-water concentration on the same day.
    pub fn new(
        pollutants: &[PollutantRecord],
        landuse: &[LandUseRecord],
        soils: &[SoilRecord],
    ) -> LoadResult<Self> {
        let mut plist: Vec<Pollutant> = Vec::with_capacity(pollutants.len());
        for rec in pollutants {
            if plist.iter().any(|p| p.name == rec.name) {
                return Err(LoadError::duplicate("pollutants", rec.name.clone()));
            }
            plist.push(Pollutant::from_record(rec)?);
        }
        let id = plist
            .iter()
            .position(|p| p.is_doc())
            .ok_or_else(|| LoadError::config("DOC is a mandatory pollutant species"))?;
        let doc = plist.remove(id);
        plist.insert(0, doc);

        let mut lu = HashMap::new();
        for rec in landuse {
            let key = (rec.landuse.clone(), rec.pollutant.clone());
            if lu.insert(key, rec.coef()).is_some() {
                return Err(LoadError::duplicate(
                    "landuse",
                    format!("{}/{}", rec.landuse, rec.pollutant),
                ));
            }
        }

        let mut sol = HashMap::new();
        for rec in soils {
            let key = (rec.soil.clone(), rec.pollutant.clone());
            if sol.insert(key, rec.coef()).is_some() {
                return Err(LoadError::duplicate(
                    "soils",
                    format!("{}/{}", rec.soil, rec.pollutant),
                ));
            }
        }
        if !soils.iter().any(|s| s.pollutant == DOC) {
            return Err(LoadError::config(
                "DOC settings are mandatory in the soil table",
            ));
        }
        debug!(
            "registry: {} pollutants, {} land-use rows, {} soil rows",
            plist.len(),
            lu.len(),
            sol.len()
        );
        Ok(Registry {
            pollutants: plist,
            landuse: lu,
            soils: sol,
        })
    }

    /// Pollutants in simulation order, DOC first.
    pub fn pollutants(&self) -> &[Pollutant] {
        &self.pollutants
    }

    /// Slot of a pollutant by name.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.pollutants.iter().position(|p| p.name == name)
    }

    /// Land-use defaults of a pollutant.
    pub fn landuse(&self, landuse: &str, pollutant: &str) -> LoadResult<SurfaceCoefficients> {
        self.landuse
            .get(&(landuse.to_string(), pollutant.to_string()))
            .copied()
            .ok_or_else(|| LoadError::missing("landuse", format!("{}/{}", landuse, pollutant)))
    }

    /// Soil-type defaults of a pollutant.
    pub fn soil(&self, soil: &str, pollutant: &str) -> LoadResult<SoilCoefficients> {
        self.soils
            .get(&(soil.to_string(), pollutant.to_string()))
            .copied()
            .ok_or_else(|| LoadError::missing("soils", format!("{}/{}", soil, pollutant)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pollutant(name: &str, koc: Option<f64>) -> PollutantRecord {
        PollutantRecord {
            name: name.to_string(),
            hlw: 6.93,
            hls: 69.3,
            cprep: 10.0,
            riverflux: 5.0,
            logkoc: koc,
            logkdoc: koc,
        }
    }

    fn soil(name: &str, pollutant: &str) -> SoilRecord {
        SoilRecord {
            soil: name.to_string(),
            pollutant: pollutant.to_string(),
            fdoc: 0.01,
            cbase: 0.0,
            geoflx: 0.0,
        }
    }

    #[test]
    fn doc_moves_to_first_slot() {
        let plt = vec![pollutant("PHE", Some(4.0)), pollutant(DOC, None)];
        let reg = Registry::new(&plt, &[], &[soil("LOAM", DOC)]).unwrap();
        assert_eq!(reg.pollutants()[0].name, DOC);
        assert_eq!(reg.index("PHE"), Some(1));
        assert_relative_eq!(reg.pollutants()[0].dwat, 0.1, epsilon = 1e-12);
        assert_relative_eq!(reg.pollutants()[0].dsoil, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn hydrophobic_coefficients_are_powers_of_ten() {
        let p = Pollutant::from_record(&pollutant("PHE", Some(3.0))).unwrap();
        match p.kinetics {
            Kinetics::Hydrophobic { koc, kdoc } => {
                assert_relative_eq!(koc, 1000.0, epsilon = 1e-9);
                assert_relative_eq!(kdoc, 1000.0, epsilon = 1e-9);
            }
            Kinetics::Doc => panic!("expected hydrophobic kinetics"),
        }
        assert!(p.kinetics.erodes());
    }

    #[test]
    fn missing_doc_is_a_configuration_error() {
        let plt = vec![pollutant("PHE", Some(4.0))];
        let err = Registry::new(&plt, &[], &[soil("LOAM", "PHE")]).unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));

        let plt = vec![pollutant(DOC, None)];
        let err = Registry::new(&plt, &[], &[soil("LOAM", "PHE")]).unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }

    #[test]
    fn duplicate_pollutant_is_rejected() {
        let plt = vec![pollutant(DOC, None), pollutant(DOC, None)];
        let err = Registry::new(&plt, &[], &[soil("LOAM", DOC)]).unwrap_err();
        assert!(matches!(err, LoadError::Duplicate { .. }));
    }

    #[test]
    fn hydrophobic_requires_partition_coefficients() {
        let err = Pollutant::from_record(&pollutant("PHE", None)).unwrap_err();
        assert!(matches!(err, LoadError::MissingKey { .. }));
    }

    #[test]
    fn unknown_landuse_is_reported() {
        let plt = vec![pollutant(DOC, None)];
        let reg = Registry::new(&plt, &[], &[soil("LOAM", DOC)]).unwrap();
        assert!(reg.landuse("FRST", DOC).is_err());
        assert!(reg.soil("LOAM", DOC).is_ok());
    }
}
