//! Loading a watershed project from a directory of tables.
//!
//! A project directory holds `settings.yaml` and the csv tables below. Optional tables may
//! be left out; user tables override defaults with land unit rows taking priority over
//! subbasin rows.
use crate::channel::{Outcrop, ReachFlux};
use crate::config::{InitType, RunConfig};
use crate::errors::{LoadError, LoadResult};
use crate::registry::{
    LandUseRecord, PollutantRecord, Registry, SoilCoefficients, SoilRecord, SurfaceCoefficients,
};
use crate::simulation::Simulation;
use crate::state::StateVariables;
use crate::utils::{self, NG_L_PER_KG_M3};
use crate::watershed::{
    HruDay, HruRecord, LandUnit, LayerRecord, SubDay, Subbasin, SubbasinRecord,
};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Run settings.
pub const SETTINGS: &str = "settings.yaml";
/// Pollutant table.
pub const POLLUTANTS: &str = "pollutants.csv";
/// Land use build-up and wash-off table.
pub const LANDUSE: &str = "landuse.csv";
/// Soil coefficient table.
pub const SOILS: &str = "soils.csv";
/// Subbasin geometry.
pub const SUBBASINS: &str = "subbasins.csv";
/// Land unit table.
pub const HRUS: &str = "hrus.csv";
/// Soil layers per land unit.
pub const SOIL_LAYERS: &str = "soil_layers.csv";
/// Daily land unit hydrology.
pub const HRU_DAILY: &str = "hru_daily.csv";
/// Daily reach forcing.
pub const SUB_DAILY: &str = "sub_daily.csv";
/// Optional soil and land use remapping.
pub const CONFLICT: &str = "conflict.csv";
/// Optional default initial soil concentrations.
pub const INIT: &str = "init.csv";
/// Optional initial soil concentrations per subbasin or land unit.
pub const USRINIT: &str = "usrinit.csv";
/// Optional build-up and wash-off overrides.
pub const USRLU: &str = "usrlu.csv";
/// Optional soil coefficient overrides.
pub const USRSOL: &str = "usrsol.csv";
/// Optional reach deposition overrides.
pub const USRFLUX: &str = "usrflux.csv";
/// Optional channel-bed outcrops.
pub const OUTCROP: &str = "outcrop.csv";
/// Land unit report written by a run.
pub const HRU_OUT: &str = "loadings.hruout";
/// Subbasin report written by a run.
pub const SUB_OUT: &str = "loadings.subout";

/// Wildcard land use in the conflict table.
pub const ANY: &str = "ANY";

/// Soil and land use remapping for combinations the parameter tables do not cover.
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictRecord {
    /// Soil code.
    #[serde(rename = "SOIL")]
    pub soil: String,
    /// Land use code, or `ANY`.
    #[serde(rename = "LU")]
    pub landuse: String,
    /// Replacement soil.
    #[serde(rename = "RSOIL")]
    pub rsoil: String,
    /// Replacement land use.
    #[serde(rename = "RLU")]
    pub rlanduse: String,
}

/// Replacement soil and land use of a land unit. An exact match wins over a wildcard row.
pub fn remap(conflicts: &[ConflictRecord], soil: &str, landuse: &str) -> (String, String) {
    let exact = conflicts
        .iter()
        .find(|c| c.soil == soil && c.landuse == landuse);
    let wild = || {
        conflicts
            .iter()
            .find(|c| c.soil == soil && c.landuse == ANY)
    };
    match exact.or_else(wild) {
        Some(c) => (c.rsoil.clone(), c.rlanduse.clone()),
        None => (soil.to_string(), landuse.to_string()),
    }
}

/// Default initial soil concentration, keyed per the run's initial-condition scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct InitRecord {
    /// Soil code, used by the soil schemes.
    #[serde(rename = "SOIL", default)]
    pub soil: Option<String>,
    /// Land use code, used by the land use schemes.
    #[serde(rename = "LANDUSE", default)]
    pub landuse: Option<String>,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// Total soil concentration (ng/L).
    pub ctsoil: f64,
}

/// Level a user row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ControlType {
    /// Applies to every land unit of a subbasin.
    #[serde(rename = "SUB")]
    Subbasin,
    /// Applies to one land unit.
    #[serde(rename = "HRU")]
    Hru,
}

/// Initial soil concentration for one subbasin or land unit.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInitRecord {
    /// Level the row applies to.
    #[serde(rename = "CTLTYPE")]
    pub ctl: ControlType,
    /// Subbasin or land unit id.
    #[serde(rename = "ID")]
    pub id: u32,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// Total soil concentration (ng/L).
    pub ctsoil: f64,
}

/// Build-up and wash-off coefficients for one subbasin or land unit.
#[derive(Debug, Clone, Deserialize)]
pub struct UserLandUseRecord {
    /// Level the row applies to.
    #[serde(rename = "CTLTYPE")]
    pub ctl: ControlType,
    /// Subbasin or land unit id.
    #[serde(rename = "ID")]
    pub id: u32,
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

impl UserLandUseRecord {
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

/// Soil coefficients for one subbasin or land unit.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSoilRecord {
    /// Level the row applies to.
    #[serde(rename = "CTLTYPE")]
    pub ctl: ControlType,
    /// Subbasin or land unit id.
    #[serde(rename = "ID")]
    pub id: u32,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// DOC fraction of soil organic carbon (kg/L).
    pub fdoc: f64,
    /// Baseline groundwater concentration (ng/L).
    pub cbase: f64,
    /// Geologic leakage flux (ug/(m2 yr)).
    #[serde(default)]
    pub geoflx: f64,
}

impl UserSoilRecord {
    /// Coefficients carried by this row.
    pub fn coef(&self) -> SoilCoefficients {
        SoilCoefficients {
            fdoc: self.fdoc,
            cbase: self.cbase,
            geoflx: self.geoflx,
        }
    }
}

/// Reach deposition rates of one pollutant in one subbasin.
#[derive(Debug, Clone, Deserialize)]
pub struct UserFluxRecord {
    /// Reach (subbasin) id.
    #[serde(rename = "RCH")]
    pub rch: u32,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// Concentration in precipitation (ng/L).
    pub cprep: f64,
    /// Dry flux to the river surface (ug/(m2 yr)).
    pub riverflux: f64,
}

/// Channel-bed outcrop of one pollutant in one subbasin.
#[derive(Debug, Clone, Deserialize)]
pub struct OutcropRecord {
    /// Subbasin id.
    #[serde(rename = "SUB")]
    pub sub: u32,
    /// Pollutant name.
    #[serde(rename = "POLLUTANT")]
    pub pollutant: String,
    /// Outcrop count coefficient.
    pub cocp: f64,
    /// Daily erosion intensity coefficient (kg/m2 per day).
    pub kocp: f64,
    /// Erosion exponent.
    pub nocp: f64,
    /// Critical unit-width discharge (m2/s).
    pub qwcr: f64,
    /// Activation energy (J/mol).
    pub ea: f64,
    /// Reference temperature (K).
    pub t0: f64,
}

impl OutcropRecord {
    /// Outcrop parameters carried by this row.
    pub fn outcrop(&self) -> Outcrop {
        Outcrop {
            cocp: self.cocp,
            kocp: self.kocp,
            nocp: self.nocp,
            qwcr: self.qwcr,
            ea: self.ea,
            t0: self.t0,
        }
    }
}

/// User values keyed by subbasin or land unit and pollutant.
#[derive(Debug, Clone)]
pub struct Overrides<T> {
    table: &'static str,
    sub: HashMap<(u32, String), T>,
    hru: HashMap<(u32, String), T>,
}

impl<T: Copy> Overrides<T> {
    /// Empty overrides for the named table.
    pub fn new(table: &'static str) -> Self {
        Overrides {
            table,
            sub: HashMap::new(),
            hru: HashMap::new(),
        }
    }

    /// Add a value, rejecting a second row for the same level, id and pollutant.
    pub fn insert(&mut self, ctl: ControlType, id: u32, pollutant: &str, value: T) -> LoadResult<()> {
        let map = match ctl {
            ControlType::Subbasin => &mut self.sub,
            ControlType::Hru => &mut self.hru,
        };
        if map.insert((id, pollutant.to_string()), value).is_some() {
            return Err(LoadError::duplicate(
                self.table,
                format!("{:?} {} {}", ctl, id, pollutant),
            ));
        }
        Ok(())
    }

    /// The land unit value if present, else the subbasin value.
    pub fn resolve(&self, sub: u32, hru: u32, pollutant: &str) -> Option<T> {
        let key = |id: u32| (id, pollutant.to_string());
        self.hru
            .get(&key(hru))
            .or_else(|| self.sub.get(&key(sub)))
            .copied()
    }

    /// Rows keyed on a subbasin or land unit that the watershed does not contain.
    pub fn orphans(&self, subs: &HashSet<u32>, hrus: &HashSet<u32>) -> Vec<String> {
        let sub = self
            .sub
            .keys()
            .filter(|(id, _)| !subs.contains(id))
            .map(|(id, p)| format!("{} SUB {} {}", self.table, id, p));
        let hru = self
            .hru
            .keys()
            .filter(|(id, _)| !hrus.contains(id))
            .map(|(id, p)| format!("{} HRU {} {}", self.table, id, p));
        sub.chain(hru).collect()
    }
}

/// Default initial soil concentrations under one keying scheme.
#[derive(Debug, Clone)]
struct InitTable {
    scheme: InitType,
    values: HashMap<(String, String), f64>,
}

impl InitTable {
    fn new(scheme: InitType, rows: &[InitRecord]) -> LoadResult<Self> {
        let mut values = HashMap::new();
        for rec in rows {
            let key = InitTable::key(scheme, rec.soil.as_deref(), rec.landuse.as_deref())
                .ok_or_else(|| {
                    LoadError::config(format!(
                        "{} row for {} lacks the columns its scheme needs",
                        INIT, rec.pollutant
                    ))
                })?;
            if values
                .insert((key.clone(), rec.pollutant.clone()), rec.ctsoil)
                .is_some()
            {
                return Err(LoadError::duplicate(
                    "init",
                    format!("{}/{}", key, rec.pollutant),
                ));
            }
        }
        Ok(InitTable { scheme, values })
    }

    fn key(scheme: InitType, soil: Option<&str>, landuse: Option<&str>) -> Option<String> {
        match scheme {
            InitType::Soil => soil.map(str::to_string),
            InitType::LandUse => landuse.map(str::to_string),
            InitType::SoilLandUse => Some(format!("{}/{}", soil?, landuse?)),
        }
    }

    fn get(&self, soil: &str, landuse: &str, pollutant: &str) -> Option<f64> {
        let key = InitTable::key(self.scheme, Some(soil), Some(landuse))?;
        self.values.get(&(key, pollutant.to_string())).copied()
    }
}

/// A watershed project read from disk.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory the tables were read from.
    pub dir: PathBuf,
    /// Run settings.
    pub config: RunConfig,
    /// Pollutant, land use and soil parameters.
    pub registry: Registry,
    /// Subbasins with their land units, in table order.
    pub subbasins: Vec<Subbasin>,
    /// Rows naming a subbasin or land unit the watershed lacks, skipped with a warning.
    pub ignored: Vec<String>,
}

impl Project {
    /// Read settings and every table from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> LoadResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        info!("Loading project from {}.", dir.display());
        let config = RunConfig::from_path(dir.join(SETTINGS))?;

        let pollutants: Vec<PollutantRecord> = utils::read_table(dir.join(POLLUTANTS))?;
        let landuse: Vec<LandUseRecord> = utils::read_table(dir.join(LANDUSE))?;
        let soils: Vec<SoilRecord> = utils::read_table(dir.join(SOILS))?;
        let registry = Registry::new(&pollutants, &landuse, &soils)?;

        let tables = Tables::read(&dir, &config, &registry)?;
        let (subbasins, ignored) = tables.build(&config, &registry)?;
        info!(
            "Loaded {} subbasins with {} land units.",
            subbasins.len(),
            subbasins.iter().map(|s| s.units.len()).sum::<usize>()
        );
        Ok(Project {
            dir,
            config,
            registry,
            subbasins,
            ignored,
        })
    }

    /// Paths of the land unit and subbasin reports.
    pub fn output_paths(&self) -> (PathBuf, PathBuf) {
        (self.dir.join(HRU_OUT), self.dir.join(SUB_OUT))
    }

    /// Hand the project to the daily loop.
    pub fn simulation(self) -> LoadResult<Simulation> {
        Simulation::new(self.config, self.registry, self.subbasins)
    }
}

/// Raw tables that describe the watershed itself.
struct Tables {
    subbasins: Vec<SubbasinRecord>,
    hrus: Vec<HruRecord>,
    layers: HashMap<u32, Vec<LayerRecord>>,
    hru_daily: HashMap<u32, Vec<HruDay>>,
    sub_daily: HashMap<u32, Vec<SubDay>>,
    conflicts: Vec<ConflictRecord>,
    init: Option<InitTable>,
    usrinit: Overrides<f64>,
    usrlu: Overrides<SurfaceCoefficients>,
    usrsol: Overrides<SoilCoefficients>,
    usrflux: HashMap<(u32, String), ReachFlux>,
    outcrop: HashMap<(u32, String), Outcrop>,
}

fn known(registry: &Registry, table: &'static str, pollutant: &str) -> LoadResult<()> {
    registry
        .index(pollutant)
        .map(|_| ())
        .ok_or_else(|| LoadError::missing("pollutants", format!("{} in {}", pollutant, table)))
}

impl Tables {
    fn read(dir: &Path, config: &RunConfig, registry: &Registry) -> LoadResult<Self> {
        let subbasins: Vec<SubbasinRecord> = utils::read_table(dir.join(SUBBASINS))?;
        let hrus: Vec<HruRecord> = utils::read_table(dir.join(HRUS))?;

        let mut layers: HashMap<u32, Vec<LayerRecord>> = HashMap::new();
        for rec in utils::read_table::<LayerRecord, _>(dir.join(SOIL_LAYERS))? {
            layers.entry(rec.hru).or_insert_with(Vec::new).push(rec);
        }
        for profile in layers.values_mut() {
            profile.sort_by(|a, b| {
                a.depth
                    .partial_cmp(&b.depth)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let in_run = |d: &chrono::NaiveDate| *d >= config.start && *d <= config.end;
        let mut hru_daily: HashMap<u32, Vec<HruDay>> = HashMap::new();
        for rec in utils::read_table::<HruDay, _>(dir.join(HRU_DAILY))? {
            if in_run(&rec.date) {
                hru_daily.entry(rec.hru).or_insert_with(Vec::new).push(rec);
            }
        }
        let mut sub_daily: HashMap<u32, Vec<SubDay>> = HashMap::new();
        for rec in utils::read_table::<SubDay, _>(dir.join(SUB_DAILY))? {
            if in_run(&rec.date) {
                sub_daily.entry(rec.sub).or_insert_with(Vec::new).push(rec);
            }
        }

        let conflicts: Vec<ConflictRecord> = utils::read_optional(dir.join(CONFLICT))?;

        let init_rows: Vec<InitRecord> = utils::read_optional(dir.join(INIT))?;
        let init = if init_rows.is_empty() {
            None
        } else {
            Some(InitTable::new(config.init_type, &init_rows)?)
        };

        let mut usrinit = Overrides::new("usrinit");
        for rec in utils::read_optional::<UserInitRecord, _>(dir.join(USRINIT))? {
            known(registry, USRINIT, &rec.pollutant)?;
            usrinit.insert(rec.ctl, rec.id, &rec.pollutant, rec.ctsoil)?;
        }
        let mut usrlu = Overrides::new("usrlu");
        for rec in utils::read_optional::<UserLandUseRecord, _>(dir.join(USRLU))? {
            known(registry, USRLU, &rec.pollutant)?;
            usrlu.insert(rec.ctl, rec.id, &rec.pollutant, rec.coef())?;
        }
        let mut usrsol = Overrides::new("usrsol");
        for rec in utils::read_optional::<UserSoilRecord, _>(dir.join(USRSOL))? {
            known(registry, USRSOL, &rec.pollutant)?;
            usrsol.insert(rec.ctl, rec.id, &rec.pollutant, rec.coef())?;
        }

        let mut usrflux = HashMap::new();
        for rec in utils::read_optional::<UserFluxRecord, _>(dir.join(USRFLUX))? {
            known(registry, USRFLUX, &rec.pollutant)?;
            let flux = ReachFlux {
                cprep: rec.cprep,
                riverflux: rec.riverflux,
            };
            if usrflux.insert((rec.rch, rec.pollutant.clone()), flux).is_some() {
                return Err(LoadError::duplicate(
                    "usrflux",
                    format!("{}/{}", rec.rch, rec.pollutant),
                ));
            }
        }

        let mut outcrop = HashMap::new();
        for rec in utils::read_optional::<OutcropRecord, _>(dir.join(OUTCROP))? {
            known(registry, OUTCROP, &rec.pollutant)?;
            if outcrop
                .insert((rec.sub, rec.pollutant.clone()), rec.outcrop())
                .is_some()
            {
                return Err(LoadError::duplicate(
                    "outcrop",
                    format!("{}/{}", rec.sub, rec.pollutant),
                ));
            }
        }

        Ok(Tables {
            subbasins,
            hrus,
            layers,
            hru_daily,
            sub_daily,
            conflicts,
            init,
            usrinit,
            usrlu,
            usrsol,
            usrflux,
            outcrop,
        })
    }

    /// Rows of the user and outcrop tables whose ids are not in the watershed.
    fn orphans(&self) -> Vec<String> {
        let subs: HashSet<u32> = self.subbasins.iter().map(|r| r.id).collect();
        let hrus: HashSet<u32> = self.hrus.iter().map(|r| r.id).collect();
        let mut rows = self.usrinit.orphans(&subs, &hrus);
        rows.extend(self.usrlu.orphans(&subs, &hrus));
        rows.extend(self.usrsol.orphans(&subs, &hrus));
        rows.extend(
            self.usrflux
                .keys()
                .filter(|(id, _)| !subs.contains(id))
                .map(|(id, p)| format!("usrflux RCH {} {}", id, p)),
        );
        rows.extend(
            self.outcrop
                .keys()
                .filter(|(id, _)| !subs.contains(id))
                .map(|(id, p)| format!("outcrop SUB {} {}", id, p)),
        );
        rows
    }

    fn build(
        mut self,
        config: &RunConfig,
        registry: &Registry,
    ) -> LoadResult<(Vec<Subbasin>, Vec<String>)> {
        let mut ignored = self.orphans();
        let mut subs: Vec<Subbasin> = Vec::with_capacity(self.subbasins.len());
        let mut index: HashMap<u32, usize> = HashMap::new();
        for rec in &self.subbasins {
            if index.insert(rec.id, subs.len()).is_some() {
                return Err(LoadError::duplicate("subbasins", rec.id.to_string()));
            }
            let mut sub = Subbasin::new(rec);
            sub.series = self.sub_daily.remove(&rec.id).unwrap_or_default();
            for p in registry.pollutants() {
                let key = (rec.id, p.name.clone());
                sub.flux.push(self.usrflux.get(&key).copied().unwrap_or(ReachFlux {
                    cprep: p.cprep,
                    riverflux: p.flux,
                }));
                sub.outcrop.push(self.outcrop.get(&key).copied());
            }
            if sub.has_outcrop() {
                debug!("subbasin {} has channel-bed outcrops", rec.id);
            }
            subs.push(sub);
        }
        ignored.extend(self.sub_daily.keys().map(|id| format!("sub_daily SUB {}", id)));

        let mut seen = HashSet::new();
        for rec in &self.hrus {
            if !seen.insert(rec.id) {
                return Err(LoadError::duplicate("hrus", rec.id.to_string()));
            }
            let slot = *index
                .get(&rec.sub)
                .ok_or_else(|| LoadError::missing("subbasins", rec.sub.to_string()))?;
            let srec = &self.subbasins[slot];
            let layers = self
                .layers
                .get(&rec.id)
                .map(|l| l.as_slice())
                .unwrap_or(&[]);
            let mut unit = LandUnit::new(rec, srec, layers)?;

            let (soil, landuse) = remap(&self.conflicts, &rec.soil, &rec.landuse);
            if soil != rec.soil || landuse != rec.landuse {
                debug!(
                    "land unit {}: {}/{} remapped to {}/{}",
                    rec.id, rec.soil, rec.landuse, soil, landuse
                );
            }
            unit.open_water = config.water_soil.as_deref() == Some(soil.as_str());
            unit.series = self.hru_daily.remove(&rec.id).unwrap_or_default();

            for p in registry.pollutants() {
                let surface = match self.usrlu.resolve(rec.sub, rec.id, &p.name) {
                    Some(c) => c,
                    None => registry.landuse(&landuse, &p.name)?,
                };
                let soilcoef = match self.usrsol.resolve(rec.sub, rec.id, &p.name) {
                    Some(c) => c,
                    None => registry.soil(&soil, &p.name)?,
                };
                let ctsoil = self
                    .usrinit
                    .resolve(rec.sub, rec.id, &p.name)
                    .or_else(|| {
                        self.init
                            .as_ref()
                            .and_then(|t| t.get(&soil, &landuse, &p.name))
                    })
                    .unwrap_or(0.0);
                unit.surface.push(surface);
                unit.soilcoef.push(soilcoef);
                unit.state.push(StateVariables {
                    msoil: ctsoil * unit.column.vsoil / NG_L_PER_KG_M3,
                    ..StateVariables::default()
                });
            }
            unit.soil = soil;
            unit.landuse = landuse;
            subs[slot].units.push(unit);
        }
        ignored.extend(self.hru_daily.keys().map(|id| format!("hru_daily HRU {}", id)));
        ignored.sort();
        for row in &ignored {
            warn!("{}: unknown subbasin or land unit, rows ignored", row);
        }
        Ok((subs, ignored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(soil: &str, lu: &str, rsoil: &str, rlu: &str) -> ConflictRecord {
        ConflictRecord {
            soil: soil.to_string(),
            landuse: lu.to_string(),
            rsoil: rsoil.to_string(),
            rlanduse: rlu.to_string(),
        }
    }

    #[test]
    fn exact_conflict_row_wins() {
        let rows = vec![
            conflict("ROCK", ANY, "LOAM", "FRST"),
            conflict("ROCK", "URBN", "LOAM", "URMD"),
        ];
        assert_eq!(
            remap(&rows, "ROCK", "URBN"),
            ("LOAM".to_string(), "URMD".to_string())
        );
        assert_eq!(
            remap(&rows, "ROCK", "AGRL"),
            ("LOAM".to_string(), "FRST".to_string())
        );
        assert_eq!(
            remap(&rows, "SAND", "AGRL"),
            ("SAND".to_string(), "AGRL".to_string())
        );
    }

    #[test]
    fn land_unit_override_beats_subbasin() {
        let mut o = Overrides::new("usrinit");
        o.insert(ControlType::Subbasin, 1, "PHE", 10.0).unwrap();
        o.insert(ControlType::Hru, 3, "PHE", 30.0).unwrap();
        assert_eq!(o.resolve(1, 3, "PHE"), Some(30.0));
        assert_eq!(o.resolve(1, 4, "PHE"), Some(10.0));
        assert_eq!(o.resolve(2, 5, "PHE"), None);
        assert_eq!(o.resolve(1, 3, "DOC"), None);
        assert!(o.insert(ControlType::Hru, 3, "PHE", 31.0).is_err());
    }

    #[test]
    fn overrides_report_unknown_ids() {
        let mut o = Overrides::new("usrsol");
        o.insert(ControlType::Subbasin, 1, "PHE", 1.0).unwrap();
        o.insert(ControlType::Subbasin, 42, "PHE", 1.0).unwrap();
        o.insert(ControlType::Hru, 99, "DOC", 1.0).unwrap();
        let subs: HashSet<u32> = vec![1].into_iter().collect();
        let hrus: HashSet<u32> = vec![1, 2].into_iter().collect();
        let mut rows = o.orphans(&subs, &hrus);
        rows.sort();
        assert_eq!(rows, vec!["usrsol HRU 99 DOC", "usrsol SUB 42 PHE"]);
    }

    fn init(soil: Option<&str>, lu: Option<&str>, c: f64) -> InitRecord {
        InitRecord {
            soil: soil.map(str::to_string),
            landuse: lu.map(str::to_string),
            pollutant: "PHE".to_string(),
            ctsoil: c,
        }
    }

    #[test]
    fn init_schemes() {
        let rows = vec![init(Some("LOAM"), Some("AGRL"), 5.0), init(Some("SAND"), Some("AGRL"), 7.0)];
        let t = InitTable::new(InitType::SoilLandUse, &rows).unwrap();
        assert_eq!(t.get("SAND", "AGRL", "PHE"), Some(7.0));
        assert_eq!(t.get("SAND", "FRST", "PHE"), None);
        let t = InitTable::new(InitType::Soil, &rows).unwrap();
        assert_eq!(t.get("LOAM", "FRST", "PHE"), Some(5.0));
        // both rows share the land use key
        assert!(InitTable::new(InitType::LandUse, &rows).is_err());
        assert!(InitTable::new(InitType::LandUse, &[init(Some("LOAM"), None, 1.0)]).is_err());
    }
}
