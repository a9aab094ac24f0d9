//! Soil column mass balance and three-phase equilibrium partitioning.
//!
//! Concentrations are in ng/L of whole soil volume unless noted. DOC takes a
//! simplified path: its soil-water concentration follows from soil organic carbon and
//! it is never partitioned, nor does it percolate.
use crate::registry::Kinetics;
use crate::utils::{self, M3_PER_MM_KM2, NG_L_PER_KG_M3};
use serde::{Deserialize, Serialize};

/// Density of the soil solid phase (mg/L).
pub const SOLID_DENSITY: f64 = 2.65e6;

/// How the soil-water DOC concentration is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocMethod {
    /// From the organic carbon content of the soil solids, independent of soil water.
    CarbonRatio,
    /// From the organic carbon mass spread over the soil-water volume.
    MassBalance,
}

impl Default for DocMethod {
    fn default() -> Self {
        DocMethod::CarbonRatio
    }
}

/// Static soil column of a land unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoilColumn {
    /// Land unit area (km2).
    pub area: f64,
    /// Soil volume (m3).
    pub vsoil: f64,
    /// Mass of soil solids (kg).
    pub msolid: f64,
    /// Mass of soil organic carbon (kg).
    pub morgc: f64,
    /// Organic carbon content (weight %).
    pub orgc: f64,
}

/// Soil-water volume (m3) from end-of-day storage plus today's percolation and lateral flow (mm).
pub fn soil_water_volume(sw_end: f64, perc: f64, latq: f64, area: f64) -> f64 {
    (sw_end + perc + latq) * area * M3_PER_MM_KM2
}

/// Daily geologic leakage (kg) from an annual flux in ug/(m2 yr) over `area` km2.
pub fn geoflux_kg(geoflx: f64, area: f64) -> f64 {
    geoflx * area / (365.0 * 1000.0)
}

/// Daily inputs to the soil column of one pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoilDay {
    /// Soil-water volume (m3).
    pub vswc: f64,
    /// Lateral flow (mm).
    pub latq: f64,
    /// Percolation (mm).
    pub perc: f64,
    /// Mass infiltrating from the surface (kg).
    pub soilin: f64,
    /// Carried-forward soil mass after decay (kg).
    pub msoil: f64,
    /// Geologic leakage (kg).
    pub geoflux: f64,
    /// DOC fraction of soil organic carbon.
    pub fdoc: f64,
    /// Today's soil-water DOC concentration (ng/L).
    pub cw_doc: f64,
    /// DOC derivation method.
    pub doc_method: DocMethod,
}

/// Result of one day in the soil column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoilOutcome {
    /// Total soil column mass before losses (kg).
    pub msoil: f64,
    /// Mass remaining in the soil column after losses (kg).
    pub msoilrem: f64,
    /// Concentration in soil water (ng/L).
    pub cswc: f64,
    /// Total concentration per soil volume.
    pub ctsoil: f64,
    /// Dissolved phase concentration.
    pub cdsoil: f64,
    /// Solid phase concentration.
    pub cpsoil: f64,
    /// DOC-bound phase concentration.
    pub cdocsoil: f64,
    /// Mass leaving with lateral flow (kg).
    pub mlat: f64,
    /// Mass leaving with percolation (kg).
    pub mper: f64,
}

/// Dissolved, solid-bound and DOC-bound fractions of the soil mass.
///  - `theta` volumetric soil water content.
///  - `kdoc` DOC-water partition coefficient (L/kg).
///  - `cwdoc` DOC concentration in soil water (mg/L).
///  - `kp` solid-water partition coefficient (L/kg).
///
/// Returns `(fd, fp, fdoc)`, all zero when nothing can hold the pollutant.
pub fn fractions(theta: f64, kdoc: f64, cwdoc: f64, kp: f64) -> (f64, f64, f64) {
    let water = 1e6 * theta;
    let bound_doc = kdoc * theta * cwdoc;
    let bound_solid = kp * SOLID_DENSITY;
    let rsoil = water + bound_doc + bound_solid;
    if rsoil <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    (water / rsoil, bound_solid / rsoil, bound_doc / rsoil)
}

impl Kinetics {
    /// Soil column mass balance of one pollutant on one land unit for one day.
    pub fn partition(&self, col: &SoilColumn, day: &SoilDay) -> SoilOutcome {
        match *self {
            Kinetics::Doc => doc_soil(col, day),
            Kinetics::Hydrophobic { koc, kdoc } => hydrophobic_soil(koc, kdoc, col, day),
        }
    }
}

fn doc_soil(col: &SoilColumn, day: &SoilDay) -> SoilOutcome {
    let cdoc = match day.doc_method {
        // mg/kg soil organic carbon
        DocMethod::CarbonRatio => utils::ratio_or_zero(1e6 * col.morgc, col.msolid) * day.fdoc,
        // kg/m3 = mg/L
        DocMethod::MassBalance => utils::ratio_or_zero(1e3 * col.morgc, day.vswc) * day.fdoc,
    };
    let mdoc = cdoc * day.vswc / 1000.0;
    let cswc = utils::ratio_or_zero(NG_L_PER_KG_M3 * mdoc, day.vswc);
    // percolation is left out of the DOC balance
    let mlat = cswc * day.latq * col.area / 1e6;
    SoilOutcome {
        msoil: mdoc,
        msoilrem: mdoc,
        cswc,
        mlat,
        ..SoilOutcome::default()
    }
}

fn hydrophobic_soil(koc: f64, kdoc: f64, col: &SoilColumn, day: &SoilDay) -> SoilOutcome {
    let msoil = day.soilin + day.msoil + day.geoflux;
    let cswc = utils::ratio_or_zero(NG_L_PER_KG_M3 * msoil, day.vswc);
    let ctsoil = utils::ratio_or_zero(NG_L_PER_KG_M3 * msoil, col.vsoil);
    let theta = utils::ratio_or_zero(day.vswc, col.vsoil);
    let kp = koc * col.orgc / 100.0;
    let (fd, fp, fdoc) = fractions(theta, kdoc, day.cw_doc / 1e6, kp);
    let cdsoil = ctsoil * fd;
    let cpsoil = ctsoil * fp;
    let cdocsoil = ctsoil * fdoc;
    let (mlat, mper) = if day.vswc > 0.0 {
        // mobile concentration in soil water (ng/L) times flow volume (mm km2 = 1e6 L)
        let cw = (cdsoil + cdocsoil) * col.vsoil / day.vswc;
        (
            cw * day.latq * col.area / 1e6,
            cw * day.perc * col.area / 1e6,
        )
    } else {
        (0.0, 0.0)
    };
    SoilOutcome {
        msoil,
        msoilrem: (msoil - mlat - mper).max(0.0),
        cswc,
        ctsoil,
        cdsoil,
        cpsoil,
        cdocsoil,
        mlat,
        mper,
    }
}
