//! Shallow and deep aquifer reservoirs fed by percolating mass.
//!
//! Each aquifer is a well-mixed store; no solid-water partitioning takes place below the
//! soil column.
use crate::registry::Kinetics;
use crate::routing;
use crate::utils::{self, L_PER_MM_KM2};

/// Groundwater parameters of a land unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AquiferParams {
    /// Groundwater delay (days).
    pub gw_delay: f64,
    /// Fraction of recharge reaching the deep aquifer.
    pub rchrg_dp: f64,
}

/// Groundwater storages carried from day to day (kg).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AquiferStores {
    /// Percolating mass still travelling to the aquifers.
    pub mperstor: f64,
    /// Shallow aquifer mass.
    pub msa: f64,
    /// Deep aquifer mass.
    pub mda: f64,
}

/// Daily hydrology and loads seen by the aquifers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AquiferDay {
    /// Land unit area (km2).
    pub area: f64,
    /// Mass leaving the soil column with percolation (kg).
    pub mper: f64,
    /// Shallow aquifer storage (mm).
    pub sa_st: f64,
    /// Deep aquifer storage (mm).
    pub da_st: f64,
    /// Shallow groundwater flow to the channel (mm).
    pub gw_q: f64,
    /// Deep groundwater flow to the channel (mm).
    pub gw_q_d: f64,
    /// Water returning from the shallow aquifer to the soil (mm).
    pub revap: f64,
    /// Baseline groundwater concentration (ng/L).
    pub cbase: f64,
}

/// Result of one day in the aquifers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AquiferOutcome {
    /// Shallow groundwater mass to the channel (kg).
    pub mgwrch: f64,
    /// Deep groundwater mass to the channel (kg).
    pub mdgwrch: f64,
    /// Mass returned to the soil column by revap (kg).
    pub mrevap: f64,
    /// Shallow aquifer concentration (ng/L).
    pub cgw: f64,
    /// Deep aquifer concentration (ng/L).
    pub cdgw: f64,
    /// Storages to carry forward.
    pub stores: AquiferStores,
}

/// Concentration (ng/L) of `mass` kg mixed into `depth` mm over `area` km2.
fn mixed_conc(mass: f64, depth: f64, area: f64) -> f64 {
    if depth > 0.0 {
        mass / (depth * area) * 1e6
    } else {
        0.0
    }
}

/// Mass (kg) carried by `depth` mm of water at `conc` ng/L over `area` km2.
fn flow_mass(conc: f64, depth: f64, area: f64) -> f64 {
    conc * depth * area * L_PER_MM_KM2 / 1e12
}

impl Kinetics {
    /// Advance the aquifers of one pollutant by one day.
    ///  - `prev` are yesterday's storages, decayed here at `dsoil`.
    pub fn groundwater(
        &self,
        params: &AquiferParams,
        prev: &AquiferStores,
        dsoil: f64,
        day: &AquiferDay,
    ) -> AquiferOutcome {
        match self {
            Kinetics::Doc => AquiferOutcome {
                mgwrch: flow_mass(day.cbase, day.gw_q, day.area),
                mdgwrch: flow_mass(day.cbase, day.gw_q_d, day.area),
                cgw: day.cbase,
                cdgw: day.cbase,
                ..AquiferOutcome::default()
            },
            Kinetics::Hydrophobic { .. } => reservoirs(params, prev, dsoil, day),
        }
    }
}

fn reservoirs(
    params: &AquiferParams,
    prev: &AquiferStores,
    dsoil: f64,
    day: &AquiferDay,
) -> AquiferOutcome {
    let stored = utils::decay(prev.mperstor, dsoil);
    let (mgwi, mperstor) = routing::recharge_lag(day.mper, stored, params.gw_delay);
    let msai = mgwi * (1.0 - params.rchrg_dp);
    let mdai = mgwi - msai;

    let mgw = utils::decay(prev.msa, dsoil) + msai;
    let cgw = mixed_conc(mgw, day.sa_st + day.gw_q, day.area);
    let mgwrch = flow_mass(cgw, day.gw_q, day.area);
    let mrevap = flow_mass(cgw, day.revap, day.area).min(mgw - mgwrch).max(0.0);
    let msa = (mgw - mgwrch - mrevap).max(0.0);

    let mdgw = utils::decay(prev.mda, dsoil) + mdai;
    let cdgw = mixed_conc(mdgw, day.da_st + day.gw_q_d, day.area);
    let mdgwrch = flow_mass(cdgw, day.gw_q_d, day.area);
    let mda = (mdgw - mdgwrch).max(0.0);

    AquiferOutcome {
        mgwrch,
        mdgwrch,
        mrevap,
        cgw,
        cdgw,
        stores: AquiferStores { mperstor, msa, mda },
    }
}
