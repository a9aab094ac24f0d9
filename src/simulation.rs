//! The daily loop: every subbasin, every land unit, every pollutant, in a fixed order.
use crate::aquifer::{AquiferDay, AquiferStores};
use crate::config::RunConfig;
use crate::errors::{LoadError, LoadResult};
use crate::output::{HruRow, Progress, Report, SubRow};
use crate::partition::{self, SoilDay};
use crate::registry::{Pollutant, Registry};
use crate::routing;
use crate::state::{ReachTotals, StateVariables};
use crate::surface::{SurfaceModel, SurfaceWater};
use crate::utils;
use crate::watershed::{HruDay, LandUnit, Subbasin};
use chrono::{Duration, NaiveDate};
use log::{debug, info, trace};

/// A configured watershed ready to be run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: RunConfig,
    registry: Registry,
    subbasins: Vec<Subbasin>,
    surface: SurfaceModel,
}

impl Simulation {
    /// Check that every subbasin and land unit is complete and size its state.
    ///
    /// Subbasins without reach flux rates get the registry defaults, subbasins without
    /// outcrop rows get none, and empty state is initialised to zero.
    pub fn new(
        config: RunConfig,
        registry: Registry,
        mut subbasins: Vec<Subbasin>,
    ) -> LoadResult<Self> {
        config.validate()?;
        let dates = config.dates();
        let np = registry.pollutants().len();
        for sub in subbasins.iter_mut() {
            check_series(&format!("subbasin {}", sub.id), &dates, &sub.series, |d| d.date)?;
            if sub.flux.is_empty() {
                sub.flux = registry
                    .pollutants()
                    .iter()
                    .map(|p| crate::channel::ReachFlux {
                        cprep: p.cprep,
                        riverflux: p.flux,
                    })
                    .collect();
            }
            if sub.outcrop.is_empty() {
                sub.outcrop = vec![None; np];
            }
            if sub.flux.len() != np || sub.outcrop.len() != np {
                return Err(LoadError::config(format!(
                    "subbasin {} does not cover all {} pollutants",
                    sub.id, np
                )));
            }
            sub.totals = vec![ReachTotals::default(); np];
            for unit in sub.units.iter_mut() {
                let name = format!("land unit {}", unit.id);
                check_series(&name, &dates, &unit.series, |d| d.date)?;
                if unit.surface.len() != np || unit.soilcoef.len() != np {
                    return Err(LoadError::config(format!(
                        "{} does not cover all {} pollutants",
                        name, np
                    )));
                }
                if unit.state.is_empty() {
                    unit.state = vec![StateVariables::default(); np];
                } else if unit.state.len() != np {
                    return Err(LoadError::config(format!(
                        "{} carries state for {} pollutants, expected {}",
                        name,
                        unit.state.len(),
                        np
                    )));
                }
            }
            debug!("subbasin {}: {} land units", sub.id, sub.units.len());
        }
        let surface = SurfaceModel::new(config.buildup, config.washoff);
        Ok(Simulation {
            config,
            registry,
            subbasins,
            surface,
        })
    }

    /// Settings of the run.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Parameter registry of the run.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Subbasins with their current state.
    pub fn subbasins(&self) -> &[Subbasin] {
        &self.subbasins
    }

    /// Run every day of the calendar, sending rows to `report` and calling `progress`
    /// once per completed day.
    pub fn run<R: Report, F: FnMut(&Progress)>(
        &mut self,
        report: &mut R,
        mut progress: F,
    ) -> LoadResult<()> {
        let dates = self.config.dates();
        let days = dates.len();
        info!(
            "Running {} days over {} subbasins and {} pollutants.",
            days,
            self.subbasins.len(),
            self.registry.pollutants().len()
        );
        for (day, date) in dates.iter().enumerate() {
            self.step(day, *date, report)?;
            progress(&Progress {
                day: day + 1,
                days,
                date: *date,
            });
        }
        report.finish()?;
        info!("Run complete.");
        Ok(())
    }

    /// Simulate day number `day` of the calendar, which must fall on `date`.
    pub fn step<R: Report>(&mut self, day: usize, date: NaiveDate, report: &mut R) -> LoadResult<()> {
        let days = self.config.days();
        if day >= days {
            return Err(LoadError::Series {
                unit: "calendar".to_string(),
                what: format!("day {} is past the end of a {}-day run", day, days),
            });
        }
        let expected = self.config.start + Duration::days(day as i64);
        if expected != date {
            return Err(LoadError::Series {
                unit: "calendar".to_string(),
                what: format!("day {} falls on {}, not {}", day, expected, date),
            });
        }
        trace!("day {} ({})", day, date);
        let config = &self.config;
        let surface = self.surface;
        let pollutants = self.registry.pollutants();
        let window = config.in_window(date);
        for sub in self.subbasins.iter_mut() {
            let reach = sub.series[day];

            if sub.has_outcrop() {
                for (slot, p) in pollutants.iter().enumerate() {
                    if !p.kinetics.erodes() {
                        continue;
                    }
                    if let Some(outcrop) = sub.outcrop[slot] {
                        let m = outcrop.erosion(reach.flow, sub.width, reach.tmp);
                        sub.totals[slot].mocp += m;
                        sub.totals[slot].mt += m;
                    }
                }
            }

            for unit in sub.units.iter_mut() {
                let hyd = unit.series[day];
                let mut cw_doc = 0.0;
                for (slot, p) in pollutants.iter().enumerate() {
                    let st = unit_day(
                        config,
                        &surface,
                        unit,
                        slot,
                        p,
                        &hyd,
                        sub.flux[slot].cprep,
                        cw_doc,
                    );
                    if p.is_doc() {
                        cw_doc = st.cw;
                    }
                    unit.state[slot] = st;
                    sub.totals[slot].add_unit(&st);
                    if window && config.output.hru && (config.output.doc || !p.is_doc()) {
                        report.hru(&HruRow {
                            date,
                            sub: sub.id,
                            hru: unit.id,
                            pollutant: p.name.clone(),
                            mt: st.out_mt,
                            msur: st.out_msurf,
                            mlat: st.out_mlat,
                            mgw: st.out_mgw,
                            mdgw: st.out_mdgw,
                            ct: st.out_conct,
                            clat: st.out_concl,
                            cgw: st.out_concg,
                            cdgw: st.out_concdg,
                            ctsoil: st.ctsoil,
                        })?;
                    }
                }
            }

            if config.river_flux {
                for (totals, flux) in sub.totals.iter_mut().zip(sub.flux.iter()) {
                    let m = flux.mass(sub.watsurf, reach.precip);
                    totals.mflux += m;
                    totals.mt += m;
                }
            }

            if window {
                for (slot, p) in pollutants.iter().enumerate() {
                    if p.is_doc() && !config.output.doc {
                        continue;
                    }
                    let t = &sub.totals[slot];
                    report.sub(&SubRow {
                        date,
                        sub: sub.id,
                        pollutant: p.name.clone(),
                        mt: t.mt,
                        msur: t.msurf,
                        mlat: t.mlat,
                        mgw: t.mgw,
                        mdgw: t.mdgw,
                        mflux: t.mflux,
                        mocp: t.mocp,
                    })?;
                }
            }
            sub.totals.iter_mut().for_each(ReachTotals::reset);
        }
        Ok(())
    }
}

fn check_series<T, F: Fn(&T) -> NaiveDate>(
    unit: &str,
    dates: &[NaiveDate],
    series: &[T],
    date: F,
) -> LoadResult<()> {
    if series.len() != dates.len() {
        return Err(LoadError::Series {
            unit: unit.to_string(),
            what: format!("{} daily rows for a {}-day run", series.len(), dates.len()),
        });
    }
    if let Some((row, want)) = series.iter().zip(dates).find(|(row, want)| date(*row) != **want) {
        return Err(LoadError::Series {
            unit: unit.to_string(),
            what: format!("row dated {} where {} was expected", date(row), want),
        });
    }
    Ok(())
}

/// One pollutant on one land unit for one day, from surface stock to channel delivery.
#[allow(clippy::too_many_arguments)]
fn unit_day(
    config: &RunConfig,
    surface: &SurfaceModel,
    unit: &LandUnit,
    slot: usize,
    pollutant: &Pollutant,
    hyd: &HruDay,
    cprep: f64,
    cw_doc: f64,
) -> StateVariables {
    let prev = &unit.state[slot];
    let mut st = *prev;
    st.reset_outputs();
    let area = unit.area;
    let dwat = pollutant.dwat;
    let dsoil = pollutant.dsoil;

    let surf = surface.step(
        &unit.surface[slot],
        dsoil,
        prev.maccu,
        &mut st.drydays,
        &SurfaceWater {
            wat: hyd.wat(),
            surq: hyd.surq,
            cprep,
            area,
        },
    );
    st.maccu = surf.mpa * area;
    st.msurf = surf.mhrmv;
    st.csurf = surf.csrmv;
    let (msurrch, msurfstor) =
        routing::surface_lag(surf.mhrmv, utils::decay(prev.msurfstor, dwat), &unit.lag);
    st.msurfstor = msurfstor;

    let coef = unit.soilcoef[slot];
    let kd = if unit.open_water { dwat } else { dsoil };
    let soil = pollutant.kinetics.partition(
        &unit.column,
        &SoilDay {
            vswc: partition::soil_water_volume(hyd.sw_end, hyd.perc, hyd.latq, area),
            latq: hyd.latq,
            perc: hyd.perc,
            soilin: surf.soilin,
            msoil: utils::decay(prev.msoil, kd),
            geoflux: partition::geoflux_kg(coef.geoflx, area),
            fdoc: coef.fdoc,
            cw_doc,
            doc_method: config.doc_method,
        },
    );
    st.mlat = soil.mlat;
    st.mper = soil.mper;
    st.cw = soil.cswc;
    st.ctsoil = soil.ctsoil;
    st.cdsoil = soil.cdsoil;
    st.cpsoil = soil.cpsoil;
    st.cdocsoil = soil.cdocsoil;

    let (mlatrch, mlatstor) = config.lateral_lag.route(
        soil.mlat,
        utils::decay(prev.mlatstor, dwat),
        &unit.lateral,
    );
    st.mlatstor = mlatstor;

    let gw = pollutant.kinetics.groundwater(
        &unit.aquifer,
        &AquiferStores {
            mperstor: prev.mperstor,
            msa: prev.msa,
            mda: prev.mda,
        },
        dsoil,
        &AquiferDay {
            area,
            mper: soil.mper,
            sa_st: hyd.sa_st,
            da_st: hyd.da_st,
            gw_q: hyd.gw_q,
            gw_q_d: hyd.gw_q_d,
            revap: hyd.revap,
            cbase: coef.cbase,
        },
    );
    st.mperstor = gw.stores.mperstor;
    st.msa = gw.stores.msa;
    st.mda = gw.stores.mda;
    st.mrevap = gw.mrevap;
    st.csaq = gw.cgw;
    st.cdaq = gw.cdgw;
    st.msoil = soil.msoilrem + gw.mrevap;

    st.out_msurf = msurrch;
    st.out_mlat = mlatrch;
    st.out_mgw = gw.mgwrch;
    st.out_mdgw = gw.mdgwrch;
    st.out_mt = msurrch + mlatrch + gw.mgwrch + gw.mdgwrch;
    // kg / (mm km2) -> ng/L
    st.out_conct = utils::ratio_or_zero(1e6 * st.out_mt, hyd.wyld * area);
    st.out_concs = utils::ratio_or_zero(1e6 * msurrch, hyd.surq_rch * area);
    st.out_concl = utils::ratio_or_zero(1e6 * mlatrch, hyd.latq_rch * area);
    st.out_concg = gw.cgw;
    st.out_concdg = gw.cdgw;
    st
}
