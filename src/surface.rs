//! Land-surface build-up during dry weather and wash-off by rain and snowmelt.
//!
//! Masses on the surface are carried per unit area (kg/km2); the masses handed on to
//! the lag router and the soil column are totals over the land unit (kg).
use crate::registry::SurfaceCoefficients;
use crate::utils::{self, L_PER_MM_KM2, NG_PER_KG};
use serde::{Deserialize, Serialize};

/// Build-up function, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildUp {
    /// `k * t^n` added per dry spell.
    Power,
    /// `bmax * (1 - exp(-k t))` added per dry spell.
    Exponential,
    /// `bmax * t / (k + t)` added every dry day, with daily decay of the stock.
    Saturation,
    /// Saturation curve continued from the current stock.
    HalfSaturation,
}

impl BuildUp {
    /// Accumulate `days` of build-up onto `mass` (kg/km2), capped at `bmax`.
    pub fn accumulate(&self, coef: &SurfaceCoefficients, mass: f64, days: f64) -> f64 {
        let bmax = coef.bmax;
        let k = coef.kbu;
        let added = match self {
            BuildUp::Power => k * days.powf(coef.nbu),
            BuildUp::Exponential => bmax * (1.0 - (-k * days).exp()),
            BuildUp::Saturation => utils::ratio_or_zero(bmax * days, k + days),
            BuildUp::HalfSaturation => {
                if mass >= bmax {
                    return bmax;
                }
                // elapsed time that would have produced the current stock
                let t0 = utils::ratio_or_zero(k * mass, bmax - mass);
                let t = t0 + days;
                return utils::ratio_or_zero(bmax * t, k + t).max(mass).min(bmax);
            }
        };
        (mass + added).min(bmax)
    }

    /// Saturation build-up decays its stock daily and ignores antecedent dry days.
    pub fn is_saturation(&self) -> bool {
        matches!(self, BuildUp::Saturation)
    }
}

/// Wash-off function, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WashOff {
    /// Removal proportional to the stock, independent of flow.
    Exponential,
    /// Removal rate scaled by the flow depth.
    FlowExponential,
    /// Removal of `k q^n`, limited by the stock.
    RatingCurve,
}

impl WashOff {
    /// Wash `mass` (kg/km2) off with coefficients `k`, `n` and flow depth `q` (mm).
    /// Returns `(remaining, removed)`.
    pub fn remove(&self, mass: f64, k: f64, n: f64, q: f64) -> (f64, f64) {
        let w = match self {
            WashOff::Exponential => mass * (1.0 - (-k).exp()),
            WashOff::FlowExponential => mass * (1.0 - (-k * q).exp()),
            WashOff::RatingCurve => mass.min(k * q.powf(n)),
        };
        let w = w.max(0.0).min(mass);
        (mass - w, w)
    }
}

/// Water reaching the surface of a land unit on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceWater {
    /// Precipitation plus snowmelt (mm).
    pub wat: f64,
    /// Generated surface runoff (mm).
    pub surq: f64,
    /// Pollutant concentration in precipitation (ng/L).
    pub cprep: f64,
    /// Land unit area (km2).
    pub area: f64,
}

/// Result of one day of surface processes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceOutcome {
    /// Surface stock after wash-off (kg/km2).
    pub mpa: f64,
    /// Mass removed into surface runoff (kg).
    pub mhrmv: f64,
    /// Concentration of the removed mass in surface runoff (ng/L).
    pub csrmv: f64,
    /// Mass carried into the soil column with infiltration (kg).
    pub soilin: f64,
}

/// Surface processes of one pollutant on one land unit for one day.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceModel {
    /// Build-up family.
    pub buildup: BuildUp,
    /// Wash-off family.
    pub washoff: WashOff,
}

impl SurfaceModel {
    /// Create a surface model from the run's build-up and wash-off choice.
    pub fn new(buildup: BuildUp, washoff: WashOff) -> Self {
        SurfaceModel { buildup, washoff }
    }

    /// Advance the surface stock `maccu` (kg) by one day.
    ///  - `dsoil` is the soil decay rate applied to a saturation stock.
    ///  - `drydays` is the antecedent dry-day counter, updated in place.
    pub fn step(
        &self,
        coef: &SurfaceCoefficients,
        dsoil: f64,
        maccu: f64,
        drydays: &mut u32,
        water: &SurfaceWater,
    ) -> SurfaceOutcome {
        let ori = utils::ratio_or_zero(maccu, water.area);
        if water.wat == 0.0 {
            let mpa = if self.buildup.is_saturation() {
                self.buildup
                    .accumulate(coef, utils::decay(ori, dsoil), 1.0)
            } else {
                *drydays += 1;
                ori
            };
            return SurfaceOutcome {
                mpa,
                ..SurfaceOutcome::default()
            };
        }

        let mut mpa = if self.buildup.is_saturation() {
            utils::decay(ori, dsoil)
        } else if *drydays != 0 {
            self.buildup.accumulate(coef, ori, f64::from(*drydays))
        } else {
            ori
        };
        *drydays = 0;

        let infil = (water.wat - water.surq).max(0.0);
        let surq = water.surq.max(0.0);
        // wet deposition per unit area: mm * L/(mm km2) * ng/L -> kg/km2
        let mrainh = surq * L_PER_MM_KM2 * water.cprep / NG_PER_KG;
        let mrainv = infil * L_PER_MM_KM2 * water.cprep / NG_PER_KG;

        let (rem, mwov) = self
            .washoff
            .remove(mpa, coef.kwov, coef.nwov, infil);
        mpa = rem;
        let mwoh = if surq > 0.0 {
            let (rem, w) = self.washoff.remove(mpa, coef.kwoh, coef.nwoh, surq);
            mpa = rem;
            w
        } else {
            0.0
        };

        let mhrmv = (mrainh + mwoh) * water.area;
        // kg/(km2 mm) = mg/L
        let csrmv = if surq > 0.0 {
            mhrmv / (surq * water.area) * 1e6
        } else {
            0.0
        };
        SurfaceOutcome {
            mpa,
            mhrmv,
            csrmv,
            soilin: (mrainv + mwov) * water.area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coef() -> SurfaceCoefficients {
        SurfaceCoefficients {
            bmax: 100.0,
            kbu: 2.0,
            nbu: 0.5,
            kwov: 0.1,
            nwov: 1.0,
            kwoh: 0.2,
            nwoh: 1.0,
        }
    }

    fn wet(wat: f64, surq: f64) -> SurfaceWater {
        SurfaceWater {
            wat,
            surq,
            cprep: 50.0,
            area: 2.0,
        }
    }

    #[test]
    fn buildup_functions() {
        let c = coef();
        assert_relative_eq!(BuildUp::Power.accumulate(&c, 10.0, 4.0), 14.0);
        assert_relative_eq!(
            BuildUp::Exponential.accumulate(&c, 10.0, 1.0),
            10.0 + 100.0 * (1.0 - (-2.0f64).exp())
        );
        assert_relative_eq!(BuildUp::Saturation.accumulate(&c, 10.0, 2.0), 60.0);
        assert_relative_eq!(BuildUp::Power.accumulate(&c, 99.0, 4.0), 100.0);
    }

    #[test]
    fn half_saturation_continues_the_curve() {
        let c = coef();
        // from bare ground the curve is bmax t / (k + t)
        assert_relative_eq!(BuildUp::HalfSaturation.accumulate(&c, 0.0, 2.0), 50.0);
        // two days then two more equals four days at once
        let two = BuildUp::HalfSaturation.accumulate(&c, 0.0, 2.0);
        let four = BuildUp::HalfSaturation.accumulate(&c, two, 2.0);
        assert_relative_eq!(four, 100.0 * 4.0 / 6.0, epsilon = 1e-9);
        assert_eq!(BuildUp::HalfSaturation.accumulate(&c, 120.0, 1.0), 100.0);
    }

    #[test]
    fn washoff_functions() {
        let (rem, w) = WashOff::Exponential.remove(10.0, 0.5, 1.0, 0.0);
        assert_relative_eq!(w, 10.0 * (1.0 - (-0.5f64).exp()));
        assert_relative_eq!(rem + w, 10.0);

        let (_, w) = WashOff::FlowExponential.remove(10.0, 0.5, 1.0, 2.0);
        assert_relative_eq!(w, 10.0 * (1.0 - (-1.0f64).exp()));

        let (rem, w) = WashOff::RatingCurve.remove(10.0, 0.5, 2.0, 3.0);
        assert_relative_eq!(w, 4.5);
        assert_relative_eq!(rem, 5.5);
        let (rem, w) = WashOff::RatingCurve.remove(1.0, 0.5, 2.0, 3.0);
        assert_eq!((rem, w), (0.0, 1.0));
    }

    #[test]
    fn dry_days_are_counted_then_built_up_once() {
        let model = SurfaceModel::new(BuildUp::Power, WashOff::Exponential);
        let c = coef();
        let mut dry = 0;
        let mut maccu = 20.0;
        for _ in 0..4 {
            let out = model.step(&c, 0.1, maccu, &mut dry, &wet(0.0, 0.0));
            assert_relative_eq!(out.mpa, 10.0);
            assert_eq!(out.mhrmv, 0.0);
            maccu = out.mpa * 2.0;
        }
        assert_eq!(dry, 4);

        // first wet day: 4 days of build-up (2 * 4^0.5 = 4) before wash-off
        let model = SurfaceModel::new(BuildUp::Power, WashOff::Exponential);
        let c = SurfaceCoefficients {
            kwov: 0.0,
            kwoh: 0.0,
            ..coef()
        };
        let out = model.step(&c, 0.1, maccu, &mut dry, &wet(5.0, 1.0));
        assert_relative_eq!(out.mpa, 14.0);
        assert_eq!(dry, 0);

        // consecutive wet day: no second build-up
        let again = model.step(&c, 0.1, out.mpa * 2.0, &mut dry, &wet(5.0, 1.0));
        assert_relative_eq!(again.mpa, 14.0);
    }

    #[test]
    fn zero_runoff_routes_rain_to_infiltration() {
        let model = SurfaceModel::new(BuildUp::Saturation, WashOff::Exponential);
        let c = coef();
        let mut dry = 0;
        let out = model.step(&c, 0.0, 40.0, &mut dry, &wet(10.0, 0.0));
        assert_eq!(out.csrmv, 0.0);
        assert_eq!(out.mhrmv, 0.0);
        let washed = 20.0 * (1.0 - (-0.1f64).exp());
        let rain = 10.0 * 50.0 / 1e6;
        assert_relative_eq!(out.soilin, (rain + washed) * 2.0, epsilon = 1e-12);
        assert_relative_eq!(out.mpa, 20.0 - washed, epsilon = 1e-12);
    }

    #[test]
    fn runoff_concentration_matches_delivered_mass() {
        let model = SurfaceModel::new(BuildUp::Saturation, WashOff::FlowExponential);
        let c = coef();
        let mut dry = 0;
        let out = model.step(&c, 0.0, 40.0, &mut dry, &wet(10.0, 4.0));
        assert!(out.mhrmv > 0.0);
        assert_relative_eq!(out.csrmv, out.mhrmv / (4.0 * 2.0) * 1e6, epsilon = 1e-9);
    }
}
