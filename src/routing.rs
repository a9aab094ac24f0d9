//! Storage-and-release routers that delay generated mass on its way to the channel.
use crate::utils;
use serde::{Deserialize, Serialize};

/// Geometry controlling the time of concentration of a land unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LagGeometry {
    /// Surface runoff lag coefficient.
    pub surlag: f64,
    /// Average overland slope length (m).
    pub slope_length: f64,
    /// Overland slope (m/m).
    pub slope: f64,
    /// Manning's n for overland flow.
    pub ov_n: f64,
    /// Land unit area (km2).
    pub area: f64,
    /// Tributary channel length attributed to the land unit (km).
    pub channel_length: f64,
    /// Tributary channel slope (m/m).
    pub channel_slope: f64,
    /// Manning's n of the tributary channel.
    pub channel_n: f64,
}

impl LagGeometry {
    /// Time of concentration (h): overland plus tributary channel travel time.
    pub fn tconc(&self) -> f64 {
        let tov = 0.0556 * (self.slope_length * self.ov_n).powf(0.6) / self.slope.powf(0.3);
        let tch = 0.62 * self.channel_length * self.channel_n.powf(0.75)
            / (self.area.powf(0.125) * self.channel_slope.powf(0.375));
        tov + tch
    }

    /// Fraction of the surface store that reaches the channel today.
    pub fn release_fraction(&self) -> f64 {
        let tconc = self.tconc();
        if tconc.is_nan() || tconc.is_infinite() {
            0.0
        } else if tconc <= 0.0 {
            1.0
        } else {
            1.0 - (-self.surlag / tconc).exp()
        }
    }
}

/// Route today's surface mass together with the (already decayed) stored mass.
/// Returns `(delivered, stored)`.
pub fn surface_lag(m: f64, stored: f64, geom: &LagGeometry) -> (f64, f64) {
    let m = m + stored;
    let delivered = m * geom.release_fraction();
    (delivered, m - delivered)
}

/// Lateral-flow router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralLag {
    /// Everything generated or stored reaches the channel the same day.
    PassThrough,
    /// Exponential release with the lateral travel time.
    Exponential,
}

impl Default for LateralLag {
    fn default() -> Self {
        LateralLag::PassThrough
    }
}

/// Parameters of the exponential lateral router.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LateralGeometry {
    /// Slope length for lateral subsurface flow (m).
    pub slope_length: f64,
    /// Saturated hydraulic conductivity (mm/h).
    pub ksat: f64,
    /// User lateral travel time (days), zero when not set.
    pub travel_time: f64,
}

impl LateralGeometry {
    /// Lateral travel time (days), from the user value or from conductivity.
    pub fn ttlag(&self) -> f64 {
        if self.travel_time != 0.0 {
            self.travel_time
        } else {
            utils::ratio_or_zero(10.4 * self.slope_length, self.ksat)
        }
    }
}

impl LateralLag {
    /// Route lateral mass `m` together with the (already decayed) stored mass.
    /// Returns `(delivered, stored)`.
    pub fn route(&self, m: f64, stored: f64, geom: &LateralGeometry) -> (f64, f64) {
        let total = m + stored;
        match self {
            LateralLag::PassThrough => (total, 0.0),
            LateralLag::Exponential => {
                let ttlag = geom.ttlag();
                let r = if ttlag > 0.0 {
                    1.0 - (-1.0 / ttlag).exp()
                } else {
                    1.0
                };
                let delivered = total * r;
                (delivered, total - delivered)
            }
        }
    }
}

/// Percolation recharge router with groundwater delay `delay` (days).
/// Mixes today's percolating mass with the (already decayed) stored mass and returns
/// `(recharge, stored)`. A non-positive delay passes everything through.
pub fn recharge_lag(mper: f64, stored: f64, delay: f64) -> (f64, f64) {
    if delay <= 0.0 {
        return (mper + stored, 0.0);
    }
    let keep = (-1.0 / delay).exp();
    let recharge = (1.0 - keep) * mper + keep * stored;
    (recharge, mper + stored - recharge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry() -> LagGeometry {
        LagGeometry {
            surlag: 4.0,
            slope_length: 60.0,
            slope: 0.05,
            ov_n: 0.14,
            area: 1.5,
            channel_length: 0.8,
            channel_slope: 0.01,
            channel_n: 0.014,
        }
    }

    #[test]
    fn time_of_concentration() {
        let g = geometry();
        let tov = 0.0556 * (60.0f64 * 0.14).powf(0.6) / 0.05f64.powf(0.3);
        let tch = 0.62 * 0.8 * 0.014f64.powf(0.75) / (1.5f64.powf(0.125) * 0.01f64.powf(0.375));
        assert_relative_eq!(g.tconc(), tov + tch, epsilon = 1e-12);
    }

    #[test]
    fn surface_lag_conserves_mass() {
        let g = geometry();
        let (d, s) = surface_lag(3.0, 1.0, &g);
        assert_relative_eq!(d + s, 4.0, epsilon = 1e-12);
        assert_relative_eq!(d, 4.0 * (1.0 - (-4.0 / g.tconc()).exp()), epsilon = 1e-12);
    }

    #[test]
    fn flat_unit_holds_its_mass() {
        let g = LagGeometry {
            slope: 0.0,
            ..geometry()
        };
        let (d, s) = surface_lag(3.0, 0.0, &g);
        assert_eq!(d, 0.0);
        assert_eq!(s, 3.0);
    }

    #[test]
    fn lateral_pass_through_empties_storage() {
        let g = LateralGeometry::default();
        assert_eq!(LateralLag::PassThrough.route(2.0, 0.5, &g), (2.5, 0.0));
    }

    #[test]
    fn lateral_exponential_uses_travel_time() {
        let g = LateralGeometry {
            slope_length: 10.0,
            ksat: 10.4,
            travel_time: 0.0,
        };
        assert_relative_eq!(g.ttlag(), 10.0);
        let (d, s) = LateralLag::Exponential.route(2.0, 0.0, &g);
        assert_relative_eq!(d, 2.0 * (1.0 - (-0.1f64).exp()), epsilon = 1e-12);
        assert_relative_eq!(d + s, 2.0, epsilon = 1e-12);

        let user = LateralGeometry {
            travel_time: 2.0,
            ..g
        };
        assert_relative_eq!(user.ttlag(), 2.0);
    }

    #[test]
    fn recharge_mixing_limits() {
        // very long delay: today's input stays in storage
        let (r, s) = recharge_lag(5.0, 0.0, 1e9);
        assert!(r < 1e-8);
        assert_relative_eq!(s, 5.0, epsilon = 1e-8);

        // very short delay: everything recharges
        let (r, s) = recharge_lag(5.0, 0.0, 1e-3);
        assert_relative_eq!(r, 5.0, epsilon = 1e-9);
        assert!(s < 1e-9);

        assert_eq!(recharge_lag(5.0, 1.0, 0.0), (6.0, 0.0));
    }

    #[test]
    fn recharge_releases_stored_mass() {
        let keep = (-1.0f64 / 3.0).exp();
        let (r, s) = recharge_lag(2.0, 4.0, 3.0);
        assert_relative_eq!(r, (1.0 - keep) * 2.0 + keep * 4.0, epsilon = 1e-12);
        assert_relative_eq!(r + s, 6.0, epsilon = 1e-12);
    }
}
