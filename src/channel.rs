//! Loads entering a reach directly: channel-bed outcrop erosion and river-surface flux.

/// Universal gas constant (J/(mol K)).
pub const GAS_CONSTANT: f64 = 8.314;
/// Offset from degrees Celsius to Kelvin.
pub const KELVIN: f64 = 273.15;

/// Outcrop erosion parameters of one pollutant in one subbasin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outcrop {
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

impl Outcrop {
    /// Daily erosion mass (kg).
    ///  - `flow` reach discharge (m3/s).
    ///  - `width` channel width (m).
    ///  - `air_temp` air temperature (degrees Celsius).
    pub fn erosion(&self, flow: f64, width: f64, air_temp: f64) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        let t = air_temp + KELVIN;
        let excess = (flow / width - self.qwcr).max(0.0);
        if excess == 0.0 {
            return 0.0;
        }
        let arrhenius = (self.ea / GAS_CONSTANT * (1.0 / self.t0 - 1.0 / t)).exp();
        self.cocp * self.kocp * arrhenius * excess.powf(self.nocp)
    }
}

/// Deposition rates applied to one pollutant in one subbasin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReachFlux {
    /// Concentration in precipitation (ng/L).
    pub cprep: f64,
    /// Dry flux to the water surface (ug/(m2 yr)).
    pub riverflux: f64,
}

impl ReachFlux {
    /// Daily mass (kg) deposited on `watsurf` m2 of river surface with `pcp` mm of rain.
    pub fn mass(&self, watsurf: f64, pcp: f64) -> f64 {
        // ug -> kg
        let mut m = watsurf * (self.riverflux / 365.0) / 1e9;
        if pcp != 0.0 {
            // m2 * mm = L; ng -> kg
            m += watsurf * pcp * self.cprep / 1e12;
        }
        m
    }
}
