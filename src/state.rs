//! Mutable state carried from one simulated day to the next.

/// State of one pollutant on one land unit.
///
/// Masses are in kg, concentrations in ng/L.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateVariables {
    /// Accumulated mass on the land surface.
    pub maccu: f64,
    /// Surface runoff mass still travelling to the channel.
    pub msurfstor: f64,
    /// Lateral flow mass still travelling to the channel.
    pub mlatstor: f64,
    /// Percolating mass still travelling to the aquifers.
    pub mperstor: f64,
    /// Mass in the soil column.
    pub msoil: f64,
    /// Mass in the shallow aquifer.
    pub msa: f64,
    /// Mass in the deep aquifer.
    pub mda: f64,
    /// Antecedent dry days.
    pub drydays: u32,

    /// Mass generated in surface runoff today.
    pub msurf: f64,
    /// Mass generated in lateral flow today.
    pub mlat: f64,
    /// Mass percolating out of the soil column today.
    pub mper: f64,
    /// Mass returned from the shallow aquifer by revap today.
    pub mrevap: f64,

    /// Surface runoff concentration.
    pub csurf: f64,
    /// Total soil concentration.
    pub ctsoil: f64,
    /// Particle-bound soil concentration.
    pub cpsoil: f64,
    /// Truly dissolved soil-water concentration.
    pub cdsoil: f64,
    /// DOC-bound soil-water concentration.
    pub cdocsoil: f64,
    /// Shallow aquifer concentration.
    pub csaq: f64,
    /// Deep aquifer concentration.
    pub cdaq: f64,
    /// Concentration in soil water.
    pub cw: f64,

    /// Surface runoff mass reaching the channel.
    pub out_msurf: f64,
    /// Lateral flow mass reaching the channel.
    pub out_mlat: f64,
    /// Shallow groundwater mass reaching the channel.
    pub out_mgw: f64,
    /// Deep groundwater mass reaching the channel.
    pub out_mdgw: f64,
    /// Total mass reaching the channel.
    pub out_mt: f64,
    /// Concentration in surface runoff reaching the channel.
    pub out_concs: f64,
    /// Concentration in lateral flow reaching the channel.
    pub out_concl: f64,
    /// Shallow groundwater concentration.
    pub out_concg: f64,
    /// Deep groundwater concentration.
    pub out_concdg: f64,
    /// Concentration in water yield.
    pub out_conct: f64,
}

impl StateVariables {
    /// Zero the channel outputs, leaving the carried pools untouched.
    pub fn reset_outputs(&mut self) {
        self.out_msurf = 0.0;
        self.out_mlat = 0.0;
        self.out_mgw = 0.0;
        self.out_mdgw = 0.0;
        self.out_mt = 0.0;
        self.out_concs = 0.0;
        self.out_concl = 0.0;
        self.out_concg = 0.0;
        self.out_concdg = 0.0;
        self.out_conct = 0.0;
    }
}

/// Daily channel loads of one pollutant summed over a subbasin (kg).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReachTotals {
    /// Surface runoff.
    pub msurf: f64,
    /// Lateral flow.
    pub mlat: f64,
    /// Shallow groundwater.
    pub mgw: f64,
    /// Deep groundwater.
    pub mdgw: f64,
    /// River-surface deposition.
    pub mflux: f64,
    /// Channel-bed outcrop erosion.
    pub mocp: f64,
    /// Everything entering the reach.
    pub mt: f64,
}

impl ReachTotals {
    /// Add one land unit's delivery.
    pub fn add_unit(&mut self, unit: &StateVariables) {
        self.msurf += unit.out_msurf;
        self.mlat += unit.out_mlat;
        self.mgw += unit.out_mgw;
        self.mdgw += unit.out_mdgw;
        self.mt += unit.out_mt;
    }

    /// Clear all accumulators for the next day.
    pub fn reset(&mut self) {
        *self = ReachTotals::default();
    }

    /// True when every accumulator is zero.
    pub fn is_zero(&self) -> bool {
        *self == ReachTotals::default()
    }
}
