/*!
* # Loadings - A library for simulating daily pollutant loads from a watershed.
* Dissolved organic carbon (DOC) and hydrophobic organic pollutants such as PAHs reach a stream along
* several paths: washed off the land surface by runoff, leached laterally through the soil, and
* released from shallow and deep aquifers.  Hydrophobic compounds also erode from channel-bed outcrops
* and settle directly onto the river surface.  Given the daily water balance of a hydrologically
* modelled watershed, the functions in this crate track the mass of each pollutant through every
* store and report the daily load entering each reach.
*
* Hydrophobic pollutants partition between soil water, soil solids and DOC in the soil column, so
* DOC is always simulated, and always simulated first: each day's soil-water DOC concentration
* sets how mobile every other pollutant is on that day.
*
*  ## Quick Start
*
* A project is a directory holding a `settings.yaml` and the parameter and daily input tables
* (see [project](project/index.html)).
* ```no_run
* use loadings::prelude::*;
*
* fn main() -> Result<(), LoadError> {
*     let project = Project::load("watershed")?;
*     let (hru, sub) = project.output_paths();
*     let mut report = CsvReport::create(hru, sub)?;
*     let mut sim = project.simulation()?;
*     sim.run(&mut report, |p| println!("{}", p.date))?;
*     Ok(())
* }
* ```
*
* Or run a synthetic watershed and keep the rows in memory:
* ```rust
* use loadings::prelude::*;
* use rand::SeedableRng;
*
* let mut rng = rand::rngs::StdRng::seed_from_u64(42);
* let mut sim = Synthetic::new().days(60).simulation(&mut rng)?;
* let mut report = MemoryReport::new();
* sim.run(&mut report, |_| {})?;
*
* let phe = report.sub_series(1, "PHE");
* assert_eq!(phe.len(), 60);
* assert!(phe.iter().all(|(_, m)| *m >= 0.0));
* # Ok::<(), LoadError>(())
* ```
*/

#![warn(missing_docs)]
pub mod aquifer;
pub mod channel;
pub mod config;
pub mod errors;
pub mod output;
pub mod partition;
pub mod plot;
pub mod project;
pub mod registry;
pub mod routing;
pub mod simulation;
pub mod state;
pub mod surface;
pub mod synthetic;
pub mod utils;
pub mod watershed;

/// Common imports.
pub mod prelude {
    pub use crate::config::{InitType, OutputWindow, RunConfig};
    pub use crate::errors::{LoadError, LoadResult};
    pub use crate::output::{CsvReport, HruRow, MemoryReport, Progress, Report, SubRow};
    pub use crate::partition::DocMethod;
    pub use crate::plot;
    pub use crate::project::Project;
    pub use crate::registry::{Kinetics, Pollutant, Registry, DOC};
    pub use crate::routing::LateralLag;
    pub use crate::simulation::Simulation;
    pub use crate::surface::{BuildUp, WashOff};
    pub use crate::synthetic::Synthetic;
    pub use crate::watershed::{LandUnit, Subbasin};
}
