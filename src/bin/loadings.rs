use clap::{Parser, Subcommand};
use loadings::prelude::*;
use loadings::utils;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "loadings")]
#[command(about = "Daily DOC and hydrophobic pollutant loads for a watershed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a project loads without running it
    Validate {
        /// Project directory
        project_dir: PathBuf,
    },
    /// Run a project and write loadings.hruout and loadings.subout
    Run {
        /// Project directory
        project_dir: PathBuf,
        /// Also draw the daily load of a reach, as SUB:POLLUTANT
        #[arg(long)]
        plot: Option<String>,
    },
}

fn parse_target(text: &str) -> Result<(u32, String), LoadError> {
    let mut parts = text.splitn(2, ':');
    let sub = parts.next().and_then(|s| s.trim().parse::<u32>().ok());
    let pollutant = parts.next().map(|p| p.trim().to_string());
    match (sub, pollutant) {
        (Some(sub), Some(p)) if !p.is_empty() => Ok((sub, p)),
        _ => Err(LoadError::config(format!(
            "plot target {} is not of the form SUB:POLLUTANT",
            text
        ))),
    }
}

fn run(project_dir: PathBuf, plot: Option<String>) -> LoadResult<()> {
    let target = plot.as_deref().map(parse_target).transpose()?;
    let project = Project::load(&project_dir)?;
    let (hru, sub) = project.output_paths();
    let csv = CsvReport::create(&hru, &sub)?;
    let mut report = (csv, MemoryReport::new());
    let mut sim = project.simulation()?;

    let start = Instant::now();
    let mut last = 0;
    sim.run(&mut report, |p| {
        let pct = (p.fraction() * 100.0) as u32;
        if pct / 10 > last {
            last = pct / 10;
            info!("{}% ({})", pct, p.date);
        }
    })?;
    info!(
        "Wrote {} and {} in {:.2?}.",
        hru.display(),
        sub.display(),
        start.elapsed()
    );

    if let Some((id, pollutant)) = target {
        let series = report.1.sub_series(id, &pollutant);
        let loads: Vec<f64> = series.iter().map(|(_, m)| *m).collect();
        info!(
            "Mean daily {} load into reach {}: {:.3e} kg.",
            pollutant,
            id,
            utils::mean(&loads)
        );
        let path = project_dir.join(format!("loadings_{}_{}.png", id, pollutant));
        let path = path.to_string_lossy();
        plot::daily_load(&series, &path)?;
        info!("Plotted {}.", path);
    }
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { project_dir } => Project::load(&project_dir)
            .and_then(|p| p.simulation())
            .map(|sim| {
                info!(
                    "{} subbasins and {} pollutants over {} days.",
                    sim.subbasins().len(),
                    sim.registry().pollutants().len(),
                    sim.config().days()
                )
            }),
        Commands::Run { project_dir, plot } => run(project_dir, plot),
    };
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
