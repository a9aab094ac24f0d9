//! Charts of simulated daily loads.
use crate::errors::{LoadError, LoadResult};
use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;

/// Draw the daily load series of one pollutant into one reach as a png at `path`.
pub fn daily_load(series: &[(NaiveDate, f64)], path: &str) -> LoadResult<()> {
    if series.is_empty() {
        return Err(LoadError::Plot("no rows to plot".to_string()));
    }
    draw_daily(series, path).map_err(|e| LoadError::Plot(e.to_string()))
}

fn draw_daily(series: &[(NaiveDate, f64)], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, (_, m))| (i as f64, *m))
        .collect();
    let xmax = (series.len() as f64 - 1.0).max(1.0);
    let ymax = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let ymax = if ymax > 0.0 { ymax * 1.05 } else { 1.0 };

    let root = BitMapBackend::new(path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..xmax, 0.0..ymax)?;

    let label = |x: &f64| {
        series
            .get(x.round().max(0.0) as usize)
            .map(|(d, _)| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&label)
        .y_label_formatter(&|y| format!("{:.2e}", y))
        .x_desc("Date")
        .y_desc("Load (kg)")
        .draw()?;

    chart.draw_series(LineSeries::new(points.clone(), &BLUE))?;
    chart.draw_series(PointSeries::of_element(points, 2, &BLUE, &|c, s, st| {
        EmptyElement::at(c) + Circle::new((0, 0), s, st.filled())
    }))?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_an_error() {
        assert!(matches!(daily_load(&[], "unused.png"), Err(LoadError::Plot(_))));
    }
}
