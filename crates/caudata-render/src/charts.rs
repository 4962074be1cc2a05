//! Profiling charts as SVG.

use std::path::Path;

use caudata_core::processing::profile::{Histogram, Profile};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::{RenderError, Result};
use crate::palette::{hex, to_plotters};

type PlotResult = std::result::Result<(), DrawingAreaErrorKind<std::io::Error>>;

const CHART_SIZE: (u32, u32) = (800, 500);
const BAR: RGBColor = RGBColor(0x3A, 0x3A, 0x98);
const SPECIMEN: RGBColor = RGBColor(0x83, 0x24, 0x24);
const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Headroom above the tallest bar
fn y_max(count: usize) -> f64 {
    (count.max(1) as f64 * 1.1).ceil()
}

fn draw_histogram(
    path: &Path,
    histogram: &Histogram,
    caption: &str,
    x_desc: &str,
) -> PlotResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let lower = histogram.bins.first().map(|b| b.lower).unwrap_or(0.0);
    let upper = histogram.bins.last().map(|b| b.upper).unwrap_or(1.0);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lower..upper.max(lower + 1.0), 0f64..y_max(histogram.max_count()))?;

    chart.configure_mesh().x_desc(x_desc).y_desc("Records").draw()?;
    chart.draw_series(histogram.bins.iter().map(|bin| {
        Rectangle::new([(bin.lower, 0.0), (bin.upper, bin.count as f64)], BAR.mix(0.8).filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Histogram of observation year
pub fn year_histogram(profile: &Profile, path: &Path) -> Result<()> {
    draw_histogram(path, &profile.year_histogram, "Records per year", "Year")
        .map_err(|e| RenderError::plot(path, e))
}

/// Histogram of coordinate uncertainty
pub fn uncertainty_histogram(profile: &Profile, path: &Path) -> Result<()> {
    draw_histogram(path, &profile.uncertainty_histogram, "Coordinate uncertainty", "Uncertainty (m)")
        .map_err(|e| RenderError::plot(path, e))
}

/// Records per calendar month, one bar per month
pub fn month_histogram(profile: &Profile, path: &Path) -> Result<()> {
    let draw = || -> PlotResult {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let max = profile.month_counts.iter().map(|m| m.count).max().unwrap_or(0);
        let mut chart = ChartBuilder::on(&root)
            .caption("Records per month", ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.5f64..12.5f64, 0f64..y_max(max))?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|x| {
                let index = x.round() as usize;
                MONTHS.get(index.wrapping_sub(1)).map(|m| m.to_string()).unwrap_or_default()
            })
            .y_desc("Records")
            .draw()?;
        chart.draw_series(profile.month_counts.iter().map(|m| {
            let x = m.month as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, m.count as f64)], BAR.mix(0.8).filled())
        }))?;

        root.present()?;
        Ok(())
    };
    draw().map_err(|e| RenderError::plot(path, e))
}

/// Stacked bars of records with and without elevation, per basis of record
pub fn completeness_bars(profile: &Profile, path: &Path) -> Result<()> {
    let rows = &profile.elevation_completeness;
    let draw = || -> PlotResult {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let max = rows.iter().map(|r| r.total).max().unwrap_or(0);
        let mut chart = ChartBuilder::on(&root)
            .caption("Elevation data by basis of record", ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..(rows.len().max(1) as f64 - 0.5), 0f64..y_max(max))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len().max(1))
            .x_label_formatter(&|x| {
                let index = x.round();
                if index < 0.0 {
                    return String::new();
                }
                rows.get(index as usize).map(|r| r.basis.label()).unwrap_or_default()
            })
            .y_desc("Records")
            .draw()?;

        let with = to_plotters(hex(0x3A3A98));
        let without = to_plotters(hex(0xBDBDBD));
        chart
            .draw_series(rows.iter().enumerate().map(|(i, r)| {
                let x = i as f64;
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, r.with_elevation as f64)], with.filled())
            }))?
            .label("With elevation")
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], with.filled()));
        chart
            .draw_series(rows.iter().enumerate().map(|(i, r)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.35, r.with_elevation as f64), (x + 0.35, r.total as f64)],
                    without.filled(),
                )
            }))?
            .label("Without elevation")
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], without.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    };
    draw().map_err(|e| RenderError::plot(path, e))
}

/// log10(uncertainty) against year
pub fn uncertainty_scatter(profile: &Profile, path: &Path) -> Result<()> {
    let points = &profile.uncertainty_by_year;
    let draw = || -> PlotResult {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (min_year, max_year) = profile.year_range.unwrap_or((1900, 2025));
        let max_log = points.iter().map(|p| p.log10_uncertainty).fold(1.0f64, f64::max);
        let min_log = points.iter().map(|p| p.log10_uncertainty).fold(0.0f64, f64::min);
        let mut chart = ChartBuilder::on(&root)
            .caption("Coordinate uncertainty over time", ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(
                (min_year - 1) as f64..(max_year + 1) as f64,
                min_log.floor()..max_log.ceil(),
            )?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("log10(uncertainty in m)")
            .x_label_formatter(&|x| format!("{:.0}", x))
            .draw()?;
        chart.draw_series(points.iter().map(|p| {
            Circle::new((p.year as f64, p.log10_uncertainty), 3, SPECIMEN.mix(0.6).filled())
        }))?;

        root.present()?;
        Ok(())
    };
    draw().map_err(|e| RenderError::plot(path, e))
}

/// File names of the profiling charts, in the order they are written
pub const PROFILE_CHART_FILES: [&str; 5] = [
    "month_histogram.svg",
    "year_histogram.svg",
    "elevation_completeness.svg",
    "uncertainty_histogram.svg",
    "uncertainty_by_year.svg",
];

/// Every profiling chart into `dir`, returning the written file names
pub fn write_profile_charts(profile: &Profile, dir: &Path) -> Result<Vec<(&'static str, &'static str)>> {
    let renderers: [(&str, fn(&Profile, &Path) -> Result<()>); 5] = [
        ("Records per month", month_histogram),
        ("Records per year", year_histogram),
        ("Elevation data by basis of record", completeness_bars),
        ("Coordinate uncertainty histogram", uncertainty_histogram),
        ("log10 coordinate uncertainty against year", uncertainty_scatter),
    ];
    let mut written = Vec::with_capacity(PROFILE_CHART_FILES.len());
    for (file, (description, render)) in PROFILE_CHART_FILES.into_iter().zip(renderers) {
        render(profile, &dir.join(file))?;
        written.push((file, description));
    }
    tracing::info!(charts = written.len(), dir = %dir.display(), "Wrote profiling charts");
    Ok(written)
}
