use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{axis_range, chart_path, format_number, no_data, palette};
use crate::analysis::linear_fit;
use crate::constants::chart::{FONT, PAIR_PLOT_CELL};
use crate::error::AppError;
use crate::table::Table;

const HISTOGRAM_BINS: usize = 10;

/// Equal-width bins over the value range as `(start, end, count)`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![(min - 0.5, max + 0.5, finite.len())];
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        // the maximum belongs to the last bin
        let index = (((v - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}

/// Rows where both columns have a number.
pub fn complete_pairs(table: &Table, x: &str, y: &str) -> Vec<(f64, f64)> {
    table
        .iter_rows()
        .filter_map(|row| Some((row.number(x)?, row.number(y)?)))
        .collect()
}

/// Grid of pairwise plots: histograms on the diagonal, scatter plots with a
/// least-squares line elsewhere.
pub fn pair_plot(
    out_dir: &Path,
    table: &Table,
    columns: &[&str],
    title: &str,
) -> Result<PathBuf, AppError> {
    for column in columns {
        table.column_index(column)?;
    }
    if columns.is_empty() || table.is_empty() {
        return Err(no_data(title));
    }

    let n = columns.len();
    let side = PAIR_PLOT_CELL * n as u32;
    let path = chart_path(out_dir, title, None);
    let root = SVGBackend::new(&path, (side, side + 40)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, (FONT, 20))?;
    let cells = body.split_evenly((n, n));

    for (k, area) in cells.iter().enumerate() {
        let (i, j) = (k / n, k % n);
        let x_desc = (i == n - 1).then_some(columns[j]);
        let y_desc = (j == 0).then_some(columns[i]);
        if i == j {
            let values: Vec<f64> = table.iter_rows().filter_map(|r| r.number(columns[i])).collect();
            draw_histogram(area, &values, x_desc, y_desc)?;
        } else {
            let points = complete_pairs(table, columns[j], columns[i]);
            draw_scatter(area, &points, x_desc, y_desc)?;
        }
    }

    root.present()?;
    info!("Wrote pair plot {}", path.display());
    Ok(path.clone())
}

fn draw_histogram(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    values: &[f64],
    x_desc: Option<&str>,
    y_desc: Option<&str>,
) -> Result<(), AppError> {
    let bins = histogram(values, HISTOGRAM_BINS);
    let x_range = axis_range(bins.iter().flat_map(|b| [b.0, b.1]), false);
    let max_count = bins.iter().map(|b| b.2).max().unwrap_or(0);

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, 0.0..(max_count as f64 + 1.0))?;
    let number_fmt = |v: &f64| format_number(*v);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_labels(4)
        .y_labels(4)
        .x_label_formatter(&number_fmt)
        .label_style((FONT, 11));
    if let Some(desc) = x_desc {
        mesh.x_desc(desc);
    }
    if let Some(desc) = y_desc {
        mesh.y_desc(desc);
    }
    mesh.draw()?;

    let color = palette::category(0);
    chart.draw_series(bins.iter().map(|&(start, end, count)| {
        Rectangle::new([(start, 0.0), (end, count as f64)], color.mix(0.7).filled())
    }))?;
    Ok(())
}

fn draw_scatter(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    points: &[(f64, f64)],
    x_desc: Option<&str>,
    y_desc: Option<&str>,
) -> Result<(), AppError> {
    let x_range = axis_range(points.iter().map(|p| p.0), false);
    let y_range = axis_range(points.iter().map(|p| p.1), false);
    let (x_start, x_end) = (x_range.start, x_range.end);

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)?;
    let number_fmt = |v: &f64| format_number(*v);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_labels(4)
        .y_labels(4)
        .x_label_formatter(&number_fmt)
        .y_label_formatter(&number_fmt)
        .label_style((FONT, 11));
    if let Some(desc) = x_desc {
        mesh.x_desc(desc);
    }
    if let Some(desc) = y_desc {
        mesh.y_desc(desc);
    }
    mesh.draw()?;

    let color = palette::category(0);
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;

    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    match linear_fit(&xs, &ys) {
        Ok(fit) => {
            chart.draw_series(LineSeries::new(
                [x_start, x_end].map(|x| (x, fit.at(x))),
                palette::category(1).stroke_width(2),
            ))?;
        }
        Err(e) => debug!("No regression line: {e}"),
    }
    Ok(())
}
