use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{category_label, chart_path, no_data, palette};
use crate::analysis::CorrelationMatrix;
use crate::constants::chart::{FONT, HEATMAP_SIZE};
use crate::error::AppError;

pub const R_PANEL_TITLE: &str = "Pearsonin korrelaatiokertoimet (r)";
pub const R2_PANEL_TITLE: &str = "Selitysasteet (R²)";

const MISSING_COLOR: RGBColor = RGBColor(200, 200, 200);

/// Colour and annotation of one cell.
pub fn cell(value: f64, min: f64, max: f64, scale: fn(f64) -> RGBColor) -> (RGBColor, String) {
    if value.is_nan() {
        (MISSING_COLOR, "nan".to_string())
    } else {
        (scale(palette::normalize(value, min, max)), format!("{value:.2}"))
    }
}

/// Side-by-side heatmaps of r (-1..1, coolwarm) and r² (0..1, YlGnBu) with
/// annotated cells.
pub fn heatmap(out_dir: &Path, matrix: &CorrelationMatrix, title: &str) -> Result<PathBuf, AppError> {
    if matrix.columns.is_empty() {
        return Err(no_data(title));
    }
    let path = chart_path(out_dir, title, None);
    let root = SVGBackend::new(&path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, (FONT, 22))?;
    let panels = body.split_evenly((1, 2));

    panel(&panels[0], &matrix.columns, &matrix.r, R_PANEL_TITLE, (-1.0, 1.0), palette::coolwarm)?;
    panel(&panels[1], &matrix.columns, &matrix.r_squared, R2_PANEL_TITLE, (0.0, 1.0), palette::ylgnbu)?;

    root.present()?;
    info!("Wrote heatmap {}", path.display());
    Ok(path.clone())
}

fn panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    columns: &[String],
    values: &[Vec<f64>],
    caption: &str,
    (min, max): (f64, f64),
    scale: fn(f64) -> RGBColor,
) -> Result<(), AppError> {
    let n = columns.len();
    let range = -0.5..(n as f64 - 0.5);
    let longest = columns.iter().map(|c| c.chars().count()).max().unwrap_or(0) as u32;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 18))
        .margin(20)
        .x_label_area_size((longest * 7).clamp(40, 260))
        .y_label_area_size((longest * 7).clamp(40, 300))
        .build_cartesian_2d(range.clone(), range)?;

    // first column on the left, first row at the top
    let mut rows_top_down = columns.to_vec();
    rows_top_down.reverse();
    let x_fmt = |v: &f64| category_label(columns, *v);
    let y_fmt = |v: &f64| category_label(&rows_top_down, *v);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_label_style((FONT, 13).into_font().transform(FontTransform::Rotate90))
        .y_label_style((FONT, 13))
        .draw()?;

    let text = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    for (i, row) in values.iter().enumerate() {
        let y = (n - 1 - i) as f64;
        for (j, &value) in row.iter().enumerate() {
            let x = j as f64;
            let (color, label) = cell(value, min, max, scale);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                color.filled(),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                label,
                (x, y),
                text.clone().color(&palette::text_on(color)),
            )))?;
        }
    }
    Ok(())
}
