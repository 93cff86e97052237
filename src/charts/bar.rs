use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{axis_range, category_label, chart_path, format_number, frames, labels_of, no_data, palette};
use crate::constants::chart::{BAR_SIZE, FONT};
use crate::error::AppError;
use crate::table::Table;

/// Share of a category band taken by its bars.
const BAND: f64 = 0.8;

/// Axis assignment and category order shared by every frame of a bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub horizontal: bool,
    pub category_column: String,
    pub value_column: String,
    pub color_column: String,
    pub categories: Vec<String>,
    pub groups: Vec<String>,
    pub value_range: Range<f64>,
}

impl BarLayout {
    /// Bars run horizontally when `x` holds the numbers, vertically when
    /// `y` does.
    pub fn new(table: &Table, x: &str, y: &str, color: &str) -> Result<Self, AppError> {
        let horizontal = table.is_numeric(x)?;
        let (category_column, value_column) = if horizontal {
            (y, x)
        } else if table.is_numeric(y)? {
            (x, y)
        } else {
            return Err(AppError::chart(format!(
                "bar chart needs a numeric axis, neither '{x}' nor '{y}' is numeric"
            )));
        };
        let categories = labels_of(table, category_column)?;
        let groups = labels_of(table, color)?;
        let value_range = axis_range(table.numbers(value_column)?, true);
        Ok(BarLayout {
            horizontal,
            category_column: category_column.to_string(),
            value_column: value_column.to_string(),
            color_column: color.to_string(),
            categories,
            groups,
            value_range,
        })
    }

    /// Bars are coloured by the category itself, no legend needed.
    pub fn colored_by_category(&self) -> bool {
        self.color_column == self.category_column
    }

    /// Axis position of a category. Horizontal charts list the first
    /// category at the top.
    pub fn position(&self, category: usize) -> f64 {
        if self.horizontal {
            (self.categories.len() - 1 - category) as f64
        } else {
            category as f64
        }
    }

    /// Category names in axis order.
    fn axis_labels(&self) -> Vec<String> {
        let mut labels = self.categories.clone();
        if self.horizontal {
            labels.reverse();
        }
        labels
    }

    /// Bar heights per group and category. Repeated rows add up.
    pub fn values(&self, table: &Table) -> Vec<Vec<Option<f64>>> {
        let mut values = vec![vec![None; self.categories.len()]; self.groups.len()];
        for row in table.iter_rows() {
            let (Some(category), Some(group), Some(v)) = (
                row.get(&self.category_column).map(ToString::to_string),
                row.get(&self.color_column).map(ToString::to_string),
                row.number(&self.value_column),
            ) else {
                continue;
            };
            let c = self.categories.iter().position(|n| *n == category);
            let g = self.groups.iter().position(|n| *n == group);
            if let (Some(c), Some(g)) = (c, g) {
                let slot: &mut Option<f64> = &mut values[g][c];
                *slot = Some(slot.unwrap_or(0.0) + v);
            }
        }
        values
    }
}

/// Offsets of each bar inside its category band, relative to the band
/// centre. Groups without a value leave no gap.
pub fn bar_slots(values: &[Vec<Option<f64>>], categories: usize) -> Vec<Vec<Option<(f64, f64)>>> {
    let mut slots = vec![vec![None; categories]; values.len()];
    for c in 0..categories {
        let present: Vec<usize> = (0..values.len())
            .filter(|&g| values[g].get(c).copied().flatten().is_some())
            .collect();
        if present.is_empty() {
            continue;
        }
        let width = BAND / present.len() as f64;
        for (k, &g) in present.iter().enumerate() {
            let start = -BAND / 2.0 + k as f64 * width;
            slots[g][c] = Some((start, start + width));
        }
    }
    slots
}

/// Bar chart of `y` against `x`, grouped side by side by `color`. With a
/// `frame` column one chart is written per frame value.
pub fn bar(
    out_dir: &Path,
    table: &Table,
    x: &str,
    y: &str,
    color: &str,
    title: &str,
    frame: Option<&str>,
) -> Result<Vec<PathBuf>, AppError> {
    let layout = BarLayout::new(table, x, y, color)?;
    if layout.categories.is_empty() || layout.groups.is_empty() {
        return Err(no_data(title));
    }
    debug!(
        "Bar layout for '{title}': horizontal={}, {} categories, {} groups",
        layout.horizontal,
        layout.categories.len(),
        layout.groups.len()
    );

    let mut written = Vec::new();
    for (frame_value, part) in frames(table, frame)? {
        let caption = match (frame, frame_value.as_deref()) {
            (Some(column), Some(value)) => format!("{title} ({column} = {value})"),
            _ => title.to_string(),
        };
        let path = chart_path(out_dir, title, frame_value.as_deref());
        draw(&path, &layout, &layout.values(&part), &caption)?;
        written.push(path);
    }
    info!("Wrote {} bar chart file(s) for '{title}'", written.len());
    Ok(written)
}

fn draw(
    path: &Path,
    layout: &BarLayout,
    values: &[Vec<Option<f64>>],
    caption: &str,
) -> Result<(), AppError> {
    let root = SVGBackend::new(path, BAR_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = layout.categories.len();
    let category_range = -0.5..(n as f64 - 0.5);
    let longest = layout
        .categories
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let label_area = (longest as u32 * 7 + 10).clamp(60, 650);

    let mut builder = ChartBuilder::on(&root);
    builder.caption(caption, (FONT, 20)).margin(20);
    let (x_range, y_range) = if layout.horizontal {
        builder.y_label_area_size(label_area).x_label_area_size(45);
        (layout.value_range.clone(), category_range)
    } else {
        builder.x_label_area_size(label_area.min(250)).y_label_area_size(80);
        (category_range, layout.value_range.clone())
    };
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    let axis_labels = layout.axis_labels();
    let category_fmt = |v: &f64| category_label(&axis_labels, *v);
    let number_fmt = |v: &f64| format_number(*v);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh().label_style((FONT, 12));
    if layout.horizontal {
        mesh.y_labels(n)
            .y_label_formatter(&category_fmt)
            .x_label_formatter(&number_fmt)
            .x_desc(layout.value_column.as_str());
    } else {
        mesh.x_labels(n)
            .x_label_formatter(&category_fmt)
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .y_label_formatter(&number_fmt)
            .y_desc(layout.value_column.as_str());
    }
    mesh.draw()?;

    let anchor = if layout.horizontal {
        Pos::new(HPos::Left, VPos::Center)
    } else {
        Pos::new(HPos::Center, VPos::Bottom)
    };
    let label_style = TextStyle::from((FONT, 11).into_font()).pos(anchor);
    let slots = bar_slots(values, n);

    for (g, group) in layout.groups.iter().enumerate() {
        let color = palette::category(g);
        let bars: Vec<(f64, f64, f64)> = (0..n)
            .filter_map(|c| {
                let v = values[g][c]?;
                let (start, end) = slots[g][c]?;
                let p = layout.position(c);
                Some((p + start, p + end, v))
            })
            .collect();
        if bars.is_empty() {
            continue;
        }

        let horizontal = layout.horizontal;
        let annotation = chart.draw_series(bars.iter().map(|&(lo, hi, v)| {
            if horizontal {
                Rectangle::new([(0.0, lo), (v, hi)], color.filled())
            } else {
                Rectangle::new([(lo, 0.0), (hi, v)], color.filled())
            }
        }))?;
        if !layout.colored_by_category() {
            annotation.label(group.as_str()).legend(move |(lx, ly)| {
                Rectangle::new([(lx, ly - 5), (lx + 12, ly + 5)], color.filled())
            });
        }

        chart.draw_series(bars.iter().map(|&(lo, hi, v)| {
            let mid = (lo + hi) / 2.0;
            let at = if horizontal { (v, mid) } else { (mid, v) };
            Text::new(format_number(v), at, label_style.clone())
        }))?;
    }

    if !layout.colored_by_category() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font((FONT, 12))
            .draw()?;
    }

    root.present()?;
    Ok(())
}
