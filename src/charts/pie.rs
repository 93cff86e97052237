use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{chart_path, no_data, palette};
use crate::constants::chart::{FONT, PIE_SIZE};
use crate::error::AppError;
use crate::table::Table;

/// Width of the legend column on the right.
const LEGEND_WIDTH: u32 = 260;

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub name: String,
    pub value: f64,
    /// Fraction of the whole, `0..=1`
    pub share: f64,
    /// Radians, clockwise from twelve o'clock
    pub start: f64,
    pub end: f64,
}

/// Pie slices of `values` per `names`, in first-appearance order. Repeated
/// names add up; non-positive totals are left out.
pub fn slices(table: &Table, values: &str, names: &str) -> Result<Vec<Slice>, AppError> {
    table.column_index(values)?;
    table.column_index(names)?;

    let mut totals: Vec<(String, f64)> = Vec::new();
    for row in table.iter_rows() {
        let (Some(name), Some(v)) = (row.get(names).map(ToString::to_string), row.number(values))
        else {
            continue;
        };
        match totals.iter_mut().find(|(n, _)| *n == name) {
            Some((_, total)) => *total += v,
            None => totals.push((name, v)),
        }
    }
    totals.retain(|(_, v)| *v > 0.0);

    let sum: f64 = totals.iter().map(|(_, v)| v).sum();
    let mut angle = 0.0;
    Ok(totals
        .into_iter()
        .map(|(name, value)| {
            let share = value / sum;
            let start = angle;
            angle += share * TAU;
            Slice {
                name,
                value,
                share,
                start,
                end: angle,
            }
        })
        .collect())
}

/// Pixel point at `angle` (clockwise from twelve o'clock) and `radius`.
fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    let a = angle - FRAC_PI_2;
    (
        center.0 + (radius * a.cos()).round() as i32,
        center.1 + (radius * a.sin()).round() as i32,
    )
}

/// Pie chart with percentage labels inside the slices.
pub fn pie(
    out_dir: &Path,
    table: &Table,
    values: &str,
    names: &str,
    title: &str,
) -> Result<PathBuf, AppError> {
    let parts = slices(table, values, names)?;
    if parts.is_empty() {
        return Err(no_data(title));
    }
    let path = chart_path(out_dir, title, None);

    let size = (PIE_SIZE.0 + LEGEND_WIDTH, PIE_SIZE.1);
    let root = SVGBackend::new(&path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, (FONT, 20))?;
    let (pie_area, legend_area) = body.split_horizontally(PIE_SIZE.0);

    let (w, h) = pie_area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) / 2.0 - 30.0;

    for (i, slice) in parts.iter().enumerate() {
        let color = palette::category(i);
        // one vertex per degree keeps the arc smooth
        let steps = ((slice.end - slice.start).to_degrees().ceil() as usize).max(1);
        let mut points = vec![center];
        points.extend((0..=steps).map(|k| {
            let angle = slice.start + (slice.end - slice.start) * k as f64 / steps as f64;
            polar(center, radius, angle)
        }));
        pie_area.draw(&Polygon::new(points, color.filled()))?;

        let label_color = palette::text_on(color);
        let label_style = TextStyle::from((FONT, 15).into_font())
            .color(&label_color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let mid = (slice.start + slice.end) / 2.0;
        pie_area.draw(&Text::new(
            format!("{:.1} %", slice.share * 100.0),
            polar(center, radius * 0.7, mid),
            label_style,
        ))?;
    }

    let legend_style = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    for (i, slice) in parts.iter().enumerate() {
        let y = 40 + i as i32 * 28;
        legend_area.draw(&Rectangle::new(
            [(10, y - 8), (26, y + 8)],
            palette::category(i).filled(),
        ))?;
        legend_area.draw(&Text::new(slice.name.clone(), (34, y), legend_style.clone()))?;
    }

    root.present()?;
    info!("Wrote pie chart {}", path.display());
    Ok(path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use tempfile::tempdir;

    fn shares() -> Table {
        Table::from_rows(
            ["Ikä", "Toimintarajoitteisten osuus, %"],
            vec![
                vec!["16 - 34".into(), 10.0.into()],
                vec!["35 - 49".into(), 10.0.into()],
                vec!["75 -".into(), 20.0.into()],
                vec!["Tuntematon".into(), Value::Missing],
                vec!["Nolla".into(), 0.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_slices() {
        let parts = slices(&shares(), "Toimintarajoitteisten osuus, %", "Ikä").unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].share, 0.5);
        assert_eq!(parts[0].start, 0.0);
        assert!((parts[2].end - TAU).abs() < 1e-12);
        assert!((parts[1].start - parts[0].end).abs() < 1e-12);
    }

    #[test]
    fn test_polar_starts_at_top() {
        assert_eq!(polar((100, 100), 50.0, 0.0), (100, 50));
        assert_eq!(polar((100, 100), 50.0, FRAC_PI_2), (150, 100));
    }

    #[test]
    fn test_pie_writes_svg() {
        let dir = tempdir().unwrap();
        let path = pie(
            dir.path(),
            &shares(),
            "Toimintarajoitteisten osuus, %",
            "Ikä",
            "Toimintarajoitteisten osuus ikäryhmittäin",
        )
        .unwrap();
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("50.0 %"));
    }
}
