//! Choropleth map of the regions.

use itertools::{Itertools, MinMaxResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{chart_path, format_number, frames, no_data, palette};
use crate::constants::chart::{FONT, MAP_SIZE};
use crate::data_fetcher::geo::Region;
use crate::error::AppError;
use crate::table::Table;

const COLOR_BAR_WIDTH: u32 = 140;
const COLOR_BAR_STEPS: i32 = 64;
const NO_DATA_COLOR: RGBColor = RGBColor(220, 220, 220);

/// Web Mercator projection of a (longitude, latitude) pair in degrees.
pub fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let y = (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (lon.to_radians(), y)
}

/// Value per region name. Names are compared trimmed; repeated names keep
/// the last value.
pub fn region_values(
    table: &Table,
    location: &str,
    value: &str,
) -> Result<HashMap<String, f64>, AppError> {
    table.column_index(location)?;
    table.column_index(value)?;
    Ok(table
        .iter_rows()
        .filter_map(|row| {
            let name = row.get(location)?.to_string().trim().to_string();
            Some((name, row.number(value)?))
        })
        .collect())
}

/// Colour scale bounds: the smallest and largest finite value, unpadded.
pub fn color_scale(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    match values
        .into_iter()
        .filter(|v| v.is_finite())
        .minmax_by(|a, b| a.total_cmp(b))
    {
        MinMaxResult::NoElements => (0.0, 1.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(min, max) => (min, max),
    }
}

/// Projected bounding box of the given regions.
pub fn projected_bounds<'a>(
    regions: impl IntoIterator<Item = &'a Region>,
) -> Option<(Range<f64>, Range<f64>)> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for region in regions {
        let Some((lon0, lat0, lon1, lat1)) = region.bounds() else {
            continue;
        };
        let (x0, y0) = mercator(lon0, lat0);
        let (x1, y1) = mercator(lon1, lat1);
        bounds = Some(match bounds {
            None => (x0, y0, x1, y1),
            Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0..x1, y0..y1))
}

/// Widens one of the ranges so that one unit is as long on both axes of a
/// `width` x `height` pixel area.
pub fn fit_aspect(x: Range<f64>, y: Range<f64>, width: u32, height: u32) -> (Range<f64>, Range<f64>) {
    let (span_x, span_y) = (x.end - x.start, y.end - y.start);
    if span_x <= 0.0 || span_y <= 0.0 || width == 0 || height == 0 {
        return (x, y);
    }
    let pixels = f64::from(width) / f64::from(height);
    if span_x / span_y < pixels {
        let grow = (span_y * pixels - span_x) / 2.0;
        (x.start - grow..x.end + grow, y)
    } else {
        let grow = (span_x / pixels - span_y) / 2.0;
        (x, y.start - grow..y.end + grow)
    }
}

/// Map of `value` per region, coloured on a Viridis scale. With a `frame`
/// column one map is written per frame value; the colour scale is shared by
/// all frames.
pub fn choropleth(
    out_dir: &Path,
    table: &Table,
    regions: &[Region],
    location: &str,
    value: &str,
    frame: Option<&str>,
    title: &str,
) -> Result<Vec<PathBuf>, AppError> {
    let all_values = region_values(table, location, value)?;
    if all_values.is_empty() || regions.is_empty() {
        return Err(no_data(title));
    }
    let unmatched: Vec<&String> = all_values
        .keys()
        .filter(|name| !regions.iter().any(|r| r.name == **name))
        .collect();
    if !unmatched.is_empty() {
        warn!("No boundary for regions {unmatched:?} in '{title}'");
    }

    let (scale_min, scale_max) = color_scale(table.numbers(value)?);
    let located: Vec<&Region> = regions
        .iter()
        .filter(|r| all_values.contains_key(&r.name))
        .collect();
    let bounds = projected_bounds(located.iter().copied())
        .or_else(|| projected_bounds(regions))
        .ok_or_else(|| AppError::geo("regions have no coordinates"))?;

    let mut written = Vec::new();
    for (frame_value, part) in frames(table, frame)? {
        let values = region_values(&part, location, value)?;
        let caption = match (frame, frame_value.as_deref()) {
            (Some(column), Some(v)) => format!("{title} ({column} = {v})"),
            _ => title.to_string(),
        };
        let path = chart_path(out_dir, title, frame_value.as_deref());

        let root = SVGBackend::new(&path, MAP_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let (map_area, bar_area) = root.split_horizontally(MAP_SIZE.0 - COLOR_BAR_WIDTH);

        let (w, h) = map_area.dim_in_pixel();
        // caption and margins take roughly 80 px of height
        let (x_range, y_range) = fit_aspect(
            bounds.0.clone(),
            bounds.1.clone(),
            w.saturating_sub(40),
            h.saturating_sub(80),
        );
        let mut chart = ChartBuilder::on(&map_area)
            .caption(&caption, (FONT, 18))
            .margin(20)
            .build_cartesian_2d(x_range, y_range)?;

        for region in regions {
            let color = values
                .get(&region.name)
                .map(|v| palette::viridis(palette::normalize(*v, scale_min, scale_max)))
                .unwrap_or(NO_DATA_COLOR);
            let rings: Vec<Vec<(f64, f64)>> = region
                .rings
                .iter()
                .map(|ring| ring.iter().map(|&(lon, lat)| mercator(lon, lat)).collect())
                .collect();
            chart.draw_series(
                rings
                    .iter()
                    .map(|ring| Polygon::new(ring.clone(), color.filled())),
            )?;
            chart.draw_series(
                rings
                    .iter()
                    .map(|ring| PathElement::new(ring.clone(), BLACK.stroke_width(1))),
            )?;
        }

        draw_color_bar(&bar_area, scale_min, scale_max, value)?;
        root.present()?;
        written.push(path.clone());
    }
    info!("Wrote {} map file(s) for '{title}'", written.len());
    Ok(written)
}

fn draw_color_bar(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    min: f64,
    max: f64,
    label: &str,
) -> Result<(), AppError> {
    let (_, h) = area.dim_in_pixel();
    let top = 80;
    let bottom = h as i32 - 80;
    let step = ((bottom - top) / COLOR_BAR_STEPS).max(1);
    for k in 0..COLOR_BAR_STEPS {
        let y = bottom - (k + 1) * step;
        let t = f64::from(k) / f64::from(COLOR_BAR_STEPS - 1);
        area.draw(&Rectangle::new(
            [(20, y), (50, y + step)],
            palette::viridis(t).filled(),
        ))?;
    }

    let style = TextStyle::from((FONT, 13).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    let bar_top = bottom - COLOR_BAR_STEPS * step;
    for (text, y) in [
        (format_number(max), bar_top),
        (format_number((min + max) / 2.0), (bar_top + bottom) / 2),
        (format_number(min), bottom),
    ] {
        area.draw(&Text::new(text, (56, y), style.clone()))?;
    }
    area.draw(&Text::new(label.to_string(), (20, top - 30), style))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::geo::parse_regions;
    use tempfile::tempdir;

    fn regions() -> Vec<Region> {
        parse_regions(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"Maakunta": "Uusimaa"},
                 "geometry": {"type": "Polygon", "coordinates": [[[23.5, 59.9], [26.0, 59.9], [26.0, 60.8], [23.5, 59.9]]]}},
                {"type": "Feature", "properties": {"Maakunta": "Lappi"},
                 "geometry": {"type": "Polygon", "coordinates": [[[23.0, 66.0], [29.5, 66.0], [27.0, 70.0], [23.0, 66.0]]]}}
            ]}"#,
            "Maakunta",
        )
        .unwrap()
    }

    fn shares() -> Table {
        Table::from_rows(
            ["Alue", "Vuosi", "value"],
            vec![
                vec!["Uusimaa".into(), 2022.into(), 19.5.into()],
                vec!["Lappi".into(), 2022.into(), 27.1.into()],
                vec!["Uusimaa".into(), 2023.into(), 20.0.into()],
                vec!["Lappi".into(), 2023.into(), 27.9.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_mercator() {
        let (x, y) = mercator(0.0, 0.0);
        assert_eq!(x, 0.0);
        assert!(y.abs() < 1e-12);
        let (_, north) = mercator(0.0, 60.0);
        // ln(tan(75°))
        assert!((north - 1.316_957_9).abs() < 1e-6);
    }

    #[test]
    fn test_fit_aspect_widens_the_narrow_axis() {
        let (x, y) = fit_aspect(0.0..1.0, 0.0..1.0, 200, 100);
        assert_eq!(x, -0.5..1.5);
        assert_eq!(y, 0.0..1.0);
        let (x, y) = fit_aspect(0.0..4.0, 0.0..1.0, 200, 100);
        assert_eq!(x, 0.0..4.0);
        assert_eq!(y, -0.5..1.5);
    }

    #[test]
    fn test_region_values_trims_names() {
        let t = Table::from_rows(["Alue", "value"], vec![vec![" Lappi ".into(), 27.0.into()]]).unwrap();
        let values = region_values(&t, "Alue", "value").unwrap();
        assert_eq!(values.get("Lappi"), Some(&27.0));
    }

    #[test]
    fn test_color_scale_is_data_range() {
        let values = shares().numbers("value").unwrap();
        assert_eq!(color_scale(values), (19.5, 27.9));
        assert_eq!(color_scale([f64::NAN, 3.0]), (3.0, 3.0));
        assert_eq!(color_scale(Vec::new()), (0.0, 1.0));
        // The extremes get the ends of the ramp
        assert_eq!(palette::normalize(19.5, 19.5, 27.9), 0.0);
        assert_eq!(palette::normalize(27.9, 19.5, 27.9), 1.0);
    }

    #[test]
    fn test_projected_bounds() {
        let r = regions();
        let (x, y) = projected_bounds(&r).unwrap();
        assert!((x.start - 23.0f64.to_radians()).abs() < 1e-12);
        assert!((x.end - 29.5f64.to_radians()).abs() < 1e-12);
        assert!(y.start < y.end);
    }

    #[test]
    fn test_choropleth_frames() {
        let dir = tempdir().unwrap();
        let files = choropleth(
            dir.path(),
            &shares(),
            &regions(),
            "Alue",
            "value",
            Some("Vuosi"),
            "Yli 65-vuotiaiden osuus väestöstä maakunnittain",
        )
        .unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[1].ends_with("yli-65-vuotiaiden-osuus-vaestosta-maakunnittain-2023.svg"));
        assert!(files.iter().all(|f| f.exists()));
    }
}
