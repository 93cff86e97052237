use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{Series, axis_range, chart_path, format_number, no_data, palette, series};
use crate::constants::chart::{FONT, LINE_SIZE, STATIC_LINE_SIZE};
use crate::error::AppError;
use crate::table::Table;

struct LineLayout {
    size: (u32, u32),
    markers: bool,
    grid: bool,
    rotate_x_labels: bool,
    legend: SeriesLabelPosition,
}

/// Line chart with markers, one line per `hue` value.
pub fn line(
    out_dir: &Path,
    table: &Table,
    x: &str,
    y: &str,
    hue: Option<&str>,
    title: &str,
) -> Result<PathBuf, AppError> {
    let layout = LineLayout {
        size: LINE_SIZE,
        markers: true,
        grid: false,
        rotate_x_labels: false,
        legend: SeriesLabelPosition::UpperRight,
    };
    render(out_dir, table, x, y, hue, title, &layout)
}

/// Static line chart with a grid, rotated year labels and the legend in the
/// lower left corner.
pub fn line_plot(
    out_dir: &Path,
    table: &Table,
    x: &str,
    y: &str,
    hue: Option<&str>,
    title: &str,
) -> Result<PathBuf, AppError> {
    let layout = LineLayout {
        size: STATIC_LINE_SIZE,
        markers: false,
        grid: true,
        rotate_x_labels: true,
        legend: SeriesLabelPosition::LowerLeft,
    };
    render(out_dir, table, x, y, hue, title, &layout)
}

fn render(
    out_dir: &Path,
    table: &Table,
    x: &str,
    y: &str,
    hue: Option<&str>,
    title: &str,
    layout: &LineLayout,
) -> Result<PathBuf, AppError> {
    let lines = series(table, x, y, hue)?;
    if lines.is_empty() {
        return Err(no_data(title));
    }
    let path = chart_path(out_dir, title, None);
    draw(&path, &lines, x, y, title, layout)?;
    info!("Wrote line chart {}", path.display());
    Ok(path)
}

fn draw(
    path: &Path,
    lines: &[Series],
    x: &str,
    y: &str,
    title: &str,
    layout: &LineLayout,
) -> Result<(), AppError> {
    let root = SVGBackend::new(path, layout.size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = axis_range(lines.iter().flat_map(|s| s.points.iter().map(|p| p.0)), false);
    let y_range = axis_range(lines.iter().flat_map(|s| s.points.iter().map(|p| p.1)), false);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 22))
        .margin(20)
        .x_label_area_size(if layout.rotate_x_labels { 70 } else { 45 })
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)?;

    let number_label = |v: &f64| format_number(*v);
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x)
        .y_desc(y)
        .x_labels(12)
        .x_label_formatter(&number_label)
        .y_label_formatter(&number_label)
        .label_style((FONT, 13));
    if !layout.grid {
        mesh.disable_mesh();
    }
    if layout.rotate_x_labels {
        mesh.x_label_style((FONT, 13).into_font().transform(FontTransform::Rotate90));
    }
    mesh.draw()?;

    for (i, s) in lines.iter().enumerate() {
        let color = palette::category(i);
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))?
            .label(s.name.as_str())
            .legend(move |(lx, ly)| {
                PathElement::new(vec![(lx, ly), (lx + 20, ly)], color.stroke_width(2))
            });
        if layout.markers {
            chart.draw_series(
                s.points
                    .iter()
                    .map(|&p| Circle::new(p, 4, color.filled())),
            )?;
        }
    }

    if lines.len() > 1 {
        chart
            .configure_series_labels()
            .position(layout.legend.clone())
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font((FONT, 13))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn spending() -> Table {
        Table::from_rows(
            ["Maa", "Vuosi", "% bruttokansantuotteesta"],
            vec![
                vec!["Suomi".into(), 2000.into(), 6.9.into()],
                vec!["Suomi".into(), 2001.into(), 7.0.into()],
                vec!["Ruotsi".into(), 2000.into(), 7.4.into()],
                vec!["Ruotsi".into(), 2001.into(), 8.1.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_line_writes_svg() {
        let dir = tempdir().unwrap();
        let path = line(
            dir.path(),
            &spending(),
            "Vuosi",
            "% bruttokansantuotteesta",
            Some("Maa"),
            "Terveydenhuollon käyttömenot",
        )
        .unwrap();
        assert_eq!(path, dir.path().join("terveydenhuollon-kayttomenot.svg"));
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Ruotsi"));
    }

    #[test]
    fn test_line_plot_without_hue() {
        let dir = tempdir().unwrap();
        let path = line_plot(
            dir.path(),
            &spending().filter_eq("Maa", "Suomi").unwrap(),
            "Vuosi",
            "% bruttokansantuotteesta",
            None,
            "Suomi",
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_line_without_data_is_an_error() {
        let dir = tempdir().unwrap();
        let empty = Table::new(["Vuosi", "Arvo"]);
        let result = line(dir.path(), &empty, "Vuosi", "Arvo", None, "Tyhjä");
        assert!(matches!(result, Err(AppError::Chart(_))));
    }
}
