//! SVG chart rendering.
//!
//! Every chart function takes the output directory and returns the files it
//! wrote. Charts with a frame column (the animated charts of the analysis)
//! produce one file per frame value, named `<slug>-<frame>.svg`. Data
//! preparation is kept in plain functions next to each renderer so the
//! layout can be tested without drawing.

pub mod bar;
pub mod heatmap;
pub mod line;
pub mod map;
pub mod pair;
pub mod palette;
pub mod pie;

pub use bar::bar;
pub use heatmap::heatmap;
pub use line::{line, line_plot};
pub use map::choropleth;
pub use pair::pair_plot;
pub use pie::pie;

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::table::{Table, Value};

const MAX_SLUG_LEN: usize = 60;

/// File-name friendly form of a chart title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        let mapped = match c {
            'ä' | 'å' | 'á' | 'à' => 'a',
            'ö' | 'ó' => 'o',
            'é' | 'è' => 'e',
            c if c.is_ascii_alphanumeric() => c,
            _ => '-',
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }
    slug.truncate(MAX_SLUG_LEN);
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "kaavio".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Output path of a chart, with the frame value appended when given.
pub fn chart_path(out_dir: &Path, title: &str, frame: Option<&str>) -> PathBuf {
    let name = match frame {
        Some(frame) => format!("{}-{}.svg", slugify(title), slugify(frame)),
        None => format!("{}.svg", slugify(title)),
    };
    out_dir.join(name)
}

/// Splits a table on the distinct values of `frame`, in first-appearance
/// order. Without a frame column the whole table is the only frame.
pub fn frames(table: &Table, frame: Option<&str>) -> Result<Vec<(Option<String>, Table)>, AppError> {
    match frame {
        None => Ok(vec![(None, table.clone())]),
        Some(column) => table
            .unique(column)?
            .into_iter()
            .map(|value| {
                let key = value.to_string();
                let part = table.filter_eq(column, &key)?;
                Ok((Some(key), part))
            })
            .collect(),
    }
}

/// Distinct values of a column rendered as labels.
pub fn labels_of(table: &Table, column: &str) -> Result<Vec<String>, AppError> {
    Ok(table
        .unique(column)?
        .iter()
        .filter(|v| !v.is_missing())
        .map(Value::to_string)
        .collect())
}

/// Range covering `values` with some padding. `include_zero` anchors bar
/// axes at zero.
pub fn axis_range(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Range<f64> {
    let (mut min, mut max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if max - min < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    let low = if include_zero && min >= 0.0 { min } else { min - pad };
    let high = if include_zero && max <= 0.0 { max } else { max + pad };
    low..high
}

/// Short label for a number, whole numbers without decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Category name at an integer axis position, empty between positions.
pub fn category_label(categories: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    categories
        .get(rounded as usize)
        .cloned()
        .unwrap_or_default()
}

/// A named list of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Numeric `x`/`y` points grouped by `hue` in first-appearance order and
/// sorted by `x`. Rows without both numbers are skipped.
pub fn series(table: &Table, x: &str, y: &str, hue: Option<&str>) -> Result<Vec<Series>, AppError> {
    table.column_index(x)?;
    table.column_index(y)?;
    let groups = match hue {
        Some(hue) => labels_of(table, hue)?,
        None => vec![y.to_string()],
    };
    let mut out: Vec<Series> = groups
        .into_iter()
        .map(|name| Series {
            name,
            points: Vec::new(),
        })
        .collect();

    for row in table.iter_rows() {
        let (Some(px), Some(py)) = (row.number(x), row.number(y)) else {
            continue;
        };
        let index = match hue {
            Some(hue) => row
                .get(hue)
                .and_then(|v| out.iter().position(|s| s.name == v.to_string())),
            None => Some(0),
        };
        if let Some(i) = index {
            out[i].points.push((px, py));
        }
    }

    for s in &mut out {
        s.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    out.retain(|s| !s.points.is_empty());
    Ok(out)
}

fn no_data(title: &str) -> AppError {
    AppError::chart(format!("no data to plot for '{title}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(
            slugify("Terveydenhuollon käyttömenot vuosittain OECD-maissa"),
            "terveydenhuollon-kayttomenot-vuosittain-oecd-maissa"
        );
        assert_eq!(slugify("  Väestö 65+ (%) "), "vaesto-65");
        assert_eq!(slugify("!!!"), "kaavio");
        assert!(slugify(&"pitkä otsikko ".repeat(20)).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn test_chart_path_with_frame() {
        let path = chart_path(Path::new("kaaviot"), "Kotihoidon asiakkaat", Some("2014"));
        assert_eq!(path, Path::new("kaaviot/kotihoidon-asiakkaat-2014.svg"));
        let path = chart_path(Path::new("kaaviot"), "Kotihoidon asiakkaat", None);
        assert_eq!(path, Path::new("kaaviot/kotihoidon-asiakkaat.svg"));
    }

    #[test]
    fn test_frames_split() {
        let t = Table::from_rows(
            ["Vuosi", "v"],
            vec![
                vec![2014.into(), 1.0.into()],
                vec![2015.into(), 2.0.into()],
                vec![2014.into(), 3.0.into()],
            ],
        )
        .unwrap();
        let f = frames(&t, Some("Vuosi")).unwrap();
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].0.as_deref(), Some("2014"));
        assert_eq!(f[0].1.len(), 2);
        assert_eq!(frames(&t, None).unwrap()[0].1.len(), 3);
    }

    #[test]
    fn test_axis_range() {
        let r = axis_range([2.0, 4.0], true);
        assert_eq!(r.start, 0.0);
        assert!((r.end - 4.2).abs() < 1e-9);
        let r = axis_range([10.0, 20.0], false);
        assert_eq!((r.start, r.end), (9.5, 20.5));
        assert_eq!(axis_range([5.0], false), 4.0..6.0);
        assert_eq!(axis_range(Vec::new(), false), 0.0..1.0);
    }

    #[test]
    fn test_category_label() {
        let cats = vec!["Uusimaa".to_string(), "Lappi".to_string()];
        assert_eq!(category_label(&cats, 1.0), "Lappi");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, 2.0), "");
        assert_eq!(category_label(&cats, -1.0), "");
    }

    #[test]
    fn test_series_grouped_and_sorted() {
        let t = Table::from_rows(
            ["Maa", "Vuosi", "%"],
            vec![
                vec!["Suomi".into(), 2001.into(), 7.0.into()],
                vec!["Ruotsi".into(), 2000.into(), 8.0.into()],
                vec!["Suomi".into(), 2000.into(), 6.5.into()],
                vec!["Ruotsi".into(), 2001.into(), Value::Missing],
            ],
        )
        .unwrap();
        let s = series(&t, "Vuosi", "%", Some("Maa")).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].name, "Suomi");
        assert_eq!(s[0].points, vec![(2000.0, 6.5), (2001.0, 7.0)]);
        assert_eq!(s[1].points, vec![(2000.0, 8.0)]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2014.0), "2014");
        assert_eq!(format_number(3.14159), "3.14");
    }
}
