//! Workbook reading.
//!
//! The THL workbooks are laid out for people: a title row or two, a header
//! row with the years, data rows and footnotes below. Sheets are read into a
//! raw [`Grid`] first and [`year_table`] then locates the header row and
//! keeps the complete data rows.

use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;
use tracing::{debug, info};

use crate::error::AppError;
use crate::table::{Table, Value};

/// Raw cell rows of a sheet.
pub type Grid = Vec<Vec<Value>>;

/// Reads a named sheet.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Grid, AppError> {
    info!("Reading sheet '{sheet}' from {}", path.display());
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet)?;
    Ok(range_to_grid(&range))
}

/// Reads the first sheet of a workbook.
pub fn read_first_sheet(path: &Path) -> Result<Grid, AppError> {
    info!("Reading first sheet from {}", path.display());
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::spreadsheet(format!("{} has no sheets", path.display())))??;
    Ok(range_to_grid(&range))
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect()
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Missing
            } else {
                Value::Text(trimmed.to_string())
            }
        }
        Data::Bool(b) => Value::Text(b.to_string()),
        _ => Value::Missing,
    }
}

/// Year in a header cell: a whole number or text starting with four digits
/// (`2015*` style footnote markers are allowed).
fn header_year(cell: &Value) -> Option<i32> {
    match cell {
        Value::Number(n) if n.fract() == 0.0 => Some(*n as i32),
        Value::Text(s) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            if digits.len() == 4 {
                digits.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Builds a wide table of a label column and the year columns
/// `first_year..=last_year`.
///
/// The header row is the first row that names every year of the span. The
/// label is taken from the first column. Rows below the header are kept when
/// they have a label and a number for every year; title, blank and footnote
/// rows fall out that way.
pub fn year_table(
    grid: &Grid,
    label_column: &str,
    first_year: i32,
    last_year: i32,
) -> Result<Table, AppError> {
    let years: Vec<i32> = (first_year..=last_year).collect();

    let (header_idx, year_columns) = grid
        .iter()
        .enumerate()
        .find_map(|(i, row)| {
            let positions: Option<Vec<usize>> = years
                .iter()
                .map(|y| row.iter().position(|c| header_year(c) == Some(*y)))
                .collect();
            positions.map(|p| (i, p))
        })
        .ok_or_else(|| {
            AppError::spreadsheet(format!(
                "no header row with the years {first_year}-{last_year}"
            ))
        })?;
    debug!("Header row {header_idx}, year columns {year_columns:?}");

    let mut columns = vec![label_column.to_string()];
    columns.extend(years.iter().map(ToString::to_string));
    let mut table = Table::new(columns);

    for row in &grid[header_idx + 1..] {
        let label = match row.first() {
            Some(Value::Text(s)) => Value::Text(s.clone()),
            _ => continue,
        };
        let numbers: Option<Vec<Value>> = year_columns
            .iter()
            .map(|&c| row.get(c).and_then(Value::parse_number).map(Value::Number))
            .collect();
        if let Some(numbers) = numbers {
            let mut out = vec![label];
            out.extend(numbers);
            table.push_row(out)?;
        }
    }

    if table.is_empty() {
        return Err(AppError::spreadsheet(format!(
            "no complete rows below the header for '{label_column}'"
        )));
    }
    Ok(table)
}
