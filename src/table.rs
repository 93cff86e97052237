//! Tidy tables and the reshaping operations the analysis is built from.
//!
//! A [`Table`] is a list of named columns and rows of [`Value`]s. The
//! operations mirror what a data-frame library offers for long/wide
//! conversion: [`Table::melt`], [`Table::pivot`], joins on a key column and
//! the usual selection and filtering helpers. Row and column order is always
//! first appearance, so a reshaped table reads in the same order as its
//! source.

use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

use crate::error::AppError;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Missing,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Numeric content, `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Missing cells and NaN numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Parses text that holds a number. Numbers pass through unchanged.
    ///
    /// A decimal comma is accepted only in the `12,5` form: no point, one
    /// comma and one or two digits after it. Anything else with a comma,
    /// such as the thousands grouping `1,234`, stays unparsed.
    pub fn parse_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Text(s) => {
                let s = s.trim();
                match s.split_once(',') {
                    None => s.parse::<f64>().ok(),
                    Some((whole, frac))
                        if !s.contains('.')
                            && (1..=2).contains(&frac.len())
                            && frac.bytes().all(|b| b.is_ascii_digit()) =>
                    {
                        format!("{whole}.{frac}").parse::<f64>().ok()
                    }
                    Some(_) => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Missing => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Value::Missing, Value::Number)
    }
}

/// How [`Table::join`] treats left rows without a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// Borrowed view of one row, addressed by column name.
pub struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, AppError> {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), AppError> {
        if row.len() != self.columns.len() {
            return Err(AppError::data(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, AppError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AppError::missing_column(name))
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>, AppError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Numeric content of a column. Missing cells are skipped, text is an error.
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, AppError> {
        let idx = self.column_index(name)?;
        let mut out = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match &row[idx] {
                Value::Number(n) if !n.is_nan() => out.push(*n),
                Value::Text(s) => {
                    return Err(AppError::data(format!(
                        "column '{name}' holds text '{s}' where a number was expected"
                    )));
                }
                _ => {}
            }
        }
        Ok(out)
    }

    /// True when the column has at least one number and no text.
    pub fn is_numeric(&self, name: &str) -> Result<bool, AppError> {
        let values = self.column_values(name)?;
        let mut seen_number = false;
        for v in values {
            match v {
                Value::Text(_) => return Ok(false),
                Value::Number(n) if !n.is_nan() => seen_number = true,
                _ => {}
            }
        }
        Ok(seen_number)
    }

    /// Distinct values of a column in first-appearance order.
    pub fn unique(&self, name: &str) -> Result<Vec<Value>, AppError> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| &row[idx])
            .unique_by(|v| v.to_string())
            .cloned()
            .collect())
    }

    pub fn select(&self, names: &[&str]) -> Result<Table, AppError> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Renames columns. Pairs naming absent columns are ignored.
    pub fn rename(mut self, pairs: &[(&str, &str)]) -> Table {
        for column in &mut self.columns {
            if let Some((_, to)) = pairs.iter().find(|(from, _)| *from == column.as_str()) {
                *column = to.to_string();
            }
        }
        self
    }

    pub fn filter<F>(&self, keep: F) -> Table
    where
        F: Fn(&RowRef<'_>) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|values| {
                    keep(&RowRef {
                        columns: &self.columns,
                        values,
                    })
                })
                .cloned()
                .collect(),
        }
    }

    fn filter_column<F>(&self, column: &str, keep: F) -> Result<Table, AppError>
    where
        F: Fn(&Value) -> bool,
    {
        let idx = self.column_index(column)?;
        Ok(Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| keep(&r[idx]))
                .cloned()
                .collect(),
        })
    }

    /// Rows whose cell renders as `text`.
    pub fn filter_eq(&self, column: &str, text: &str) -> Result<Table, AppError> {
        self.filter_column(column, |v| v.to_string() == text)
    }

    pub fn filter_ne(&self, column: &str, text: &str) -> Result<Table, AppError> {
        self.filter_column(column, |v| v.to_string() != text)
    }

    pub fn filter_not_in(&self, column: &str, excluded: &[&str]) -> Result<Table, AppError> {
        self.filter_column(column, |v| {
            let s = v.to_string();
            !excluded.iter().any(|e| *e == s)
        })
    }

    /// Rows whose number lies in `low..=high`. Non-numeric rows are dropped.
    pub fn filter_between(&self, column: &str, low: f64, high: f64) -> Result<Table, AppError> {
        self.filter_column(column, |v| {
            v.as_f64().is_some_and(|n| (low..=high).contains(&n))
        })
    }

    /// Converts a column to whole numbers, e.g. year labels such as `"2014"`.
    pub fn to_integer(mut self, column: &str) -> Result<Table, AppError> {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            let parsed = row[idx].parse_number().ok_or_else(|| {
                AppError::data(format!(
                    "cannot convert '{}' in column '{column}' to an integer",
                    row[idx]
                ))
            })?;
            row[idx] = Value::Number(parsed.trunc());
        }
        Ok(self)
    }

    /// Replaces every missing cell in the table.
    pub fn fill_missing(mut self, value: Value) -> Table {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_missing() {
                *cell = value.clone();
            }
        }
        self
    }

    /// Drops every row that has a missing cell.
    pub fn drop_incomplete(mut self) -> Table {
        self.rows.retain(|r| !r.iter().any(Value::is_missing));
        self
    }

    pub fn round(mut self, column: &str, decimals: i32) -> Result<Table, AppError> {
        let idx = self.column_index(column)?;
        let factor = 10f64.powi(decimals);
        for row in &mut self.rows {
            if let Value::Number(n) = row[idx] {
                row[idx] = Value::Number((n * factor).round() / factor);
            }
        }
        Ok(self)
    }

    /// Applies a string transformation to every text cell of a column.
    pub fn map_text<F>(mut self, column: &str, f: F) -> Result<Table, AppError>
    where
        F: Fn(&str) -> String,
    {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            if let Value::Text(s) = &row[idx] {
                row[idx] = Value::Text(f(s));
            }
        }
        Ok(self)
    }

    /// Appends a column computed from each row.
    pub fn with_column<F>(mut self, name: &str, f: F) -> Table
    where
        F: Fn(&RowRef<'_>) -> Value,
    {
        let computed: Vec<Value> = self
            .rows
            .iter()
            .map(|values| {
                f(&RowRef {
                    columns: &self.columns,
                    values,
                })
            })
            .collect();
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(computed) {
            row.push(value);
        }
        self
    }

    /// Wide to long. Every column not in `id_vars` becomes rows of
    /// `var_name`/`value_name`; the output runs through all rows of the first
    /// value column before moving to the next one.
    pub fn melt(
        &self,
        id_vars: &[&str],
        var_name: &str,
        value_name: &str,
    ) -> Result<Table, AppError> {
        let id_indices = id_vars
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>, _>>()?;
        let value_indices: Vec<usize> = (0..self.columns.len())
            .filter(|i| !id_indices.contains(i))
            .collect();

        let mut columns: Vec<String> = id_vars.iter().map(|s| s.to_string()).collect();
        columns.push(var_name.to_string());
        columns.push(value_name.to_string());

        let mut rows = Vec::with_capacity(self.rows.len() * value_indices.len());
        for &vi in &value_indices {
            for row in &self.rows {
                let mut out: Vec<Value> = id_indices.iter().map(|&i| row[i].clone()).collect();
                out.push(Value::Text(self.columns[vi].clone()));
                out.push(row[vi].clone());
                rows.push(out);
            }
        }
        Ok(Table { columns, rows })
    }

    /// Long to wide. One output row per distinct `index` combination and one
    /// output column per distinct value of `columns`. Duplicate cells are
    /// averaged; combinations without data stay missing. Columns and rows
    /// without any data are dropped.
    pub fn pivot(&self, index: &[&str], columns: &str, values: &str) -> Result<Table, AppError> {
        let index_idx = index
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>, _>>()?;
        let col_idx = self.column_index(columns)?;
        let val_idx = self.column_index(values)?;

        let mut row_keys: Vec<Vec<Value>> = Vec::new();
        let mut row_pos: HashMap<Vec<String>, usize> = HashMap::new();
        let mut col_names: Vec<String> = Vec::new();
        let mut col_pos: HashMap<String, usize> = HashMap::new();
        // (sum, count) per (row, column)
        let mut cells: HashMap<(usize, usize), (f64, usize)> = HashMap::new();

        for row in &self.rows {
            let key: Vec<String> = index_idx.iter().map(|&i| row[i].to_string()).collect();
            let r = *row_pos.entry(key).or_insert_with(|| {
                row_keys.push(index_idx.iter().map(|&i| row[i].clone()).collect());
                row_keys.len() - 1
            });
            let name = row[col_idx].to_string();
            let c = *col_pos.entry(name.clone()).or_insert_with(|| {
                col_names.push(name);
                col_names.len() - 1
            });
            if let Some(v) = row[val_idx].as_f64() {
                let cell = cells.entry((r, c)).or_insert((0.0, 0));
                cell.0 += v;
                cell.1 += 1;
            }
        }

        let kept_cols: Vec<usize> = (0..col_names.len())
            .filter(|&c| (0..row_keys.len()).any(|r| cells.contains_key(&(r, c))))
            .collect();

        let mut out_columns: Vec<String> = index.iter().map(|s| s.to_string()).collect();
        out_columns.extend(kept_cols.iter().map(|&c| col_names[c].clone()));

        let mut rows = Vec::with_capacity(row_keys.len());
        for (r, key) in row_keys.into_iter().enumerate() {
            if !kept_cols.iter().any(|&c| cells.contains_key(&(r, c))) {
                continue;
            }
            let mut out = key;
            for &c in &kept_cols {
                out.push(match cells.get(&(r, c)) {
                    Some((sum, count)) => Value::Number(sum / *count as f64),
                    None => Value::Missing,
                });
            }
            rows.push(out);
        }

        Ok(Table {
            columns: out_columns,
            rows,
        })
    }

    /// Joins on one key column compared by rendered value. Non-key columns
    /// present on both sides get `_x` (left) and `_y` (right) suffixes.
    pub fn join(&self, other: &Table, on: &str, how: JoinKind) -> Result<Table, AppError> {
        let left_key = self.column_index(on)?;
        let right_key = other.column_index(on)?;

        let right_cols: Vec<usize> = (0..other.columns.len())
            .filter(|&i| i != right_key)
            .collect();

        let overlaps = |name: &str| name != on && other.has_column(name) && self.has_column(name);
        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if overlaps(c) {
                    format!("{c}_x")
                } else {
                    c.clone()
                }
            })
            .collect();
        columns.extend(right_cols.iter().map(|&i| {
            let c = &other.columns[i];
            if overlaps(c) {
                format!("{c}_y")
            } else {
                c.clone()
            }
        }));

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            index.entry(row[right_key].to_string()).or_default().push(i);
        }

        let mut rows = Vec::new();
        for row in &self.rows {
            match index.get(&row[left_key].to_string()) {
                Some(matches) => {
                    for &m in matches {
                        let mut out = row.clone();
                        out.extend(right_cols.iter().map(|&i| other.rows[m][i].clone()));
                        rows.push(out);
                    }
                }
                None if how == JoinKind::Left => {
                    let mut out = row.clone();
                    out.extend(right_cols.iter().map(|_| Value::Missing));
                    rows.push(out);
                }
                None => {}
            }
        }

        Ok(Table { columns, rows })
    }

    /// Sum of `value` per distinct `by`, in first-appearance order.
    pub fn group_sum(&self, by: &str, value: &str) -> Result<Table, AppError> {
        let by_idx = self.column_index(by)?;
        let val_idx = self.column_index(value)?;
        let mut keys: Vec<Value> = Vec::new();
        let mut sums: Vec<f64> = Vec::new();
        let mut pos: HashMap<String, usize> = HashMap::new();
        for row in &self.rows {
            let p = *pos.entry(row[by_idx].to_string()).or_insert_with(|| {
                keys.push(row[by_idx].clone());
                sums.push(0.0);
                keys.len() - 1
            });
            if let Some(v) = row[val_idx].as_f64() {
                sums[p] += v;
            }
        }
        Ok(Table {
            columns: vec![by.to_string(), value.to_string()],
            rows: keys
                .into_iter()
                .zip(sums)
                .map(|(k, s)| vec![k, Value::Number(s)])
                .collect(),
        })
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_years() -> Table {
        Table::from_rows(
            ["Maa", "2000", "2001"],
            vec![
                vec!["Suomi".into(), 6.7.into(), 6.9.into()],
                vec!["Ruotsi".into(), 7.4.into(), 7.9.into()],
            ],
        )
        .unwrap()
    }

    fn long_survey() -> Table {
        Table::from_rows(
            ["Ikä", "Tiedot", "value"],
            vec![
                vec!["16-34".into(), "Kuuleminen, %".into(), 2.0.into()],
                vec!["16-34".into(), "Näkeminen, %".into(), 1.0.into()],
                vec!["35-49".into(), "Kuuleminen, %".into(), 4.0.into()],
                vec!["35-49".into(), "Kuuleminen, %".into(), 6.0.into()],
                vec!["35-49".into(), "Tyhjä".into(), Value::Missing],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(2014.0).to_string(), "2014");
        assert_eq!(Value::Number(6.25).to_string(), "6.25");
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::text("KOKO MAA").to_string(), "KOKO MAA");
    }

    #[test]
    fn test_value_missing_and_parse() {
        assert!(Value::Missing.is_missing());
        assert!(Value::Number(f64::NAN).is_missing());
        assert!(!Value::Number(0.0).is_missing());
        assert_eq!(Value::text(" 12,5 ").parse_number(), Some(12.5));
        assert_eq!(Value::text("..").parse_number(), None);
    }

    #[test]
    fn test_parse_number_decimal_comma_only() {
        assert_eq!(Value::text("7,25").parse_number(), Some(7.25));
        assert_eq!(Value::text("-0,5").parse_number(), Some(-0.5));
        assert_eq!(Value::text("3.5").parse_number(), Some(3.5));
        // Thousands grouping and mixed separators stay text
        assert_eq!(Value::text("1,234").parse_number(), None);
        assert_eq!(Value::text("1,234.5").parse_number(), None);
        assert_eq!(Value::text("1,2,3").parse_number(), None);
        assert_eq!(Value::text("12,").parse_number(), None);
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut t = Table::new(["a", "b"]);
        assert!(t.push_row(vec![Value::Missing]).is_err());
        assert!(t.push_row(vec![1.0.into(), 2.0.into()]).is_ok());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_melt_is_column_major() {
        let long = wide_years().melt(&["Maa"], "Vuosi", "%").unwrap();
        assert_eq!(long.columns(), &["Maa", "Vuosi", "%"]);
        assert_eq!(long.len(), 4);
        let countries: Vec<String> = long
            .column_values("Maa")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(countries, vec!["Suomi", "Ruotsi", "Suomi", "Ruotsi"]);
        assert_eq!(long.rows()[2][1], Value::text("2001"));
        assert_eq!(long.rows()[3][2], Value::Number(7.9));
    }

    #[test]
    fn test_melt_then_integer_years() {
        let long = wide_years()
            .melt(&["Maa"], "Vuosi", "%")
            .unwrap()
            .to_integer("Vuosi")
            .unwrap();
        assert!(long.is_numeric("Vuosi").unwrap());
        assert_eq!(long.numbers("Vuosi").unwrap(), vec![2000.0, 2000.0, 2001.0, 2001.0]);
    }

    #[test]
    fn test_to_integer_rejects_text() {
        let t = Table::from_rows(["Vuosi"], vec![vec!["vuosi".into()]]).unwrap();
        assert!(matches!(t.to_integer("Vuosi"), Err(AppError::Data(_))));
    }

    #[test]
    fn test_pivot_averages_and_drops_empty_columns() {
        let wide = long_survey().pivot(&["Ikä"], "Tiedot", "value").unwrap();
        assert_eq!(wide.columns(), &["Ikä", "Kuuleminen, %", "Näkeminen, %"]);
        assert_eq!(wide.len(), 2);
        assert_eq!(wide.rows()[0][1], Value::Number(2.0));
        assert_eq!(wide.rows()[1][1], Value::Number(5.0));
        assert_eq!(wide.rows()[1][2], Value::Missing);
    }

    #[test]
    fn test_pivot_missing_column() {
        let err = long_survey().pivot(&["Sukupuoli"], "Tiedot", "value");
        assert!(matches!(err, Err(AppError::MissingColumn { .. })));
    }

    #[test]
    fn test_fill_missing_and_drop_incomplete() {
        let wide = long_survey().pivot(&["Ikä"], "Tiedot", "value").unwrap();
        assert_eq!(wide.clone().drop_incomplete().len(), 1);
        let filled = wide.fill_missing(Value::Number(0.0));
        assert_eq!(filled.rows()[1][2], Value::Number(0.0));
    }

    #[test]
    fn test_filters() {
        let t = wide_years();
        assert_eq!(t.filter_eq("Maa", "Suomi").unwrap().len(), 1);
        assert_eq!(t.filter_ne("Maa", "Suomi").unwrap().len(), 1);
        assert_eq!(t.filter_not_in("Maa", &["Suomi", "Ruotsi"]).unwrap().len(), 0);
        let long = t
            .melt(&["Maa"], "Vuosi", "%")
            .unwrap()
            .to_integer("Vuosi")
            .unwrap();
        assert_eq!(long.filter_between("Vuosi", 2001.0, 2010.0).unwrap().len(), 2);
        assert_eq!(long.filter(|r| r.number("%").unwrap_or(0.0) > 7.0).len(), 2);
    }

    #[test]
    fn test_join_inner_and_left_with_suffixes() {
        let left = Table::from_rows(
            ["Toiminto", "Vuosi", "M€"],
            vec![
                vec!["A".into(), 2000.into(), 10.0.into()],
                vec!["A".into(), 2001.into(), 12.0.into()],
            ],
        )
        .unwrap();
        let right = Table::from_rows(
            ["Toiminto", "Vuosi", "M€"],
            vec![vec!["Yhteensä".into(), 2000.into(), 100.0.into()]],
        )
        .unwrap();

        let inner = left.join(&right, "Vuosi", JoinKind::Inner).unwrap();
        assert_eq!(
            inner.columns(),
            &["Toiminto_x", "Vuosi", "M€_x", "Toiminto_y", "M€_y"]
        );
        assert_eq!(inner.len(), 1);

        let outer = left.join(&right, "Vuosi", JoinKind::Left).unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.rows()[1][4], Value::Missing);
    }

    #[test]
    fn test_group_sum_and_with_column() {
        let t = Table::from_rows(
            ["Maakunta", "Vuosi", "Arvo"],
            vec![
                vec!["Uusimaa".into(), 2014.into(), 10.0.into()],
                vec!["Pirkanmaa".into(), 2014.into(), 5.0.into()],
                vec!["Uusimaa".into(), 2015.into(), 11.0.into()],
            ],
        )
        .unwrap();
        let sums = t.group_sum("Vuosi", "Arvo").unwrap();
        assert_eq!(sums.rows()[0], vec![Value::Number(2014.0), Value::Number(15.0)]);
        assert_eq!(sums.rows()[1], vec![Value::Number(2015.0), Value::Number(11.0)]);

        let doubled = sums.with_column("Kaksi", |r| r.number("Arvo").map(|v| v * 2.0).into());
        assert_eq!(doubled.rows()[0][2], Value::Number(30.0));
    }

    #[test]
    fn test_rename_select_round_and_map_text() {
        let t = Table::from_rows(
            ["Alue", "value"],
            vec![vec!["MK01 Uusimaa".into(), 23.456.into()]],
        )
        .unwrap()
        .rename(&[("value", "Osuus"), ("absent", "x")])
        .round("Osuus", 2)
        .unwrap()
        .map_text("Alue", |s| s.to_lowercase())
        .unwrap();
        assert_eq!(t.columns(), &["Alue", "Osuus"]);
        assert_eq!(t.rows()[0], vec![Value::text("mk01 uusimaa"), Value::Number(23.46)]);
        assert!(t.select(&["Osuus", "nope"]).is_err());
    }

    #[test]
    fn test_head_keeps_columns() {
        let preview = long_survey().head(2);
        assert_eq!(preview.columns(), &["Ikä", "Tiedot", "value"]);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview.rows()[1][1], Value::text("Näkeminen, %"));
        assert_eq!(long_survey().head(50).len(), 5);
    }

    #[test]
    fn test_unique_first_appearance() {
        let u = long_survey().unique("Tiedot").unwrap();
        assert_eq!(
            u,
            vec![
                Value::text("Kuuleminen, %"),
                Value::text("Näkeminen, %"),
                Value::text("Tyhjä")
            ]
        );
    }
}
