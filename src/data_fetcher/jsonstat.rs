//! JSON-stat 2.0 dataset decoding.
//!
//! PxWeb answers a `json-stat2` query with a single dataset object: a list of
//! dimension ids, their sizes, a category index per dimension and a flat value
//! array in row-major order (the last dimension varies fastest). This module
//! decodes that object and flattens it into a [`Table`] with one column per
//! dimension, named by the dimension label and holding category labels, plus a
//! `value` column.

use serde::Deserialize;
use std::collections::HashMap;

use crate::constants::labels;
use crate::error::AppError;
use crate::table::{Table, Value};

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    label: Option<String>,
    id: Vec<String>,
    size: Vec<usize>,
    dimension: HashMap<String, RawDimension>,
    value: RawValues,
}

#[derive(Debug, Deserialize)]
struct RawDimension {
    #[serde(default)]
    label: Option<String>,
    category: RawCategory,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    index: Option<RawIndex>,
    #[serde(default)]
    label: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIndex {
    List(Vec<String>),
    Map(HashMap<String, usize>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValues {
    Dense(Vec<Option<f64>>),
    Sparse(HashMap<String, Option<f64>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub id: String,
    pub label: String,
    pub categories: Vec<Category>,
}

/// A decoded JSON-stat dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: Option<String>,
    pub dimensions: Vec<Dimension>,
    pub values: Vec<Option<f64>>,
}

impl Dataset {
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        let raw: RawDataset = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, AppError> {
        let raw: RawDataset = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDataset) -> Result<Self, AppError> {
        if let Some(class) = &raw.class
            && class != "dataset"
        {
            return Err(AppError::json_stat(format!(
                "expected class 'dataset', got '{class}'"
            )));
        }
        if raw.id.len() != raw.size.len() {
            return Err(AppError::json_stat(format!(
                "{} dimension ids but {} sizes",
                raw.id.len(),
                raw.size.len()
            )));
        }

        let mut dimension_map = raw.dimension;
        let mut dimensions = Vec::with_capacity(raw.id.len());
        for (id, &size) in raw.id.iter().zip(&raw.size) {
            let dim = dimension_map
                .remove(id)
                .ok_or_else(|| AppError::json_stat(format!("dimension '{id}' is not described")))?;
            let categories = decode_categories(id, dim.category)?;
            if categories.len() != size {
                return Err(AppError::json_stat(format!(
                    "dimension '{id}' has {} categories but size {size}",
                    categories.len()
                )));
            }
            dimensions.push(Dimension {
                id: id.clone(),
                label: dim.label.unwrap_or_else(|| id.clone()),
                categories,
            });
        }

        let cells: usize = raw.size.iter().product();
        let values = match raw.value {
            RawValues::Dense(values) => {
                if values.len() != cells {
                    return Err(AppError::json_stat(format!(
                        "{} values for {cells} cells",
                        values.len()
                    )));
                }
                values
            }
            RawValues::Sparse(map) => {
                let mut values = vec![None; cells];
                for (key, v) in map {
                    let pos: usize = key.parse().map_err(|_| {
                        AppError::json_stat(format!("value key '{key}' is not a position"))
                    })?;
                    let slot = values.get_mut(pos).ok_or_else(|| {
                        AppError::json_stat(format!("value position {pos} is out of range"))
                    })?;
                    *slot = v;
                }
                values
            }
        };

        Ok(Dataset {
            label: raw.label,
            dimensions,
            values,
        })
    }

    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    /// Flattens the cube into long format, one row per cell.
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut columns: Vec<String> = self.dimensions.iter().map(|d| d.label.clone()).collect();
        columns.push(labels::VALUE.to_string());

        let sizes: Vec<usize> = self.dimensions.iter().map(|d| d.categories.len()).collect();
        let mut strides = vec![1usize; sizes.len()];
        for k in (0..sizes.len().saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * sizes[k + 1];
        }

        let mut rows = Vec::with_capacity(self.values.len());
        for (flat, value) in self.values.iter().enumerate() {
            let mut row: Vec<Value> = self
                .dimensions
                .iter()
                .enumerate()
                .map(|(k, dim)| {
                    let pos = (flat / strides[k]) % sizes[k];
                    Value::Text(dim.categories[pos].label.clone())
                })
                .collect();
            row.push((*value).into());
            rows.push(row);
        }
        Table::from_rows(columns, rows)
    }
}

fn decode_categories(id: &str, category: RawCategory) -> Result<Vec<Category>, AppError> {
    let names = category.label.unwrap_or_default();
    let codes: Vec<String> = match category.index {
        Some(RawIndex::List(codes)) => codes,
        Some(RawIndex::Map(map)) => {
            let mut slots: Vec<Option<String>> = vec![None; map.len()];
            for (code, pos) in map {
                let slot = slots.get_mut(pos).ok_or_else(|| {
                    AppError::json_stat(format!("category index {pos} of '{id}' is out of range"))
                })?;
                *slot = Some(code);
            }
            slots
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| AppError::json_stat(format!("category index of '{id}' has gaps")))?
        }
        // a lone label without an index describes a single-category dimension
        None if names.len() == 1 => names.keys().cloned().collect(),
        None => {
            return Err(AppError::json_stat(format!(
                "dimension '{id}' has no category index"
            )));
        }
    };

    Ok(codes
        .into_iter()
        .map(|code| Category {
            label: names.get(&code).cloned().unwrap_or_else(|| code.clone()),
            code,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "class": "dataset",
            "label": "Yksinäisyyden tunne",
            "id": ["Vuosi", "Ikä", "Tiedot"],
            "size": [2, 2, 1],
            "dimension": {
                "Vuosi": {
                    "label": "Vuosi",
                    "category": {
                        "index": {"2018": 0, "2022": 1},
                        "label": {"2018": "2018", "2022": "2022"}
                    }
                },
                "Ikä": {
                    "label": "Ikä",
                    "category": {
                        "index": ["SSS", "16-24"],
                        "label": {"SSS": "Yhteensä", "16-24": "16 - 24"}
                    }
                },
                "Tiedot": {
                    "label": "Tiedot",
                    "category": {
                        "label": {"osuus": "Henkilöiden osuus (%)"}
                    }
                }
            },
            "value": [10.5, 15.0, null, 18.25]
        })
    }

    #[test]
    fn test_decode_dimensions() {
        let ds = Dataset::from_value(sample()).unwrap();
        assert_eq!(ds.label.as_deref(), Some("Yksinäisyyden tunne"));
        assert_eq!(ds.dimensions.len(), 3);
        let age = ds.dimension("Ikä").unwrap();
        assert_eq!(age.categories[0].code, "SSS");
        assert_eq!(age.categories[0].label, "Yhteensä");
        let info = ds.dimension("Tiedot").unwrap();
        assert_eq!(info.categories[0].label, "Henkilöiden osuus (%)");
    }

    #[test]
    fn test_flatten_row_major() {
        let table = Dataset::from_value(sample()).unwrap().to_table().unwrap();
        assert_eq!(table.columns(), &["Vuosi", "Ikä", "Tiedot", "value"]);
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.rows()[1],
            vec![
                Value::text("2018"),
                Value::text("16 - 24"),
                Value::text("Henkilöiden osuus (%)"),
                Value::Number(15.0)
            ]
        );
        assert_eq!(table.rows()[2][0], Value::text("2022"));
        assert_eq!(table.rows()[2][3], Value::Missing);
    }

    #[test]
    fn test_sparse_values() {
        let mut doc = sample();
        doc["value"] = json!({"3": 1.5});
        let ds = Dataset::from_value(doc).unwrap();
        assert_eq!(ds.values, vec![None, None, None, Some(1.5)]);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let mut doc = sample();
        doc["size"] = json!([2, 3, 1]);
        assert!(matches!(
            Dataset::from_value(doc),
            Err(AppError::JsonStat(_))
        ));
    }

    #[test]
    fn test_value_count_mismatch_is_rejected() {
        let mut doc = sample();
        doc["value"] = json!([1.0, 2.0]);
        assert!(matches!(
            Dataset::from_value(doc),
            Err(AppError::JsonStat(_))
        ));
    }

    #[test]
    fn test_missing_dimension_is_rejected() {
        let mut doc = sample();
        doc["id"] = json!(["Vuosi", "Ikä", "Alue"]);
        assert!(Dataset::from_value(doc).is_err());
    }

    #[test]
    fn test_not_a_dataset() {
        let mut doc = sample();
        doc["class"] = json!("collection");
        assert!(Dataset::from_value(doc).is_err());
    }
}
