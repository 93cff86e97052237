//! PxWeb query bodies.
//!
//! A PxWeb table is queried by POSTing a JSON document that lists, per
//! variable code, which values to select. Variables left out are returned in
//! full (except for eliminable ones, which the server aggregates).

use serde::{Deserialize, Serialize};

pub const JSON_STAT2: &str = "json-stat2";
pub const FILTER_ITEM: &str = "item";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PxQuery {
    pub query: Vec<QueryItem>,
    pub response: ResponseFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryItem {
    pub code: String,
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub filter: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub format: String,
}

impl Default for PxQuery {
    fn default() -> Self {
        PxQuery {
            query: Vec::new(),
            response: ResponseFormat {
                format: JSON_STAT2.to_string(),
            },
        }
    }
}

impl PxQuery {
    /// Selects the listed value codes of a variable.
    pub fn item(self, code: &str, values: &[&str]) -> Self {
        self.filtered(code, FILTER_ITEM, values)
    }

    /// Selects values through a named filter, e.g. a regional aggregation
    /// such as `agg:_Maakunnat 2025.agg`.
    pub fn filtered(mut self, code: &str, filter: &str, values: &[&str]) -> Self {
        self.query.push(QueryItem {
            code: code.to_string(),
            selection: Selection {
                filter: filter.to_string(),
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        });
        self
    }
}

/// Region codes MK01..MK21 of the 2025 regional division (MK03 and MK20 no
/// longer exist).
const REGIONS: [&str; 19] = [
    "MK01", "MK02", "MK04", "MK05", "MK06", "MK07", "MK08", "MK09", "MK10", "MK11", "MK12",
    "MK13", "MK14", "MK15", "MK16", "MK17", "MK18", "MK19", "MK21",
];

/// Life satisfaction by age group and self-rated health (table 11ze).
pub fn life_satisfaction() -> PxQuery {
    PxQuery::default()
        .item(
            "Ikä",
            &["16-24", "25-34", "35-49", "50-64", "65-74", "75-84", "85-"],
        )
        .item("Itse koettu terveydentila", &["1", "2", "3", "6"])
}

/// Share of persons with functional limitations (table 13xi), everything.
pub fn disabled_share() -> PxQuery {
    PxQuery::default()
}

/// Functional limitations by degree (table 13xj).
pub fn functional_limitations() -> PxQuery {
    PxQuery::default().item("Ikä", &["SSS", "16-34", "35-49", "50-64", "65-74", "75-"])
}

/// Loneliness during the past four weeks (table 11z9).
pub fn loneliness() -> PxQuery {
    PxQuery::default()
        .item(
            "Ikä",
            &[
                "SSS", "16-24", "25-34", "35-49", "50-64", "65-74", "75-84", "85-",
            ],
        )
        .item("Yksinäinen", &["12", "20"])
}

/// Use of information and communications technology (table 13ud).
pub fn ict_usage() -> PxQuery {
    PxQuery::default()
        .item("Sukupuoli", &["SSS"])
        .item("Ikä", &["1", "2", "3", "4", "5", "6", "7"])
        .item(
            "Tiedot",
            &[
                "mphtss", "iot_dva", "iuph1a", "iuph1b", "iuchat1", "iuif", "ihif", "iubk",
                "iunw", "iusell", "iusnet1", "iusnetf1", "igovip", "igovapro", "ibuy1", "ibuy2",
                "bclot1", "bfdr", "bhlfts", "bhlfts1", "bapp", "bctick", "bsutil", "btps_e",
                "bots", "iug_dtv", "ieid1", "ieid2", "ieid3",
            ],
        )
}

/// Population of the regions, total and aged 65+ (table 11re).
pub fn population() -> PxQuery {
    PxQuery::default()
        .filtered("Alue", "agg:_Maakunnat 2025.agg", &REGIONS)
        .filtered(
            "Ikä",
            "agg:Ikäkausi 0-14, 15-24, 25-44, 45-64, 65-.agg",
            &["SSS", "65-"],
        )
        .item("Sukupuoli", &["SSS"])
}

/// Share of population aged over 64, whole country and regions (table 11ra).
pub fn elderly_share() -> PxQuery {
    let mut areas = vec!["SSS"];
    areas.extend_from_slice(&REGIONS);
    PxQuery::default()
        .filtered("Alue", "agg:_- Maakunnat 2025.agg", &areas)
        .item("Tiedot", &["vaesto_yli64_p"])
}
