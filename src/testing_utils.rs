//! Test utilities: JSON-stat answers for every PxWeb table of the analysis,
//! workbook grids and region boundaries, small enough to chart quickly.

use serde_json::{Map, Value as Json, json};

use crate::constants::labels::{
    HOME_SERVICES, NO_DIFFICULTY, SELF_CARE, SOME_DIFFICULTY, TOTAL, TOTAL_HEALTH_EXPENDITURE,
    WHOLE_COUNTRY,
};
use crate::constants::tables;
use crate::constants::years::{
    EXPENDITURE_FIRST, EXPENDITURE_LAST, HOME_CARE_FIRST, HOME_CARE_LAST,
};
use crate::data_fetcher::Grid;
use crate::datasets::ict::EXCLUDED_SERVICES;
use crate::datasets::survey::LIMITATION_TYPES;
use crate::table::Value;

/// Self-care shares of the age rows, no difficulty and some difficulty.
/// The two samples give U = 36 and p ≈ 0.0050.
pub const SELF_CARE_NO_DIFFICULTY: [f64; 6] = [96.0, 98.0, 98.0, 95.0, 91.0, 97.0];
pub const SELF_CARE_SOME_DIFFICULTY: [f64; 6] = [3.0, 1.5, 1.0, 4.0, 7.5, 2.0];

/// Regions present in the fixtures, as they appear after the code prefix is removed.
pub const REGIONS: [&str; 2] = ["Uusimaa", "Lappi"];

pub struct TestDataBuilder;

impl TestDataBuilder {
    /// A JSON-stat 2.0 dataset. Category codes equal their labels and the
    /// values are in row-major order, the last dimension varying fastest.
    pub fn jsonstat(label: &str, dimensions: &[(&str, &[&str])], values: &[Option<f64>]) -> Json {
        let mut dims = Map::new();
        for (name, categories) in dimensions {
            let labels: Map<String, Json> = categories
                .iter()
                .map(|c| (c.to_string(), Json::String(c.to_string())))
                .collect();
            dims.insert(
                name.to_string(),
                json!({
                    "label": name,
                    "category": {"index": categories, "label": labels}
                }),
            );
        }
        json!({
            "class": "dataset",
            "label": label,
            "id": dimensions.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            "size": dimensions.iter().map(|(_, c)| c.len()).collect::<Vec<_>>(),
            "dimension": dims,
            "value": values,
        })
    }

    fn counting(n: usize, start: f64, step: f64) -> Vec<Option<f64>> {
        (0..n).map(|i| Some(start + step * i as f64)).collect()
    }

    /// Life satisfaction, one suppressed cell.
    pub fn life_satisfaction() -> Json {
        let mut values = Self::counting(8, 7.0, 0.2);
        values[3] = None;
        Self::jsonstat(
            "Tyytyväisyys elämään",
            &[
                ("Vuosi", &["2018", "2022"]),
                ("Ikä", &["16 - 24", "75 - 84"]),
                ("Itse koettu terveydentila", &["Hyvä", "Huono"]),
                ("Tiedot", &["Tyytyväisyys elämään, keskiarvo"]),
            ],
            &values,
        )
    }

    pub fn disabled_share() -> Json {
        Self::jsonstat(
            "Toimintarajoitteiset",
            &[
                ("Sukupuoli", &[TOTAL, "Miehet"]),
                ("Ikä", &["16 - 34", "75 -"]),
                ("Tiedot", &["Toimintarajoitteisten osuus, %"]),
            ],
            &[Some(8.1), Some(41.3), Some(7.0), None],
        )
    }

    /// Functional limitations with the self-care shares of
    /// [`SELF_CARE_NO_DIFFICULTY`] and [`SELF_CARE_SOME_DIFFICULTY`].
    pub fn functional_limitations() -> Json {
        let ages = [TOTAL, "16 - 34", "35 - 49", "50 - 64", "65 - 74", "75 -"];
        let degrees = [NO_DIFFICULTY, SOME_DIFFICULTY];
        let mut values = Vec::new();
        for age in 0..ages.len() {
            for degree in 0..degrees.len() {
                for (k, limitation) in LIMITATION_TYPES.iter().enumerate() {
                    let value = match (*limitation == SELF_CARE, degree) {
                        (true, 0) => SELF_CARE_NO_DIFFICULTY[age],
                        (true, _) => SELF_CARE_SOME_DIFFICULTY[age],
                        (false, 0) => 90.0 - k as f64 - age as f64,
                        (false, _) => 5.0 + k as f64 + age as f64,
                    };
                    values.push(Some(value));
                }
            }
        }
        Self::jsonstat(
            "Toimintarajoitteet",
            &[
                ("Ikä", &ages[..]),
                ("Toimintarajoitteen aste", &degrees[..]),
                ("Tiedot", &LIMITATION_TYPES[..]),
            ],
            &values,
        )
    }

    pub fn loneliness() -> Json {
        Self::jsonstat(
            "Yksinäisyyden tunne",
            &[
                ("Ikä", &[TOTAL, "75 - 84"]),
                ("Vuosi", &["2018", "2022"]),
                ("Yksinäinen", &["Ei koskaan", "Jatkuvasti"]),
                ("Tiedot", &["Henkilöiden osuus (%)"]),
            ],
            &Self::counting(8, 40.0, -4.5),
        )
    }

    pub fn ict_usage() -> Json {
        Self::jsonstat(
            "Tieto- ja viestintätekniikan käyttö",
            &[
                ("Vuosi", &["2013", "2024"]),
                ("Sukupuoli", &[TOTAL]),
                ("Ikä", &["65 - 74", "75 - 89"]),
                ("Tiedot", &["Käyttänyt internetiä, %", EXCLUDED_SERVICES[0]]),
            ],
            &[
                Some(70.0),
                Some(5.0),
                Some(35.0),
                None,
                Some(95.0),
                Some(40.0),
                Some(71.0),
                Some(22.0),
            ],
        )
    }

    pub fn population() -> Json {
        Self::jsonstat(
            "Väestö",
            &[
                ("Alue", &["MK01 Uusimaa", "MK19 Lappi"]),
                ("Ikä", &[TOTAL, "65 -"]),
                ("Sukupuoli", &[TOTAL]),
                ("Vuosi", &["2022", "2023"]),
            ],
            &[
                Some(1_733_000.0),
                Some(1_747_000.0),
                Some(300_000.0),
                Some(306_000.0),
                Some(176_000.0),
                Some(175_000.0),
                Some(42_000.0),
                Some(43_000.0),
            ],
        )
    }

    /// Share of people aged over 64 for the whole country and two regions,
    /// every year of the expenditure and home care spans.
    pub fn elderly_share() -> Json {
        let years: Vec<String> = (EXPENDITURE_FIRST..=HOME_CARE_LAST)
            .map(|y| y.to_string())
            .collect();
        let year_refs: Vec<&str> = years.iter().map(String::as_str).collect();
        let mut values = Vec::new();
        for base in [15.0, 12.0, 17.0] {
            values.extend(Self::counting(year_refs.len(), base, 0.35));
        }
        Self::jsonstat(
            "Yli 64-vuotiaiden osuus",
            &[
                ("Alue", &[WHOLE_COUNTRY, "MK01 Uusimaa", "MK19 Lappi"]),
                ("Vuosi", year_refs.as_slice()),
                ("Tiedot", &["Yli 64-vuotiaiden osuus väestöstä, %"]),
            ],
            &values,
        )
    }

    /// Table paths with their fixture bodies, in fetch order.
    pub fn px_responses() -> Vec<(&'static str, Json)> {
        vec![
            (tables::LIFE_SATISFACTION, Self::life_satisfaction()),
            (tables::DISABLED_SHARE, Self::disabled_share()),
            (tables::FUNCTIONAL_LIMITATIONS, Self::functional_limitations()),
            (tables::LONELINESS, Self::loneliness()),
            (tables::ICT_USAGE, Self::ict_usage()),
            (tables::POPULATION, Self::population()),
            (tables::ELDERLY_SHARE, Self::elderly_share()),
        ]
    }

    /// A sheet laid out like the THL workbooks: a title, a blank row, the
    /// header with the years, one row per label growing linearly by year,
    /// and a footnote.
    pub fn year_grid(
        header_label: &str,
        first_year: i32,
        last_year: i32,
        rows: &[(&str, f64, f64)],
    ) -> Grid {
        let mut header: Vec<Value> = vec![header_label.into()];
        header.extend((first_year..=last_year).map(|y| Value::text(y.to_string())));
        let width = header.len();

        let mut grid: Grid = vec![
            vec!["Taulukko".into()],
            vec![Value::Missing; width],
            header,
        ];
        for (label, start, step) in rows {
            let mut row: Vec<Value> = vec![(*label).into()];
            row.extend(
                (first_year..=last_year).map(|y| Value::Number(start + step * f64::from(y - first_year))),
            );
            grid.push(row);
        }
        grid.push(vec!["Lähde: THL".into()]);
        grid
    }

    pub fn oecd_gdp() -> Grid {
        Self::year_grid(
            "Maa",
            EXPENDITURE_FIRST,
            EXPENDITURE_LAST,
            &[("Suomi", 6.8, 0.12), ("Ruotsi", 7.4, 0.15)],
        )
    }

    pub fn elderly_services_pct() -> Grid {
        Self::year_grid(
            "Toiminto",
            EXPENDITURE_FIRST,
            EXPENDITURE_LAST,
            &[
                ("1.1 Laitoshoito", 60.0, -1.4),
                (HOME_SERVICES, 14.0, 1.1),
                ("1.4 Muut palvelut", 26.0, 0.3),
                (TOTAL, 100.0, 0.0),
            ],
        )
    }

    pub fn elderly_services_meur() -> Grid {
        Self::year_grid(
            "Toiminto",
            EXPENDITURE_FIRST,
            EXPENDITURE_LAST,
            &[
                ("1.1 Laitoshoito", 900.0, 5.0),
                (HOME_SERVICES, 250.0, 40.0),
            ],
        )
    }

    pub fn total_expenditure() -> Grid {
        Self::year_grid(
            "Toiminto",
            EXPENDITURE_FIRST,
            EXPENDITURE_LAST,
            &[
                ("Erikoissairaanhoito", 3000.0, 150.0),
                (TOTAL_HEALTH_EXPENDITURE, 9000.0, 420.0),
            ],
        )
    }

    pub fn home_care() -> Grid {
        Self::year_grid(
            "Avohilmo: Kotihoidon asiakkaat",
            HOME_CARE_FIRST,
            HOME_CARE_LAST,
            &[
                ("KOKO MAA", 100_000.0, 2_000.0),
                ("Uusimaa", 30_000.0, 900.0),
                ("Lappi", 6_000.0, 80.0),
            ],
        )
    }

    /// Two small regions named like the fixture regions.
    pub fn regions_geojson() -> String {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"Maakunta": REGIONS[0]},
                    "geometry": {"type": "Polygon", "coordinates": [[
                        [23.5, 59.9], [26.5, 59.9], [26.5, 61.0], [23.5, 61.0], [23.5, 59.9]
                    ]]}
                },
                {
                    "type": "Feature",
                    "properties": {"Maakunta": REGIONS[1]},
                    "geometry": {"type": "MultiPolygon", "coordinates": [[[
                        [21.0, 66.0], [29.5, 66.0], [28.0, 70.0], [21.0, 69.0], [21.0, 66.0]
                    ]]]}
                }
            ]
        })
        .to_string()
    }
}
