//! Health and welfare survey tables (Statistics Finland, eot).

use crate::constants::labels::{
    AGE, INFO, LIMITATION_DEGREE, NO_DIFFICULTY, SELF_CARE, SEX, SOME_DIFFICULTY, TOTAL, VALUE,
    YEAR,
};
use crate::error::AppError;
use crate::table::{Table, Value};

pub const SELF_RATED_HEALTH: &str = "Itse koettu terveydentila";
pub const DISABLED_SHARE: &str = "Toimintarajoitteisten osuus, %";
pub const LIMITATION: &str = "Toimintarajoite";
pub const LIMITATION_VALUE: &str = "Arvo";
pub const LONELY: &str = "Yksinäinen";
pub const LONELY_SHARE: &str = "Henkilöiden osuus (%)";

/// Limitation types compared in the chart and the test.
pub const LIMITATION_TYPES: [&str; 6] = [
    SELF_CARE,
    "Kommunikointi, %",
    "Kuuleminen, %",
    "Käveleminen tai portaiden kulkeminen, %",
    "Muistaminen tai keskittyminen, %",
    "Näkeminen, %",
];

/// Mean life satisfaction; suppressed cells count as zero.
pub fn life_satisfaction(raw: &Table) -> Result<Table, AppError> {
    raw.clone().fill_missing(Value::Number(0.0)).to_integer(YEAR)
}

/// Share of persons with functional limitations by age, both sexes.
pub fn disabled_share(raw: &Table) -> Result<Table, AppError> {
    raw.pivot(&[SEX, AGE], INFO, VALUE)?
        .fill_missing(Value::Number(0.0))
        .filter_eq(SEX, TOTAL)
}

/// Limitation types by age and degree in long format.
pub fn functional_limitations(raw: &Table) -> Result<Table, AppError> {
    let mut columns = vec![AGE, LIMITATION_DEGREE];
    columns.extend(LIMITATION_TYPES);
    raw.pivot(&[AGE, LIMITATION_DEGREE], INFO, VALUE)?
        .fill_missing(Value::Number(0.0))
        .select(&columns)?
        .melt(&[AGE, LIMITATION_DEGREE], LIMITATION, LIMITATION_VALUE)
}

pub fn loneliness(raw: &Table) -> Result<Table, AppError> {
    raw.pivot(&[AGE, YEAR, LONELY], INFO, VALUE)?.to_integer(YEAR)
}

/// Self-care limitation shares of the two mildest degrees, one observation
/// per age row.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfCareSamples {
    pub no_difficulty: Vec<f64>,
    pub some_difficulty: Vec<f64>,
}

/// Picks the Mann-Whitney samples from the long limitation table. Every age
/// row is used, the all-ages row included.
pub fn self_care_samples(limitations: &Table) -> Result<SelfCareSamples, AppError> {
    let self_care = limitations.filter_eq(LIMITATION, SELF_CARE)?;
    Ok(SelfCareSamples {
        no_difficulty: self_care
            .filter_eq(LIMITATION_DEGREE, NO_DIFFICULTY)?
            .numbers(LIMITATION_VALUE)?,
        some_difficulty: self_care
            .filter_eq(LIMITATION_DEGREE, SOME_DIFFICULTY)?
            .numbers(LIMITATION_VALUE)?,
    })
}
