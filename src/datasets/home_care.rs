//! Home care clients by region (THL, Avohilmo).

use crate::constants::labels::{VALUE, YEAR};
use crate::constants::years::{HOME_CARE_FIRST, HOME_CARE_LAST};
use crate::data_fetcher::spreadsheet::{Grid, year_table};
use crate::error::AppError;
use crate::table::{JoinKind, Table};

pub const REGION: &str = "Maakunta";
pub const CLIENTS: &str = "Arvo";
pub const CLIENTS_TOTAL: &str = "Kotihoidon asiakasmäärät";
pub const ELDERLY_SHARE: &str = "65-vuotta täyttäneiden osuus";

/// Row labels that sum other rows.
const AGGREGATE_PREFIXES: [&str; 3] = ["koko maa", "yhteensä", "kaikki"];

fn is_aggregate(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    AGGREGATE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Home care clients per region and year, long format with whole numbers.
pub fn home_care_clients(grid: &Grid) -> Result<Table, AppError> {
    let wide = year_table(grid, REGION, HOME_CARE_FIRST, HOME_CARE_LAST)?;
    wide.filter(|row| {
        row.get(REGION)
            .and_then(|v| v.as_text())
            .is_some_and(|label| !is_aggregate(label))
    })
    .melt(&[REGION], YEAR, CLIENTS)?
    .to_integer(YEAR)?
    .to_integer(CLIENTS)
}

/// Yearly client totals next to the whole-country share of people aged 65+.
pub fn home_care_vs_elderly(
    clients: &Table,
    elderly_whole_country: &Table,
) -> Result<Table, AppError> {
    let totals = clients
        .group_sum(YEAR, CLIENTS)?
        .rename(&[(CLIENTS, CLIENTS_TOTAL)]);
    let elderly = elderly_whole_country
        .filter_between(YEAR, f64::from(HOME_CARE_FIRST), f64::from(HOME_CARE_LAST))?
        .rename(&[(VALUE, ELDERLY_SHARE)]);
    elderly
        .join(&totals, YEAR, JoinKind::Inner)?
        .select(&[YEAR, ELDERLY_SHARE, CLIENTS_TOTAL])
}
