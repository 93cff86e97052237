//! Health expenditure workbook (THL, Terveydenhuollon menot ja rahoitus).

use crate::constants::labels::{HOME_SERVICES, TOTAL_HEALTH_EXPENDITURE, VALUE, YEAR};
use crate::constants::years::{EXPENDITURE_FIRST, EXPENDITURE_LAST, HOME_CARE_CLASS_FIRST};
use crate::data_fetcher::spreadsheet::{Grid, year_table};
use crate::error::AppError;
use crate::table::{JoinKind, Table, Value};

pub const COUNTRY: &str = "Maa";
pub const FUNCTION: &str = "Toiminto";
pub const GDP_SHARE: &str = "% bruttokansantuotteesta";
pub const SERVICES_SHARE: &str = "Osuus ikääntyneiden palveluista (%)";
pub const MILLION_EUR: &str = "Miljoonaa euroa";
pub const ELDERLY_SERVICES_MEUR: &str = "Ikääntyneiden palvelut (miljoonaa euroa)";
pub const TOTAL_MEUR: &str = "Terveydenhuoltomenot yhteensä (miljoonaa euroa)";
pub const SHARE_OF_TOTAL: &str = "Osuus kokonaiskäyttömenoista (%)";
pub const HOME_SERVICES_SHARE: &str = "Ikääntyneiden palveluista (%)";
pub const OVER_65: &str = "Yli 65-vuotiaat";

fn expenditure_years(grid: &Grid, label: &str) -> Result<Table, AppError> {
    year_table(grid, label, EXPENDITURE_FIRST, EXPENDITURE_LAST)
}

/// Health expenditure as % of GDP in OECD countries, long format.
pub fn oecd_health_spending(grid: &Grid) -> Result<Table, AppError> {
    expenditure_years(grid, COUNTRY)?
        .melt(&[COUNTRY], YEAR, GDP_SHARE)?
        .to_integer(YEAR)
}

/// Structure of elderly services expenditure in percent. The 100 % total row
/// is dropped and shares are rounded to two decimals.
pub fn elderly_services_structure(grid: &Grid) -> Result<Table, AppError> {
    expenditure_years(grid, FUNCTION)?
        .melt(&[FUNCTION], YEAR, SERVICES_SHARE)?
        .filter(|row| row.number(SERVICES_SHARE) != Some(100.0))
        .to_integer(YEAR)?
        .round(SERVICES_SHARE, 2)
}

/// Total health expenditure (investments included) per year in M€.
pub fn total_expenditure(grid: &Grid) -> Result<Table, AppError> {
    expenditure_years(grid, FUNCTION)?
        .filter_eq(FUNCTION, TOTAL_HEALTH_EXPENDITURE)?
        .melt(&[FUNCTION], YEAR, MILLION_EUR)?
        .to_integer(YEAR)
}

/// Each elderly service's share of total health expenditure.
///
/// `services_meur` is the elderly services sheet in M€, `total` the output of
/// [`total_expenditure`]. Years without a total keep a missing share.
pub fn elderly_services_share_of_total(
    services_meur: &Grid,
    total: &Table,
) -> Result<Table, AppError> {
    let services = expenditure_years(services_meur, FUNCTION)?
        .melt(&[FUNCTION], YEAR, MILLION_EUR)?
        .to_integer(YEAR)?;

    let joined = services
        .join(total, YEAR, JoinKind::Left)?
        .rename(&[
            ("Toiminto_x", FUNCTION),
            ("Miljoonaa euroa_x", ELDERLY_SERVICES_MEUR),
            ("Miljoonaa euroa_y", TOTAL_MEUR),
        ])
        .select(&[FUNCTION, YEAR, ELDERLY_SERVICES_MEUR, TOTAL_MEUR])?;

    joined
        .with_column(SHARE_OF_TOTAL, |row| {
            match (row.number(ELDERLY_SERVICES_MEUR), row.number(TOTAL_MEUR)) {
                (Some(part), Some(whole)) if whole != 0.0 => Value::Number(part / whole * 100.0),
                _ => Value::Missing,
            }
        })
        .round(SHARE_OF_TOTAL, 2)
}

/// Home services' share of elderly services next to the share of people
/// aged 65+, joined on year.
pub fn home_services_vs_elderly(
    structure: &Table,
    elderly_whole_country: &Table,
) -> Result<Table, AppError> {
    let home_services = structure.filter_eq(FUNCTION, HOME_SERVICES)?;
    let elderly = elderly_whole_country.filter_between(
        YEAR,
        f64::from(EXPENDITURE_FIRST),
        f64::from(EXPENDITURE_LAST),
    )?;
    home_services
        .join(&elderly, YEAR, JoinKind::Inner)?
        .rename(&[(SERVICES_SHARE, HOME_SERVICES_SHARE), (VALUE, OVER_65)])
        .select(&[YEAR, HOME_SERVICES_SHARE, OVER_65])
}

/// Restricts [`home_services_vs_elderly`] to the years in which home
/// services include the home care task class.
pub fn home_services_since_home_care_class(table: &Table) -> Result<Table, AppError> {
    table.filter_between(
        YEAR,
        f64::from(HOME_CARE_CLASS_FIRST),
        f64::from(EXPENDITURE_LAST),
    )
}
