use crate::constants::labels::{AGE, AGED_65_PLUS, REGION, TOTAL, VALUE, WHOLE_COUNTRY, YEAR};
use crate::error::AppError;
use crate::table::Table;

/// Regional population, all ages and 65+.
#[derive(Debug, Clone)]
pub struct Population {
    pub totals: Table,
    pub aged_65_plus: Table,
}

/// Share of the population aged over 64.
#[derive(Debug, Clone)]
pub struct ElderlyShare {
    pub whole_country: Table,
    pub regions: Table,
}

/// Removes the statistical region code, `"MK01 Uusimaa"` becomes `"Uusimaa"`.
pub fn strip_region_code(label: &str) -> String {
    let trimmed = label.trim();
    if let Some(rest) = trimmed.strip_prefix("MK") {
        let after_digits = rest.trim_start_matches(|c: char| c.is_ascii_digit());
        if after_digits.len() < rest.len() && after_digits.starts_with(char::is_whitespace) {
            return after_digits.trim().to_string();
        }
    }
    trimmed.to_string()
}

pub fn population(raw: &Table) -> Result<Population, AppError> {
    let tidy = raw
        .select(&[REGION, AGE, YEAR, VALUE])?
        .to_integer(YEAR)?
        .map_text(REGION, strip_region_code)?;
    Ok(Population {
        totals: tidy.filter_eq(AGE, TOTAL)?,
        aged_65_plus: tidy.filter_eq(AGE, AGED_65_PLUS)?,
    })
}

pub fn elderly_share(raw: &Table) -> Result<ElderlyShare, AppError> {
    let tidy = raw.clone().to_integer(YEAR)?;
    Ok(ElderlyShare {
        whole_country: tidy.filter_eq(REGION, WHOLE_COUNTRY)?,
        regions: tidy
            .filter_ne(REGION, WHOLE_COUNTRY)?
            .map_text(REGION, strip_region_code)?,
    })
}
