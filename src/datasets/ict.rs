use crate::constants::labels::{AGE, INFO, VALUE, YEAR};
use crate::error::AppError;
use crate::table::{Table, Value};

pub const SERVICE: &str = "Palvelu";
pub const USER_SHARE: &str = "Käyttäjien osuus";

/// Series with too short a history to chart.
pub const EXCLUDED_SERVICES: [&str; 3] = [
    "Soittanut videopuheluja  viimeisen 3 kuukauden aikana, %",
    "Kirjautunut johonkin palveluun matkapuhelinoperaattorin mobiilivarmeenteella viimeisen 12 kuukauden aikana, %",
    "Kirjautunut johonkin palveluun verkkopankin tunnuksella tai mobiilitunnisteella viimeisen 12 kuukauden aikana, %",
];

/// Share of users per service, age group and year in long format.
pub fn ict_usage(raw: &Table) -> Result<Table, AppError> {
    raw.pivot(&[YEAR, AGE], INFO, VALUE)?
        .fill_missing(Value::Number(0.0))
        .to_integer(YEAR)?
        .melt(&[AGE, YEAR], SERVICE, USER_SHARE)?
        .filter_not_in(SERVICE, &EXCLUDED_SERVICES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ict_usage() {
        let raw = Table::from_rows(
            ["Vuosi", "Sukupuoli", "Ikä", "Tiedot", "value"],
            vec![
                vec!["2013".into(), "Yhteensä".into(), "65-74".into(), "Käyttänyt internetiä, %".into(), 70.0.into()],
                vec!["2013".into(), "Yhteensä".into(), "65-74".into(), EXCLUDED_SERVICES[0].into(), 5.0.into()],
                vec!["2024".into(), "Yhteensä".into(), "65-74".into(), "Käyttänyt internetiä, %".into(), 95.0.into()],
            ],
        )
        .unwrap();
        let t = ict_usage(&raw).unwrap();
        assert_eq!(t.columns(), &["Ikä", "Vuosi", SERVICE, USER_SHARE]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.numbers(USER_SHARE).unwrap(), vec![70.0, 95.0]);
        assert_eq!(t.numbers("Vuosi").unwrap(), vec![2013.0, 2024.0]);
    }
}
