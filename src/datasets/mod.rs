//! One reshape per source dataset.
//!
//! Every function here takes a raw table (or workbook grid) in the layout its
//! source delivers and returns the tidy table the charts and statistics of
//! the analysis read. The column names are the Finnish labels of the sources.

pub mod expenditure;
pub mod home_care;
pub mod ict;
pub mod population;
pub mod survey;

pub use expenditure::{
    elderly_services_share_of_total, elderly_services_structure, home_services_since_home_care_class,
    home_services_vs_elderly,
    oecd_health_spending, total_expenditure,
};
pub use home_care::{home_care_clients, home_care_vs_elderly};
pub use ict::ict_usage;
pub use population::{ElderlyShare, Population, elderly_share, population, strip_region_code};
pub use survey::{
    SelfCareSamples, disabled_share, functional_limitations, life_satisfaction, loneliness,
    self_care_samples,
};
