pub mod api;
pub mod geo;
pub mod jsonstat;
pub mod spreadsheet;

pub use api::{PxTables, fetch_all, post_query};
pub use geo::{Region, load_regions};
pub use jsonstat::Dataset;
pub use spreadsheet::{Grid, read_first_sheet, read_sheet, year_table};
