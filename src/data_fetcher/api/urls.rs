//! URL building utilities for PxWeb tables

/// Builds the URL of a PxWeb table.
/// Slashes between the base URL and the table path are normalised.
///
/// # Arguments
/// * `api_base_url` - The database root, e.g. `https://pxdata.stat.fi/PxWeb/api/v1/fi/StatFin`
/// * `table_path` - The table path relative to the root, e.g. `eot/statfin_eot_pxt_11ze.px`
///
/// # Returns
/// * `String` - The complete table URL
///
/// # Example
/// ```
/// use hoiva_analyysi::data_fetcher::api::build_table_url;
///
/// let url = build_table_url("https://pxdata.stat.fi/PxWeb/api/v1/fi/StatFin/", "/eot/statfin_eot_pxt_11ze.px");
/// assert_eq!(url, "https://pxdata.stat.fi/PxWeb/api/v1/fi/StatFin/eot/statfin_eot_pxt_11ze.px");
/// ```
pub fn build_table_url(api_base_url: &str, table_path: &str) -> String {
    format!(
        "{}/{}",
        api_base_url.trim_end_matches('/'),
        table_path.trim_start_matches('/')
    )
}
