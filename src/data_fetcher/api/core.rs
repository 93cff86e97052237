use reqwest::Client;
use tracing::{info, instrument};

use super::fetch_utils::post_query;
use super::queries::{self, PxQuery};
use super::urls::build_table_url;
use crate::config::Config;
use crate::constants::tables;
use crate::error::AppError;
use crate::table::Table;

/// Raw long-format tables of every PxWeb query of the analysis.
#[derive(Debug, Clone)]
pub struct PxTables {
    pub life_satisfaction: Table,
    pub disabled_share: Table,
    pub functional_limitations: Table,
    pub loneliness: Table,
    pub ict_usage: Table,
    pub population: Table,
    pub elderly_share: Table,
}

/// The queries of the analysis paired with their table paths, in fetch order.
pub fn analysis_queries() -> Vec<(&'static str, PxQuery)> {
    vec![
        (tables::LIFE_SATISFACTION, queries::life_satisfaction()),
        (tables::DISABLED_SHARE, queries::disabled_share()),
        (tables::FUNCTIONAL_LIMITATIONS, queries::functional_limitations()),
        (tables::LONELINESS, queries::loneliness()),
        (tables::ICT_USAGE, queries::ict_usage()),
        (tables::POPULATION, queries::population()),
        (tables::ELDERLY_SHARE, queries::elderly_share()),
    ]
}

/// Fetches one table below the configured API root.
pub async fn fetch_table(
    client: &Client,
    config: &Config,
    table_path: &str,
    query: &PxQuery,
) -> Result<Table, AppError> {
    let url = build_table_url(&config.api_base_url, table_path);
    post_query(client, &url, query).await
}

/// Fetches all tables one after another. PxWeb limits clients to 30 queries
/// per 10 seconds, so the queries are not issued concurrently.
#[instrument(skip(client, config))]
pub async fn fetch_all(client: &Client, config: &Config) -> Result<PxTables, AppError> {
    let mut fetched = Vec::with_capacity(7);
    for (path, query) in analysis_queries() {
        fetched.push(fetch_table(client, config, path, &query).await?);
    }
    info!("Fetched {} PxWeb tables", fetched.len());

    let mut it = fetched.into_iter();
    let mut next = || {
        it.next()
            .ok_or_else(|| AppError::data("fewer tables fetched than queried"))
    };
    Ok(PxTables {
        life_satisfaction: next()?,
        disabled_share: next()?,
        functional_limitations: next()?,
        loneliness: next()?,
        ict_usage: next()?,
        population: next()?,
        elderly_share: next()?,
    })
}
