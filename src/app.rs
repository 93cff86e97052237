//! The analysis run: fetch and read every source, reshape, chart and test.
//!
//! [`run_analysis`] is the whole run. It is split into [`load_sources`],
//! which does all I/O on the inputs, and [`analyse`], which works on the
//! loaded sources and only touches the output directory.

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::analysis::{
    self, CorrelationMatrix, Decision, MannWhitney, Summary, correlation_matrix, describe,
    mann_whitney_u,
};
use crate::charts;
use crate::config::Config;
use crate::constants::files;
use crate::constants::labels::{AGE, LIMITATION_DEGREE, REGION, VALUE, YEAR};
use crate::data_fetcher::api::create_http_client_with_timeout;
use crate::data_fetcher::{
    Grid, PxTables, Region, fetch_all, load_regions, read_first_sheet, read_sheet,
};
use crate::datasets::{self, expenditure, home_care, ict, survey};
use crate::error::AppError;

/// Per-run switches that are not part of the stored configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub render_charts: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            render_charts: true,
        }
    }
}

/// Every input of the analysis, as fetched or read.
#[derive(Debug, Clone)]
pub struct Sources {
    pub px: PxTables,
    pub oecd_gdp: Grid,
    pub elderly_services_pct: Grid,
    pub elderly_services_meur: Grid,
    pub total_expenditure: Grid,
    pub home_care: Grid,
    /// Not read when charts are skipped.
    pub regions: Vec<Region>,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub charts: Vec<PathBuf>,
    pub home_care_correlation: CorrelationMatrix,
    pub home_services_correlation: CorrelationMatrix,
    pub home_services_correlation_since_2015: CorrelationMatrix,
    pub summaries: Vec<Summary>,
    pub self_care_test: MannWhitney,
    pub decision: Decision,
}

pub mod titles {
    pub const OECD_LINE: &str = "Terveydenhuollon käyttömenot vuosittain OECD-maissa";
    pub const POPULATION: &str = "Väestönkehitys maakunnittain";
    pub const OECD_BAR: &str =
        "Terveydenhuollon käyttömenojen osuus bruttokansantuotteesta OECD-maissa";
    pub const POPULATION_65: &str = "Yli 65-vuotiaiden väestönkehitys maakunnittain";
    pub const ELDERLY_SHARE_COUNTRY: &str = "Yli 65-vuotiaiden osuus koko maassa vuosittain";
    pub const ELDERLY_SHARE_REGIONS: &str = "Yli 65-vuotiaiden osuus maakunnittain ja vuosittain";
    pub const ICT: &str =
        "Ikäryhmien osuus tieto- ja viestintätekniikan käytössä vuosina 2013 - 2024";
    pub const ELDERLY_MAP: &str = "Yli 65-vuotiaiden osuus väestöstä maakunnittain";
    pub const LONELINESS: &str =
        "Yksinäisyyden tunne väestössä ikäryhmittäin vuosina 2018 ja 2022";
    pub const SERVICES_STRUCTURE: &str = "Ikääntyneiden palveluiden menojen rakenne vuosittain";
    pub const DISABLED_SHARE: &str = "Toimintarajoitteisten osuus ikäryhmittäin vuonna 2022";
    pub const LIMITATIONS: &str = "Toimintarajoitteet ikäryhmittäin vuonna 2022";
    pub const LIFE_SATISFACTION: &str = "Koetun tyytyväisyyden keskiarvo (asteikolla 1-10, jossa 1 on erittäin tyytymätön ja 10 erittäin tyytyväinen) vuosittain itse koetun terveydentilan ja ikäryhmän perusteella";
    pub const HOME_CARE_CLIENTS: &str =
        "Kotihoidon asiakasmäärien kehitys maakunnittain vuosina 2014-2023";
    pub const HOME_CARE_VS_ELDERLY: &str =
        "Kotihoidon asiakasmäärät ja 65-vuotta täyttäneiden osuus 2014-2023";
    pub const HOME_SERVICES_VS_ELDERLY: &str =
        "Kotipalvelujen osuus ja yli 65-vuotiaiden osuus 2000-2022";
    pub const HOME_SERVICES_VS_ELDERLY_SINCE_2015: &str =
        "Kotipalvelujen osuus ja yli 65-vuotiaiden osuus 2015-2022";
    pub const SHARE_OF_TOTAL: &str =
        "Ikääntyneiden palveluiden osuus terveydenhuollon kokonaiskäyttömenoista 2000-2022";
    pub const TOTAL_EXPENDITURE: &str = "Terveydenhuoltomenot vuosittain 2000-2022";
}

/// Fetches the PxWeb tables and reads the workbooks (and, for charts, the
/// region boundaries) from the data directory.
#[instrument(skip_all)]
pub async fn load_sources(config: &Config, options: RunOptions) -> Result<Sources, AppError> {
    let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
    let px = fetch_all(&client, config).await?;

    let expenditure_book = config.data_path(files::EXPENDITURE_WORKBOOK);
    let regions = if options.render_charts {
        load_regions(
            &config.data_path(files::REGIONS_GEOJSON),
            files::REGION_NAME_PROPERTY,
        )?
    } else {
        Vec::new()
    };

    Ok(Sources {
        px,
        oecd_gdp: read_sheet(&expenditure_book, files::SHEET_OECD_GDP)?,
        elderly_services_pct: read_sheet(&expenditure_book, files::SHEET_ELDERLY_SERVICES_PCT)?,
        elderly_services_meur: read_sheet(&expenditure_book, files::SHEET_ELDERLY_SERVICES_MEUR)?,
        total_expenditure: read_sheet(&expenditure_book, files::SHEET_TOTAL_EXPENDITURE)?,
        home_care: read_first_sheet(&config.data_path(files::HOME_CARE_WORKBOOK))?,
        regions,
    })
}

/// Collects the paths of the charts written during a run. A `None`
/// directory means charts are skipped.
struct Charts<'a> {
    out_dir: Option<&'a Path>,
    written: Vec<PathBuf>,
}

impl Charts<'_> {
    fn draw<F>(&mut self, render: F) -> Result<(), AppError>
    where
        F: FnOnce(&Path) -> Result<Vec<PathBuf>, AppError>,
    {
        if let Some(dir) = self.out_dir {
            self.written.extend(render(dir)?);
        }
        Ok(())
    }
}

/// Reshapes the sources, writes the charts into `out_dir` (when given) in
/// the order of the narrative, and runs the statistics.
pub fn analyse(sources: &Sources, out_dir: Option<&Path>) -> Result<Report, AppError> {
    let px = &sources.px;
    let mut drawn = Charts {
        out_dir,
        written: Vec::new(),
    };

    let oecd = datasets::oecd_health_spending(&sources.oecd_gdp)?;
    let population = datasets::population(&px.population)?;
    let elderly = datasets::elderly_share(&px.elderly_share)?;
    let ict_usage = datasets::ict_usage(&px.ict_usage)?;
    let loneliness = datasets::loneliness(&px.loneliness)?;
    let structure = datasets::elderly_services_structure(&sources.elderly_services_pct)?;
    let disabled = datasets::disabled_share(&px.disabled_share)?;
    let limitations = datasets::functional_limitations(&px.functional_limitations)?;
    let life = datasets::life_satisfaction(&px.life_satisfaction)?;
    let clients = datasets::home_care_clients(&sources.home_care)?;
    let total = datasets::total_expenditure(&sources.total_expenditure)?;
    let share_of_total =
        datasets::elderly_services_share_of_total(&sources.elderly_services_meur, &total)?;
    info!("All datasets reshaped");
    for (name, table) in [
        ("oecd", &oecd),
        ("elderly share", &elderly.regions),
        ("home care clients", &clients),
        ("share of total", &share_of_total),
    ] {
        debug!("{name}, {} rows:\n{}", table.len(), table.head(5));
    }

    let year = Some(YEAR);
    drawn.draw(|dir| {
        Ok(vec![charts::line(
            dir,
            &oecd,
            YEAR,
            expenditure::GDP_SHARE,
            Some(expenditure::COUNTRY),
            titles::OECD_LINE,
        )?])
    })?;
    drawn.draw(|dir| {
        Ok(vec![charts::line(
            dir,
            &population.totals,
            YEAR,
            VALUE,
            Some(REGION),
            titles::POPULATION,
        )?])
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &oecd,
            expenditure::GDP_SHARE,
            expenditure::COUNTRY,
            expenditure::COUNTRY,
            titles::OECD_BAR,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(dir, &population.totals, VALUE, REGION, REGION, titles::POPULATION, year)
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &population.aged_65_plus,
            VALUE,
            REGION,
            REGION,
            titles::POPULATION_65,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &elderly.whole_country,
            VALUE,
            REGION,
            REGION,
            titles::ELDERLY_SHARE_COUNTRY,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &elderly.regions,
            VALUE,
            REGION,
            REGION,
            titles::ELDERLY_SHARE_REGIONS,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &ict_usage,
            ict::USER_SHARE,
            ict::SERVICE,
            AGE,
            titles::ICT,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::choropleth(
            dir,
            &elderly.regions,
            &sources.regions,
            REGION,
            VALUE,
            year,
            titles::ELDERLY_MAP,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &loneliness,
            AGE,
            survey::LONELY_SHARE,
            survey::LONELY,
            titles::LONELINESS,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &structure,
            expenditure::SERVICES_SHARE,
            expenditure::FUNCTION,
            expenditure::FUNCTION,
            titles::SERVICES_STRUCTURE,
            year,
        )
    })?;
    drawn.draw(|dir| {
        Ok(vec![charts::pie(
            dir,
            &disabled,
            survey::DISABLED_SHARE,
            AGE,
            titles::DISABLED_SHARE,
        )?])
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &limitations,
            survey::LIMITATION,
            survey::LIMITATION_VALUE,
            LIMITATION_DEGREE,
            titles::LIMITATIONS,
            Some(AGE),
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &life,
            VALUE,
            survey::SELF_RATED_HEALTH,
            AGE,
            titles::LIFE_SATISFACTION,
            year,
        )
    })?;
    drawn.draw(|dir| {
        charts::bar(
            dir,
            &clients,
            home_care::CLIENTS,
            home_care::REGION,
            home_care::REGION,
            titles::HOME_CARE_CLIENTS,
            year,
        )
    })?;

    let home_care_vs_elderly = datasets::home_care_vs_elderly(&clients, &elderly.whole_country)?;
    let home_care_columns = [YEAR, home_care::ELDERLY_SHARE, home_care::CLIENTS_TOTAL];
    let home_care_correlation = correlation_matrix(&home_care_vs_elderly, &home_care_columns)?;
    drawn.draw(|dir| {
        Ok(vec![charts::heatmap(
            dir,
            &home_care_correlation,
            titles::HOME_CARE_VS_ELDERLY,
        )?])
    })?;

    let services_columns = [YEAR, expenditure::HOME_SERVICES_SHARE, expenditure::OVER_65];
    let home_services = datasets::home_services_vs_elderly(&structure, &elderly.whole_country)?;
    let home_services_correlation = correlation_matrix(&home_services, &services_columns)?;
    drawn.draw(|dir| {
        Ok(vec![
            charts::pair_plot(
                dir,
                &home_services,
                &services_columns,
                titles::HOME_SERVICES_VS_ELDERLY,
            )?,
            charts::heatmap(
                dir,
                &home_services_correlation,
                &format!("{} (r)", titles::HOME_SERVICES_VS_ELDERLY),
            )?,
        ])
    })?;

    let since_2015 = datasets::home_services_since_home_care_class(&home_services)?;
    let home_services_correlation_since_2015 = correlation_matrix(&since_2015, &services_columns)?;
    drawn.draw(|dir| {
        Ok(vec![
            charts::pair_plot(
                dir,
                &since_2015,
                &services_columns,
                titles::HOME_SERVICES_VS_ELDERLY_SINCE_2015,
            )?,
            charts::heatmap(
                dir,
                &home_services_correlation_since_2015,
                &format!("{} (r)", titles::HOME_SERVICES_VS_ELDERLY_SINCE_2015),
            )?,
        ])
    })?;

    let samples = datasets::self_care_samples(&limitations)?;
    let self_care_test = mann_whitney_u(&samples.no_difficulty, &samples.some_difficulty)?;
    let decision = analysis::interpret_default(self_care_test.p_value);
    info!(
        "Mann-Whitney U = {:.2}, p = {:.4}: {}",
        self_care_test.u, self_care_test.p_value, decision
    );

    drawn.draw(|dir| {
        charts::bar(
            dir,
            &share_of_total,
            expenditure::SHARE_OF_TOTAL,
            expenditure::FUNCTION,
            expenditure::FUNCTION,
            titles::SHARE_OF_TOTAL,
            year,
        )
    })?;
    drawn.draw(|dir| {
        Ok(vec![charts::line_plot(
            dir,
            &total,
            YEAR,
            expenditure::MILLION_EUR,
            None,
            titles::TOTAL_EXPENDITURE,
        )?])
    })?;

    let mut summaries = describe(
        &home_care_vs_elderly,
        &[home_care::ELDERLY_SHARE, home_care::CLIENTS_TOTAL],
    )?;
    summaries.extend(describe(
        &home_services,
        &[expenditure::HOME_SERVICES_SHARE, expenditure::OVER_65],
    )?);

    Ok(Report {
        charts: drawn.written,
        home_care_correlation,
        home_services_correlation,
        home_services_correlation_since_2015,
        summaries,
        self_care_test,
        decision,
    })
}

/// Runs the whole analysis with the given configuration.
pub async fn run_analysis(config: &Config, options: RunOptions) -> Result<Report, AppError> {
    let sources = load_sources(config, options).await?;

    let out_dir = PathBuf::from(&config.output_dir);
    if options.render_charts {
        tokio::fs::create_dir_all(&out_dir).await?;
        info!("Writing charts to {}", out_dir.display());
    }

    let report = analyse(
        &sources,
        options.render_charts.then_some(out_dir.as_path()),
    )?;
    info!("Analysis finished, {} charts written", report.charts.len());
    Ok(report)
}
