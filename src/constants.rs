//! Application-wide constants and configuration values
//!
//! Table paths, fixed labels of the source datasets and the defaults for the
//! configurable settings live here.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Upper bound for establishing a connection, capped by the request timeout
pub const HTTP_CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 4;

/// Statistics Finland PxWeb API root for the StatFin database
pub const DEFAULT_API_BASE_URL: &str = "https://pxdata.stat.fi:443/PxWeb/api/v1/fi/StatFin";

/// Directory holding the bundled workbooks and the region GeoJSON
pub const DEFAULT_DATA_DIR: &str = ".";

/// Directory the SVG charts are written to
pub const DEFAULT_OUTPUT_DIR: &str = "kaaviot";

pub const LOG_FILE_NAME: &str = "hoiva_analyysi.log";

/// Retry policy for transient PxWeb failures
pub mod retry {
    /// Attempts after the first request
    pub const MAX_RETRIES: u32 = 3;

    /// Initial backoff, doubled after every retry
    pub const INITIAL_BACKOFF_MS: u64 = 250;
}

/// PxWeb table paths relative to the API base URL
pub mod tables {
    /// Life satisfaction by age group and self-rated health
    pub const LIFE_SATISFACTION: &str = "eot/statfin_eot_pxt_11ze.px";

    /// Share of persons with functional limitations
    pub const DISABLED_SHARE: &str = "eot/statfin_eot_pxt_13xi.px";

    /// Functional limitations by type and degree
    pub const FUNCTIONAL_LIMITATIONS: &str = "eot/statfin_eot_pxt_13xj.px";

    /// Feeling of loneliness during the past four weeks
    pub const LONELINESS: &str = "eot/statfin_eot_pxt_11z9.px";

    /// Use of information and communications technology
    pub const ICT_USAGE: &str = "sutivi/statfin_sutivi_pxt_13ud.px";

    /// Population by region and age group
    pub const POPULATION: &str = "vaerak/statfin_vaerak_pxt_11re.px";

    /// Share of population aged over 64 by region
    pub const ELDERLY_SHARE: &str = "vaerak/statfin_vaerak_pxt_11ra.px";
}

/// Bundled local sources
pub mod files {
    pub const EXPENDITURE_WORKBOOK: &str = "Menot_ja_rahoitus.xlsx";
    pub const HOME_CARE_WORKBOOK: &str = "KH_asiakkaat_maakunnittain.xlsx";
    pub const REGIONS_GEOJSON: &str = "maakunnat.geojson";

    pub const SHEET_TOTAL_EXPENDITURE: &str = "Taulukko 1";
    pub const SHEET_ELDERLY_SERVICES_MEUR: &str = "Taulukko 4a";
    pub const SHEET_ELDERLY_SERVICES_PCT: &str = "Taulukko 4b";
    pub const SHEET_OECD_GDP: &str = "Taulukko 8";

    /// Feature property holding the region name in the GeoJSON
    pub const REGION_NAME_PROPERTY: &str = "Maakunta";
}

/// Year spans of the bundled workbooks
pub mod years {
    pub const EXPENDITURE_FIRST: i32 = 2000;
    pub const EXPENDITURE_LAST: i32 = 2022;
    pub const HOME_CARE_FIRST: i32 = 2014;
    pub const HOME_CARE_LAST: i32 = 2023;
    /// Home services include the home care task class from this year on
    pub const HOME_CARE_CLASS_FIRST: i32 = 2015;
}

/// Labels that appear inside the source data
pub mod labels {
    pub const VALUE: &str = "value";
    pub const YEAR: &str = "Vuosi";
    pub const AGE: &str = "Ikä";
    pub const REGION: &str = "Alue";
    pub const SEX: &str = "Sukupuoli";
    pub const INFO: &str = "Tiedot";
    pub const TOTAL: &str = "Yhteensä";
    pub const WHOLE_COUNTRY: &str = "KOKO MAA";
    pub const AGED_65_PLUS: &str = "65 -";
    pub const LIMITATION_DEGREE: &str = "Toimintarajoitteen aste";
    pub const NO_DIFFICULTY: &str = "Ei vaikeuksia";
    pub const SOME_DIFFICULTY: &str = "Vähän vaikeuksia";
    pub const SELF_CARE: &str = "Itsestä huolehtiminen, %";
    pub const HOME_SERVICES: &str = "1.3 Kotipalvelut*";
    pub const TOTAL_HEALTH_EXPENDITURE: &str = "Terveydenhuoltomenot yhteensä (ml. Investoinnit)";
}

/// Chart canvas sizes in pixels
pub mod chart {
    pub const LINE_SIZE: (u32, u32) = (1400, 600);
    pub const STATIC_LINE_SIZE: (u32, u32) = (1600, 800);
    pub const BAR_SIZE: (u32, u32) = (1400, 1200);
    pub const PIE_SIZE: (u32, u32) = (900, 900);
    pub const MAP_SIZE: (u32, u32) = (900, 1200);
    pub const HEATMAP_SIZE: (u32, u32) = (2000, 900);
    pub const PAIR_PLOT_CELL: u32 = 360;
    pub const FONT: &str = "sans-serif";
}

/// Significance level of the hypothesis test
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
