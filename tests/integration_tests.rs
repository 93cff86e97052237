use hoiva_analyysi::{
    analysis::{Decision, UTestMethod},
    app::{Sources, analyse, run_analysis},
    config::Config,
    constants::tables,
    data_fetcher::{api::create_http_client_with_timeout, fetch_all, geo::parse_regions},
    error::AppError,
    testing_utils::{REGIONS, SELF_CARE_NO_DIFFICULTY, SELF_CARE_SOME_DIFFICULTY, TestDataBuilder},
    RunOptions,
};
use tempfile::tempdir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

/// Starts a PxWeb stand-in that answers every table of the analysis.
async fn mock_pxweb() -> MockServer {
    let mock_server = MockServer::start().await;
    for (table_path, body) in TestDataBuilder::px_responses() {
        Mock::given(method("POST"))
            .and(path(format!("/{table_path}")))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    mock_server
}

fn mock_config(api_base_url: String) -> Config {
    Config {
        api_base_url,
        http_timeout_seconds: 5,
        ..Config::default()
    }
}

async fn fixture_sources(config: &Config) -> Sources {
    let client = create_http_client_with_timeout(config.http_timeout_seconds).unwrap();
    Sources {
        px: fetch_all(&client, config).await.unwrap(),
        oecd_gdp: TestDataBuilder::oecd_gdp(),
        elderly_services_pct: TestDataBuilder::elderly_services_pct(),
        elderly_services_meur: TestDataBuilder::elderly_services_meur(),
        total_expenditure: TestDataBuilder::total_expenditure(),
        home_care: TestDataBuilder::home_care(),
        regions: parse_regions(&TestDataBuilder::regions_geojson(), "Maakunta").unwrap(),
    }
}

/// Full run from PxWeb answers to charts and statistics
#[tokio::test]
async fn test_full_analysis_writes_charts_and_runs_statistics() {
    let mock_server = mock_pxweb().await;
    let config = mock_config(mock_server.uri());
    let sources = fixture_sources(&config).await;

    let out_dir = tempdir().unwrap();
    let report = analyse(&sources, Some(out_dir.path())).unwrap();

    // Every chart is an SVG inside the output directory
    assert!(!report.charts.is_empty());
    for chart in &report.charts {
        assert!(chart.starts_with(out_dir.path()));
        assert_eq!(chart.extension().and_then(|e| e.to_str()), Some("svg"));
        let content = std::fs::read_to_string(chart).unwrap();
        assert!(content.contains("<svg"), "{} is not an SVG", chart.display());
    }

    // Animated charts write one file per year
    let map_frames = report
        .charts
        .iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("yli-65-vuotiaiden-osuus-vaestosta-maakunnittain-"))
        })
        .count();
    assert_eq!(map_frames, 24);

    // The self-care test of the narrative
    let test = &report.self_care_test;
    assert_eq!(test.u, 36.0);
    assert_eq!(test.method, UTestMethod::Asymptotic);
    assert!((test.p_value - 0.0050).abs() < 5e-4, "p = {}", test.p_value);
    assert_eq!(report.decision, Decision::RejectNull);

    // Linear fixtures correlate perfectly
    assert_eq!(
        report
            .home_care_correlation
            .get("65-vuotta täyttäneiden osuus", "Kotihoidon asiakasmäärät"),
        Some(1.0)
    );
    assert_eq!(report.home_services_correlation.columns.len(), 3);
    assert_eq!(report.summaries.len(), 4);
    assert_eq!(report.summaries[0].count, 10);
    assert_eq!(report.summaries[2].count, 23);
}

/// Statistics only, nothing is written
#[tokio::test]
async fn test_analysis_without_charts() {
    let mock_server = mock_pxweb().await;
    let config = mock_config(mock_server.uri());
    let mut sources = fixture_sources(&config).await;
    sources.regions.clear();

    let report = analyse(&sources, None).unwrap();
    assert!(report.charts.is_empty());
    assert_eq!(report.self_care_test.u, 36.0);
    assert_eq!(report.summaries[2].count, 23);
}

/// The fixture samples alone reproduce the documented result
#[test]
fn test_fixture_samples_match_documented_result() {
    let result = hoiva_analyysi::mann_whitney_u(
        &SELF_CARE_NO_DIFFICULTY,
        &SELF_CARE_SOME_DIFFICULTY,
    )
    .unwrap();
    assert_eq!(result.u, 36.0);
    assert!(result.p_value < 0.05);
}

/// A missing table stops the run before any chart is drawn
#[tokio::test]
async fn test_run_fails_on_missing_table() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}", tables::LIFE_SATISFACTION)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let out_dir = tempdir().unwrap();
    let config = Config {
        output_dir: out_dir.path().join("kaaviot").to_string_lossy().to_string(),
        ..mock_config(mock_server.uri())
    };

    let result = run_analysis(&config, RunOptions::default()).await;
    assert!(matches!(result, Err(AppError::ApiNotFound { .. })));
    assert!(!out_dir.path().join("kaaviot").exists());
}

/// Every table is fetched but the workbooks are missing from the data directory
#[tokio::test]
async fn test_run_fails_without_workbooks() {
    let mock_server = mock_pxweb().await;
    let data_dir = tempdir().unwrap();
    let config = Config {
        data_dir: data_dir.path().to_string_lossy().to_string(),
        ..mock_config(mock_server.uri())
    };

    let result = run_analysis(
        &config,
        RunOptions {
            render_charts: false,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Spreadsheet(_))));
}

/// Region boundaries are read before the workbooks when charts are drawn
#[tokio::test]
async fn test_run_fails_without_region_file() {
    let mock_server = mock_pxweb().await;
    let data_dir = tempdir().unwrap();
    let config = Config {
        data_dir: data_dir.path().to_string_lossy().to_string(),
        ..mock_config(mock_server.uri())
    };

    let result = run_analysis(&config, RunOptions::default()).await;
    assert!(matches!(result, Err(AppError::Io(_))));
}

/// Fixture regions and fixture data use the same names
#[test]
fn test_fixture_regions() {
    let regions = parse_regions(&TestDataBuilder::regions_geojson(), "Maakunta").unwrap();
    let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, REGIONS);
}
