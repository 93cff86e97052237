use crate::analysis::{Decision, UTestMethod};
use crate::app::{Report, RunOptions, run_analysis};
use crate::cli::Args;
use crate::config::Config;
use crate::error::AppError;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::SetTitle,
};
use std::io::stdout;
use tracing::info;

const TITLE: &str = "Hoiva-analyysi";
const FRAME: Color = Color::AnsiValue(231);
const ACCENT: Color = Color::AnsiValue(51);
const REJECT: Color = Color::AnsiValue(46);
const RETAIN: Color = Color::AnsiValue(226);

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    execute!(stdout(), SetTitle(TITLE))?;
    Config::display().await
}

/// Handles configuration update commands (--set-api-url, --set-data-dir,
/// --set-output-dir, --set-log-file, --clear-log-file).
///
/// Starts from the stored configuration, or the defaults when there is none,
/// and saves the result after validating it.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let config_path = Config::get_config_path();
    let mut config = if std::path::Path::new(&config_path).exists() {
        Config::load_from_path(&config_path).await?
    } else {
        Config::default()
    };

    apply_config_updates(&mut config, args);
    config.validate()?;
    config.save().await?;

    if args.clear_log_file_path {
        println!("Custom log file path cleared. Using default location.");
    }
    println!("Config updated successfully!");
    Ok(())
}

/// Copies the `--set-*` and `--clear-log-file` values into `config`.
pub fn apply_config_updates(config: &mut Config, args: &Args) {
    if let Some(url) = &args.new_api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = &args.new_data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.new_output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(new_log_path) = &args.new_log_file_path {
        config.log_file_path = Some(new_log_path.clone());
    } else if args.clear_log_file_path {
        config.log_file_path = None;
    }
}

/// Applies the per-run `--data-dir` and `--output-dir` overrides.
pub fn apply_run_overrides(config: &mut Config, args: &Args) {
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
}

/// Runs the analysis and prints the report.
pub async fn handle_analysis_command(args: &Args, mut config: Config) -> Result<Report, AppError> {
    apply_run_overrides(&mut config, args);
    execute!(stdout(), SetTitle(TITLE))?;

    let options = RunOptions {
        render_charts: !args.no_charts,
    };
    info!("Starting analysis with {config:?}");
    let report = run_analysis(&config, options).await?;
    print_report(&report);
    Ok(report)
}

/// Lines of the result box: heading, statistic, p-value, method and the
/// decision, the decision line colored by outcome.
pub fn result_box_lines(report: &Report) -> Vec<(String, Option<Color>)> {
    let test = &report.self_care_test;
    let method = match test.method {
        UTestMethod::Exact => "tarkka jakauma",
        UTestMethod::Asymptotic => "normaaliapproksimaatio",
    };
    let color = match report.decision {
        Decision::RejectNull => REJECT,
        Decision::RetainNull => RETAIN,
    };
    vec![
        ("Mann-Whitneyn U-testi, itsestä huolehtiminen".to_string(), None),
        (format!("U: {:.2}", test.u), Some(ACCENT)),
        (format!("p-arvo: {:.4}", test.p_value), Some(ACCENT)),
        (format!("Menetelmä: {method}"), None),
        (report.decision.to_string(), Some(color)),
    ]
}

/// Prints the correlation tables, summaries, written charts and the boxed
/// test result.
pub fn print_report(report: &Report) {
    if !report.charts.is_empty() {
        println!("\nKaaviot ({}):", report.charts.len());
        for path in &report.charts {
            println!("  {}", path.display());
        }
    }

    println!("\nKotihoidon asiakasmäärät ja 65-vuotta täyttäneet 2014-2023");
    println!("{}", report.home_care_correlation);
    println!("Kotipalvelut ja yli 65-vuotiaat 2000-2022");
    println!("{}", report.home_services_correlation);
    println!("Kotipalvelut ja yli 65-vuotiaat 2015-2022");
    println!("{}", report.home_services_correlation_since_2015);

    println!("Tunnusluvut");
    for summary in &report.summaries {
        println!("{summary}");
    }
    println!();

    print_status_box(&result_box_lines(report));
}

/// Prints lines inside a double-line box. A colored line of the form
/// `label: value` has only its value colored.
pub fn print_status_box(lines: &[(String, Option<Color>)]) {
    let max_content_width = lines
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0);
    let box_width = max_content_width + 4;
    let border = format!("╔{:═<width$}╗", "", width = box_width - 2);
    let sep = format!("╠{:═<width$}╣", "", width = box_width - 2);
    let bottom = format!("╚{:═<width$}╝", "", width = box_width - 2);

    execute!(stdout(), SetForegroundColor(FRAME), Print(format!("{border}\n"))).ok();
    for (i, (line, color)) in lines.iter().enumerate() {
        match color {
            Some(c) => {
                if let Some((pre, value)) = line.split_once(':') {
                    let pre = format!("║ {pre}:");
                    let value = value.trim_start();
                    let pad = max_content_width
                        .saturating_sub(pre.chars().count() - 2 + value.chars().count());
                    execute!(
                        stdout(),
                        SetForegroundColor(FRAME),
                        Print(pre),
                        SetForegroundColor(*c),
                        Print(value),
                        SetForegroundColor(FRAME),
                        Print(format!("{:pad$} ║\n", "", pad = pad)),
                    )
                    .ok();
                } else {
                    execute!(
                        stdout(),
                        SetForegroundColor(FRAME),
                        Print("║ "),
                        SetForegroundColor(*c),
                        Print(format!("{line:<max_content_width$}")),
                        SetForegroundColor(FRAME),
                        Print(" ║\n")
                    )
                    .ok();
                }
            }
            None => {
                execute!(
                    stdout(),
                    SetForegroundColor(FRAME),
                    Print(format!("║ {line:<max_content_width$} ║\n"))
                )
                .ok();
            }
        }
        if i == 0 && lines.len() > 2 {
            execute!(stdout(), Print(format!("{sep}\n"))).ok();
        }
    }
    execute!(stdout(), Print(format!("{bottom}\n")), ResetColor).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CorrelationMatrix, MannWhitney};

    fn report(decision: Decision) -> Report {
        let matrix = CorrelationMatrix {
            columns: vec!["a".to_string()],
            r: vec![vec![1.0]],
            r_squared: vec![vec![1.0]],
        };
        Report {
            charts: Vec::new(),
            home_care_correlation: matrix.clone(),
            home_services_correlation: matrix.clone(),
            home_services_correlation_since_2015: matrix,
            summaries: Vec::new(),
            self_care_test: MannWhitney {
                u: 36.0,
                p_value: 0.00499,
                method: UTestMethod::Asymptotic,
            },
            decision,
        }
    }

    #[test]
    fn test_apply_config_updates() {
        let args = Args {
            new_api_url: Some("http://localhost:8080/StatFin/".to_string()),
            new_output_dir: Some("ulos".to_string()),
            new_log_file_path: Some("/tmp/h.log".to_string()),
            ..Args::default()
        };
        let mut config = Config::default();
        apply_config_updates(&mut config, &args);
        assert_eq!(config.api_base_url, "http://localhost:8080/StatFin");
        assert_eq!(config.output_dir, "ulos");
        assert_eq!(config.data_dir, Config::default().data_dir);
        assert_eq!(config.log_file_path, Some("/tmp/h.log".to_string()));
    }

    #[test]
    fn test_clear_log_file() {
        let args = Args {
            clear_log_file_path: true,
            ..Args::default()
        };
        let mut config = Config {
            log_file_path: Some("/tmp/h.log".to_string()),
            ..Config::default()
        };
        apply_config_updates(&mut config, &args);
        assert_eq!(config.log_file_path, None);
    }

    #[test]
    fn test_run_overrides_do_not_touch_other_settings() {
        let args = Args {
            data_dir: Some("lahteet".to_string()),
            ..Args::default()
        };
        let mut config = Config::default();
        apply_run_overrides(&mut config, &args);
        assert_eq!(config.data_dir, "lahteet");
        assert_eq!(config.output_dir, Config::default().output_dir);
    }

    #[test]
    fn test_result_box_lines() {
        let lines = result_box_lines(&report(Decision::RejectNull));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].0, "U: 36.00");
        assert_eq!(lines[2].0, "p-arvo: 0.0050");
        assert_eq!(lines[3].0, "Menetelmä: normaaliapproksimaatio");
        assert_eq!(lines[4].1, Some(REJECT));

        let retained = result_box_lines(&report(Decision::RetainNull));
        assert_eq!(retained[4].1, Some(RETAIN));
    }

    #[test]
    fn test_print_report_does_not_panic() {
        print_report(&report(Decision::RetainNull));
        print_status_box(&[]);
    }
}
