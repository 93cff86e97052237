use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

use crate::error::AppError;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Returns true when the arguments only manage the configuration and no
/// analysis should run.
pub fn is_config_operation(args: &Args) -> bool {
    args.new_api_url.is_some()
        || args.new_data_dir.is_some()
        || args.new_output_dir.is_some()
        || args.new_log_file_path.is_some()
        || args.clear_log_file_path
        || args.list_config
}

/// Rejects argument combinations that contradict each other.
pub fn validate_args(args: &Args) -> Result<(), AppError> {
    if args.new_log_file_path.is_some() && args.clear_log_file_path {
        return Err(AppError::config_error(
            "--set-log-file and --clear-log-file cannot be used together",
        ));
    }
    if args.no_charts && args.output_dir.is_some() {
        return Err(AppError::config_error(
            "--output-dir has no effect together with --no-charts",
        ));
    }
    Ok(())
}

/// Elderly care in Finland, in numbers
///
/// Fetches population, health survey and ICT usage tables from the
/// Statistics Finland PxWeb API, reads the THL expenditure and home care
/// workbooks, and writes the charts of the analysis as SVG files.
///
/// The run ends with the correlation tables, descriptive statistics and a
/// Mann-Whitney U test of self care ability between persons with no and with
/// some functional difficulty.
#[derive(Parser, Debug, Default)]
#[command(author = "Simo Ruotsalainen", version, about, long_about)]
#[command(styles = get_styles())]
pub struct Args {
    /// Directory of the bundled workbooks and the region GeoJSON for this run.
    #[arg(long = "data-dir", value_name = "DIR", help_heading = "Run Options")]
    pub data_dir: Option<String>,

    /// Directory the SVG charts are written to for this run.
    #[arg(long = "output-dir", value_name = "DIR", help_heading = "Run Options")]
    pub output_dir: Option<String>,

    /// Skip chart rendering and only print the statistics.
    #[arg(long = "no-charts", help_heading = "Run Options")]
    pub no_charts: bool,

    /// Update the PxWeb API root in config.
    #[arg(long = "set-api-url", value_name = "URL", help_heading = "Configuration")]
    pub new_api_url: Option<String>,

    /// Update the data directory in config.
    #[arg(long = "set-data-dir", value_name = "DIR", help_heading = "Configuration")]
    pub new_data_dir: Option<String>,

    /// Update the chart directory in config.
    #[arg(long = "set-output-dir", value_name = "DIR", help_heading = "Configuration")]
    pub new_output_dir: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", value_name = "PATH", help_heading = "Configuration")]
    pub new_log_file_path: Option<String>,

    /// Clear the custom log file path from config. This reverts to using the default log location.
    #[arg(long = "clear-log-file", help_heading = "Configuration")]
    pub clear_log_file_path: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Also print log events to the terminal, at debug level.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", value_name = "PATH", help_heading = "Debug")]
    pub log_file: Option<String>,
}
