use clap::Parser;
use hoiva_analyysi::cli::{Args, is_config_operation, validate_args};
use hoiva_analyysi::commands::{
    handle_analysis_command, handle_config_update_command, handle_list_config_command,
};
use hoiva_analyysi::logging::setup_logging;
use hoiva_analyysi::{AppError, Config};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    validate_args(&args)?;

    // Config commands work on the file itself and need no logging
    if is_config_operation(&args) {
        if args.list_config {
            return handle_list_config_command().await;
        }
        return handle_config_update_command(&args).await;
    }

    let config = Config::load().await?;

    // The guard must be kept alive for the duration of the program
    let (log_file_path, _guard) = setup_logging(&args, &config).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    if let Err(e) = handle_analysis_command(&args, config).await {
        tracing::error!("Analysis failed: {e}");
        eprintln!("Analyysi epäonnistui: {e}");
        eprintln!("Lokitiedosto: {log_file_path}");
        return Err(e);
    }

    Ok(())
}
