use std::env;
use std::process::ExitCode;

use clap::Parser;

use epgstation_cleaner::config::{
    format_duration, read_env, CleanerConfig, LogFormat, LogLevel, ACCEPT_INVALID_CERTS_ENV_VAR,
    BASE_URL_ENV_VAR, DRY_RUN_ENV_VAR, LOG_FORMAT_ENV_VAR, LOG_LEVEL_ENV_VAR,
    RETAIN_DURATION_ENV_VAR,
};
use epgstation_cleaner::logging::init_logging;
use epgstation_cleaner::{EpgStationClient, Sweeper};

/// Delete raw TS files of old, already-encoded EPGStation recordings.
///
/// Every option can also be given through its environment variable; flags win.
#[derive(Parser, Debug)]
#[command(name = "epgstation-cleaner", version, about)]
struct Cli {
    /// EPGStation base URL [env: EPGSTATION_BASE_URL] [default: http://localhost:8888]
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Retention threshold as hours (336) or a duration (336h, 1h30m) [env: RETAIN_DURATION]
    #[arg(long, value_name = "DURATION")]
    retain: Option<String>,

    /// Log intended deletions without performing them [env: IS_DRY_RUN]
    #[arg(long)]
    dry_run: bool,

    /// ERROR, WARN, INFO or DEBUG [env: LOG_LEVEL]
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// json, compact or pretty [env: LOG_FORMAT]
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<String>,

    /// Verify the server's TLS certificate [env: ACCEPT_INVALID_CERTS=false]
    #[arg(long)]
    strict_tls: bool,
}

impl Cli {
    /// Value a flag supplies for a configuration key, if any.
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            BASE_URL_ENV_VAR => self.base_url.clone(),
            RETAIN_DURATION_ENV_VAR => self.retain.clone(),
            DRY_RUN_ENV_VAR => self.dry_run.then(|| "true".to_string()),
            LOG_LEVEL_ENV_VAR => self.log_level.clone(),
            LOG_FORMAT_ENV_VAR => self.log_format.clone(),
            ACCEPT_INVALID_CERTS_ENV_VAR => self.strict_tls.then(|| "false".to_string()),
            _ => None,
        }
    }
}

fn install_logging(level: LogLevel, format: LogFormat, rust_log: Option<&str>) {
    if let Err(e) = init_logging(level, format, rust_log) {
        eprintln!("Warning: Failed to install logger: {}", e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let rust_log = env::var("RUST_LOG").ok();

    let config = match CleanerConfig::try_from_lookup(|key| match cli.lookup(key) {
        Some(value) => Ok(Some(value)),
        None => read_env(key),
    }) {
        Ok(config) => config,
        Err(e) => {
            install_logging(LogLevel::default(), LogFormat::default(), rust_log.as_deref());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    install_logging(config.log_level, config.log_format, rust_log.as_deref());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.base_url,
        log_level = %config.log_level,
        "Starting"
    );

    if config.dry_run {
        tracing::info!("Dry run mode is enabled. Delete operation is not executed");
    }
    if config.accept_invalid_certs {
        tracing::debug!("TLS certificate verification is disabled");
    }

    let retain = format_duration(config.retain_duration);
    tracing::info!(retain = %retain, "Retain duration is {}", retain);

    let client = match EpgStationClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create EPGStation client");
            return ExitCode::FAILURE;
        }
    };

    match Sweeper::from_config(client, &config).run().await {
        Ok(report) => {
            if report.has_failures() {
                tracing::warn!(
                    fetched = report.recordings_fetched,
                    selected = report.recordings_selected,
                    deleted = report.files_deleted,
                    failed = report.files_failed,
                    "Cleanup finished with failed deletions"
                );
            } else {
                tracing::info!(
                    fetched = report.recordings_fetched,
                    selected = report.recordings_selected,
                    deleted = report.files_deleted,
                    dry_run_skipped = report.files_skipped_dry_run,
                    dry_run = config.dry_run,
                    "Cleanup finished"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error_kind = e.kind(), error = %e, "Failed to fetch recorded programs");
            ExitCode::FAILURE
        }
    }
}
