mod config;

use chameleon::group_trending_hashtag::GroupTrendingHashtagService;
use chameleon::http_source::HttpConfigSource;
use chameleon::request::CurrentRequest;
use chameleon::sensor::{CounterSensor, MetricsCounterSensor};
use chameleon::source::{ConfigSource, ConfigSourceError};
use chameleon::types::MemberUrn;
use clap::{Args, Parser};
use config::{Config, ConfigError, LoggingConfig, MetricsConfig};
use launchpad::api::CardApiError;
use launchpad::formatter::GroupHashtagPromptCardFormatter;
use launchpad::localization::StaticLocalizationService;
use metrics_exporter_statsd::{StatsdBuilder, StatsdError};
use shared::metrics_defs::describe_all;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
enum CliCommand {
    /// Serve the launchpad card API.
    Run(RunArgs),
    /// Resolve a group's trending hashtag cards once and print them as JSON.
    Fetch(FetchArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    config: PathBuf,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(long)]
    config: PathBuf,
    #[arg(long)]
    group_id: i64,
    #[arg(long)]
    member_id: i64,
    /// Accept-Language value to resolve localized content with.
    #[arg(long)]
    locale: Option<String>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not create config source: {0}")]
    ConfigSource(#[from] ConfigSourceError),
    #[error("could not create statsd recorder: {0}")]
    Statsd(#[from] StatsdError),
    #[error("could not install metrics recorder: {0}")]
    MetricsRecorder(String),
    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Api(#[from] CardApiError),
    #[error("could not print configs: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Run(args) => run(args),
        CliCommand::Fetch(args) => fetch(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "launchpad-dash failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let config = Config::from_file(&args.config)?;
    let _sentry = init_logging(config.common.logging.as_ref());
    if let Some(metrics) = &config.common.metrics {
        init_metrics(metrics)?;
    }

    // The blocking client is created and finally dropped outside the runtime.
    let source: Arc<dyn ConfigSource> =
        Arc::new(HttpConfigSource::new(&config.chameleon.config_source)?);
    let service = GroupTrendingHashtagService::new(source.clone(), counter_sensor());
    let localization = Arc::new(StaticLocalizationService::new(
        config.launchpad.translations.clone(),
    ));
    let formatter = Arc::new(GroupHashtagPromptCardFormatter::new(
        service,
        localization,
        &config.launchpad,
    ));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    tracing::info!("Starting launchpad-dash");
    let served = rt.block_on(launchpad::api::serve(
        config.launchpad.listener.clone(),
        formatter,
    ));
    drop(rt);
    drop(source);

    served?;
    Ok(())
}

fn fetch(args: FetchArgs) -> Result<(), CliError> {
    let config = Config::from_file(&args.config)?;
    let _sentry = init_logging(config.common.logging.as_ref());

    let source = Arc::new(HttpConfigSource::new(&config.chameleon.config_source)?);
    let service = GroupTrendingHashtagService::new(source, counter_sensor());

    let mut request = CurrentRequest::new(MemberUrn::new(args.member_id));
    if let Some(locale) = args.locale {
        request = request.with_accept_language(locale);
    }

    let configs = service.fetch_group_trending_hashtags(&request, args.group_id);
    println!("{}", serde_json::to_string_pretty(&configs)?);
    Ok(())
}

fn counter_sensor() -> Arc<dyn CounterSensor> {
    Arc::new(MetricsCounterSensor)
}

fn init_logging(logging: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            logging
                .and_then(|l| l.filter.as_deref())
                .unwrap_or(DEFAULT_LOG_FILTER),
        )
    });

    let sentry = logging
        .and_then(|l| l.sentry_dsn.as_deref())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    sentry
}

fn init_metrics(metrics: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(metrics.statsd_host.clone(), metrics.statsd_port)
        .build(Some(&metrics.prefix))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::MetricsRecorder(e.to_string()))?;

    describe_all(chameleon::metrics_defs::ALL_METRICS);
    describe_all(launchpad::metrics_defs::ALL_METRICS);
    tracing::info!(
        host = %metrics.statsd_host,
        port = metrics.statsd_port,
        "Reporting metrics to statsd"
    );
    Ok(())
}
