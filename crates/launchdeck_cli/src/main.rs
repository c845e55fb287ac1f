//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire a launch repository to the fixture fetcher and print observed state.
//! - Exercise refresh and local delete end to end without a network.

use clap::Parser;
use launchdeck_core::{
    init_logging_from_config, ActorPublisher, CoreConfig, FixtureFetcher, Launch, PageRequest,
    RefreshOutcome, Repository, RepositoryOptions,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

const REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(
    name = "launchdeck",
    version,
    about = "Load launches from fixtures through the reactive repository"
)]
struct Args {
    /// Directory holding `<resource>.json` fixture documents.
    #[arg(long)]
    fixtures: Option<PathBuf>,
    /// Page size forwarded to the fetcher.
    #[arg(long)]
    limit: Option<u32>,
    /// Page offset forwarded to the fetcher.
    #[arg(long)]
    offset: Option<u32>,
    /// Launch id to remove locally after loading; repeatable.
    #[arg(long = "delete", value_name = "ID")]
    delete: Vec<String>,
    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("launchdeck: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = resolve_config(&args)?;
    init_logging_from_config(&config)?;

    let fixture_dir = config.fixture_dir.clone().unwrap_or_else(default_fixture_dir);
    info!(
        "event=cli_start module=cli status=start fixtures={} version={}",
        fixture_dir.display(),
        launchdeck_core::core_version()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("launchdeck-fetch")
        .enable_all()
        .build()
        .map_err(|err| format!("failed to start runtime: {err}"))?;
    let publisher = ActorPublisher::spawn("launchdeck-publish")
        .map_err(|err| format!("failed to start publisher: {err}"))?;

    let repo: Repository<Launch> = Repository::with_options(
        Arc::new(FixtureFetcher::<Launch>::new(fixture_dir)),
        runtime.handle().clone(),
        Arc::new(publisher),
        RepositoryOptions {
            eager_refresh: false,
            page: config.page,
            router: config.router(),
        },
    );

    let (idle_tx, idle_rx) = mpsc::channel();
    let busy_seen = AtomicBool::new(false);
    let _loading = repo.observe_loading().subscribe(move |loading| {
        println!("loading={loading}");
        if *loading {
            busy_seen.store(true, Ordering::SeqCst);
        } else if busy_seen.swap(false, Ordering::SeqCst) {
            let _ = idle_tx.send(());
        }
    });
    let _collection = repo.observe_collection().subscribe(|launches| {
        println!("collection count={}", launches.len());
    });

    repo.refresh();
    idle_rx
        .recv_timeout(REFRESH_TIMEOUT)
        .map_err(|_| "refresh did not settle in time".to_string())?;

    if let RefreshOutcome::Failed { reason } = repo.observe_last_refresh().get() {
        return Err(format!("could not load launches: {reason}"));
    }

    for id in &args.delete {
        repo.delete(id);
    }

    for launch in repo.collection().iter() {
        println!("{}", describe(launch));
    }
    info!("event=cli_done module=cli status=ok");
    Ok(())
}

/// Layers command-line flags over environment configuration.
fn resolve_config(args: &Args) -> Result<CoreConfig, String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(level) = &args.log_level {
        config = config.with_log_level(level).map_err(|err| err.to_string())?;
    }
    if let Some(dir) = &args.log_dir {
        config = config.with_log_dir(dir.clone()).map_err(|err| err.to_string())?;
    }
    if let Some(dir) = &args.fixtures {
        config.fixture_dir = Some(dir.clone());
    }
    config.page = PageRequest::new(
        args.limit.or(config.page.limit),
        args.offset.or(config.page.offset),
    );
    Ok(config)
}

fn default_fixture_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
}

fn describe(launch: &Launch) -> String {
    let status = match launch.success {
        Some(true) => "success",
        Some(false) => "failure",
        None => "upcoming",
    };
    format!(
        "#{:<4} {:<24} {} {:<8} {}",
        launch.flight_number, launch.name, launch.date_utc, status, launch.id
    )
}
