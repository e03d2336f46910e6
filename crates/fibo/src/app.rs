//! Application entry point and dispatch.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use fibo_cli::presenter::{CliPresenter, OutputMode};
use fibo_cli::ui::{is_color_disabled, BatchProgress};
use fibo_core::observers::CompositeObserver;
use fibo_core::{
    parse_ordinal, ComputeObserver, FiboError, Generator, LoggingObserver, Memoizer, MemoryCache,
    Number, NullCache, StatsObserver,
};
use fibo_store::JournalCache;
use fibo_workers::GeneratorPool;

use crate::config::{AppConfig, CacheKind, Command};

/// Cache, observers and output shared by every command.
struct Session {
    cache: Arc<dyn Memoizer>,
    stats: Arc<StatsObserver>,
    observer: Arc<dyn ComputeObserver>,
    presenter: CliPresenter,
}

impl Session {
    fn open(config: &AppConfig) -> Result<Self> {
        let cache = open_cache(config)?;
        let stats = Arc::new(StatsObserver::new());
        let observers: Vec<Arc<dyn ComputeObserver>> =
            vec![stats.clone(), Arc::new(LoggingObserver::new())];
        let observer: Arc<dyn ComputeObserver> = Arc::new(CompositeObserver::new(observers));
        let mode = OutputMode::from_flags(config.json, config.quiet);
        Ok(Self {
            cache,
            stats,
            observer,
            presenter: CliPresenter::new(mode, !is_color_disabled()),
        })
    }

    fn generator(&self) -> Generator {
        Generator::with_observer(self.cache.clone(), self.observer.clone())
    }
}

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    if let Command::Completion { shell } = &config.command {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        fibo_cli::completion::generate_completion(&mut cmd, *shell, &mut io::stdout());
        return Ok(());
    }

    let session = Session::open(config)?;
    let started = Instant::now();
    let mut out = io::stdout().lock();

    match &config.command {
        Command::Calculate { ordinal } => {
            let n = parse_ordinal(ordinal)?;
            let value = session.generator().compute(n);
            session.presenter.value(&mut out, &value)?;
        }
        Command::Count { max, min } => {
            let high: Number = max.parse().map_err(FiboError::from)?;
            let low: Number = min.parse().map_err(FiboError::from)?;
            let count = session.generator().find_ordinals_in_range(&low, &high)?;
            session.presenter.count(&mut out, count)?;
        }
        Command::Clear => {
            session.generator().clear_cache()?;
            session.presenter.cleared(&mut out)?;
        }
        Command::Batch {
            start,
            end,
            workers,
        } => run_batch(&session, &mut out, start, end, *workers)?,
        Command::Completion { .. } => {}
    }
    out.flush()?;

    if config.stats {
        let snapshot = session.stats.snapshot();
        session
            .presenter
            .stats(&mut io::stderr().lock(), &snapshot, started.elapsed())?;
    }
    Ok(())
}

fn run_batch(
    session: &Session,
    out: &mut dyn Write,
    start: &str,
    end: &str,
    workers: usize,
) -> Result<()> {
    let start = parse_ordinal(start)?;
    let end = parse_ordinal(end)?;
    if start > end {
        return Err(FiboError::InvalidArgument(format!(
            "batch start {start} is greater than end {end}"
        ))
        .into());
    }

    let ordinals: Vec<u64> = (start..=end).collect();
    let total = ordinals.len() as u64;
    let progress = if session.presenter.mode() == OutputMode::Text {
        BatchProgress::new(total)
    } else {
        BatchProgress::hidden(total)
    };

    let mut pool =
        GeneratorPool::with_observer(session.cache.clone(), session.observer.clone(), workers)?;
    pool.start()?;
    let mut results = pool.compute_all_with(&ordinals, |c| progress.completed(c.ordinal))?;
    pool.close()?;
    progress.finish();

    debug!(start, end, workers, "Batch complete");
    session.presenter.batch(out, &mut results)?;
    Ok(())
}

fn open_cache(config: &AppConfig) -> Result<Arc<dyn Memoizer>> {
    let cache: Arc<dyn Memoizer> = match config.cache {
        CacheKind::Memory => Arc::new(MemoryCache::new()),
        CacheKind::None => Arc::new(NullCache::new()),
        CacheKind::Journal => Arc::new(
            JournalCache::open(&config.cache_path).with_context(|| {
                format!("failed to open cache journal {}", config.cache_path.display())
            })?,
        ),
    };
    debug!(cache = cache.name(), "Cache ready");
    Ok(cache)
}
