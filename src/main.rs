/*!
 * Interval Ticker - Demo Entry Point
 *
 * Arms one interval timer, fans its ticks out to a pool of blocking waiter
 * threads, and cancels after a fixed run time or on Ctrl+C.
 *
 * Environment variables:
 * - TICKER_BACKEND: signal | descriptor | auto (default: auto)
 * - TICKER_PERIOD_MS: tick period (default: 100)
 * - TICKER_WAITERS: number of waiter threads (default: 4)
 * - TICKER_RUN_MS: run time before cancelling (default: 2500)
 */

use anyhow::{anyhow, Context};
use interval_ticker::{init_tracing, Backend, IntervalTimer, TickSource, TickerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid {}='{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let backend: Backend = env_or("TICKER_BACKEND", Backend::Auto)?;
    let period = Duration::from_millis(env_or("TICKER_PERIOD_MS", 100u64)?);
    let waiters: usize = env_or("TICKER_WAITERS", 4)?;
    let run_for = Duration::from_millis(env_or("TICKER_RUN_MS", 2500u64)?);

    let config = TickerConfig {
        backend,
        ..Default::default()
    };
    let timer = Arc::new(IntervalTimer::initialized(config).context("timer init failed")?);
    info!(backend = timer.name(), waiters, ?period, ?run_for, "Interval ticker starting");

    let handles: Vec<_> = (0..waiters)
        .map(|id| {
            let timer = timer.clone();
            tokio::task::spawn_blocking(move || {
                let mut ticks = 0u64;
                while !timer.is_cancel_requested() {
                    match timer.wait_for_event() {
                        Ok(outcome) if outcome.is_consumed() => ticks += 1,
                        Ok(_) => {}
                        Err(e) => {
                            warn!(waiter = id, error = %e, "Waiter stopping on timer error");
                            break;
                        }
                    }
                }
                (id, ticks)
            })
        })
        .collect();

    timer.start(period).context("timer start failed")?;

    tokio::select! {
        _ = tokio::time::sleep(run_for) => info!("Run time elapsed"),
        result = tokio::signal::ctrl_c() => {
            result.context("ctrl-c handler failed")?;
            info!("Interrupted");
        }
    }

    timer.stop()?;
    timer.notify_cancel()?;

    let mut total = 0u64;
    for handle in handles {
        let (id, ticks) = handle.await.context("waiter panicked")?;
        info!(waiter = id, ticks, "Waiter finished");
        total += ticks;
    }

    let stats = timer.stats();
    info!(
        total,
        backlog = timer.pending_event_count(),
        stats = %serde_json::to_string(&stats)?,
        "Interval ticker finished"
    );
    Ok(())
}
