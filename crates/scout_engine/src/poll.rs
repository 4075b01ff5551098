use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Found { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled,
}

/// Runs `check` once per tick until it yields a value, the attempt budget runs
/// out, or `cancel` fires. The first check runs immediately; `check` receives
/// the 1-based attempt number.
pub async fn poll_until<T, F, Fut>(
    settings: PollSettings,
    cancel: &CancellationToken,
    mut check: F,
) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    // tokio rejects a zero period
    let mut ticker = tokio::time::interval(settings.interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for attempt in 1..=settings.max_attempts {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = ticker.tick() => {}
        }
        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            found = check(attempt) => found,
        };
        if let Some(value) = found {
            return PollOutcome::Found {
                value,
                attempts: attempt,
            };
        }
    }

    PollOutcome::Exhausted {
        attempts: settings.max_attempts,
    }
}
