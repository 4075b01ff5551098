use std::time::Duration;

use scout_engine::{poll_until, PollOutcome, PollSettings};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn settings(max_attempts: u32) -> PollSettings {
    PollSettings {
        interval: Duration::from_secs(1),
        max_attempts,
    }
}

#[tokio::test(start_paused = true)]
async fn first_check_runs_immediately_then_once_per_interval() {
    let cancel = CancellationToken::new();
    let started = Instant::now();
    let mut seen = Vec::new();

    let outcome = poll_until(settings(10), &cancel, |attempt| {
        seen.push(attempt);
        async move { (attempt == 3).then_some("link") }
    })
    .await;

    assert_eq!(
        outcome,
        PollOutcome::Found {
            value: "link",
            attempts: 3
        }
    );
    assert_eq!(seen, vec![1, 2, 3]);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_attempt_budget() {
    let cancel = CancellationToken::new();
    let mut calls = 0;

    let outcome: PollOutcome<()> = poll_until(settings(5), &cancel, |_| {
        calls += 1;
        async { None }
    })
    .await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 5 });
    assert_eq!(calls, 5);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_never_checks() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut calls = 0;

    let outcome: PollOutcome<()> = poll_until(settings(5), &cancel, |_| {
        calls += 1;
        async { None }
    })
    .await;

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(calls, 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_a_running_poll() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });
    let mut calls = 0;

    let outcome: PollOutcome<()> = poll_until(settings(120), &cancel, |_| {
        calls += 1;
        async { None }
    })
    .await;

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(calls, 3);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_tolerated() {
    let cancel = CancellationToken::new();
    let poll = PollSettings {
        interval: Duration::ZERO,
        max_attempts: 3,
    };

    let outcome: PollOutcome<()> = poll_until(poll, &cancel, |_| async { None }).await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 3 });
}
