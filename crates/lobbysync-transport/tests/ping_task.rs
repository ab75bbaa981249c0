//! Integration tests for the keepalive timer.
//!
//! Time is paused, so the runtime jumps straight to the next timer
//! whenever every task is idle.

use std::time::Duration;

use lobbysync_transport::PingTask;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_ping_task_sends_after_each_interval() {
    let (tx, mut rx) = mpsc::channel(8);
    let start = Instant::now();
    let _task = PingTask::spawn(tx, "ping", Duration::from_secs(5));

    for n in 1..=3u32 {
        assert_eq!(rx.recv().await.as_deref(), Some("ping"));
        assert_eq!(start.elapsed(), Duration::from_secs(5) * n);
    }
}

#[tokio::test(start_paused = true)]
async fn test_ping_task_first_ping_waits_one_interval() {
    let (tx, mut rx) = mpsc::channel(8);
    let _task = PingTask::spawn(tx, "ping", Duration::from_secs(5));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_ping_task_drop_stops_pings() {
    let (tx, mut rx) = mpsc::channel(8);
    let task = PingTask::spawn(tx, "ping", Duration::from_secs(1));
    assert_eq!(rx.recv().await.as_deref(), Some("ping"));

    drop(task);

    // The aborted task drops the only sender.
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_ping_task_finishes_when_receiver_dropped() {
    let (tx, rx) = mpsc::channel(8);
    let task = PingTask::spawn(tx, "ping", Duration::from_secs(1));
    drop(rx);

    tokio::time::sleep(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;
    assert!(task.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_ping_task_zero_interval_is_clamped() {
    let (tx, mut rx) = mpsc::channel(8);
    let task = PingTask::spawn(tx, "keepalive", Duration::ZERO);
    assert_eq!(task.interval(), Duration::from_millis(1));
    assert_eq!(rx.recv().await.as_deref(), Some("keepalive"));
}
