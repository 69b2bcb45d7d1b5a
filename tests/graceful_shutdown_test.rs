//! Shutdown ordering and the final flush.

use daq_sampler::config::SamplerConfig;
use daq_sampler::data::ChannelId;
use daq_sampler::hardware::mock::{Emission, MemorySink, SequenceSource};
use daq_sampler::Pipeline;
use std::time::Duration;

/// Drain period far longer than the test run, so nothing is drained before shutdown.
fn slow_drain_config(flush_on_shutdown: bool) -> SamplerConfig {
    let mut config = SamplerConfig::default();
    config.acquisition.channels = vec![ChannelId(0), ChannelId(1)];
    config.drain.period = Duration::from_millis(500);
    config.drain.batch = 100;
    config.drain.flush_on_shutdown = flush_on_shutdown;
    config
}

#[tokio::test(start_paused = true)]
async fn test_final_flush_emits_every_stored_row() {
    let sink = MemorySink::new();
    let handle = Pipeline::<_, _, 2>::new(
        slow_drain_config(true),
        SequenceSource::new(2),
        sink.clone(),
    )
    .unwrap()
    .spawn()
    .unwrap();

    tokio::time::sleep(Duration::from_millis(52)).await;
    assert_eq!(handle.buffered(), Some(10));
    let snapshot = handle.shutdown().await.unwrap();

    assert_eq!(snapshot.drain_ticks, 0);
    assert_eq!(sink.rows().len(), 10);
    assert_eq!(sink.rows()[0], vec![0, 1]);
    assert!(!sink.emissions().contains(&Emission::Empty));
    assert_eq!(snapshot.rows_emitted, snapshot.rows_stored);
}

#[tokio::test(start_paused = true)]
async fn test_without_final_flush_rows_stay_buffered() {
    let sink = MemorySink::new();
    let handle = Pipeline::<_, _, 2>::new(
        slow_drain_config(false),
        SequenceSource::new(2),
        sink.clone(),
    )
    .unwrap()
    .spawn()
    .unwrap();

    tokio::time::sleep(Duration::from_millis(52)).await;
    let snapshot = handle.shutdown().await.unwrap();

    assert!(sink.emissions().is_empty());
    assert_eq!(snapshot.rows_emitted, 0);
    assert_eq!(snapshot.rows_stored, 10);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_tick() {
    let sink = MemorySink::new();
    let handle = Pipeline::<_, _, 2>::new(
        slow_drain_config(true),
        SequenceSource::new(2),
        sink.clone(),
    )
    .unwrap()
    .spawn()
    .unwrap();

    let snapshot = handle.shutdown().await.unwrap();
    assert_eq!(snapshot.sample_ticks, 0);
    assert_eq!(snapshot.rows_acquired, 0);
    assert!(sink.emissions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_handle_stops_tasks() {
    let sink = MemorySink::new();
    let handle = Pipeline::<_, _, 2>::new(
        slow_drain_config(true),
        SequenceSource::new(2),
        sink.clone(),
    )
    .unwrap()
    .spawn()
    .unwrap();
    let diagnostics = handle.diagnostics().clone();

    tokio::time::sleep(Duration::from_millis(21)).await;
    drop(handle);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let ticks = diagnostics.snapshot().sample_ticks;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(diagnostics.snapshot().sample_ticks, ticks);
    assert_eq!(sink.rows().len(), 4);
}
