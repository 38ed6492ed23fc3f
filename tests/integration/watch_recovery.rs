//! The game deletes and recreates SavedVariables; the agent must follow.

use crate::helpers::{fast_config, fresh_with, roster_json, wait_for_status, write_saved_variables};
use missionminder::{Agent, WatchStatus};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn follows_file_recreation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let mut config = fast_config(dir.path());
    config.watch.retry_interval_ms = 200;
    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&config, sink).unwrap();
    let mut status = agent.watcher().status_receiver();
    wait_for_status(&mut status, |s| *s == WatchStatus::Watching).await;
    fresh_with(&mut rx, &["Alpha-Realm"]).await;

    std::fs::remove_file(&path).unwrap();
    wait_for_status(&mut status, |s| matches!(s, WatchStatus::Retrying { .. })).await;
    // The last good snapshot survives the gap.
    assert_eq!(agent.reader().current().character_keys(), vec!["Alpha-Realm"]);

    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm", "Beta-Realm"]));
    fresh_with(&mut rx, &["Alpha-Realm", "Beta-Realm"]).await;
    assert_eq!(agent.watch_status(), WatchStatus::Watching);

    agent.shutdown().await.unwrap();
}

#[tokio::test]
async fn gives_up_but_keeps_serving() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let mut config = fast_config(dir.path());
    config.watch.retry_interval_ms = 10;
    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&config, sink).unwrap();
    let mut status = agent.watcher().status_receiver();
    fresh_with(&mut rx, &["Alpha-Realm"]).await;

    std::fs::remove_file(&path).unwrap();
    wait_for_status(&mut status, |s| *s == WatchStatus::Dead).await;
    assert_eq!(agent.reader().current().character_keys(), vec!["Alpha-Realm"]);

    // With the watch dead, a forced reload still reaches the pipeline.
    write_saved_variables(dir.path(), &roster_json(&["Gamma-Realm"]));
    assert!(agent.force_trigger());
    fresh_with(&mut rx, &["Gamma-Realm"]).await;

    tokio::time::timeout(Duration::from_secs(5), agent.shutdown())
        .await
        .expect("shutdown in time")
        .unwrap();
}

#[tokio::test]
async fn starts_before_file_exists() {
    let dir = tempfile::tempdir().unwrap();

    let mut config = fast_config(dir.path());
    config.watch.retry_interval_ms = 300;
    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&config, sink).unwrap();
    let mut status = agent.watcher().status_receiver();
    assert!(agent.reader().current().is_empty());

    wait_for_status(&mut status, |s| matches!(s, WatchStatus::Retrying { .. })).await;
    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));
    fresh_with(&mut rx, &["Alpha-Realm"]).await;

    agent.shutdown().await.unwrap();
}
