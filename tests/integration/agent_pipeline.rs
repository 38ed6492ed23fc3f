//! The running agent: file writes become fresh-data triggers, time becomes
//! periodic triggers.

use crate::helpers::{fast_config, fresh_with, next_trigger, roster_json, write_saved_variables};
use missionminder::{Agent, AgentConfig, Recompute, TriggerReason};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn rewrite_produces_fresh_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&fast_config(dir.path()), sink).unwrap();
    fresh_with(&mut rx, &["Alpha-Realm"]).await;

    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm", "Beta-Realm"]));
    let trigger = fresh_with(&mut rx, &["Alpha-Realm", "Beta-Realm"]).await;
    assert_eq!(trigger.snapshot.len(), 2);
    assert_eq!(agent.reader().current().len(), 2);

    agent.shutdown().await.unwrap();
}

#[tokio::test]
async fn periodic_trigger_reuses_current_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let mut config = fast_config(dir.path());
    config.refresh.interval_secs = 1;
    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&config, sink).unwrap();

    let fresh = fresh_with(&mut rx, &["Alpha-Realm"]).await;
    let periodic = next_trigger(&mut rx).await;
    assert_eq!(periodic.reason, TriggerReason::Periodic);
    assert!(Arc::ptr_eq(&fresh.snapshot, &periodic.snapshot));
    assert!(periodic.at.duration_since(fresh.at) >= Duration::from_secs(1));

    agent.shutdown().await.unwrap();
}

#[tokio::test]
async fn corrupt_rewrite_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&fast_config(dir.path()), sink).unwrap();
    fresh_with(&mut rx, &["Alpha-Realm"]).await;

    std::fs::write(&path, "MissionMinderDB = {\n\t[\"export\"] = \"!!not base64!!\",\n}\n")
        .unwrap();
    assert!(agent.force_trigger());
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(agent.reader().current().character_keys(), vec!["Alpha-Realm"]);
    while let Ok(trigger) = rx.try_recv() {
        assert_ne!(trigger.reason, TriggerReason::FreshData);
    }

    agent.shutdown().await.unwrap();
}

#[tokio::test]
async fn force_trigger_reloads_unchanged_file() {
    let dir = tempfile::tempdir().unwrap();
    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&fast_config(dir.path()), sink).unwrap();
    let first = fresh_with(&mut rx, &["Alpha-Realm"]).await;

    assert!(agent.force_trigger());
    let second = fresh_with(&mut rx, &["Alpha-Realm"]).await;
    // A reload always produces a new snapshot, even for identical bytes.
    assert!(!Arc::ptr_eq(&first.snapshot, &second.snapshot));

    agent.shutdown().await.unwrap();
}

#[tokio::test]
async fn config_file_drives_agent() {
    let dir = tempfile::tempdir().unwrap();
    write_saved_variables(dir.path(), &roster_json(&["Alpha-Realm"]));

    let config_path = dir.path().join("conf").join("config.toml");
    fast_config(dir.path()).save_to_file(&config_path).unwrap();
    let config = AgentConfig::from_file(&config_path).unwrap();

    let (sink, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::start(&config, sink).unwrap();
    fresh_with(&mut rx, &["Alpha-Realm"]).await;

    tokio::time::timeout(Duration::from_secs(5), agent.shutdown())
        .await
        .expect("shutdown in time")
        .unwrap();
}

#[tokio::test]
async fn external_cancel_stops_agent() {
    let dir = tempfile::tempdir().unwrap();
    let (sink, _rx) = mpsc::unbounded_channel::<Recompute>();
    let agent = Agent::start(&fast_config(dir.path()), sink).unwrap();

    let cancel = agent.cancel_token();
    let run = tokio::spawn(agent.run_until_cancelled());
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("agent stops in time")
        .unwrap();
    assert!(result.is_ok());
}
