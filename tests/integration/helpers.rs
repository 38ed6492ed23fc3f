//! Shared helpers for integration tests.

use base64::Engine;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use missionminder::{AgentConfig, Recompute, TriggerReason, WatchStatus};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub(crate) const FILE_NAME: &str = "MissionMinder.lua";

/// Epoch seconds far enough out that missions stay pending during a test.
pub(crate) const FAR_FUTURE: i64 = 4_000_000_000;

/// zlib + base64, as the addon encodes its export.
pub(crate) fn encode_export(json: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).expect("compress");
    let compressed = encoder.finish().expect("finish");
    base64::engine::general_purpose::STANDARD.encode(compressed)
}

pub(crate) fn saved_variables_file(json: &str) -> String {
    format!(
        "\nMissionMinderDB = {{\n\t[\"export\"] = \"{}\",\n\t[\"version\"] = 3,\n}}\n",
        encode_export(json)
    )
}

/// Write an export for `json` into `dir`, returning the file path.
pub(crate) fn write_saved_variables(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join(FILE_NAME);
    std::fs::write(&path, saved_variables_file(json)).expect("write saved variables");
    path
}

/// Minimal export with one character per key.
pub(crate) fn roster_json(keys: &[&str]) -> String {
    let characters: serde_json::Map<String, serde_json::Value> = keys
        .iter()
        .map(|key| {
            let (name, realm) = key.split_once('-').unwrap_or((*key, ""));
            (
                (*key).to_owned(),
                serde_json::json!({ "Name": name, "Realm": realm }),
            )
        })
        .collect();
    serde_json::json!({ "Characters": characters }).to_string()
}

/// Agent config pointed at `dir` with fast polling.
pub(crate) fn fast_config(dir: &Path) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.addon.saved_variables_dir = dir.to_path_buf();
    config.watch.poll_interval_ms = 10;
    config.watch.retry_interval_ms = 50;
    config
}

/// Next trigger, failing the test after five seconds.
pub(crate) async fn next_trigger(rx: &mut mpsc::UnboundedReceiver<Recompute>) -> Recompute {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("trigger in time")
        .expect("scheduler alive")
}

/// Skip periodic triggers until fresh data whose roster is `keys`.
pub(crate) async fn fresh_with(
    rx: &mut mpsc::UnboundedReceiver<Recompute>,
    keys: &[&str],
) -> Recompute {
    loop {
        let trigger = next_trigger(rx).await;
        if trigger.reason == TriggerReason::FreshData && trigger.snapshot.character_keys() == keys
        {
            return trigger;
        }
    }
}

pub(crate) async fn wait_for_status(
    rx: &mut watch::Receiver<WatchStatus>,
    pred: impl FnMut(&WatchStatus) -> bool,
) -> WatchStatus {
    *tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("status in time")
        .expect("watcher alive")
}
