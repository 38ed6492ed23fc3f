//! Shared test utilities used across multiple test modules.

use base64::Engine;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Encode raw JSON the way the addon does: zlib, then standard base64.
pub fn encode_export(json: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(json.as_bytes())
        .expect("compress export");
    let compressed = encoder.finish().expect("finish compression");
    base64::engine::general_purpose::STANDARD.encode(compressed)
}

/// A complete SavedVariables file embedding `json` as its export.
pub fn saved_variables_file(json: &str) -> String {
    format!(
        "\nMissionMinderDB = {{\n\t[\"export\"] = \"{}\",\n\t[\"version\"] = 3,\n}}\n",
        encode_export(json)
    )
}
