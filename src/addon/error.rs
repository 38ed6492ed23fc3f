//! Error types for the SavedVariables load pipeline.
//!
//! Each stage of a load cycle has its own error so callers can tell an addon
//! that has not run yet ([`ExtractError::EmptyContents`]) apart from a file
//! that is corrupt. [`LoadError`] wraps all of them for one cycle.

use std::path::PathBuf;

/// Failure to locate the export payload in the raw file bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The file exists but has no contents yet.
    #[error("saved variables file is empty")]
    EmptyContents,

    /// The prefix or suffix marker is missing.
    #[error("export match not found")]
    NotFound,
}

/// Failure to base64-decode the export payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Zero-length payload or malformed base64.
    #[error("invalid base64 encoding: {reason}")]
    InvalidEncoding {
        /// What the decoder rejected.
        reason: String,
    },
}

/// Failure to inflate the decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecompressionError {
    /// Bad zlib header or corrupt DEFLATE stream.
    #[error("corrupt compressed stream: {reason}")]
    Corrupt {
        /// Underlying decompressor message.
        reason: String,
    },

    /// Inflated output exceeded the configured bound.
    #[error("decompressed payload exceeds {limit} bytes")]
    TooLarge {
        /// The configured bound in bytes.
        limit: usize,
    },
}

/// Top-level schema violation. Fatal to the current cycle.
#[derive(Debug, thiserror::Error)]
#[error("malformed addon data: {0}")]
pub struct ParseError(#[from] pub serde_json::Error);

/// A single reward entry could not be read.
///
/// Never fatal: the entry is logged and kept as [`Reward::Unknown`].
///
/// [`Reward::Unknown`]: crate::addon::Reward::Unknown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardParseError {
    /// No known field set was present.
    #[error("unrecognized reward shape")]
    UnknownShape,

    /// A known shape was detected but its fields did not deserialize.
    #[error("{shape} reward is malformed: {reason}")]
    Malformed {
        /// The detected shape (`currency`, `item`, `experience`).
        shape: &'static str,
        /// Deserializer message.
        reason: String,
    },
}

/// Any failure during one read → extract → decode → inflate → parse cycle.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Extraction stage failed.
    #[error("error extracting data: {0}")]
    Extract(#[from] ExtractError),

    /// Base64 stage failed.
    #[error("error decoding data: {0}")]
    Decode(#[from] DecodeError),

    /// Inflate stage failed.
    #[error("error decompressing data: {0}")]
    Decompression(#[from] DecompressionError),

    /// Parse stage failed.
    #[error("error loading addon data: {0}")]
    Parse(#[from] ParseError),
}

impl LoadError {
    /// `true` when the addon simply has not written an export yet.
    pub fn is_empty_contents(&self) -> bool {
        matches!(self, Self::Extract(ExtractError::EmptyContents))
    }
}
