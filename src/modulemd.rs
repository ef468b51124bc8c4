// src/modulemd.rs

//! modulemd document model
//!
//! Serde types for the two document kinds dnf consumes: one `modulemd`
//! (version 2) record per stream and a single trailing
//! `modulemd-defaults` (version 1) record. Field order in the YAML output
//! follows struct order; documents are joined with the `...`/`---`
//! separator pair `modifyrepo` expects.
//!
//! Schema reference: libmodulemd spec.v2.yaml.

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const DOCUMENT_SEPARATOR: &str = "...\n---\n";

/// One stream definition
#[derive(Debug, Serialize)]
pub struct ModuleDoc {
    pub document: String,
    pub version: u32,
    pub data: ModuleData,
}

impl ModuleDoc {
    pub fn new(data: ModuleData) -> Self {
        Self {
            document: "modulemd".to_string(),
            version: 2,
            data,
        }
    }
}

/// Payload of a stream definition
#[derive(Debug, Serialize)]
pub struct ModuleData {
    pub name: String,
    pub stream: String,
    /// Timestamp-derived, monotonically increasing between runs
    pub version: u64,
    /// Short content hash distinguishing rebuilds of the same stream
    pub context: String,
    pub arch: String,
    pub summary: String,
    pub description: String,
    pub license: License,
    pub profiles: BTreeMap<String, Profile>,
    pub artifacts: Artifacts,
}

#[derive(Debug, Serialize)]
pub struct License {
    pub module: Vec<String>,
}

/// Named installation profile: package names, not NEVRAs
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub description: String,
    pub rpms: Vec<String>,
}

/// Artifact list: full NEVRA identifiers
#[derive(Debug, Serialize)]
pub struct Artifacts {
    pub rpms: Vec<String>,
}

/// The trailing defaults record
#[derive(Debug, Serialize)]
pub struct DefaultsDoc {
    pub document: String,
    pub version: u32,
    pub data: DefaultsData,
}

impl DefaultsDoc {
    pub fn new(data: DefaultsData) -> Self {
        Self {
            document: "modulemd-defaults".to_string(),
            version: 1,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DefaultsData {
    pub module: String,
    pub stream: String,
    pub profiles: BTreeMap<String, Vec<String>>,
}

/// Render the full document sequence: every stream, then the defaults
pub fn render(modules: &[ModuleDoc], defaults: &DefaultsDoc) -> Result<String> {
    let mut docs = Vec::with_capacity(modules.len() + 1);
    for module in modules {
        docs.push(serde_yaml::to_string(module)?);
    }
    docs.push(serde_yaml::to_string(defaults)?);
    Ok(docs.join(DOCUMENT_SEPARATOR))
}

/// Short context hash over the stream's identity
///
/// SHA-256 of module name, stream, run timestamp and dist tag, truncated
/// to eight hex characters. Stable for a fixed timestamp.
pub fn stream_context(module: &str, stream: &str, version: u64, dist: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(module.as_bytes());
    hasher.update(stream.as_bytes());
    hasher.update(version.to_string().as_bytes());
    hasher.update(dist.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..4])
}
