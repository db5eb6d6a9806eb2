use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address};
use rstest::fixture;
use tempfile::TempDir;

use crate::metadata::MetadataLayout;
use crate::retry::RetryPolicy;
use crate::types::params::{PublishParams, OUTPUTS_DIR};

pub const WORKFLOW_DID: &str = "did:nv:0c7f2b5fc2b35d3b1b4ff2a5d29d19e1b6a1f1e9d1a4a9f4be8fbbc1d8e1c2a3";
pub const ASSET_DID: &str = "did:nv:9a1c5e0b7f3d2a6e4c8b1d0f5e7a3c9b2d4f6e8a0c1b3d5f7e9a2c4b6d8f0e1a";
pub const WORKFLOW_OWNER: Address = address!("00000000000000000000000000000000000000a1");
pub const PUBLISHER: Address = address!("00000000000000000000000000000000000000b2");
pub const STORAGE_REGION: &str = "eu-central-1";

/// Ordered record of the calls made to the mocked collaborators.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn write_file(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; len]).unwrap();
}

/// A workflow volume whose `outputs` directory holds `a.txt` (10 bytes) and `b.png` (2048 bytes).
#[fixture]
pub fn workflow_volume() -> TempDir {
    let volume = tempfile::tempdir().unwrap();
    write_file(&volume.path().join(OUTPUTS_DIR).join("a.txt"), 10);
    write_file(&volume.path().join(OUTPUTS_DIR).join("b.png"), 2048);
    volume
}

pub fn publish_params(volume: &Path) -> PublishParams {
    PublishParams {
        workflow_did: WORKFLOW_DID.to_string(),
        outputs_path: volume.join(OUTPUTS_DIR),
        execution_id: Some("exec-42".to_string()),
        bucket_region: STORAGE_REGION.to_string(),
        presign_expiry: Duration::from_secs(3600),
        public_read: true,
        record_provenance: true,
        transfer_ownership: true,
        rename_files: false,
        metadata_layout: MetadataLayout::Envelope,
        retry_policy: RetryPolicy::default(),
    }
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
