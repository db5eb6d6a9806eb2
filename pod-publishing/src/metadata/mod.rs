use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collector::CollectedFile;

pub const AUTHOR: &str = "pod-publishing";
pub const LICENSE: &str = "No License Specified";
pub const PRICE: &str = "1";
pub const ASSET_TYPE: &str = "dataset";

/// How the workflow metadata is embedded in the published document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MetadataLayout {
    /// `{"workflow": <workflow metadata>, "executionId": <id or null>}`
    #[default]
    Envelope,
    /// The workflow metadata as is.
    Embedded,
}

/// A file that has been uploaded and can be downloaded through `url`.
///
/// Built from a [CollectedFile] by dropping its local path, so the path can never be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedFile {
    pub index: usize,
    pub name: String,
    pub content_type: Option<String>,
    pub content_length: u64,
    pub url: String,
}

impl PublishedFile {
    pub fn new(file: CollectedFile, url: String) -> Self {
        let CollectedFile { index, name, key: _, path: _, content_type, content_length } = file;
        Self { index, name, content_type, content_length, url }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub main: MainMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainMetadata {
    pub date_created: String,
    pub date_published: String,
    pub author: String,
    pub license: String,
    pub price: String,
    pub metadata: serde_json::Value,
    pub files: Vec<PublishedFile>,
    #[serde(rename = "type")]
    pub asset_type: String,
}

/// ISO-8601 in UTC with second precision, e.g. `2020-01-01T10:00:00Z`.
pub fn format_publish_date(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn build_metadata(
    workflow_metadata: &serde_json::Value,
    files: Vec<PublishedFile>,
    layout: MetadataLayout,
    execution_id: Option<&str>,
    now: DateTime<Utc>,
) -> AssetMetadata {
    let publishing_date = format_publish_date(now);
    let metadata = match layout {
        MetadataLayout::Envelope => serde_json::json!({
            "workflow": workflow_metadata,
            "executionId": execution_id,
        }),
        MetadataLayout::Embedded => workflow_metadata.clone(),
    };

    AssetMetadata {
        main: MainMetadata {
            date_created: publishing_date.clone(),
            date_published: publishing_date,
            author: AUTHOR.to_string(),
            license: LICENSE.to_string(),
            price: PRICE.to_string(),
            metadata,
            files,
            asset_type: ASSET_TYPE.to_string(),
        },
    }
}
