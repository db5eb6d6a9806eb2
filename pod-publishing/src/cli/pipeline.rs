use clap::{ArgAction, Args};

use crate::metadata::MetadataLayout;

/// Optional stages of a publishing run.
#[derive(Debug, Clone, Args)]
pub struct PipelineCliArgs {
    /// Make the output bucket readable by anyone
    #[arg(env = "POD_PUBLISHING_PUBLIC_READ", long, default_value_t = true, action = ArgAction::Set)]
    pub public_read: bool,

    /// Record used / wasDerivedFrom / wasAssociatedWith provenance events
    #[arg(env = "POD_PUBLISHING_RECORD_PROVENANCE", long, default_value_t = true, action = ArgAction::Set)]
    pub record_provenance: bool,

    /// Hand the published asset over to the owner of the workflow
    #[arg(env = "POD_PUBLISHING_TRANSFER_OWNERSHIP", long, default_value_t = true, action = ArgAction::Set)]
    pub transfer_ownership: bool,

    /// Prefix every output file with a random id before upload
    #[arg(env = "POD_PUBLISHING_RENAME_FILES", long, default_value_t = false, action = ArgAction::Set)]
    pub rename_files: bool,

    #[arg(env = "POD_PUBLISHING_METADATA_LAYOUT", long, value_enum, default_value_t = MetadataLayout::Envelope)]
    pub metadata_layout: MetadataLayout,
}
