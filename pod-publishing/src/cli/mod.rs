use std::path::PathBuf;

use clap::Parser;
use url::Url;

pub mod pipeline;
pub mod registry;
pub mod retry;
pub mod storage;

/// Every argument can also be provided through the environment variable named next to it,
/// or through a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pod-publishing",
    about = "Publish the outputs of a compute workflow as a new registry asset",
    long_about = "Collects the files a compute workflow wrote to <path>/outputs, uploads them to a fresh \
    object storage bucket and registers them as a new dataset asset derived from the workflow.",
    after_help = "Example:\n  \
    pod-publishing -w did:nv:0c7f... -n http://localhost:8545 --gateway-url http://localhost:8030 \\\n    \
    --metadata-url http://localhost:5000 --secretstore-url http://localhost:12001 \\\n    \
    -c \"$(cat account.json)\" -p secret -l /data \\\n    \
    --did-registry-address 0x<DIDRegistry address of the deployment>"
)]
pub struct Cli {
    /// DID of the workflow whose outputs are published
    #[arg(short = 'w', long = "workflow", env = "POD_PUBLISHING_WORKFLOW")]
    pub workflow: String,

    /// JSON-RPC URL of the node hosting the registry contracts
    #[arg(short = 'n', long = "node", env = "POD_PUBLISHING_NODE_URL")]
    pub node: Url,

    #[arg(long, env = "POD_PUBLISHING_GATEWAY_URL")]
    pub gateway_url: Url,

    #[arg(long, env = "POD_PUBLISHING_METADATA_URL")]
    pub metadata_url: Url,

    #[arg(long, env = "POD_PUBLISHING_SECRETSTORE_URL")]
    pub secretstore_url: Url,

    /// Encrypted JSON keystore of the publishing account, with an `address` field
    #[arg(short = 'c', long = "credentials", env = "POD_PUBLISHING_CREDENTIALS")]
    pub credentials: String,

    /// Password of the keystore
    #[arg(short = 'p', long = "password", env = "POD_PUBLISHING_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Volume of the finished workflow. Must contain an `outputs` directory.
    #[arg(short = 'l', long = "path", env = "POD_PUBLISHING_PATH")]
    pub path: PathBuf,

    /// Identifier of the execution, recorded in the published metadata
    #[arg(long, env = "EXECUTION_ID")]
    pub execution_id: Option<String>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[clap(flatten)]
    pub registry_args: registry::RegistryCliArgs,

    #[clap(flatten)]
    pub storage_args: storage::StorageCliArgs,

    #[clap(flatten)]
    pub pipeline_args: pipeline::PipelineCliArgs,

    #[clap(flatten)]
    pub retry_args: retry::RetryCliArgs,
}
