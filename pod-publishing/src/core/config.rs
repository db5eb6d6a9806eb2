use pod_publishing_nevermined_client::{connect, LocalAccount, NeverminedValidatedArgs};
use pod_publishing_registry_client_interface::{AccountSigner, ProvenanceRecorder, RegistryClient};
use tracing::debug;

use crate::cli::Cli;
use crate::core::client::storage::s3::S3StorageClient;
use crate::core::client::StorageClient;
use crate::types::params::{AccountParams, PublishParams, StorageParams};
use crate::PublishResult;

/// Everything a publishing run talks to, plus the validated parameters of the run.
pub struct Config {
    params: PublishParams,
    /// Object store receiving the output files
    storage: Box<dyn StorageClient>,
    /// Registry resolving the workflow and holding the published asset
    registry: Box<dyn RegistryClient>,
    provenance: Box<dyn ProvenanceRecorder>,
    /// The publishing account
    account: Box<dyn AccountSigner>,
}

impl Config {
    /// Validate the command line and connect every client
    pub async fn setup(cli: &Cli) -> PublishResult<Self> {
        let params = PublishParams::try_from(cli.clone())?;
        let storage_params = StorageParams::from(cli.clone());
        let account_params = AccountParams::try_from(cli.clone())?;
        let nevermined_args = NeverminedValidatedArgs::try_from(cli.clone())?;

        let account = LocalAccount::from_keystore(&account_params.credentials, &account_params.password)?;
        debug!(address = %account.address(), "Publishing account unlocked");

        let storage = Self::build_storage_client(&storage_params).await;
        let nevermined = connect(&nevermined_args, account.clone());

        Ok(Self::new(params, storage, Box::new(nevermined.clone()), Box::new(nevermined), Box::new(account)))
    }

    pub fn new(
        params: PublishParams,
        storage: Box<dyn StorageClient>,
        registry: Box<dyn RegistryClient>,
        provenance: Box<dyn ProvenanceRecorder>,
        account: Box<dyn AccountSigner>,
    ) -> Self {
        Self { params, storage, registry, provenance, account }
    }

    async fn build_storage_client(storage_params: &StorageParams) -> Box<dyn StorageClient> {
        Box::new(S3StorageClient::new(storage_params).await)
    }

    /// Returns the parameters of the run
    pub fn params(&self) -> &PublishParams {
        &self.params
    }

    /// Returns the storage client
    pub fn storage(&self) -> &dyn StorageClient {
        self.storage.as_ref()
    }

    /// Returns the registry client
    pub fn registry(&self) -> &dyn RegistryClient {
        self.registry.as_ref()
    }

    /// Returns the provenance recorder
    pub fn provenance(&self) -> &dyn ProvenanceRecorder {
        self.provenance.as_ref()
    }

    /// Returns the publishing account
    pub fn account(&self) -> &dyn AccountSigner {
        self.account.as_ref()
    }
}
