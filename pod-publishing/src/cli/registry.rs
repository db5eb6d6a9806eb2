use clap::Args;

/// Parameters used to reach the registry contracts.
#[derive(Debug, Clone, Args)]
pub struct RegistryCliArgs {
    /// Address of the DIDRegistry contract. There is no built-in default; every deployment
    /// must provide the address of its own contract.
    #[arg(env = "POD_PUBLISHING_DID_REGISTRY_ADDRESS", long)]
    pub did_registry_address: String,
}
