use alloy::primitives::{Address, Bytes, B256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceKind {
    Used,
    WasDerivedFrom,
    WasAssociatedWith,
}

impl std::fmt::Display for ProvenanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvenanceKind::Used => write!(f, "used"),
            ProvenanceKind::WasDerivedFrom => write!(f, "wasDerivedFrom"),
            ProvenanceKind::WasAssociatedWith => write!(f, "wasAssociatedWith"),
        }
    }
}

/// A single entry of the provenance trail, as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceEvent {
    /// An agent consumed an entity during an activity.
    Used {
        provenance_id: B256,
        did: B256,
        agent_id: Address,
        activity_id: B256,
        signature: Bytes,
        attributes: String,
    },
    /// A new entity was produced out of an existing one.
    WasDerivedFrom {
        provenance_id: B256,
        new_entity_did: B256,
        used_entity_did: B256,
        agent_id: Address,
        activity_id: B256,
        attributes: String,
    },
    /// An agent took part in an activity on an entity.
    WasAssociatedWith { provenance_id: B256, did: B256, agent_id: Address, activity_id: B256, attributes: String },
}

impl ProvenanceEvent {
    pub fn kind(&self) -> ProvenanceKind {
        match self {
            ProvenanceEvent::Used { .. } => ProvenanceKind::Used,
            ProvenanceEvent::WasDerivedFrom { .. } => ProvenanceKind::WasDerivedFrom,
            ProvenanceEvent::WasAssociatedWith { .. } => ProvenanceKind::WasAssociatedWith,
        }
    }

    pub fn provenance_id(&self) -> B256 {
        match self {
            ProvenanceEvent::Used { provenance_id, .. }
            | ProvenanceEvent::WasDerivedFrom { provenance_id, .. }
            | ProvenanceEvent::WasAssociatedWith { provenance_id, .. } => *provenance_id,
        }
    }

    pub fn attributes(&self) -> &str {
        match self {
            ProvenanceEvent::Used { attributes, .. }
            | ProvenanceEvent::WasDerivedFrom { attributes, .. }
            | ProvenanceEvent::WasAssociatedWith { attributes, .. } => attributes,
        }
    }
}
