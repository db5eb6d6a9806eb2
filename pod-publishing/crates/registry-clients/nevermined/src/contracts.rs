use alloy::primitives::{keccak256, Address, B256};
use alloy::sol;
use alloy::sol_types::SolValue;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface DIDRegistry {
        function registerAttribute(bytes32 _didSeed, bytes32 _checksum, address[] memory _providers, string memory _url) external;
        function getDIDOwner(bytes32 _did) external view returns (address);
        function transferDIDOwnership(bytes32 _did, address _newOwner) external;
        function hashDID(bytes32 _didSeed, address _creator) external pure returns (bytes32);
        function used(bytes32 _provId, bytes32 _did, address _agentId, bytes32 _activityId, bytes memory _signatureUsing, string memory _attributes) external returns (bool);
        function wasDerivedFrom(bytes32 _provId, bytes32 _newEntityDid, bytes32 _usedEntityDid, address _agentId, bytes32 _activityId, string memory _attributes) external returns (bool);
        function wasAssociatedWith(bytes32 _provId, bytes32 _did, address _agentId, bytes32 _activityId, string memory _attributes) external returns (bool);
    }
}

/// Off-chain twin of `DIDRegistry.hashDID`: the DID a creator obtains by registering `did_seed`.
pub fn hash_did(did_seed: B256, creator: Address) -> B256 {
    keccak256((did_seed, creator).abi_encode())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn hash_did_depends_on_seed_and_creator() {
        let seed = keccak256(b"seed");
        let alice = address!("00000000000000000000000000000000000000a1");
        let bob = address!("00000000000000000000000000000000000000b2");

        assert_eq!(hash_did(seed, alice), hash_did(seed, alice));
        assert_ne!(hash_did(seed, alice), hash_did(seed, bob));
        assert_ne!(hash_did(seed, alice), hash_did(keccak256(b"other"), alice));
    }

    #[test]
    fn hash_did_matches_abi_encoding() {
        let seed = B256::repeat_byte(0x11);
        let creator = Address::repeat_byte(0x22);

        let mut encoded = Vec::with_capacity(64);
        encoded.extend_from_slice(seed.as_slice());
        encoded.extend_from_slice(&[0u8; 12]);
        encoded.extend_from_slice(creator.as_slice());

        assert_eq!(hash_did(seed, creator), keccak256(encoded));
    }
}
