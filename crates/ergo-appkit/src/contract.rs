//! Guard scripts for output boxes.

use crate::{AppkitError, AppkitResult};
use ergo_lib::ergotree_ir::{
    chain::address::{Address, AddressEncoder, NetworkAddress, NetworkPrefix},
    ergo_tree::ErgoTree,
    serialization::SigmaSerializable,
};
use ergo_lib::wallet::miner_fee::MINERS_FEE_BASE16_BYTES;

/// An ErgoTree guarding an output box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErgoContract {
    tree: ErgoTree,
}

impl ErgoContract {
    /// Wrap an already compiled tree.
    pub fn new(tree: ErgoTree) -> Self {
        Self { tree }
    }

    /// Contract spendable by whoever can satisfy the address script.
    pub fn from_address(address: &Address) -> AppkitResult<Self> {
        Ok(Self::new(address.script()?))
    }

    /// Pay-to-public-key contract for an encoded address.
    pub fn send_to_pk(network: NetworkPrefix, address: &str) -> AppkitResult<Self> {
        Self::from_address(&parse_address(network, address)?)
    }

    /// Standard miner fee contract.
    pub fn miner_fee() -> AppkitResult<Self> {
        let bytes = hex::decode(MINERS_FEE_BASE16_BYTES)
            .map_err(|e| AppkitError::Transaction(format!("fee proposition: {}", e)))?;
        Ok(Self::new(ErgoTree::sigma_parse_bytes(&bytes)?))
    }

    /// Parse a hex encoded serialized tree.
    pub fn from_hex(tree_hex: &str) -> AppkitResult<Self> {
        let bytes = hex::decode(tree_hex)
            .map_err(|e| AppkitError::InvalidAddress(format!("{}: {}", tree_hex, e)))?;
        Ok(Self::new(ErgoTree::sigma_parse_bytes(&bytes)?))
    }

    pub fn ergo_tree(&self) -> &ErgoTree {
        &self.tree
    }

    /// Address for this contract (P2PK when the tree is a plain public key).
    pub fn address(&self) -> AppkitResult<Address> {
        Address::recreate_from_ergo_tree(&self.tree)
            .map_err(|e| AppkitError::InvalidAddress(e.to_string()))
    }
}

impl From<ErgoTree> for ErgoContract {
    fn from(tree: ErgoTree) -> Self {
        Self::new(tree)
    }
}

/// Parse a base58 address for the given network.
pub fn parse_address(network: NetworkPrefix, address: &str) -> AppkitResult<Address> {
    AddressEncoder::new(network)
        .parse_address_from_str(address)
        .map_err(|e| AppkitError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Base58 encoding of an address on the given network.
pub fn encode_address(network: NetworkPrefix, address: &Address) -> String {
    NetworkAddress::new(network, address).to_base58()
}
