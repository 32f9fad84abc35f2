pub mod execution;
pub mod genesis;
pub mod wager;

use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Digestible, Hasher,
};
pub use execution::{Block, NAMESPACE};
pub use genesis::{Genesis, GenesisError};

/// Genesis message to use during initialization.
const GENESIS: &[u8] = b"banco: house always settles";

/// Get the genesis block.
pub fn genesis_block() -> Block {
    let genesis_parent = Sha256::hash(GENESIS);
    Block::new(genesis_parent, 0, genesis_parent, vec![])
}

/// Compute the digest of the genesis block.
pub fn genesis_digest() -> Digest {
    genesis_block().digest()
}
