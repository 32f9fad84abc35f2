//! Genesis configuration.
//!
//! Describes the initial asset registry, operator settings, wallet
//! allocations and house funding. Parsed from YAML and validated before any
//! state is written.

use commonware_cryptography::ed25519::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

use crate::wager::{
    Lifecycle, SystemConfig, TokenId, DEFAULT_HOUSE_EDGE_PERCENT, DEFAULT_MAX_BET,
    DEFAULT_MIN_HOUSE_CUT, DEFAULT_RANDOMNESS_WINDOW, MAX_HOUSE_EDGE_PERCENT, MAX_SYMBOL_LENGTH,
};

#[derive(Debug, ThisError)]
pub enum GenesisError {
    #[error("failed to parse genesis: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("house_edge_percent must be in 1..=100 (got {0})")]
    InvalidHouseEdge(u8),
    #[error("max_bet must be > 0")]
    ZeroMaxBet,
    #[error("randomness_window must be > 0")]
    ZeroWindow,
    #[error("asset {0} is declared more than once")]
    DuplicateAsset(String),
    #[error("asset symbol {0} is empty or too long")]
    InvalidSymbol(String),
    #[error("asset {0} is not declared")]
    UnknownAsset(String),
    #[error("asset {symbol} has {decimals} decimals and cannot be allowed")]
    FractionalAsset { symbol: String, decimals: u8 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub allowed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde(with = "serde_public_key_hex")]
    pub account: PublicKey,
    pub symbol: String,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funding {
    pub symbol: String,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    #[serde(with = "serde_public_key_hex")]
    pub admin: PublicKey,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
    #[serde(default = "default_max_bet")]
    pub max_bet: u64,
    #[serde(default = "default_house_edge_percent")]
    pub house_edge_percent: u8,
    #[serde(default = "default_min_house_cut")]
    pub min_house_cut: u64,
    #[serde(default = "default_randomness_window")]
    pub randomness_window: u64,
    /// External wallet balances available before the first block.
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    /// Initial house reserve, drawn from the admin's allocation.
    #[serde(default)]
    pub treasury: Vec<Funding>,
}

fn default_max_bet() -> u64 {
    DEFAULT_MAX_BET
}

fn default_house_edge_percent() -> u8 {
    DEFAULT_HOUSE_EDGE_PERCENT
}

fn default_min_house_cut() -> u64 {
    DEFAULT_MIN_HOUSE_CUT
}

fn default_randomness_window() -> u64 {
    DEFAULT_RANDOMNESS_WINDOW
}

impl Genesis {
    /// Parse and validate a YAML genesis document.
    pub fn from_yaml(raw: &str) -> Result<Self, GenesisError> {
        let genesis: Self = serde_yaml::from_str(raw)?;
        genesis.validate()?;
        Ok(genesis)
    }

    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.house_edge_percent == 0 || self.house_edge_percent > MAX_HOUSE_EDGE_PERCENT {
            return Err(GenesisError::InvalidHouseEdge(self.house_edge_percent));
        }
        if self.max_bet == 0 {
            return Err(GenesisError::ZeroMaxBet);
        }
        if self.randomness_window == 0 {
            return Err(GenesisError::ZeroWindow);
        }

        let mut symbols = BTreeSet::new();
        for asset in &self.assets {
            if asset.symbol.is_empty() || asset.symbol.len() > MAX_SYMBOL_LENGTH {
                return Err(GenesisError::InvalidSymbol(asset.symbol.clone()));
            }
            if !symbols.insert(asset.symbol.as_str()) {
                return Err(GenesisError::DuplicateAsset(asset.symbol.clone()));
            }
            if asset.allowed && asset.decimals != 0 {
                return Err(GenesisError::FractionalAsset {
                    symbol: asset.symbol.clone(),
                    decimals: asset.decimals,
                });
            }
        }

        let referenced = self
            .allocations
            .iter()
            .map(|allocation| &allocation.symbol)
            .chain(self.treasury.iter().map(|funding| &funding.symbol));
        for symbol in referenced {
            if !symbols.contains(symbol.as_str()) {
                return Err(GenesisError::UnknownAsset(symbol.clone()));
            }
        }

        Ok(())
    }

    pub fn config(&self) -> SystemConfig {
        SystemConfig {
            admin: self.admin.clone(),
            max_bet: self.max_bet,
            house_edge_percent: self.house_edge_percent,
            min_house_cut: self.min_house_cut,
            lifecycle: Lifecycle::Active,
            randomness_window: self.randomness_window,
        }
    }

    /// Identifier of a declared asset.
    pub fn token(&self, symbol: &str) -> Option<TokenId> {
        self.assets
            .iter()
            .find(|asset| asset.symbol == symbol)
            .map(|asset| TokenId::from_symbol(&asset.symbol))
    }
}

pub mod serde_public_key_hex {
    use commonware_codec::ReadExt;
    use commonware_cryptography::ed25519::PublicKey;
    use commonware_utils::{from_hex, hex};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(public_key: &PublicKey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex(public_key.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PublicKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid hex string"))?;
        let mut reader = bytes.as_slice();
        PublicKey::read(&mut reader).map_err(|_| serde::de::Error::custom("invalid public key"))
    }
}
