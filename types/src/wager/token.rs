use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{sha256::Sha256, Hasher};
use commonware_utils::hex;
use std::fmt;

use super::{read_string, string_encode_size, write_string, MAX_SYMBOL_LENGTH};

/// Identifier of an external fungible asset.
///
/// Derived from the asset symbol so genesis files and clients can refer to
/// assets by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub [u8; 32]);

impl TokenId {
    pub fn from_symbol(symbol: &str) -> Self {
        let digest = Sha256::hash(symbol.as_bytes());
        let mut id = [0u8; 32];
        id.copy_from_slice(digest.as_ref());
        Self(id)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl Write for TokenId {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_slice(&self.0);
    }
}

impl Read for TokenId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < Self::SIZE {
            return Err(Error::EndOfBuffer);
        }
        let mut id = [0u8; 32];
        reader.copy_to_slice(&mut id);
        Ok(Self(id))
    }
}

impl FixedSize for TokenId {
    const SIZE: usize = 32;
}

/// Registry metadata for an external asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetMetadata {
    pub symbol: String,
    pub decimals: u8,
}

impl AssetMetadata {
    /// Only whole-unit assets can be wagered.
    pub fn is_integer_unit(&self) -> bool {
        self.decimals == 0
    }
}

impl Write for AssetMetadata {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.symbol, writer);
        self.decimals.write(writer);
    }
}

impl Read for AssetMetadata {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            symbol: read_string(reader, MAX_SYMBOL_LENGTH)?,
            decimals: u8::read(reader)?,
        })
    }
}

impl EncodeSize for AssetMetadata {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.symbol) + self.decimals.encode_size()
    }
}

/// Per-token custody accounting.
///
/// `custodied` is everything held by the system for the token. `user_total`
/// is the sum of all user balances and `pending_stakes` the sum of stakes of
/// unresolved wagers. The house reserve lives under its own key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CustodyState {
    pub custodied: u64,
    pub user_total: u64,
    pub pending_stakes: u64,
}

impl CustodyState {
    /// Amount held in custody that is not owed to any user.
    pub fn unowed(&self) -> u64 {
        self.custodied
            .saturating_sub(self.user_total)
            .saturating_sub(self.pending_stakes)
    }
}

impl Write for CustodyState {
    fn write(&self, writer: &mut impl BufMut) {
        self.custodied.write(writer);
        self.user_total.write(writer);
        self.pending_stakes.write(writer);
    }
}

impl Read for CustodyState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            custodied: u64::read(reader)?,
            user_total: u64::read(reader)?,
            pending_stakes: u64::read(reader)?,
        })
    }
}

impl FixedSize for CustodyState {
    const SIZE: usize = u64::SIZE * 3;
}
