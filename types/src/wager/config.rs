use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{WagerError, MAX_HOUSE_EDGE_PERCENT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    Active = 0,
    Paused = 1,
}

impl Write for Lifecycle {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Lifecycle {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Active),
            1 => Ok(Self::Paused),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Lifecycle {
    const SIZE: usize = 1;
}

/// Operator-controlled settings.
///
/// The stake cap applies when a wager starts. The house edge and minimum cut
/// are read when a wager resolves, so changes apply to wagers already pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemConfig {
    pub admin: PublicKey,
    pub max_bet: u64,
    pub house_edge_percent: u8,
    pub min_house_cut: u64,
    pub lifecycle: Lifecycle,
    /// Number of blocks after commitment during which a wager can resolve.
    pub randomness_window: u64,
}

impl SystemConfig {
    pub fn is_paused(&self) -> bool {
        self.lifecycle == Lifecycle::Paused
    }

    pub fn validate_house_edge(percent: u8) -> Result<(), WagerError> {
        if percent == 0 || percent > MAX_HOUSE_EDGE_PERCENT {
            return Err(WagerError::InvalidHouseEdge { percent });
        }
        Ok(())
    }
}

impl Write for SystemConfig {
    fn write(&self, writer: &mut impl BufMut) {
        self.admin.write(writer);
        self.max_bet.write(writer);
        self.house_edge_percent.write(writer);
        self.min_house_cut.write(writer);
        self.lifecycle.write(writer);
        self.randomness_window.write(writer);
    }
}

impl Read for SystemConfig {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let admin = PublicKey::read(reader)?;
        let max_bet = u64::read(reader)?;
        let house_edge_percent = u8::read(reader)?;
        if house_edge_percent == 0 || house_edge_percent > MAX_HOUSE_EDGE_PERCENT {
            return Err(Error::Invalid("SystemConfig", "house edge out of range"));
        }
        let min_house_cut = u64::read(reader)?;
        let lifecycle = Lifecycle::read(reader)?;
        let randomness_window = u64::read(reader)?;
        Ok(Self {
            admin,
            max_bet,
            house_edge_percent,
            min_house_cut,
            lifecycle,
            randomness_window,
        })
    }
}

impl FixedSize for SystemConfig {
    const SIZE: usize = PublicKey::SIZE
        + u64::SIZE
        + u8::SIZE
        + u64::SIZE
        + Lifecycle::SIZE
        + u64::SIZE;
}
