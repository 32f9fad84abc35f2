use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

use super::TokenId;

/// The side a player backs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Banker = 0,
    Player = 1,
}

impl Write for Side {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Side {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Banker),
            1 => Ok(Self::Player),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Side {
    const SIZE: usize = 1;
}

/// Result of a hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    Banker = 0,
    Player = 1,
    Tie = 2,
}

impl Outcome {
    /// Whether a bet on `side` wins this outcome. A tie wins for nobody.
    pub fn wins(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Outcome::Banker, Side::Banker) | (Outcome::Player, Side::Player)
        )
    }
}

impl Write for Outcome {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Outcome {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Banker),
            1 => Ok(Self::Player),
            2 => Ok(Self::Tie),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Outcome {
    const SIZE: usize = 1;
}

/// The two scores drawn for a hand, each in `0..=9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scores {
    pub banker: u8,
    pub player: u8,
}

impl Scores {
    pub fn new(banker: u8, player: u8) -> Self {
        Self { banker, player }
    }
}

/// A pending wager. Each account has at most one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wager {
    pub token: TokenId,
    pub stake: u64,
    pub side: Side,
    /// Height of the block that included the wager start.
    pub commitment: u64,
    pub resolved: bool,
}

impl Wager {
    pub fn new(token: TokenId, stake: u64, side: Side, commitment: u64) -> Self {
        Self {
            token,
            stake,
            side,
            commitment,
            resolved: false,
        }
    }

    /// Height whose entropy decides this wager.
    pub fn reveal_height(&self) -> u64 {
        self.commitment.saturating_add(1)
    }

    /// Last height at which this wager can still be resolved.
    pub fn last_resolvable_height(&self, window: u64) -> u64 {
        self.commitment.saturating_add(window)
    }
}

impl Write for Wager {
    fn write(&self, writer: &mut impl BufMut) {
        self.token.write(writer);
        self.stake.write(writer);
        self.side.write(writer);
        self.commitment.write(writer);
        self.resolved.write(writer);
    }
}

impl Read for Wager {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            token: TokenId::read(reader)?,
            stake: u64::read(reader)?,
            side: Side::read(reader)?,
            commitment: u64::read(reader)?,
            resolved: bool::read(reader)?,
        })
    }
}

impl FixedSize for Wager {
    const SIZE: usize = TokenId::SIZE + u64::SIZE + Side::SIZE + u64::SIZE + bool::SIZE;
}
