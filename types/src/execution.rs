use bytes::{Buf, BufMut};
use commonware_codec::{
    varint::UInt, Encode, EncodeSize, Error, FixedSize, RangeCfg, Read, ReadExt, Write,
};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;

use crate::wager::{
    read_string, string_encode_size, write_string, AssetMetadata, CustodyState, Outcome, Side,
    SystemConfig, TokenId, Wager, MAX_ERROR_MESSAGE_LENGTH,
};

pub const NAMESPACE: &[u8] = b"_BANCO";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";
pub const MAX_BLOCK_TRANSACTIONS: usize = 500;

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

impl Digestible for Transaction {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes().as_ref());
        hasher.update(self.instruction.encode().as_ref());
        hasher.update(self.public.as_ref());
        // Signature is excluded: any valid signature authorizes the same transaction
        hasher.finalize()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    // Player instructions (tags 0-3)
    /// Move `amount` of `token` from the signer's wallet into custody.
    /// Binary: [0] [token:32] [amount:u64 BE]
    Deposit { token: TokenId, amount: u64 },

    /// Release `amount` of `token` from the signer's balance to their wallet.
    /// Binary: [1] [token:32] [amount:u64 BE]
    Withdraw { token: TokenId, amount: u64 },

    /// Stake on a side. The including block becomes the commitment.
    /// Binary: [2] [token:32] [amount:u64 BE] [side:u8]
    StartWager {
        token: TokenId,
        amount: u64,
        side: Side,
    },

    /// Settle the signer's pending wager.
    /// Binary: [3]
    ResolveWager,

    // Administrative instructions (tags 10-19)
    /// Binary: [10] [token:32]
    AddToken { token: TokenId },

    /// Binary: [11] [token:32]
    RemoveToken { token: TokenId },

    /// Binary: [12] [amount:u64 BE]
    SetMaxBet { amount: u64 },

    /// Binary: [13] [percent:u8]
    SetHouseEdge { percent: u8 },

    /// Binary: [14] [amount:u64 BE]
    SetMinHouseCut { amount: u64 },

    /// Move `amount` of `token` from the admin wallet into the house reserve.
    /// Binary: [15] [token:32] [amount:u64 BE]
    FundTreasury { token: TokenId, amount: u64 },

    /// Binary: [16]
    Pause,

    /// Binary: [17]
    Unpause,

    /// Send everything in custody that is not owed to users to the admin.
    /// Binary: [18] [token:32]
    Closeout { token: TokenId },

    /// Refund a stuck wager to its owner.
    /// Binary: [19] [player:32]
    RecoverWager { player: PublicKey },
}

impl Instruction {
    pub fn is_admin(&self) -> bool {
        !matches!(
            self,
            Self::Deposit { .. }
                | Self::Withdraw { .. }
                | Self::StartWager { .. }
                | Self::ResolveWager
        )
    }
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Deposit { token, amount } => {
                0u8.write(writer);
                token.write(writer);
                amount.write(writer);
            }
            Self::Withdraw { token, amount } => {
                1u8.write(writer);
                token.write(writer);
                amount.write(writer);
            }
            Self::StartWager {
                token,
                amount,
                side,
            } => {
                2u8.write(writer);
                token.write(writer);
                amount.write(writer);
                side.write(writer);
            }
            Self::ResolveWager => 3u8.write(writer),

            Self::AddToken { token } => {
                10u8.write(writer);
                token.write(writer);
            }
            Self::RemoveToken { token } => {
                11u8.write(writer);
                token.write(writer);
            }
            Self::SetMaxBet { amount } => {
                12u8.write(writer);
                amount.write(writer);
            }
            Self::SetHouseEdge { percent } => {
                13u8.write(writer);
                percent.write(writer);
            }
            Self::SetMinHouseCut { amount } => {
                14u8.write(writer);
                amount.write(writer);
            }
            Self::FundTreasury { token, amount } => {
                15u8.write(writer);
                token.write(writer);
                amount.write(writer);
            }
            Self::Pause => 16u8.write(writer),
            Self::Unpause => 17u8.write(writer),
            Self::Closeout { token } => {
                18u8.write(writer);
                token.write(writer);
            }
            Self::RecoverWager { player } => {
                19u8.write(writer);
                player.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            0 => Self::Deposit {
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
            },
            1 => Self::Withdraw {
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
            },
            2 => Self::StartWager {
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
                side: Side::read(reader)?,
            },
            3 => Self::ResolveWager,

            10 => Self::AddToken {
                token: TokenId::read(reader)?,
            },
            11 => Self::RemoveToken {
                token: TokenId::read(reader)?,
            },
            12 => Self::SetMaxBet {
                amount: u64::read(reader)?,
            },
            13 => Self::SetHouseEdge {
                percent: u8::read(reader)?,
            },
            14 => Self::SetMinHouseCut {
                amount: u64::read(reader)?,
            },
            15 => Self::FundTreasury {
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
            },
            16 => Self::Pause,
            17 => Self::Unpause,
            18 => Self::Closeout {
                token: TokenId::read(reader)?,
            },
            19 => Self::RecoverWager {
                player: PublicKey::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Deposit { .. } | Self::Withdraw { .. } | Self::FundTreasury { .. } => {
                    TokenId::SIZE + u64::SIZE
                }
                Self::StartWager { .. } => TokenId::SIZE + u64::SIZE + Side::SIZE,
                Self::ResolveWager | Self::Pause | Self::Unpause => 0,
                Self::AddToken { .. } | Self::RemoveToken { .. } | Self::Closeout { .. } => {
                    TokenId::SIZE
                }
                Self::SetMaxBet { .. } | Self::SetMinHouseCut { .. } => u64::SIZE,
                Self::SetHouseEdge { .. } => u8::SIZE,
                Self::RecoverWager { .. } => PublicKey::SIZE,
            }
    }
}

/// A sequenced batch of transactions.
///
/// `entropy` is the block's randomness beacon. It is not known before the
/// block is produced and decides every wager committed one block earlier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub parent: Digest,

    pub height: u64,
    pub entropy: Digest,

    pub transactions: Vec<Transaction>,

    digest: Digest,
}

impl Block {
    fn compute_digest(
        parent: &Digest,
        height: u64,
        entropy: &Digest,
        transactions: &[Transaction],
    ) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(parent);
        hasher.update(&height.to_be_bytes());
        hasher.update(entropy);
        for transaction in transactions {
            hasher.update(&transaction.digest());
        }
        hasher.finalize()
    }

    pub fn new(
        parent: Digest,
        height: u64,
        entropy: Digest,
        transactions: Vec<Transaction>,
    ) -> Self {
        assert!(transactions.len() <= MAX_BLOCK_TRANSACTIONS);
        let digest = Self::compute_digest(&parent, height, &entropy, &transactions);
        Self {
            parent,
            height,
            entropy,
            transactions,
            digest,
        }
    }
}

impl Write for Block {
    fn write(&self, writer: &mut impl BufMut) {
        self.parent.write(writer);
        UInt(self.height).write(writer);
        self.entropy.write(writer);
        self.transactions.write(writer);
    }
}

impl Read for Block {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let parent = Digest::read(reader)?;
        let height = UInt::read(reader)?.into();
        let entropy = Digest::read(reader)?;
        let transactions = Vec::<Transaction>::read_cfg(
            reader,
            &(RangeCfg::from(0..=MAX_BLOCK_TRANSACTIONS), ()),
        )?;

        let digest = Self::compute_digest(&parent, height, &entropy, &transactions);
        Ok(Self {
            parent,
            height,
            entropy,
            transactions,
            digest,
        })
    }
}

impl EncodeSize for Block {
    fn encode_size(&self) -> usize {
        self.parent.encode_size()
            + UInt(self.height).encode_size()
            + self.entropy.encode_size()
            + self.transactions.encode_size()
    }
}

impl Digestible for Block {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        self.digest
    }
}

/// Nonce tracking for replay protection.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Nonce tracking (tag 0)
    Account(PublicKey),

    // System keys (tags 1-3)
    Config,
    Asset(TokenId),
    AllowedToken(TokenId),

    // Ledger keys (tags 4-7)
    Balance(PublicKey, TokenId),
    Wallet(PublicKey, TokenId),
    Custody(TokenId),
    Reserve(TokenId),

    // Wager keys (tags 8-9)
    Wager(PublicKey),
    Entropy(u64),

    /// Last committed height (tag 10)
    Commit,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }

            Self::Config => 1u8.write(writer),
            Self::Asset(token) => {
                2u8.write(writer);
                token.write(writer);
            }
            Self::AllowedToken(token) => {
                3u8.write(writer);
                token.write(writer);
            }

            Self::Balance(pk, token) => {
                4u8.write(writer);
                pk.write(writer);
                token.write(writer);
            }
            Self::Wallet(pk, token) => {
                5u8.write(writer);
                pk.write(writer);
                token.write(writer);
            }
            Self::Custody(token) => {
                6u8.write(writer);
                token.write(writer);
            }
            Self::Reserve(token) => {
                7u8.write(writer);
                token.write(writer);
            }

            Self::Wager(pk) => {
                8u8.write(writer);
                pk.write(writer);
            }
            Self::Entropy(height) => {
                9u8.write(writer);
                height.write(writer);
            }

            Self::Commit => 10u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),

            1 => Self::Config,
            2 => Self::Asset(TokenId::read(reader)?),
            3 => Self::AllowedToken(TokenId::read(reader)?),

            4 => Self::Balance(PublicKey::read(reader)?, TokenId::read(reader)?),
            5 => Self::Wallet(PublicKey::read(reader)?, TokenId::read(reader)?),
            6 => Self::Custody(TokenId::read(reader)?),
            7 => Self::Reserve(TokenId::read(reader)?),

            8 => Self::Wager(PublicKey::read(reader)?),
            9 => Self::Entropy(u64::read(reader)?),

            10 => Self::Commit,

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) | Self::Wager(_) => PublicKey::SIZE,
                Self::Config | Self::Commit => 0,
                Self::Asset(_) | Self::AllowedToken(_) | Self::Custody(_) | Self::Reserve(_) => {
                    TokenId::SIZE
                }
                Self::Balance(..) | Self::Wallet(..) => PublicKey::SIZE + TokenId::SIZE,
                Self::Entropy(_) => u64::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    /// Nonce tracking (tag 0)
    Account(Account),

    // System values (tags 1-3)
    Config(SystemConfig),
    Asset(AssetMetadata),
    Allowed,

    // Ledger values (tags 4-7)
    Balance(u64),
    Wallet(u64),
    Custody(CustodyState),
    Reserve(u64),

    // Wager values (tags 8-9)
    Wager(Wager),
    Entropy(Digest),

    /// Last committed height (tag 10)
    Commit { height: u64 },
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }

            Self::Config(config) => {
                1u8.write(writer);
                config.write(writer);
            }
            Self::Asset(asset) => {
                2u8.write(writer);
                asset.write(writer);
            }
            Self::Allowed => 3u8.write(writer),

            Self::Balance(amount) => {
                4u8.write(writer);
                amount.write(writer);
            }
            Self::Wallet(amount) => {
                5u8.write(writer);
                amount.write(writer);
            }
            Self::Custody(custody) => {
                6u8.write(writer);
                custody.write(writer);
            }
            Self::Reserve(amount) => {
                7u8.write(writer);
                amount.write(writer);
            }

            Self::Wager(wager) => {
                8u8.write(writer);
                wager.write(writer);
            }
            Self::Entropy(entropy) => {
                9u8.write(writer);
                entropy.write(writer);
            }

            Self::Commit { height } => {
                10u8.write(writer);
                height.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),

            1 => Self::Config(SystemConfig::read(reader)?),
            2 => Self::Asset(AssetMetadata::read(reader)?),
            3 => Self::Allowed,

            4 => Self::Balance(u64::read(reader)?),
            5 => Self::Wallet(u64::read(reader)?),
            6 => Self::Custody(CustodyState::read(reader)?),
            7 => Self::Reserve(u64::read(reader)?),

            8 => Self::Wager(Wager::read(reader)?),
            9 => Self::Entropy(Digest::read(reader)?),

            10 => Self::Commit {
                height: u64::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Config(config) => config.encode_size(),
                Self::Asset(asset) => asset.encode_size(),
                Self::Allowed => 0,
                Self::Balance(amount) | Self::Wallet(amount) | Self::Reserve(amount) => {
                    amount.encode_size()
                }
                Self::Custody(custody) => custody.encode_size(),
                Self::Wager(wager) => wager.encode_size(),
                Self::Entropy(entropy) => entropy.encode_size(),
                Self::Commit { height } => height.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Player events (tags 0-5)
    Deposited {
        player: PublicKey,
        token: TokenId,
        amount: u64,
        balance: u64,
    },
    Withdrawn {
        player: PublicKey,
        token: TokenId,
        amount: u64,
        balance: u64,
    },
    WagerStarted {
        player: PublicKey,
        token: TokenId,
        stake: u64,
        side: Side,
        commitment: u64,
    },
    WagerResolved {
        player: PublicKey,
        token: TokenId,
        stake: u64,
        side: Side,
        banker_score: u8,
        player_score: u8,
        outcome: Outcome,
        payout: u64,
        commission: u64,
    },
    WagerRefunded {
        player: PublicKey,
        token: TokenId,
        stake: u64,
    },
    /// An expired wager's stake was taken into the reserve.
    WagerForfeited {
        player: PublicKey,
        token: TokenId,
        stake: u64,
        reserve: u64,
    },

    // Administrative events (tags 10-16)
    TokenAdded {
        token: TokenId,
    },
    TokenRemoved {
        token: TokenId,
    },
    Paused,
    Unpaused,
    ConfigUpdated {
        max_bet: u64,
        house_edge_percent: u8,
        min_house_cut: u64,
    },
    TreasuryFunded {
        token: TokenId,
        amount: u64,
        reserve: u64,
    },
    ClosedOut {
        token: TokenId,
        amount: u64,
        recipient: PublicKey,
    },

    /// An instruction failed and its effects were discarded (tag 20)
    Rejected {
        account: PublicKey,
        error_code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Deposited {
                player,
                token,
                amount,
                balance,
            } => {
                0u8.write(writer);
                player.write(writer);
                token.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::Withdrawn {
                player,
                token,
                amount,
                balance,
            } => {
                1u8.write(writer);
                player.write(writer);
                token.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::WagerStarted {
                player,
                token,
                stake,
                side,
                commitment,
            } => {
                2u8.write(writer);
                player.write(writer);
                token.write(writer);
                stake.write(writer);
                side.write(writer);
                commitment.write(writer);
            }
            Self::WagerResolved {
                player,
                token,
                stake,
                side,
                banker_score,
                player_score,
                outcome,
                payout,
                commission,
            } => {
                3u8.write(writer);
                player.write(writer);
                token.write(writer);
                stake.write(writer);
                side.write(writer);
                banker_score.write(writer);
                player_score.write(writer);
                outcome.write(writer);
                payout.write(writer);
                commission.write(writer);
            }
            Self::WagerRefunded {
                player,
                token,
                stake,
            } => {
                4u8.write(writer);
                player.write(writer);
                token.write(writer);
                stake.write(writer);
            }
            Self::WagerForfeited {
                player,
                token,
                stake,
                reserve,
            } => {
                5u8.write(writer);
                player.write(writer);
                token.write(writer);
                stake.write(writer);
                reserve.write(writer);
            }

            Self::TokenAdded { token } => {
                10u8.write(writer);
                token.write(writer);
            }
            Self::TokenRemoved { token } => {
                11u8.write(writer);
                token.write(writer);
            }
            Self::Paused => 12u8.write(writer),
            Self::Unpaused => 13u8.write(writer),
            Self::ConfigUpdated {
                max_bet,
                house_edge_percent,
                min_house_cut,
            } => {
                14u8.write(writer);
                max_bet.write(writer);
                house_edge_percent.write(writer);
                min_house_cut.write(writer);
            }
            Self::TreasuryFunded {
                token,
                amount,
                reserve,
            } => {
                15u8.write(writer);
                token.write(writer);
                amount.write(writer);
                reserve.write(writer);
            }
            Self::ClosedOut {
                token,
                amount,
                recipient,
            } => {
                16u8.write(writer);
                token.write(writer);
                amount.write(writer);
                recipient.write(writer);
            }

            Self::Rejected {
                account,
                error_code,
                message,
            } => {
                20u8.write(writer);
                account.write(writer);
                error_code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            0 => Self::Deposited {
                player: PublicKey::read(reader)?,
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            1 => Self::Withdrawn {
                player: PublicKey::read(reader)?,
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            2 => Self::WagerStarted {
                player: PublicKey::read(reader)?,
                token: TokenId::read(reader)?,
                stake: u64::read(reader)?,
                side: Side::read(reader)?,
                commitment: u64::read(reader)?,
            },
            3 => Self::WagerResolved {
                player: PublicKey::read(reader)?,
                token: TokenId::read(reader)?,
                stake: u64::read(reader)?,
                side: Side::read(reader)?,
                banker_score: u8::read(reader)?,
                player_score: u8::read(reader)?,
                outcome: Outcome::read(reader)?,
                payout: u64::read(reader)?,
                commission: u64::read(reader)?,
            },
            4 => Self::WagerRefunded {
                player: PublicKey::read(reader)?,
                token: TokenId::read(reader)?,
                stake: u64::read(reader)?,
            },
            5 => Self::WagerForfeited {
                player: PublicKey::read(reader)?,
                token: TokenId::read(reader)?,
                stake: u64::read(reader)?,
                reserve: u64::read(reader)?,
            },

            10 => Self::TokenAdded {
                token: TokenId::read(reader)?,
            },
            11 => Self::TokenRemoved {
                token: TokenId::read(reader)?,
            },
            12 => Self::Paused,
            13 => Self::Unpaused,
            14 => Self::ConfigUpdated {
                max_bet: u64::read(reader)?,
                house_edge_percent: u8::read(reader)?,
                min_house_cut: u64::read(reader)?,
            },
            15 => Self::TreasuryFunded {
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
                reserve: u64::read(reader)?,
            },
            16 => Self::ClosedOut {
                token: TokenId::read(reader)?,
                amount: u64::read(reader)?,
                recipient: PublicKey::read(reader)?,
            },

            20 => Self::Rejected {
                account: PublicKey::read(reader)?,
                error_code: u8::read(reader)?,
                message: read_string(reader, MAX_ERROR_MESSAGE_LENGTH)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Deposited { .. } | Self::Withdrawn { .. } => {
                    PublicKey::SIZE + TokenId::SIZE + u64::SIZE + u64::SIZE
                }
                Self::WagerStarted { .. } => {
                    PublicKey::SIZE + TokenId::SIZE + u64::SIZE + Side::SIZE + u64::SIZE
                }
                Self::WagerResolved { .. } => {
                    PublicKey::SIZE
                        + TokenId::SIZE
                        + u64::SIZE
                        + Side::SIZE
                        + u8::SIZE
                        + u8::SIZE
                        + Outcome::SIZE
                        + u64::SIZE
                        + u64::SIZE
                }
                Self::WagerRefunded { .. } => PublicKey::SIZE + TokenId::SIZE + u64::SIZE,
                Self::WagerForfeited { .. } => {
                    PublicKey::SIZE + TokenId::SIZE + u64::SIZE + u64::SIZE
                }
                Self::TokenAdded { .. } | Self::TokenRemoved { .. } => TokenId::SIZE,
                Self::Paused | Self::Unpaused => 0,
                Self::ConfigUpdated { .. } => u64::SIZE + u8::SIZE + u64::SIZE,
                Self::TreasuryFunded { .. } => TokenId::SIZE + u64::SIZE + u64::SIZE,
                Self::ClosedOut { .. } => TokenId::SIZE + u64::SIZE + PublicKey::SIZE,
                Self::Rejected { message, .. } => {
                    PublicKey::SIZE + u8::SIZE + string_encode_size(message)
                }
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
    Commit { height: u64 },
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
            Self::Commit { height } => {
                2u8.write(writer);
                height.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            2 => Ok(Self::Commit {
                height: u64::read(reader)?,
            }),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Event(event) => event.encode_size(),
            Self::Transaction(transaction) => transaction.encode_size(),
            Self::Commit { height } => height.encode_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::ReadExt;
    use commonware_cryptography::ed25519::PrivateKey;

    fn usd() -> TokenId {
        TokenId::from_symbol("USD")
    }

    #[test]
    fn test_transaction_sign_verify() {
        let private = PrivateKey::from_seed(7);
        let tx = Transaction::sign(
            &private,
            3,
            Instruction::StartWager {
                token: usd(),
                amount: 10,
                side: Side::Player,
            },
        );
        assert!(tx.verify());

        let mut tampered = tx.clone();
        tampered.nonce = 4;
        assert!(!tampered.verify());
    }

    #[test]
    fn test_transaction_digest_ignores_signature() {
        let a = PrivateKey::from_seed(1);
        let tx = Transaction::sign(&a, 0, Instruction::ResolveWager);
        let mut other = tx.clone();
        other.signature = a.sign(&b"other"[..], b"payload");
        assert_eq!(tx.digest(), other.digest());
    }

    #[test]
    fn test_transaction_decode() {
        let private = PrivateKey::from_seed(9);
        let tx = Transaction::sign(
            &private,
            1,
            Instruction::RecoverWager {
                player: PrivateKey::from_seed(10).public_key(),
            },
        );
        let encoded = tx.encode();
        assert_eq!(encoded.len(), tx.encode_size());
        let decoded = Transaction::read(&mut &encoded[..]).unwrap();
        assert_eq!(tx, decoded);
        assert!(decoded.verify());
    }

    #[test]
    fn test_instruction_tags_are_stable() {
        assert_eq!(Instruction::ResolveWager.encode()[0], 3);
        assert_eq!(Instruction::Pause.encode()[0], 16);
        assert_eq!(
            Instruction::Closeout { token: usd() }.encode()[0],
            18
        );
        assert!(Instruction::Pause.is_admin());
        assert!(!Instruction::ResolveWager.is_admin());
    }

    #[test]
    fn test_instruction_rejects_unknown_tag() {
        let bytes = [42u8];
        assert!(matches!(
            Instruction::read(&mut &bytes[..]),
            Err(Error::InvalidEnum(42))
        ));
    }

    #[test]
    fn test_block_digest_covers_entropy() {
        let parent = Sha256::hash(b"parent");
        let a = Block::new(parent, 1, Sha256::hash(b"a"), vec![]);
        let b = Block::new(parent, 1, Sha256::hash(b"b"), vec![]);
        assert_ne!(a.digest(), b.digest());

        let decoded = Block::read(&mut &a.encode()[..]).unwrap();
        assert_eq!(decoded.digest(), a.digest());
    }

    #[test]
    fn test_key_value_encoding() {
        let player = PrivateKey::from_seed(2).public_key();
        let key = Key::Balance(player, usd());
        let encoded = key.encode();
        assert_eq!(encoded.len(), key.encode_size());
        assert_eq!(Key::read(&mut &encoded[..]).unwrap(), key);

        let value = Value::Wager(Wager::new(usd(), 10, Side::Banker, 5));
        let encoded = value.encode();
        assert_eq!(encoded.len(), value.encode_size());
        assert_eq!(Value::read(&mut &encoded[..]).unwrap(), value);
    }

    #[test]
    fn test_rejected_event_encoding() {
        let event = Event::Rejected {
            account: PrivateKey::from_seed(3).public_key(),
            error_code: 7,
            message: "insufficient balance (have=0, need=10)".to_string(),
        };
        let output = Output::Event(event);
        let encoded = output.encode();
        assert_eq!(encoded.len(), output.encode_size());
        assert_eq!(Output::read(&mut &encoded[..]).unwrap(), output);
    }

    #[test]
    fn test_resolved_event_encoding() {
        let event = Event::WagerResolved {
            player: PrivateKey::from_seed(4).public_key(),
            token: usd(),
            stake: 10,
            side: Side::Banker,
            banker_score: 7,
            player_score: 3,
            outcome: Outcome::Banker,
            payout: 19,
            commission: 1,
        };
        let encoded = event.encode();
        assert_eq!(encoded.len(), event.encode_size());
        assert_eq!(Event::read(&mut &encoded[..]).unwrap(), event);
    }

    #[test]
    fn test_forfeited_event_tag() {
        let event = Event::WagerForfeited {
            player: PrivateKey::from_seed(5).public_key(),
            token: usd(),
            stake: 40,
            reserve: 5_040,
        };
        let encoded = event.encode();
        assert_eq!(encoded[0], 5);
        assert_eq!(encoded.len(), event.encode_size());
        assert_eq!(Event::read(&mut &encoded[..]).unwrap(), event);
    }
}
