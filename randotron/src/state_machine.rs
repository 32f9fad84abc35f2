use std::collections::{BTreeMap, BTreeSet};

use banco_types::{
    execution::{Event, Instruction, Output, Transaction},
    wager::{
        Side, TokenId, ERROR_RANDOMNESS_EXPIRED, ERROR_RESERVE_INSUFFICIENT, ERROR_WAGER_PENDING,
    },
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use rand::Rng;
use tracing::{debug, info, warn};

/// Tuning shared by every simulated player.
#[derive(Clone, Debug)]
pub struct Params {
    pub max_stake: u64,
    pub max_deposit: u64,
    pub randomness_window: u64,
    /// Amount the house adds to the reserve after a settlement is refused.
    pub top_up: u64,
    /// One in `forget_ratio` resolutions is skipped, leaving wagers to expire.
    pub forget_ratio: u32,
    /// One in `withdraw_ratio` idle turns cashes out the whole balance.
    pub withdraw_ratio: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Depositing,
    Ready,
    Staking,
    Pending { commitment: u64 },
    Resolving { commitment: u64 },
    Withdrawing,
    /// Past the reveal window, waiting on the house to recover it.
    Expired { commitment: u64 },
}

impl Status {
    fn in_flight(&self) -> bool {
        matches!(
            self,
            Self::Depositing | Self::Staking | Self::Resolving { .. } | Self::Withdrawing
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub wagers: u64,
    pub wins: u64,
    pub refunds: u64,
    pub forfeits: u64,
    pub rejected: u64,
}

pub struct Player {
    private_key: PrivateKey,
    public_key: PublicKey,
    nonce: u64,
    status: Status,
    last_change: u64,

    wallet: u64,
    balance: u64,
    tally: Tally,
}

impl Player {
    pub fn new(private_key: PrivateKey, wallet: u64) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
            nonce: 0,
            status: Status::Idle,
            last_change: 0,
            wallet,
            balance: 0,
            tally: Tally::default(),
        }
    }

    fn transition(&mut self, status: Status, height: u64) {
        self.status = status;
        self.last_change = height;
    }

    fn settled(&self) -> Status {
        if self.balance == 0 {
            Status::Idle
        } else {
            Status::Ready
        }
    }

    /// Pick the next instruction to submit in the block at `height`.
    pub fn tick(
        &mut self,
        height: u64,
        token: TokenId,
        params: &Params,
        rng: &mut impl Rng,
    ) -> Option<Transaction> {
        let instruction = match self.status {
            Status::Idle => {
                if self.wallet == 0 {
                    return None;
                }
                let amount = rng.gen_range(1..=self.wallet.min(params.max_deposit));
                self.transition(Status::Depositing, height);
                Some(Instruction::Deposit { token, amount })
            }
            Status::Ready => {
                if self.balance == 0 {
                    self.transition(Status::Idle, height);
                    return None;
                }
                if rng.gen_ratio(1, params.withdraw_ratio) {
                    self.transition(Status::Withdrawing, height);
                    Some(Instruction::Withdraw {
                        token,
                        amount: self.balance,
                    })
                } else {
                    let amount = rng.gen_range(1..=self.balance.min(params.max_stake));
                    let side = if rng.gen_bool(0.5) {
                        Side::Banker
                    } else {
                        Side::Player
                    };
                    self.transition(Status::Staking, height);
                    Some(Instruction::StartWager {
                        token,
                        amount,
                        side,
                    })
                }
            }
            Status::Pending { commitment } => {
                if height <= commitment {
                    None
                } else if height > commitment + params.randomness_window {
                    debug!(account = ?self.public_key, commitment, "Wager expired");
                    self.transition(Status::Expired { commitment }, height);
                    None
                } else if rng.gen_ratio(1, params.forget_ratio) {
                    None
                } else {
                    self.transition(Status::Resolving { commitment }, height);
                    Some(Instruction::ResolveWager)
                }
            }
            Status::Depositing
            | Status::Staking
            | Status::Resolving { .. }
            | Status::Withdrawing
            | Status::Expired { .. } => None,
        };
        instruction.map(|instruction| self.create_transaction(instruction))
    }

    pub fn apply_event(&mut self, event: &Event, height: u64) {
        match event {
            Event::Deposited {
                player,
                amount,
                balance,
                ..
            } if player == &self.public_key => {
                self.wallet = self.wallet.saturating_sub(*amount);
                self.balance = *balance;
                self.transition(Status::Ready, height);
            }
            Event::Withdrawn {
                player,
                amount,
                balance,
                ..
            } if player == &self.public_key => {
                self.wallet = self.wallet.saturating_add(*amount);
                self.balance = *balance;
                info!(account = ?self.public_key, wallet = self.wallet, "Cashed out");
                self.transition(self.settled(), height);
            }
            Event::WagerStarted {
                player,
                stake,
                commitment,
                ..
            } if player == &self.public_key => {
                self.balance = self.balance.saturating_sub(*stake);
                self.tally.wagers += 1;
                self.transition(
                    Status::Pending {
                        commitment: *commitment,
                    },
                    height,
                );
            }
            Event::WagerResolved {
                player,
                stake,
                outcome,
                payout,
                ..
            } if player == &self.public_key => {
                self.balance = self.balance.saturating_add(*payout);
                if payout > stake {
                    self.tally.wins += 1;
                }
                debug!(account = ?self.public_key, ?outcome, payout, "Resolved");
                self.transition(self.settled(), height);
            }
            Event::WagerRefunded { player, stake, .. } if player == &self.public_key => {
                self.balance = self.balance.saturating_add(*stake);
                self.tally.refunds += 1;
                self.transition(self.settled(), height);
            }
            Event::WagerForfeited { player, stake, .. } if player == &self.public_key => {
                self.tally.forfeits += 1;
                debug!(account = ?self.public_key, stake, "Forfeited");
                self.transition(self.settled(), height);
            }
            Event::Rejected {
                account,
                error_code,
                message,
            } if account == &self.public_key => {
                self.tally.rejected += 1;
                debug!(account = ?self.public_key, error_code, reason = %message, "Rejected");
                let next = match (self.status, *error_code) {
                    (Status::Resolving { commitment }, ERROR_RANDOMNESS_EXPIRED) => {
                        Status::Expired { commitment }
                    }
                    (Status::Resolving { commitment }, _) => Status::Pending { commitment },
                    // A wager we lost track of is still open on chain.
                    (Status::Staking, ERROR_WAGER_PENDING) => {
                        Status::Pending { commitment: height }
                    }
                    _ => self.settled(),
                };
                self.transition(next, height);
            }
            _ => {}
        }
    }

    /// Adopt the nonce execution expects next.
    pub fn sync_nonce(&mut self, next: u64) {
        if self.nonce != next {
            warn!(account = ?self.public_key, from = self.nonce, to = next, "Update nonce");
            self.nonce = next;
        }
    }

    /// Forget an in-flight instruction that never produced an event.
    fn reset(&mut self, height: u64) {
        let next = match self.status {
            Status::Resolving { commitment } => Status::Pending { commitment },
            _ => self.settled(),
        };
        self.transition(next, height);
    }

    fn create_transaction(&mut self, instruction: Instruction) -> Transaction {
        let nonce = self.nonce;
        self.nonce += 1;
        Transaction::sign(&self.private_key, nonce, instruction)
    }
}

/// The administrator: keeps the reserve funded and clears expired wagers.
pub struct House {
    private_key: PrivateKey,
    public_key: PublicKey,
    nonce: u64,
    underfunded: bool,
    recoveries: BTreeSet<PublicKey>,
}

impl House {
    pub fn new(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
            nonce: 0,
            underfunded: false,
            recoveries: BTreeSet::new(),
        }
    }

    /// At most one instruction per block: funding first, then one recovery.
    fn tick(&mut self, token: TokenId, params: &Params) -> Option<Transaction> {
        let instruction = if self.underfunded {
            self.underfunded = false;
            info!(amount = params.top_up, "Topping up reserve");
            Instruction::FundTreasury {
                token,
                amount: params.top_up,
            }
        } else {
            let player = self.recoveries.pop_first()?;
            info!(?player, "Recovering expired wager");
            Instruction::RecoverWager { player }
        };
        let nonce = self.nonce;
        self.nonce += 1;
        Some(Transaction::sign(&self.private_key, nonce, instruction))
    }

    fn apply_event(&mut self, event: &Event) {
        match event {
            Event::Rejected {
                account,
                error_code: ERROR_RESERVE_INSUFFICIENT,
                ..
            } if account != &self.public_key => {
                self.underfunded = true;
            }
            Event::Rejected {
                account, message, ..
            } if account == &self.public_key => {
                warn!(reason = %message, "House instruction rejected");
            }
            Event::TreasuryFunded { reserve, .. } => {
                info!(reserve, "Reserve funded");
            }
            _ => {}
        }
    }
}

pub struct Engine {
    pub token: TokenId,
    pub params: Params,
    pub house: House,
    pub players: BTreeMap<PublicKey, Player>,
}

impl Engine {
    pub fn new(token: TokenId, params: Params, house: House) -> Self {
        Self {
            token,
            params,
            house,
            players: BTreeMap::new(),
        }
    }

    pub fn add_player(&mut self, private_key: PrivateKey, wallet: u64) {
        let player = Player::new(private_key, wallet);
        self.players.insert(player.public_key.clone(), player);
    }

    pub fn accounts(&self) -> Vec<PublicKey> {
        self.players.keys().cloned().collect()
    }

    /// Collect transactions for the block at `height`.
    pub fn tick(&mut self, height: u64, rng: &mut impl Rng) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        if let Some(tx) = self.house.tick(self.token, &self.params) {
            transactions.push(tx);
        }
        for player in self.players.values_mut() {
            if let Some(tx) = player.tick(height, self.token, &self.params, rng) {
                transactions.push(tx);
            }
            if let Status::Expired { .. } = player.status {
                self.house.recoveries.insert(player.public_key.clone());
            }
        }
        transactions
    }

    pub fn apply(&mut self, height: u64, outputs: &[Output]) {
        for output in outputs {
            let Output::Event(event) = output else {
                continue;
            };
            self.house.apply_event(event);
            match event {
                Event::WagerRefunded { player, .. } | Event::WagerForfeited { player, .. } => {
                    self.house.recoveries.remove(player);
                }
                _ => {}
            }
            for player in self.players.values_mut() {
                player.apply_event(event, height);
            }
        }
    }

    pub fn sync_nonces(&mut self, nonces: &BTreeMap<PublicKey, u64>) {
        for (public, next) in nonces {
            if public == &self.house.public_key {
                self.house.nonce = *next;
            } else if let Some(player) = self.players.get_mut(public) {
                player.sync_nonce(*next);
            }
        }
    }

    /// Reset players whose instruction has been in flight for more than `threshold` blocks.
    pub fn stuck(&mut self, height: u64, threshold: u64) -> Vec<PublicKey> {
        let mut stuck = Vec::new();
        for (public, player) in self.players.iter_mut() {
            if player.status.in_flight() && player.last_change + threshold < height {
                player.reset(height);
                stuck.push(public.clone());
            }
        }
        stuck
    }

    /// Players per phase: (idle, ready, pending, in flight, expired).
    pub fn stats(&self) -> (usize, usize, usize, usize, usize) {
        let mut stats = (0, 0, 0, 0, 0);
        for player in self.players.values() {
            match player.status {
                Status::Idle => stats.0 += 1,
                Status::Ready => stats.1 += 1,
                Status::Pending { .. } => stats.2 += 1,
                Status::Expired { .. } => stats.4 += 1,
                _ => stats.3 += 1,
            }
        }
        stats
    }

    pub fn tally(&self) -> Tally {
        self.players
            .values()
            .fold(Tally::default(), |mut total, player| {
                total.wagers += player.tally.wagers;
                total.wins += player.tally.wins;
                total.refunds += player.tally.refunds;
                total.forfeits += player.tally.forfeits;
                total.rejected += player.tally.rejected;
                total
            })
    }
}
