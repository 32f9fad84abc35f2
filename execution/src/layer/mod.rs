use anyhow::{Context as _, Result};
use banco_types::{
    execution::{Event, Instruction, Key, Output, Transaction, Value},
    wager::{WagerError, DEFAULT_RANDOMNESS_WINDOW, MAX_ERROR_MESSAGE_LENGTH},
};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::query;
use crate::state::{load_account, validate_and_increment_nonce, PrepareError, State, Status};

mod access;
mod handlers;
mod ledger;
mod registry;
mod treasury;

/// Why an instruction did not apply.
#[derive(Debug)]
pub(crate) enum ApplyError {
    /// The instruction is invalid against current state. Its writes are discarded.
    Rejected(WagerError),
    /// Storage failed. The whole block aborts.
    State(anyhow::Error),
}

impl From<WagerError> for ApplyError {
    fn from(err: WagerError) -> Self {
        Self::Rejected(err)
    }
}

impl From<anyhow::Error> for ApplyError {
    fn from(err: anyhow::Error) -> Self {
        Self::State(err)
    }
}

pub(crate) type Applied = std::result::Result<Vec<Event>, ApplyError>;

/// Staged view of state while a block executes.
///
/// Writes collect in `pending` and reach the underlying state only through
/// [`Layer::commit`].
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,

    height: u64,
    entropy: Digest,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, height: u64, entropy: Digest) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),

            height,
            entropy,
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn remove(&mut self, key: Key) {
        self.pending.insert(key, Status::Delete);
    }

    /// Record this block's entropy and forget entropy no wager can use anymore.
    async fn record_entropy(&mut self) -> Result<()> {
        let window = query::config(self)
            .await?
            .map(|config| config.randomness_window)
            .unwrap_or(DEFAULT_RANDOMNESS_WINDOW);
        self.insert(Key::Entropy(self.height), Value::Entropy(self.entropy));
        if self.height > window {
            self.remove(Key::Entropy(self.height - window));
        }
        Ok(())
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public)
            .await
            .map_err(PrepareError::State)?;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        );

        Ok(())
    }

    async fn apply(&mut self, transaction: &Transaction) -> Applied {
        let public = &transaction.public;

        match &transaction.instruction {
            Instruction::Deposit { token, amount } => {
                self.handle_deposit(public, token, *amount).await
            }
            Instruction::Withdraw { token, amount } => {
                self.handle_withdraw(public, token, *amount).await
            }
            Instruction::StartWager {
                token,
                amount,
                side,
            } => self.handle_start_wager(public, token, *amount, *side).await,
            Instruction::ResolveWager => self.handle_resolve_wager(public).await,

            Instruction::AddToken { token } => self.handle_add_token(public, token).await,
            Instruction::RemoveToken { token } => self.handle_remove_token(public, token).await,
            Instruction::SetMaxBet { amount } => self.handle_set_max_bet(public, *amount).await,
            Instruction::SetHouseEdge { percent } => {
                self.handle_set_house_edge(public, *percent).await
            }
            Instruction::SetMinHouseCut { amount } => {
                self.handle_set_min_house_cut(public, *amount).await
            }
            Instruction::FundTreasury { token, amount } => {
                self.handle_fund_treasury(public, token, *amount).await
            }
            Instruction::Pause => self.handle_pause(public).await,
            Instruction::Unpause => self.handle_unpause(public).await,
            Instruction::Closeout { token } => self.handle_closeout(public, token).await,
            Instruction::RecoverWager { player } => self.handle_recover_wager(public, player).await,
        }
    }

    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Vec<Output>, BTreeMap<PublicKey, u64>)> {
        self.record_entropy()
            .await
            .with_context(|| format!("record entropy (height={})", self.height))?;

        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            if !tx.verify() {
                debug!(public = ?tx.public, "invalid signature; dropping transaction");
                continue;
            }
            match self.prepare(&tx).await {
                Ok(()) => {}
                Err(PrepareError::NonceMismatch { expected, got }) => {
                    debug!(
                        public = ?tx.public,
                        expected,
                        got,
                        "nonce mismatch; dropping transaction"
                    );
                    continue;
                }
                Err(PrepareError::State(err)) => {
                    return Err(err).context("state error during prepare");
                }
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));

            // Nonce bump is staged; a rejection rolls back to this point
            let checkpoint = self.pending.clone();
            match self.apply(&tx).await {
                Ok(events) => outputs.extend(events.into_iter().map(Output::Event)),
                Err(ApplyError::Rejected(err)) => {
                    self.pending = checkpoint;
                    warn!(
                        public = ?tx.public,
                        height = self.height,
                        admin = tx.instruction.is_admin(),
                        code = err.code(),
                        kind = ?err.kind(),
                        retryable = err.is_retryable(),
                        %err,
                        "rejected transaction"
                    );
                    outputs.push(Output::Event(rejected(&tx.public, &err)));
                }
                Err(ApplyError::State(err)) => {
                    return Err(err).with_context(|| {
                        format!("state error applying transaction (height={})", self.height)
                    });
                }
            }
            outputs.push(Output::Transaction(tx));
        }

        Ok((outputs, processed_nonces))
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

fn rejected(account: &PublicKey, err: &WagerError) -> Event {
    let mut message = err.to_string();
    if message.len() > MAX_ERROR_MESSAGE_LENGTH {
        let mut end = MAX_ERROR_MESSAGE_LENGTH;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    Event::Rejected {
        account: account.clone(),
        error_code: err.code(),
        message,
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
