mod state_machine;

use anyhow::{bail, Context as _, Result};
use banco_execution::{audit_solvency, init_genesis, state_transition::execute_block, Memory};
use banco_types::{
    execution::{Block, MAX_BLOCK_TRANSACTIONS},
    genesis::{Allocation, AssetSpec, Funding},
    genesis_digest,
    wager::{
        TokenId, DEFAULT_HOUSE_EDGE_PERCENT, DEFAULT_MAX_BET, DEFAULT_MIN_HOUSE_CUT,
        DEFAULT_RANDOMNESS_WINDOW,
    },
    Genesis,
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::Digest,
    Digestible, Hasher, Sha256, Signer,
};
use commonware_runtime::Clock;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use state_machine::{Engine as BotEngine, House, Params};
use std::time::Duration;
use tracing::{info, warn};

pub use banco_execution::SolvencyReport;
pub use state_machine::Tally;

const STUCK_THRESHOLD: u64 = 3;
const DEFAULT_FORGET_RATIO: u32 = 40;
const DEFAULT_WITHDRAW_RATIO: u32 = 15;

/// Configuration for a randotron run (from config file)
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub seed: u64,
    pub num_players: usize,
    pub blocks: u64,
    #[serde(default)]
    pub block_interval_ms: u64,
    /// Blocks between solvency audits (0 audits only at the end).
    #[serde(default)]
    pub audit_interval: u64,

    pub symbol: String,
    /// Chips each player starts with outside custody.
    pub wallet: u64,
    /// Initial house reserve.
    pub treasury: u64,
    /// Chips the administrator keeps back for top-ups.
    #[serde(default)]
    pub house_float: u64,
    #[serde(default = "default_max_bet")]
    pub max_bet: u64,
    #[serde(default = "default_house_edge_percent")]
    pub house_edge_percent: u8,
    #[serde(default = "default_min_house_cut")]
    pub min_house_cut: u64,
    #[serde(default = "default_randomness_window")]
    pub randomness_window: u64,
    #[serde(default = "default_forget_ratio")]
    pub forget_ratio: u32,
    #[serde(default = "default_withdraw_ratio")]
    pub withdraw_ratio: u32,
}

fn default_log_level() -> String {
    "info".to_string()
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

fn default_forget_ratio() -> u32 {
    DEFAULT_FORGET_RATIO
}

fn default_withdraw_ratio() -> u32 {
    DEFAULT_WITHDRAW_RATIO
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.num_players == 0 {
            bail!("num_players must be positive");
        }
        // One transaction per player plus one from the house.
        if self.num_players >= MAX_BLOCK_TRANSACTIONS {
            bail!(
                "num_players must be below {MAX_BLOCK_TRANSACTIONS}, got {}",
                self.num_players
            );
        }
        if self.forget_ratio == 0 || self.withdraw_ratio == 0 {
            bail!("ratios must be positive");
        }
        Ok(())
    }

    fn params(&self) -> Params {
        Params {
            max_stake: self.max_bet,
            max_deposit: self.wallet,
            randomness_window: self.randomness_window,
            top_up: self.treasury.max(1),
            forget_ratio: self.forget_ratio,
            withdraw_ratio: self.withdraw_ratio,
        }
    }

    fn genesis(&self, admin: &PublicKey, players: &[PublicKey]) -> Genesis {
        let mut allocations = vec![Allocation {
            account: admin.clone(),
            symbol: self.symbol.clone(),
            amount: self.treasury.saturating_add(self.house_float),
        }];
        allocations.extend(players.iter().map(|player| Allocation {
            account: player.clone(),
            symbol: self.symbol.clone(),
            amount: self.wallet,
        }));
        Genesis {
            admin: admin.clone(),
            assets: vec![AssetSpec {
                symbol: self.symbol.clone(),
                decimals: 0,
                allowed: true,
            }],
            max_bet: self.max_bet,
            house_edge_percent: self.house_edge_percent,
            min_house_cut: self.min_house_cut,
            randomness_window: self.randomness_window,
            allocations,
            treasury: vec![Funding {
                symbol: self.symbol.clone(),
                amount: self.treasury,
            }],
        }
    }
}

/// Outcome of a completed run
#[derive(Debug)]
pub struct Summary {
    pub height: u64,
    pub tally: Tally,
    pub report: SolvencyReport,
}

/// Drives simulated players against an in-memory ledger, one block at a time.
pub struct Engine<E: Clock> {
    context: E,
    config: Config,
    state: Memory,
    token: TokenId,
    bot: BotEngine,
    rng: ChaCha20Rng,
    parent: Digest,
    height: u64,
}

impl<E: Clock> Engine<E> {
    pub async fn new(context: E, config: Config) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha20Rng::seed_from_u64(config.seed);

        // Derive keys
        let admin = PrivateKey::from_seed(rng.gen());
        let players: Vec<PrivateKey> = (0..config.num_players)
            .map(|_| PrivateKey::from_seed(rng.gen()))
            .collect();
        let public_keys: Vec<PublicKey> = players.iter().map(|p| p.public_key()).collect();

        // Boot the ledger
        let genesis = config.genesis(&admin.public_key(), &public_keys);
        let token = genesis
            .token(&config.symbol)
            .context("symbol missing from genesis")?;
        let mut state = Memory::default();
        init_genesis(&mut state, &genesis)
            .await
            .context("initialize genesis")?;

        let mut bot = BotEngine::new(token, config.params(), House::new(admin));
        for private in players {
            bot.add_player(private, config.wallet);
        }
        info!(players = config.num_players, %token, "Initialized accounts");

        Ok(Self {
            context,
            config,
            state,
            token,
            bot,
            rng,
            parent: genesis_digest(),
            height: 0,
        })
    }

    async fn step(&mut self) -> Result<()> {
        let height = self.height + 1;
        let transactions = self.bot.tick(height, &mut self.rng);

        let mut seed = [0u8; 32];
        self.rng.fill_bytes(&mut seed);
        let entropy = Sha256::hash(&seed);

        let block = Block::new(self.parent, height, entropy, transactions);
        let result = execute_block(&mut self.state, &block)
            .await
            .with_context(|| format!("execute block (height={height})"))?;
        self.bot.apply(height, &result.outputs);
        self.bot.sync_nonces(&result.processed_nonces);

        let stuck = self.bot.stuck(height, STUCK_THRESHOLD);
        if !stuck.is_empty() {
            warn!(?stuck, "Reset stuck accounts");
        }

        self.parent = block.digest();
        self.height = height;
        Ok(())
    }

    async fn audit(&self) -> Result<SolvencyReport> {
        let report = audit_solvency(&self.state, &self.token, &self.bot.accounts()).await?;
        if !report.is_solvent() {
            bail!("insolvent at height {}: {report:?}", self.height);
        }
        if report.audited_balances != report.user_total {
            bail!(
                "balances diverged at height {}: audited={} tracked={}",
                self.height,
                report.audited_balances,
                report.user_total
            );
        }
        Ok(report)
    }

    pub async fn run(mut self) -> Result<Summary> {
        let interval = Duration::from_millis(self.config.block_interval_ms);
        while self.height < self.config.blocks {
            self.step().await?;

            if self.config.audit_interval > 0 && self.height % self.config.audit_interval == 0 {
                let report = self.audit().await?;
                let (idle, ready, pending, in_flight, expired) = self.bot.stats();
                info!(
                    height = self.height,
                    reserve = report.reserve,
                    user_total = report.user_total,
                    pending_stakes = report.pending_stakes,
                    surplus = report.surplus(),
                    idle,
                    ready,
                    pending,
                    in_flight,
                    expired,
                    "Stats"
                );
            }
            if !interval.is_zero() {
                self.context.sleep(interval).await;
            }
        }

        let report = self.audit().await?;
        let tally = self.bot.tally();
        info!(
            height = self.height,
            wagers = tally.wagers,
            wins = tally.wins,
            refunds = tally.refunds,
            forfeits = tally.forfeits,
            rejected = tally.rejected,
            reserve = report.reserve,
            "Finished"
        );
        Ok(Summary {
            height: self.height,
            tally,
            report,
        })
    }
}
