//! End-to-end wager flows through block execution.

use crate::mocks::{
    chip, create_account_keypair, create_entropy, entropy_for_outcome, entropy_with_scores, events,
    execute, fractional, setup_state, spare, test_genesis, TEST_RESERVE, TEST_WALLET,
};
use crate::{audit_solvency, query, Memory, State};
use banco_types::{
    execution::{Event, Instruction, Key, Transaction, Value},
    wager::*,
    Genesis,
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::Digest,
    Signer,
};
use commonware_runtime::deterministic::Runner;
use commonware_runtime::Runner as _;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;

#[derive(Clone, Copy)]
enum Who {
    Admin,
    Player(usize),
}

use Who::{Admin, Player};

struct Harness {
    state: Memory,
    height: u64,
    admin: PrivateKey,
    players: Vec<PrivateKey>,
    nonces: HashMap<PublicKey, u64>,
}

impl Harness {
    async fn new(players: usize) -> Self {
        Self::with_genesis(players, |_| {}).await
    }

    async fn with_genesis(players: usize, modify: impl FnOnce(&mut Genesis)) -> Self {
        let (admin, admin_public) = create_account_keypair(0);
        let players: Vec<PrivateKey> = (1..=players as u64)
            .map(|seed| create_account_keypair(seed).0)
            .collect();
        let publics: Vec<PublicKey> = players.iter().map(|p| p.public_key()).collect();

        let mut genesis = test_genesis(&admin_public, &publics);
        modify(&mut genesis);
        Self {
            state: setup_state(&genesis).await,
            height: 0,
            admin,
            players,
            nonces: HashMap::new(),
        }
    }

    fn signer(&self, who: Who) -> PrivateKey {
        match who {
            Admin => self.admin.clone(),
            Player(i) => self.players[i].clone(),
        }
    }

    fn public(&self, who: Who) -> PublicKey {
        self.signer(who).public_key()
    }

    async fn block(&mut self, entropy: Digest, txs: Vec<(Who, Instruction)>) -> Vec<Event> {
        self.height += 1;
        let mut signed = Vec::new();
        for (who, instruction) in txs {
            let signer = self.signer(who);
            let nonce = self.nonces.entry(signer.public_key()).or_default();
            signed.push(Transaction::sign(&signer, *nonce, instruction));
            *nonce += 1;
        }
        let outputs = execute(&mut self.state, self.height, entropy, signed).await;
        events(&outputs)
    }

    async fn step(&mut self, who: Who, instruction: Instruction) -> Vec<Event> {
        self.block(create_entropy(self.height + 1), vec![(who, instruction)])
            .await
    }

    async fn resolve(&mut self, entropy: Digest) -> Vec<Event> {
        self.block(entropy, vec![(Player(0), Instruction::ResolveWager)])
            .await
    }

    async fn balance(&self, who: Who) -> u64 {
        query::balance(&self.state, &self.public(who), &chip())
            .await
            .unwrap()
    }

    async fn wallet(&self, who: Who) -> u64 {
        query::wallet(&self.state, &self.public(who), &chip())
            .await
            .unwrap()
    }

    async fn reserve(&self) -> u64 {
        query::reserve(&self.state, &chip()).await.unwrap()
    }

    async fn assert_solvent(&self) {
        let accounts: Vec<PublicKey> = (0..self.players.len())
            .map(|i| self.public(Player(i)))
            .collect();
        let report = audit_solvency(&self.state, &chip(), &accounts).await.unwrap();
        assert!(report.is_solvent(), "insolvent: {report:?}");
        assert_eq!(report.audited_balances, report.user_total);
    }
}

fn deposit(amount: u64) -> Instruction {
    Instruction::Deposit {
        token: chip(),
        amount,
    }
}

fn withdraw(amount: u64) -> Instruction {
    Instruction::Withdraw {
        token: chip(),
        amount,
    }
}

fn fund(amount: u64) -> Instruction {
    Instruction::FundTreasury {
        token: chip(),
        amount,
    }
}

fn start(amount: u64, side: Side) -> Instruction {
    Instruction::StartWager {
        token: chip(),
        amount,
        side,
    }
}

fn rejection(events: &[Event]) -> Option<u8> {
    events.iter().find_map(|event| match event {
        Event::Rejected { error_code, .. } => Some(*error_code),
        _ => None,
    })
}

fn resolved(events: &[Event]) -> Option<(Outcome, u64, u64)> {
    events.iter().find_map(|event| match event {
        Event::WagerResolved {
            outcome,
            payout,
            commission,
            ..
        } => Some((*outcome, *payout, *commission)),
        _ => None,
    })
}

#[test]
fn test_deposit_and_withdraw() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;

        let events = h.step(Player(0), deposit(500)).await;
        assert!(matches!(
            events.as_slice(),
            [Event::Deposited { amount: 500, balance: 500, .. }]
        ));
        assert_eq!(h.wallet(Player(0)).await, TEST_WALLET - 500);

        let events = h.step(Player(0), withdraw(200)).await;
        assert!(matches!(
            events.as_slice(),
            [Event::Withdrawn { amount: 200, balance: 300, .. }]
        ));
        assert_eq!(h.balance(Player(0)).await, 300);
        assert_eq!(h.wallet(Player(0)).await, TEST_WALLET - 300);

        let events = h.step(Player(0), withdraw(301)).await;
        assert_eq!(rejection(&events), Some(ERROR_INSUFFICIENT_BALANCE));
        assert_eq!(h.balance(Player(0)).await, 300);

        let events = h.step(Player(0), deposit(0)).await;
        assert_eq!(rejection(&events), Some(ERROR_INVALID_AMOUNT));

        let events = h.step(Player(0), deposit(TEST_WALLET)).await;
        assert_eq!(
            rejection(&events),
            Some(ERROR_INSUFFICIENT_EXTERNAL_BALANCE)
        );
        h.assert_solvent().await;
    });
}

#[test]
fn test_player_win_pays_double() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;
        let events = h.step(Player(0), start(10, Side::Player)).await;
        assert!(matches!(
            events.as_slice(),
            [Event::WagerStarted { stake: 10, commitment: 2, .. }]
        ));
        assert_eq!(h.balance(Player(0)).await, 90);

        let events = h.resolve(entropy_with_scores(3, 7)).await;
        assert!(matches!(
            events.as_slice(),
            [Event::WagerResolved {
                banker_score: 3,
                player_score: 7,
                outcome: Outcome::Player,
                payout: 20,
                commission: 0,
                ..
            }]
        ));
        assert_eq!(h.balance(Player(0)).await, 110);
        assert_eq!(h.reserve().await, TEST_RESERVE - 10);
        assert!(query::pending_wager(&h.state, &h.public(Player(0)))
            .await
            .unwrap()
            .is_none());
        h.assert_solvent().await;
    });
}

#[test]
fn test_banker_win_takes_commission() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Banker)).await;

        let events = h.resolve(entropy_for_outcome(Outcome::Banker)).await;
        assert_eq!(resolved(&events), Some((Outcome::Banker, 19, 1)));
        assert_eq!(h.balance(Player(0)).await, 109);
        assert_eq!(h.reserve().await, TEST_RESERVE - 9);
        h.assert_solvent().await;
    });
}

#[test]
fn test_tie_and_loss() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;

        h.step(Player(0), start(10, Side::Banker)).await;
        let events = h.resolve(entropy_for_outcome(Outcome::Tie)).await;
        assert_eq!(resolved(&events), Some((Outcome::Tie, 10, 0)));
        assert_eq!(h.balance(Player(0)).await, 100);
        assert_eq!(h.reserve().await, TEST_RESERVE);

        h.step(Player(0), start(10, Side::Banker)).await;
        let events = h.resolve(entropy_for_outcome(Outcome::Player)).await;
        assert_eq!(resolved(&events), Some((Outcome::Player, 0, 0)));
        assert_eq!(h.balance(Player(0)).await, 90);
        assert_eq!(h.reserve().await, TEST_RESERVE + 10);
        h.assert_solvent().await;
    });
}

#[test]
fn test_single_pending_wager() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Player)).await;

        let events = h.step(Player(0), start(10, Side::Player)).await;
        assert_eq!(rejection(&events), Some(ERROR_WAGER_PENDING));
        assert_eq!(h.balance(Player(0)).await, 90);

        let events = h.step(Player(0), Instruction::ResolveWager).await;
        assert!(resolved(&events).is_some());
        let events = h.step(Player(0), Instruction::ResolveWager).await;
        assert_eq!(rejection(&events), Some(ERROR_NO_PENDING_WAGER));
    });
}

#[test]
fn test_stored_resolved_wager_is_not_paid() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        let player = h.public(Player(0));
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Player)).await;

        let mut wager = query::pending_wager(&h.state, &player)
            .await
            .unwrap()
            .unwrap();
        wager.resolved = true;
        h.state
            .insert(Key::Wager(player.clone()), Value::Wager(wager))
            .await
            .unwrap();

        let events = h.resolve(entropy_for_outcome(Outcome::Player)).await;
        assert_eq!(rejection(&events), Some(ERROR_WAGER_ALREADY_RESOLVED));
        assert_eq!(h.balance(Player(0)).await, 90);
        assert_eq!(h.reserve().await, TEST_RESERVE);
    });
}

#[test]
fn test_resolution_timing() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::with_genesis(2, |genesis| genesis.randomness_window = 3).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(1), deposit(100)).await;

        // Same block as the start: randomness does not exist yet
        let events = h
            .block(
                create_entropy(3),
                vec![
                    (Player(0), start(10, Side::Player)),
                    (Player(0), Instruction::ResolveWager),
                    (Player(1), start(10, Side::Banker)),
                ],
            )
            .await;
        assert_eq!(rejection(&events), Some(ERROR_TOO_EARLY));
        assert!(WagerError::TooEarly {
            commitment: 3,
            height: 3
        }
        .is_retryable());

        // Within the window (commitment 3, window 3 -> heights 4..=6)
        h.step(Admin, Instruction::SetMinHouseCut { amount: 1 }).await;
        h.step(Admin, Instruction::SetMinHouseCut { amount: 1 }).await;
        let events = h.step(Player(0), Instruction::ResolveWager).await;
        assert!(resolved(&events).is_some());

        // Past the window
        let events = h.step(Player(1), Instruction::ResolveWager).await;
        assert_eq!(rejection(&events), Some(ERROR_RANDOMNESS_EXPIRED));
        assert!(query::pending_wager(&h.state, &h.public(Player(1)))
            .await
            .unwrap()
            .is_some());
    });
}

#[test]
fn test_recover_expired_wager() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::with_genesis(1, |genesis| genesis.randomness_window = 2).await;
        let player = h.public(Player(0));
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(40, Side::Player)).await;

        let recover = Instruction::RecoverWager {
            player: player.clone(),
        };
        let events = h.step(Admin, recover.clone()).await;
        assert_eq!(rejection(&events), Some(ERROR_WAGER_NOT_EXPIRED));

        let events = h.step(Player(0), recover.clone()).await;
        assert_eq!(rejection(&events), Some(ERROR_UNAUTHORIZED));

        // Commitment 2, window 2: expired from height 5
        let events = h.step(Admin, recover.clone()).await;
        assert_eq!(
            events,
            vec![Event::WagerForfeited {
                player: player.clone(),
                token: chip(),
                stake: 40,
                reserve: TEST_RESERVE + 40,
            }]
        );
        assert_eq!(h.balance(Player(0)).await, 60);
        assert_eq!(h.reserve().await, TEST_RESERVE + 40);
        assert!(query::pending_wager(&h.state, &player)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            query::custody(&h.state, &chip()).await.unwrap().pending_stakes,
            0
        );
        h.assert_solvent().await;
    });
}

#[test]
fn test_unresolved_losing_wager_is_not_refunded() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::with_genesis(1, |genesis| genesis.randomness_window = 2).await;
        let player = h.public(Player(0));
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(40, Side::Banker)).await;

        // The reveal block shows a loss and the player walks away
        h.block(entropy_for_outcome(Outcome::Player), vec![]).await;
        h.block(create_entropy(4), vec![]).await;

        let events = h.step(Admin, Instruction::RecoverWager { player }).await;
        assert!(matches!(
            events.as_slice(),
            [Event::WagerForfeited { stake: 40, .. }]
        ));
        // Same books as resolving the loss
        assert_eq!(h.balance(Player(0)).await, 60);
        assert_eq!(h.reserve().await, TEST_RESERVE + 40);
        h.assert_solvent().await;
    });
}

#[test]
fn test_admin_operations_reject_players() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Banker)).await;
        let player = h.public(Player(0));

        let instructions = [
            Instruction::AddToken { token: spare() },
            Instruction::RemoveToken { token: chip() },
            Instruction::SetMaxBet { amount: 5 },
            Instruction::SetHouseEdge { percent: 50 },
            Instruction::SetMinHouseCut { amount: 7 },
            fund(10),
            Instruction::Pause,
            Instruction::Unpause,
            Instruction::Closeout { token: chip() },
            Instruction::RecoverWager {
                player: player.clone(),
            },
        ];

        // Once while active and once while paused
        for paused in [false, true] {
            if paused {
                h.step(Admin, Instruction::Pause).await;
            }
            for instruction in instructions.iter().cloned() {
                let config = query::config(&h.state).await.unwrap();
                let custody = query::custody(&h.state, &chip()).await.unwrap();
                let reserve = h.reserve().await;
                let admin_wallet = h.wallet(Admin).await;
                let player_wallet = h.wallet(Player(0)).await;
                let allowed = (
                    query::is_allowed(&h.state, &chip()).await.unwrap(),
                    query::is_allowed(&h.state, &spare()).await.unwrap(),
                );

                let events = h.step(Player(0), instruction.clone()).await;
                assert_eq!(
                    rejection(&events),
                    Some(ERROR_UNAUTHORIZED),
                    "{instruction:?} (paused={paused})"
                );

                assert_eq!(query::config(&h.state).await.unwrap(), config);
                assert_eq!(query::custody(&h.state, &chip()).await.unwrap(), custody);
                assert_eq!(h.reserve().await, reserve);
                assert_eq!(h.wallet(Admin).await, admin_wallet);
                assert_eq!(h.wallet(Player(0)).await, player_wallet);
                assert_eq!(
                    (
                        query::is_allowed(&h.state, &chip()).await.unwrap(),
                        query::is_allowed(&h.state, &spare()).await.unwrap(),
                    ),
                    allowed
                );
                assert!(query::pending_wager(&h.state, &player)
                    .await
                    .unwrap()
                    .is_some());
            }
        }
    });
}

#[test]
fn test_insufficient_reserve_rejects_banker_win() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::with_genesis(1, |genesis| genesis.treasury.clear()).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Banker)).await;

        // Gross 20, commission 1: the reserve owes 9
        let events = h.resolve(entropy_for_outcome(Outcome::Banker)).await;
        assert_eq!(rejection(&events), Some(ERROR_RESERVE_INSUFFICIENT));
        assert_eq!(h.balance(Player(0)).await, 90);
        assert_eq!(h.reserve().await, 0);

        h.step(Admin, fund(9)).await;
        let events = h.step(Player(0), Instruction::ResolveWager).await;
        assert_eq!(resolved(&events), Some((Outcome::Banker, 19, 1)));
        assert_eq!(h.balance(Player(0)).await, 109);
        assert_eq!(h.reserve().await, 0);
        h.assert_solvent().await;
    });
}

#[test]
fn test_insufficient_reserve_rejects_player_win() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::with_genesis(1, |genesis| genesis.treasury.clear()).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Player)).await;

        let events = h.resolve(entropy_for_outcome(Outcome::Player)).await;
        assert_eq!(rejection(&events), Some(ERROR_RESERVE_INSUFFICIENT));
        assert_eq!(h.balance(Player(0)).await, 90);
        let wager = query::pending_wager(&h.state, &h.public(Player(0)))
            .await
            .unwrap()
            .expect("wager stays pending");
        assert!(!wager.resolved);
        assert_eq!(
            query::custody(&h.state, &chip()).await.unwrap().pending_stakes,
            10
        );

        // Funding the house lets a later resolution (same entropy window) succeed
        h.step(Admin, fund(50)).await;
        let events = h.step(Player(0), Instruction::ResolveWager).await;
        let outcome = resolved(&events).map(|(outcome, ..)| outcome);
        assert_eq!(outcome, Some(Outcome::Player));
        assert_eq!(h.balance(Player(0)).await, 110);
        assert_eq!(h.reserve().await, 40);
        h.assert_solvent().await;
    });
}

#[test]
fn test_stake_limits() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(5_000)).await;

        let events = h.step(Player(0), start(0, Side::Banker)).await;
        assert_eq!(rejection(&events), Some(ERROR_INVALID_AMOUNT));

        let events = h.step(Player(0), start(1_001, Side::Banker)).await;
        assert_eq!(rejection(&events), Some(ERROR_STAKE_ABOVE_MAXIMUM));

        h.step(Admin, Instruction::SetMaxBet { amount: 2_000 }).await;
        let events = h.step(Player(0), start(1_001, Side::Banker)).await;
        assert!(rejection(&events).is_none());

        let events = h.step(Admin, Instruction::SetMaxBet { amount: 0 }).await;
        assert_eq!(rejection(&events), Some(ERROR_INVALID_AMOUNT));
    });
}

#[test]
fn test_house_edge_read_at_resolution() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(500)).await;
        let events = h
            .block(
                create_entropy(2),
                vec![
                    (Player(0), start(100, Side::Banker)),
                    (Admin, Instruction::SetHouseEdge { percent: 10 }),
                ],
            )
            .await;
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ConfigUpdated { house_edge_percent: 10, .. }
        )));

        let events = h.resolve(entropy_for_outcome(Outcome::Banker)).await;
        assert_eq!(resolved(&events), Some((Outcome::Banker, 180, 20)));

        for percent in [0, 101] {
            let events = h.step(Admin, Instruction::SetHouseEdge { percent }).await;
            assert_eq!(rejection(&events), Some(ERROR_INVALID_HOUSE_EDGE));
        }
        let config = query::config(&h.state).await.unwrap().unwrap();
        assert_eq!(config.house_edge_percent, 10);
    });
}

#[test]
fn test_token_registry() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        let gem = spare();
        let gem_deposit = Instruction::Deposit {
            token: gem,
            amount: 10,
        };
        let gem_withdraw = Instruction::Withdraw {
            token: gem,
            amount: 10,
        };

        let events = h.step(Player(0), gem_deposit.clone()).await;
        assert_eq!(rejection(&events), Some(ERROR_TOKEN_NOT_ALLOWED));

        let events = h.step(Player(0), Instruction::AddToken { token: gem }).await;
        assert_eq!(rejection(&events), Some(ERROR_UNAUTHORIZED));

        let fraction = fractional();
        let events = h.step(Admin, Instruction::AddToken { token: fraction }).await;
        assert_eq!(rejection(&events), Some(ERROR_FRACTIONAL_TOKEN));

        let unknown = TokenId::from_symbol("NOPE");
        let events = h.step(Admin, Instruction::AddToken { token: unknown }).await;
        assert_eq!(rejection(&events), Some(ERROR_UNKNOWN_TOKEN));

        let events = h.step(Admin, Instruction::AddToken { token: gem }).await;
        assert_eq!(events, vec![Event::TokenAdded { token: gem }]);
        let events = h.step(Admin, Instruction::AddToken { token: gem }).await;
        assert_eq!(rejection(&events), Some(ERROR_TOKEN_ALREADY_ALLOWED));

        h.step(Player(0), gem_deposit).await;
        h.step(Admin, Instruction::RemoveToken { token: gem }).await;
        assert!(!query::is_allowed(&h.state, &gem).await.unwrap());

        // Balance survives removal but cannot move until the token returns
        let player = h.public(Player(0));
        assert_eq!(query::balance(&h.state, &player, &gem).await.unwrap(), 10);
        let events = h.step(Player(0), gem_withdraw.clone()).await;
        assert_eq!(rejection(&events), Some(ERROR_TOKEN_NOT_ALLOWED));

        h.step(Admin, Instruction::AddToken { token: gem }).await;
        let events = h.step(Player(0), gem_withdraw).await;
        assert!(rejection(&events).is_none());
        let wallet = query::wallet(&h.state, &player, &gem).await.unwrap();
        assert_eq!(wallet, TEST_WALLET);
    });
}

#[test]
fn test_removed_token_wager_still_resolves() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Banker)).await;
        h.step(Admin, Instruction::RemoveToken { token: chip() }).await;

        let events = h.resolve(entropy_for_outcome(Outcome::Tie)).await;
        assert_eq!(resolved(&events), Some((Outcome::Tie, 10, 0)));
        assert_eq!(h.balance(Player(0)).await, 100);
    });
}

#[test]
fn test_pause_gates_player_operations() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(1).await;
        h.step(Player(0), deposit(100)).await;
        h.step(Player(0), start(10, Side::Player)).await;

        let events = h.step(Player(0), Instruction::Pause).await;
        assert_eq!(rejection(&events), Some(ERROR_UNAUTHORIZED));
        let events = h.step(Admin, Instruction::Unpause).await;
        assert_eq!(rejection(&events), Some(ERROR_NOT_PAUSED));
        let events = h.step(Admin, Instruction::Closeout { token: chip() }).await;
        assert_eq!(rejection(&events), Some(ERROR_NOT_PAUSED));

        assert_eq!(h.step(Admin, Instruction::Pause).await, vec![Event::Paused]);
        let events = h.step(Admin, Instruction::Pause).await;
        assert_eq!(rejection(&events), Some(ERROR_PAUSED));

        for instruction in [
            deposit(10),
            withdraw(10),
            start(10, Side::Banker),
            Instruction::ResolveWager,
        ] {
            let events = h.step(Player(0), instruction).await;
            assert_eq!(rejection(&events), Some(ERROR_PAUSED));
        }

        // Administration keeps working while paused
        let events = h.step(Admin, Instruction::SetMinHouseCut { amount: 2 }).await;
        assert!(rejection(&events).is_none());

        let events = h.step(Admin, Instruction::Unpause).await;
        assert_eq!(events, vec![Event::Unpaused]);
        let events = h.step(Player(0), Instruction::ResolveWager).await;
        assert!(resolved(&events).is_some());
        h.assert_solvent().await;
    });
}

#[test]
fn test_closeout_keeps_user_funds() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new(2).await;
        h.step(Player(0), deposit(1_000)).await;
        h.step(Player(1), deposit(300)).await;
        h.step(Player(0), start(100, Side::Banker)).await;
        h.step(Admin, Instruction::Pause).await;

        let admin_wallet = h.wallet(Admin).await;
        let events = h.step(Admin, Instruction::Closeout { token: chip() }).await;
        assert_eq!(
            events,
            vec![Event::ClosedOut {
                token: chip(),
                amount: TEST_RESERVE,
                recipient: h.public(Admin),
            }]
        );
        assert_eq!(h.wallet(Admin).await, admin_wallet + TEST_RESERVE);
        assert_eq!(h.reserve().await, 0);
        h.assert_solvent().await;

        // A pending wager is refundable at any time while paused
        let player = h.public(Player(0));
        let events = h.step(Admin, Instruction::RecoverWager { player }).await;
        assert!(matches!(
            events.as_slice(),
            [Event::WagerRefunded { stake: 100, .. }]
        ));

        // Nothing is left to take
        let events = h.step(Admin, Instruction::Closeout { token: chip() }).await;
        assert!(matches!(
            events.as_slice(),
            [Event::ClosedOut { amount: 0, .. }]
        ));

        h.step(Admin, Instruction::Unpause).await;
        h.step(Player(0), withdraw(1_000)).await;
        h.step(Player(1), withdraw(300)).await;
        assert_eq!(h.wallet(Player(0)).await, TEST_WALLET);
        assert_eq!(h.wallet(Player(1)).await, TEST_WALLET);
        assert_eq!(
            query::custody(&h.state, &chip()).await.unwrap(),
            CustodyState::default()
        );
    });
}

#[test]
fn test_random_play_stays_solvent() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::with_genesis(4, |genesis| genesis.randomness_window = 8).await;
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..120 {
            let mut txs = Vec::new();
            for i in 0..4 {
                let instruction = match rng.gen_range(0..5) {
                    0 => deposit(rng.gen_range(1..400)),
                    1 => withdraw(rng.gen_range(1..200)),
                    2 => start(
                        rng.gen_range(1..300),
                        if rng.gen_bool(0.5) {
                            Side::Banker
                        } else {
                            Side::Player
                        },
                    ),
                    _ => Instruction::ResolveWager,
                };
                txs.push((Player(i), instruction));
            }
            if rng.gen_bool(0.05) {
                txs.push((Admin, fund(rng.gen_range(1..100))));
            }
            let mut seed = [0u8; 8];
            rng.fill(&mut seed);
            let entropy = create_entropy(u64::from_be_bytes(seed));
            h.block(entropy, txs).await;
            h.assert_solvent().await;
        }
    });
}
