use super::*;
use commonware_codec::{Encode, FixedSize, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, Signer};

#[test]
fn test_token_id_is_derived_from_symbol() {
    let chip = TokenId::from_symbol("CHIP");
    assert_eq!(chip, TokenId::from_symbol("CHIP"));
    assert_ne!(chip, TokenId::from_symbol("chip"));
    assert_eq!(chip.to_string().len(), 64);
}

#[test]
fn test_wager_timing_helpers() {
    let wager = Wager::new(TokenId::from_symbol("CHIP"), 10, Side::Player, 41);
    assert!(!wager.resolved);
    assert_eq!(wager.reveal_height(), 42);
    assert_eq!(wager.last_resolvable_height(256), 297);

    let encoded = wager.encode();
    assert_eq!(encoded.len(), Wager::SIZE);
    assert_eq!(Wager::read(&mut &encoded[..]).unwrap(), wager);
}

#[test]
fn test_outcome_wins() {
    assert!(Outcome::Banker.wins(Side::Banker));
    assert!(!Outcome::Banker.wins(Side::Player));
    assert!(Outcome::Player.wins(Side::Player));
    assert!(!Outcome::Tie.wins(Side::Banker));
    assert!(!Outcome::Tie.wins(Side::Player));
}

#[test]
fn test_side_rejects_unknown_discriminant() {
    let bytes = [2u8];
    assert!(matches!(
        Side::read(&mut &bytes[..]),
        Err(commonware_codec::Error::InvalidEnum(2))
    ));
}

#[test]
fn test_custody_unowed_saturates() {
    let custody = CustodyState {
        custodied: 100,
        user_total: 70,
        pending_stakes: 20,
    };
    assert_eq!(custody.unowed(), 10);

    let short = CustodyState {
        custodied: 10,
        user_total: 70,
        pending_stakes: 20,
    };
    assert_eq!(short.unowed(), 0);
}

#[test]
fn test_system_config_rejects_invalid_edge_on_decode() {
    let mut config = SystemConfig {
        admin: PrivateKey::from_seed(1).public_key(),
        max_bet: 100,
        house_edge_percent: 5,
        min_house_cut: 1,
        lifecycle: Lifecycle::Active,
        randomness_window: DEFAULT_RANDOMNESS_WINDOW,
    };
    let encoded = config.encode();
    assert_eq!(encoded.len(), SystemConfig::SIZE);
    assert_eq!(SystemConfig::read(&mut &encoded[..]).unwrap(), config);

    config.house_edge_percent = 0;
    let encoded = config.encode();
    assert!(SystemConfig::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_house_edge_bounds() {
    assert!(SystemConfig::validate_house_edge(1).is_ok());
    assert!(SystemConfig::validate_house_edge(100).is_ok());
    assert_eq!(
        SystemConfig::validate_house_edge(0),
        Err(WagerError::InvalidHouseEdge { percent: 0 })
    );
    assert_eq!(
        SystemConfig::validate_house_edge(101),
        Err(WagerError::InvalidHouseEdge { percent: 101 })
    );
}

#[test]
fn test_error_taxonomy() {
    let early = WagerError::TooEarly {
        commitment: 5,
        height: 5,
    };
    assert_eq!(early.kind(), ErrorKind::Timing);
    assert!(early.is_retryable());
    assert_eq!(early.code(), ERROR_TOO_EARLY);

    let expired = WagerError::RandomnessExpired {
        commitment: 5,
        deadline: 261,
    };
    assert_eq!(expired.kind(), ErrorKind::Timing);
    assert!(!expired.is_retryable());

    assert_eq!(
        WagerError::ReserveInsufficient {
            reserve: 0,
            needed: 10
        }
        .kind(),
        ErrorKind::Invariant
    );
    assert_eq!(WagerError::Unauthorized.kind(), ErrorKind::Authorization);
    assert_eq!(WagerError::Paused.kind(), ErrorKind::Lifecycle);
    assert_eq!(WagerError::WagerPending.kind(), ErrorKind::Validation);
}

#[test]
fn test_error_codes_are_unique() {
    let chip = TokenId::from_symbol("CHIP");
    let errors = [
        WagerError::InvalidAmount,
        WagerError::StakeAboveMaximum {
            stake: 1,
            max_bet: 0,
        },
        WagerError::TokenNotAllowed(chip),
        WagerError::UnknownToken(chip),
        WagerError::FractionalToken(chip, 6),
        WagerError::TokenAlreadyAllowed(chip),
        WagerError::InsufficientBalance { have: 0, need: 1 },
        WagerError::InsufficientExternalBalance { have: 0, need: 1 },
        WagerError::WagerPending,
        WagerError::NoPendingWager,
        WagerError::InvalidHouseEdge { percent: 0 },
        WagerError::TooEarly {
            commitment: 0,
            height: 0,
        },
        WagerError::RandomnessExpired {
            commitment: 0,
            deadline: 0,
        },
        WagerError::WagerNotExpired {
            commitment: 0,
            deadline: 0,
        },
        WagerError::ReserveInsufficient {
            reserve: 0,
            needed: 1,
        },
        WagerError::RandomnessUnavailable(1),
        WagerError::WagerAlreadyResolved,
        WagerError::Overflow,
        WagerError::AccountingMismatch(chip),
        WagerError::NotConfigured,
        WagerError::Unauthorized,
        WagerError::Paused,
        WagerError::NotPaused,
    ];
    let mut codes: Vec<u8> = errors.iter().map(WagerError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}
