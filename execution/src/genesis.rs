use crate::{query, State};
use anyhow::{anyhow, Context as _, Result};
use banco_types::{
    execution::{Key, Value},
    wager::{AssetMetadata, TokenId},
    Genesis,
};
use tracing::info;

/// Write the initial state described by `genesis`.
///
/// Fails if the state already holds a configuration.
pub async fn init_genesis<S: State>(state: &mut S, genesis: &Genesis) -> Result<()> {
    genesis.validate().context("invalid genesis")?;
    if query::config(state).await?.is_some() {
        return Err(anyhow!("state is already initialized"));
    }

    state
        .insert(Key::Config, Value::Config(genesis.config()))
        .await?;

    for asset in &genesis.assets {
        let token = TokenId::from_symbol(&asset.symbol);
        state
            .insert(
                Key::Asset(token),
                Value::Asset(AssetMetadata {
                    symbol: asset.symbol.clone(),
                    decimals: asset.decimals,
                }),
            )
            .await?;
        if asset.allowed {
            state.insert(Key::AllowedToken(token), Value::Allowed).await?;
        }
    }

    for allocation in &genesis.allocations {
        let token = TokenId::from_symbol(&allocation.symbol);
        let wallet = query::wallet(state, &allocation.account, &token).await?;
        let updated = wallet
            .checked_add(allocation.amount)
            .ok_or_else(|| anyhow!("allocation overflow for {}", allocation.symbol))?;
        state
            .insert(
                Key::Wallet(allocation.account.clone(), token),
                Value::Wallet(updated),
            )
            .await?;
    }

    // House funding comes out of the admin's allocation
    for funding in &genesis.treasury {
        let token = TokenId::from_symbol(&funding.symbol);
        let wallet = query::wallet(state, &genesis.admin, &token).await?;
        let remaining = wallet.checked_sub(funding.amount).ok_or_else(|| {
            anyhow!(
                "treasury funding of {} {} exceeds admin allocation {}",
                funding.amount,
                funding.symbol,
                wallet
            )
        })?;
        let mut custody = query::custody(state, &token).await?;
        custody.custodied = custody
            .custodied
            .checked_add(funding.amount)
            .ok_or_else(|| anyhow!("custody overflow for {}", funding.symbol))?;
        let reserve = query::reserve(state, &token)
            .await?
            .checked_add(funding.amount)
            .ok_or_else(|| anyhow!("reserve overflow for {}", funding.symbol))?;

        state
            .insert(
                Key::Wallet(genesis.admin.clone(), token),
                Value::Wallet(remaining),
            )
            .await?;
        state.insert(Key::Custody(token), Value::Custody(custody)).await?;
        state.insert(Key::Reserve(token), Value::Reserve(reserve)).await?;
    }

    info!(
        assets = genesis.assets.len(),
        allocations = genesis.allocations.len(),
        max_bet = genesis.max_bet,
        house_edge_percent = genesis.house_edge_percent,
        randomness_window = genesis.randomness_window,
        "initialized genesis"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{chip, create_account_keypair, test_genesis, TEST_RESERVE, TEST_WALLET};
    use crate::Memory;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    #[test]
    fn test_genesis_funds_wallets_and_reserve() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, admin) = create_account_keypair(0);
            let (_, player) = create_account_keypair(1);
            let genesis = test_genesis(&admin, &[player.clone()]);

            let mut state = Memory::default();
            init_genesis(&mut state, &genesis).await.unwrap();

            assert!(query::is_allowed(&state, &chip()).await.unwrap());
            assert_eq!(
                query::wallet(&state, &player, &chip()).await.unwrap(),
                TEST_WALLET
            );
            assert_eq!(
                query::wallet(&state, &admin, &chip()).await.unwrap(),
                TEST_WALLET - TEST_RESERVE
            );
            assert_eq!(query::reserve(&state, &chip()).await.unwrap(), TEST_RESERVE);
            assert_eq!(
                query::custody(&state, &chip()).await.unwrap().custodied,
                TEST_RESERVE
            );

            // Second initialization is refused
            assert!(init_genesis(&mut state, &genesis).await.is_err());
        });
    }

    #[test]
    fn test_genesis_rejects_overfunded_treasury() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, admin) = create_account_keypair(0);
            let mut genesis = test_genesis(&admin, &[]);
            genesis.treasury[0].amount = TEST_WALLET + 1;

            let mut state = Memory::default();
            assert!(init_genesis(&mut state, &genesis).await.is_err());
        });
    }
}
