//! Solvency checks over custody accounting.

use crate::{query, State};
use anyhow::Result;
use banco_types::wager::TokenId;
use commonware_cryptography::ed25519::PublicKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolvencyReport {
    pub token: TokenId,
    pub custodied: u64,
    pub reserve: u64,
    pub user_total: u64,
    pub pending_stakes: u64,
    /// Sum of the balances of the accounts that were audited.
    pub audited_balances: u64,
}

impl SolvencyReport {
    /// Custody not claimed by users, pending stakes or the reserve.
    pub fn surplus(&self) -> i128 {
        self.custodied as i128
            - self.user_total as i128
            - self.pending_stakes as i128
            - self.reserve as i128
    }

    pub fn is_solvent(&self) -> bool {
        self.surplus() >= 0 && self.audited_balances as u128 <= self.user_total as u128
    }
}

/// Audit `token`, summing the individual balances of `accounts`.
///
/// When `accounts` covers every holder, `audited_balances` equals `user_total`.
pub async fn audit_solvency<S: State>(
    state: &S,
    token: &TokenId,
    accounts: &[PublicKey],
) -> Result<SolvencyReport> {
    let custody = query::custody(state, token).await?;
    let reserve = query::reserve(state, token).await?;

    let mut audited_balances = 0u64;
    for account in accounts {
        let balance = query::balance(state, account, token).await?;
        audited_balances = audited_balances.saturating_add(balance);
    }

    Ok(SolvencyReport {
        token: *token,
        custodied: custody.custodied,
        reserve,
        user_total: custody.user_total,
        pending_stakes: custody.pending_stakes,
        audited_balances,
    })
}
