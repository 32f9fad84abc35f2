use super::*;
use banco_types::wager::{CustodyState, TokenId};

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn custody(&self, token: &TokenId) -> Result<CustodyState> {
        query::custody(self, token).await
    }

    pub(in crate::layer) fn store_custody(&mut self, token: &TokenId, custody: CustodyState) {
        self.insert(Key::Custody(*token), Value::Custody(custody));
    }

    /// Add to a user balance. Returns the new balance.
    pub(in crate::layer) async fn credit(
        &mut self,
        account: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Result<u64, ApplyError> {
        let balance = query::balance(self, account, token).await?;
        let updated = balance.checked_add(amount).ok_or(WagerError::Overflow)?;

        let mut custody = self.custody(token).await?;
        custody.user_total = custody
            .user_total
            .checked_add(amount)
            .ok_or(WagerError::Overflow)?;

        self.store_custody(token, custody);
        self.insert(
            Key::Balance(account.clone(), *token),
            Value::Balance(updated),
        );
        Ok(updated)
    }

    /// Subtract from a user balance. Never goes below zero.
    pub(in crate::layer) async fn debit(
        &mut self,
        account: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Result<u64, ApplyError> {
        let balance = query::balance(self, account, token).await?;
        let updated = balance
            .checked_sub(amount)
            .ok_or(WagerError::InsufficientBalance {
                have: balance,
                need: amount,
            })?;

        let mut custody = self.custody(token).await?;
        custody.user_total = custody
            .user_total
            .checked_sub(amount)
            .ok_or(WagerError::AccountingMismatch(*token))?;

        self.store_custody(token, custody);
        if updated == 0 {
            self.remove(Key::Balance(account.clone(), *token));
        } else {
            self.insert(
                Key::Balance(account.clone(), *token),
                Value::Balance(updated),
            );
        }
        Ok(updated)
    }

    /// Move value from an external wallet into custody.
    pub(in crate::layer) async fn pull_into_custody(
        &mut self,
        account: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Result<(), ApplyError> {
        let wallet = query::wallet(self, account, token).await?;
        let remaining = wallet
            .checked_sub(amount)
            .ok_or(WagerError::InsufficientExternalBalance {
                have: wallet,
                need: amount,
            })?;

        let mut custody = self.custody(token).await?;
        custody.custodied = custody
            .custodied
            .checked_add(amount)
            .ok_or(WagerError::Overflow)?;

        self.store_custody(token, custody);
        self.insert(
            Key::Wallet(account.clone(), *token),
            Value::Wallet(remaining),
        );
        Ok(())
    }

    /// Move value out of custody to an external wallet.
    pub(in crate::layer) async fn release_from_custody(
        &mut self,
        account: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Result<(), ApplyError> {
        let mut custody = self.custody(token).await?;
        custody.custodied = custody
            .custodied
            .checked_sub(amount)
            .ok_or(WagerError::AccountingMismatch(*token))?;

        let wallet = query::wallet(self, account, token).await?;
        let updated = wallet.checked_add(amount).ok_or(WagerError::Overflow)?;

        self.store_custody(token, custody);
        self.insert(Key::Wallet(account.clone(), *token), Value::Wallet(updated));
        Ok(())
    }
}
