use super::*;
use banco_types::wager::TokenId;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_deposit(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Applied {
        self.active_config().await?;
        ensure_positive(amount)?;
        self.ensure_allowed(token).await?;

        self.pull_into_custody(public, token, amount).await?;
        let balance = self.credit(public, token, amount).await?;
        debug!(player = ?public, %token, amount, balance, "deposit");

        Ok(vec![Event::Deposited {
            player: public.clone(),
            token: *token,
            amount,
            balance,
        }])
    }

    pub(in crate::layer) async fn handle_withdraw(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Applied {
        self.active_config().await?;
        ensure_positive(amount)?;
        self.ensure_allowed(token).await?;

        let balance = self.debit(public, token, amount).await?;
        self.release_from_custody(public, token, amount).await?;
        debug!(player = ?public, %token, amount, balance, "withdraw");

        Ok(vec![Event::Withdrawn {
            player: public.clone(),
            token: *token,
            amount,
            balance,
        }])
    }
}
