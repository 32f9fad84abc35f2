use super::*;
use crate::payout::ReserveChange;
use banco_types::wager::TokenId;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn reserve(&self, token: &TokenId) -> Result<u64> {
        query::reserve(self, token).await
    }

    pub(in crate::layer) fn store_reserve(&mut self, token: &TokenId, amount: u64) {
        self.insert(Key::Reserve(*token), Value::Reserve(amount));
    }

    /// Apply a settlement to the reserve. Fails rather than going negative.
    pub(in crate::layer) async fn adjust_reserve(
        &mut self,
        token: &TokenId,
        change: ReserveChange,
    ) -> Result<u64, ApplyError> {
        let reserve = self.reserve(token).await?;
        let updated = change.apply(reserve)?;
        if updated != reserve {
            self.store_reserve(token, updated);
        }
        Ok(updated)
    }
}
