use super::*;
use banco_types::wager::{TokenId, Wager};

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn ensure_allowed(&self, token: &TokenId) -> Result<(), ApplyError> {
        if !query::is_allowed(self, token).await? {
            return Err(WagerError::TokenNotAllowed(*token).into());
        }
        Ok(())
    }

    pub(in crate::layer) fn allow(&mut self, token: &TokenId) {
        self.insert(Key::AllowedToken(*token), Value::Allowed);
    }

    pub(in crate::layer) fn disallow(&mut self, token: &TokenId) {
        self.remove(Key::AllowedToken(*token));
    }

    pub(in crate::layer) async fn wager(&self, account: &PublicKey) -> Result<Option<Wager>> {
        query::pending_wager(self, account).await
    }

    pub(in crate::layer) fn store_wager(&mut self, account: &PublicKey, wager: Wager) {
        self.insert(Key::Wager(account.clone()), Value::Wager(wager));
    }

    pub(in crate::layer) fn clear_wager(&mut self, account: &PublicKey) {
        self.remove(Key::Wager(account.clone()));
    }
}
