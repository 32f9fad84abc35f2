use super::*;
use banco_types::wager::{Lifecycle, SystemConfig, TokenId};
use tracing::info;

fn config_updated(config: &SystemConfig) -> Vec<Event> {
    vec![Event::ConfigUpdated {
        max_bet: config.max_bet,
        house_edge_percent: config.house_edge_percent,
        min_house_cut: config.min_house_cut,
    }]
}

impl<'a, S: State> Layer<'a, S> {
    // === Token registry ===

    pub(in crate::layer) async fn handle_add_token(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
    ) -> Applied {
        self.admin_config(public).await?;
        let asset = query::asset(self, token)
            .await?
            .ok_or(WagerError::UnknownToken(*token))?;
        if !asset.is_integer_unit() {
            return Err(WagerError::FractionalToken(*token, asset.decimals).into());
        }
        if query::is_allowed(self, token).await? {
            return Err(WagerError::TokenAlreadyAllowed(*token).into());
        }

        self.allow(token);
        info!(%token, symbol = %asset.symbol, "token allowed");
        Ok(vec![Event::TokenAdded { token: *token }])
    }

    pub(in crate::layer) async fn handle_remove_token(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
    ) -> Applied {
        self.admin_config(public).await?;
        self.ensure_allowed(token).await?;

        // Existing balances and wagers in the token are untouched
        self.disallow(token);
        info!(%token, "token removed");
        Ok(vec![Event::TokenRemoved { token: *token }])
    }

    // === Configuration ===

    pub(in crate::layer) async fn handle_set_max_bet(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Applied {
        let mut config = self.admin_config(public).await?;
        ensure_positive(amount)?;

        config.max_bet = amount;
        let events = config_updated(&config);
        self.store_config(config);
        Ok(events)
    }

    pub(in crate::layer) async fn handle_set_house_edge(
        &mut self,
        public: &PublicKey,
        percent: u8,
    ) -> Applied {
        let mut config = self.admin_config(public).await?;
        SystemConfig::validate_house_edge(percent)?;

        config.house_edge_percent = percent;
        let events = config_updated(&config);
        self.store_config(config);
        Ok(events)
    }

    pub(in crate::layer) async fn handle_set_min_house_cut(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Applied {
        let mut config = self.admin_config(public).await?;

        config.min_house_cut = amount;
        let events = config_updated(&config);
        self.store_config(config);
        Ok(events)
    }

    // === Treasury ===

    pub(in crate::layer) async fn handle_fund_treasury(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
        amount: u64,
    ) -> Applied {
        self.admin_config(public).await?;
        ensure_positive(amount)?;
        if query::asset(self, token).await?.is_none() {
            return Err(WagerError::UnknownToken(*token).into());
        }

        self.pull_into_custody(public, token, amount).await?;
        let reserve = self
            .reserve(token)
            .await?
            .checked_add(amount)
            .ok_or(WagerError::Overflow)?;
        self.store_reserve(token, reserve);
        info!(%token, amount, reserve, "treasury funded");

        Ok(vec![Event::TreasuryFunded {
            token: *token,
            amount,
            reserve,
        }])
    }

    /// Send every unit not owed to users (reserve included) to the admin.
    pub(in crate::layer) async fn handle_closeout(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
    ) -> Applied {
        let config = self.admin_config(public).await?;
        if !config.is_paused() {
            return Err(WagerError::NotPaused.into());
        }

        let custody = self.custody(token).await?;
        let amount = custody.unowed();
        let reserve = self.reserve(token).await?;
        if reserve > amount {
            // The reserve is part of what is not owed to users
            return Err(WagerError::AccountingMismatch(*token).into());
        }

        if amount > 0 {
            self.release_from_custody(&config.admin, token, amount).await?;
        }
        if reserve > 0 {
            self.store_reserve(token, 0);
        }
        info!(%token, amount, reserve, "closed out");

        Ok(vec![Event::ClosedOut {
            token: *token,
            amount,
            recipient: config.admin,
        }])
    }

    // === Lifecycle ===

    pub(in crate::layer) async fn handle_pause(&mut self, public: &PublicKey) -> Applied {
        let mut config = self.admin_config(public).await?;
        if config.is_paused() {
            return Err(WagerError::Paused.into());
        }

        config.lifecycle = Lifecycle::Paused;
        self.store_config(config);
        info!(height = self.height, "paused");
        Ok(vec![Event::Paused])
    }

    pub(in crate::layer) async fn handle_unpause(&mut self, public: &PublicKey) -> Applied {
        let mut config = self.admin_config(public).await?;
        if !config.is_paused() {
            return Err(WagerError::NotPaused.into());
        }

        config.lifecycle = Lifecycle::Active;
        self.store_config(config);
        info!(height = self.height, "unpaused");
        Ok(vec![Event::Unpaused])
    }
}
