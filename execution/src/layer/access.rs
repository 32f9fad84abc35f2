use super::*;
use banco_types::wager::SystemConfig;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn load_config(&self) -> Result<SystemConfig, ApplyError> {
        query::config(self)
            .await?
            .ok_or(ApplyError::Rejected(WagerError::NotConfigured))
    }

    pub(in crate::layer) fn store_config(&mut self, config: SystemConfig) {
        self.insert(Key::Config, Value::Config(config));
    }

    /// Config for an administrative operation signed by `public`.
    pub(in crate::layer) async fn admin_config(
        &self,
        public: &PublicKey,
    ) -> Result<SystemConfig, ApplyError> {
        let config = self.load_config().await?;
        if &config.admin != public {
            return Err(WagerError::Unauthorized.into());
        }
        Ok(config)
    }

    /// Config for a player operation, which requires the system to be active.
    pub(in crate::layer) async fn active_config(&self) -> Result<SystemConfig, ApplyError> {
        let config = self.load_config().await?;
        if config.is_paused() {
            return Err(WagerError::Paused.into());
        }
        Ok(config)
    }
}
