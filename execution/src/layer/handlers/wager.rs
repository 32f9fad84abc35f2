use super::*;
use crate::{
    oracle,
    payout::{self, ReserveChange},
};
use banco_types::wager::{Side, TokenId, Wager};

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_start_wager(
        &mut self,
        public: &PublicKey,
        token: &TokenId,
        amount: u64,
        side: Side,
    ) -> Applied {
        let config = self.active_config().await?;
        ensure_positive(amount)?;
        if amount > config.max_bet {
            return Err(WagerError::StakeAboveMaximum {
                stake: amount,
                max_bet: config.max_bet,
            }
            .into());
        }
        self.ensure_allowed(token).await?;
        if self.wager(public).await?.is_some() {
            return Err(WagerError::WagerPending.into());
        }

        self.debit(public, token, amount).await?;
        let mut custody = self.custody(token).await?;
        custody.pending_stakes = custody
            .pending_stakes
            .checked_add(amount)
            .ok_or(WagerError::Overflow)?;
        self.store_custody(token, custody);

        let wager = Wager::new(*token, amount, side, self.height);
        self.store_wager(public, wager);
        debug!(
            player = ?public,
            %token,
            stake = amount,
            ?side,
            commitment = self.height,
            "wager started"
        );

        Ok(vec![Event::WagerStarted {
            player: public.clone(),
            token: *token,
            stake: amount,
            side,
            commitment: self.height,
        }])
    }

    pub(in crate::layer) async fn handle_resolve_wager(&mut self, public: &PublicKey) -> Applied {
        let config = self.active_config().await?;
        let mut wager = self
            .wager(public)
            .await?
            .ok_or(WagerError::NoPendingWager)?;
        // Resolution deletes the record, so only a stored record carrying the flag lands here.
        if wager.resolved {
            return Err(WagerError::WagerAlreadyResolved.into());
        }

        let window = config.randomness_window;
        let scores = oracle::reveal(self, wager.commitment, self.height, window)
            .await?
            .into_scores(wager.commitment, self.height)?;
        wager.resolved = true;

        let outcome = payout::determine_outcome(scores);
        let settlement = payout::settle(
            wager.stake,
            wager.side,
            outcome,
            config.house_edge_percent,
            config.min_house_cut,
        )?;

        let reserve = self.adjust_reserve(&wager.token, settlement.reserve).await?;
        self.release_stake(&wager).await?;
        if settlement.payout > 0 {
            self.credit(public, &wager.token, settlement.payout).await?;
        }
        self.clear_wager(public);
        debug!(
            player = ?public,
            token = %wager.token,
            stake = wager.stake,
            banker = scores.banker,
            player_score = scores.player,
            ?outcome,
            payout = settlement.payout,
            commission = settlement.commission,
            reserve,
            "wager resolved"
        );

        Ok(vec![Event::WagerResolved {
            player: public.clone(),
            token: wager.token,
            stake: wager.stake,
            side: wager.side,
            banker_score: scores.banker,
            player_score: scores.player,
            outcome,
            payout: settlement.payout,
            commission: settlement.commission,
        }])
    }

    /// Clear a wager that can no longer resolve.
    ///
    /// While paused the stake is refunded so closeout can settle exposure.
    /// While active an expired wager is forfeited into the reserve: its
    /// reveal is already public, so a refund would let losers opt out.
    pub(in crate::layer) async fn handle_recover_wager(
        &mut self,
        public: &PublicKey,
        player: &PublicKey,
    ) -> Applied {
        let config = self.admin_config(public).await?;
        let wager = self
            .wager(player)
            .await?
            .ok_or(WagerError::NoPendingWager)?;
        let deadline = wager.last_resolvable_height(config.randomness_window);
        let paused = config.is_paused();
        if !paused && self.height <= deadline {
            return Err(WagerError::WagerNotExpired {
                commitment: wager.commitment,
                deadline,
            }
            .into());
        }

        self.release_stake(&wager).await?;
        self.clear_wager(player);
        if !paused {
            let reserve = self
                .adjust_reserve(&wager.token, ReserveChange::Credit(wager.stake))
                .await?;
            warn!(
                player = ?player,
                token = %wager.token,
                stake = wager.stake,
                commitment = wager.commitment,
                height = self.height,
                reserve,
                "wager forfeited"
            );
            return Ok(vec![Event::WagerForfeited {
                player: player.clone(),
                token: wager.token,
                stake: wager.stake,
                reserve,
            }]);
        }

        self.credit(player, &wager.token, wager.stake).await?;
        warn!(
            player = ?player,
            token = %wager.token,
            stake = wager.stake,
            commitment = wager.commitment,
            height = self.height,
            "wager refunded"
        );
        Ok(vec![Event::WagerRefunded {
            player: player.clone(),
            token: wager.token,
            stake: wager.stake,
        }])
    }

    async fn release_stake(&mut self, wager: &Wager) -> Result<(), ApplyError> {
        let mut custody = self.custody(&wager.token).await?;
        custody.pending_stakes = custody
            .pending_stakes
            .checked_sub(wager.stake)
            .ok_or(WagerError::AccountingMismatch(wager.token))?;
        self.store_custody(&wager.token, custody);
        Ok(())
    }
}
