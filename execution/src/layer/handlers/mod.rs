use super::*;

fn ensure_positive(amount: u64) -> Result<(), WagerError> {
    if amount == 0 {
        return Err(WagerError::InvalidAmount);
    }
    Ok(())
}

mod admin;
mod ledger;
mod wager;
