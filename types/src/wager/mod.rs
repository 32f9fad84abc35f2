//! Wager domain types.
//!
//! Tokens, custody accounting, wagers, outcomes, operator configuration and
//! the rejection taxonomy shared by the execution layer and clients.

mod codec;
mod config;
mod constants;
mod error;
mod game;
mod token;

pub use codec::{read_string, string_encode_size, write_string};
pub use config::*;
pub use constants::*;
pub use error::*;
pub use game::*;
pub use token::*;

#[cfg(test)]
mod tests;
