//! ceid Pattern Matching
//!
//! Prefix validation against the identifier alphabet and difficulty estimates.

mod matcher;
pub mod difficulty;

pub use matcher::{Prefix, PatternError};
pub use difficulty::{estimated_tries, match_probability, possibility_percent};
