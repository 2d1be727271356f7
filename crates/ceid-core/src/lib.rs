//! ceid Core Engine
//!
//! Multi-threaded search for RSA keys whose extension ID starts with a prefix.

mod search;
mod sink;
mod stats;

pub use search::{
    SearchConfig, SearchError, SearchOutcome, SearchResult, VanitySearch,
    MAX_CONSECUTIVE_FAILURES, PROGRESS_INTERVAL,
};
pub use sink::{Artifacts, PemFileSink, ResultSink, SearchReport, SinkError};
pub use stats::SearchStats;

// Re-exports for convenience
pub use ceid_identity::{derive, Candidate, ExtensionId, KeySource, RsaKeySource};
pub use ceid_pattern::{difficulty, estimated_tries, possibility_percent, PatternError, Prefix};
