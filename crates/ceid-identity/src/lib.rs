//! ceid Identity
//!
//! Extension identifier codec and candidate generation.

pub mod codec;
pub mod generator;
pub mod traits;

pub use codec::{derive, substitute, ExtensionId, IdError, ALPHABET, ID_LEN};
pub use generator::RsaKeySource;
pub use traits::{Candidate, IdentityError, KeySource};
