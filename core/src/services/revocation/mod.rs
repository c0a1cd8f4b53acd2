//! Revocation store and its interchangeable backends
//!
//! A revoked token is remembered only until it would have expired anyway,
//! so every record carries a TTL and no backend grows without bound.

mod backend;
mod memory;
mod store;

#[cfg(test)]
mod tests;

pub use backend::RevocationBackend;
pub use memory::InMemoryRevocationBackend;
pub use store::{
    BatchRevocationReport, RevocationOutcome, RevocationSettings, RevocationStats,
    RevocationStore,
};
