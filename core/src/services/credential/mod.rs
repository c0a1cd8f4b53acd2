//! Credential orchestration: authentication, refresh rotation and logout.

mod service;

#[cfg(test)]
mod tests;

pub use service::{CredentialService, PairRevocation};
