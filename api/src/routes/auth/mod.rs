//! Credential route handlers
//!
//! - Token refresh (rotate-on-use)
//! - Logout
//! - Identity and diagnostics for authenticated callers

pub mod logout;
pub mod me;
pub mod refresh;
pub mod status;

pub use logout::logout;
pub use me::me;
pub use refresh::refresh;
pub use status::status;
