//! Shared revocation backend and store wiring

pub mod factory;
pub mod redis_backend;

pub use factory::build_revocation_store;
pub use redis_backend::RedisRevocationBackend;
