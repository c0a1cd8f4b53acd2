//! Cache module for Redis-based storage
//!
//! Connection management, retry logic and the handful of commands the
//! revocation backend needs.

pub mod redis_client;


pub use redis_client::RedisClient;

// Re-export commonly used types
pub use ck_shared::config::CacheConfig;
