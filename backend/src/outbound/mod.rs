//! Outbound adapters implementing domain ports for infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM.
//! - **memory**: process-local repositories used without a database.
//! - **cache**: the in-process TTL progress cache.
//!
//! Adapters translate between domain types and storage representations.
//! They contain no business logic.

pub mod cache;
pub mod memory;
pub mod persistence;
