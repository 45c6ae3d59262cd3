//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories with the same semantics, used when
//!   no database is configured and in tests
//! - **media**: image files under the media root
//! - **security**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod media;
pub mod memory;
pub mod persistence;
pub mod security;
