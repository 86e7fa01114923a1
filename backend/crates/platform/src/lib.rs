//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, hex digests, constant-time compare)
//! - Client identification from connection info and proxy headers
//! - Rate limiting abstractions

pub mod client;
pub mod crypto;
pub mod rate_limit;
