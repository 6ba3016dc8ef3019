// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test fixtures for pitopt crates.
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`instance`] - Seeded block models with valid precedence
//! - [`oracle`] - Exhaustive optimum for tiny models
//! - [`rng`] - Deterministic xorshift generator
#![forbid(unsafe_code)]

pub mod config;
pub mod instance;
pub mod oracle;
pub mod rng;

pub use config::InMemoryConfigStore;
pub use instance::{layered_instance, random_instance, Instance};
pub use oracle::{brute_force_best, MAX_ORACLE_BLOCKS};
pub use rng::XorShift64;
