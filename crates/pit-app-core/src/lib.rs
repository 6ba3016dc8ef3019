// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for pitopt tools.
//! Turns parameter files and block value inputs into solved realizations,
//! keeping the CLI and storage adapters thin.

pub mod config;
pub mod ebv;
pub mod error;
pub mod grid;
pub mod params;
pub mod pipeline;
pub mod slope;
