// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print bridge — core types, error definitions, configuration and the traits
// shared by all crates.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use traits::*;
pub use types::*;
