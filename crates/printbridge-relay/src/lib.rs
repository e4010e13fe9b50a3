// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print bridge relay — the single-flight loop that takes jobs from the job
// source and streams them to the printer.

pub mod relay;

pub use relay::{Relay, RelayStats};
