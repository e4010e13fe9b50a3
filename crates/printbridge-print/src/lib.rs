// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print bridge printer side — PJL job framing and the raw TCP socket the
// framed document is written to.

pub mod pjl;
pub mod raw_link;

pub use raw_link::{RawConnection, RawPrinterLink};
