// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PJL (Printer Job Language) framing.
//
// A raw-socket job is wrapped as:
//
//   <UEL>@PJL SET COPIES=n\r\n@PJL ENTER LANGUAGE=PDF\r\n <document> <UEL>@PJL EOJ\r\n
//
// The Universal Exit Language sequence (ESC %-12345X) drops the printer back
// into PJL mode whatever it was doing before. Nothing is read back.

use printbridge_core::types::PdlLanguage;

/// Universal Exit Language: ESC %-12345X.
pub const UEL: &[u8] = b"\x1b%-12345X";

/// Line terminator for PJL commands.
const CRLF: &str = "\r\n";

/// Preamble sent before the first document byte.
pub fn job_header(copies: u32, language: PdlLanguage) -> Vec<u8> {
    let mut out = UEL.to_vec();
    out.extend_from_slice(format!("@PJL SET COPIES={copies}{CRLF}").as_bytes());
    out.extend_from_slice(
        format!("@PJL ENTER LANGUAGE={}{CRLF}", language.pjl_keyword()).as_bytes(),
    );
    out
}

/// Trailer sent after the last document byte.
pub fn job_footer() -> Vec<u8> {
    let mut out = UEL.to_vec();
    out.extend_from_slice(format!("@PJL EOJ{CRLF}").as_bytes());
    out
}
