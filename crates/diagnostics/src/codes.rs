//! Diagnostic code constants.
//!
//! Generated from `data/diagnostics.json` at build time. `KS1xxx` codes come
//! from section structure, `KS2xxx` from command lines.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
