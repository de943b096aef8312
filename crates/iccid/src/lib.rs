//! ICCID codec: validation, formatting, parsing, and synthesis of the
//! carrier identifiers used throughout the profile engine.
//!
//! Identifiers are 19-20 decimal digits ending in a mod-10 (Luhn) checksum
//! digit. Synthesized identifiers follow a fixed layout (7-digit carrier
//! prefix, 8 random digits, 3-digit plan id, checksum); ingested ones are
//! treated as opaque digit strings and only checked, never re-derived.
//!
//! Nothing in this crate panics on malformed input: `validate` answers with
//! a bool and `parse` fails closed with a structured [`IccidError`].
pub mod codec;
pub mod luhn;
pub mod prefixes;
pub mod synth;

pub use codec::{format, parse, strip, validate, IccidError, IccidInfo};
pub use prefixes::{lookup_prefix, prefix_for_country, PrefixEntry};
pub use synth::{activation_payload, synthesize, synthesize_activation_code};
