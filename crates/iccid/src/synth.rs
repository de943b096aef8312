//! Client-side synthesis of identifiers, activation codes, and the
//! scannable activation payload.

use crate::luhn;
use crate::prefixes;
use rand::Rng;

/// Width of the random digit run between prefix and plan id. Together with
/// the 7-digit prefix, 3-digit plan id, and checksum this yields a 19-digit
/// identifier, the short end of the accepted [19,20] range.
const RANDOM_DIGITS: u32 = 8;

/// RSP host embedded in the activation payload. Presentational only.
const RSP_HOST: &str = "rsp.roamline.net";

/// Alphabet for activation codes; ambiguous glyphs (0/O, 1/I) are left out.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Synthesize a fresh identifier for a country and plan.
///
/// Layout: country prefix (7) + random run (8) + zero-padded plan id (3) +
/// checksum (1). Unknown countries fall back to the generic worldwide
/// prefix. The output always passes [`crate::validate`].
pub fn synthesize(country_code: &str, plan_id: u16) -> String {
    let entry = prefixes::prefix_for_country(country_code);
    let mut rng = rand::thread_rng();
    let random_run: u32 = rng.gen_range(0..10u32.pow(RANDOM_DIGITS));
    let payload = format!(
        "{}{:08}{:03}",
        entry.prefix,
        random_run,
        plan_id % 1000
    );
    // The payload is all digits by construction, so the checksum exists.
    let check = luhn::checksum(&payload).unwrap_or(0);
    format!("{}{}", payload, check)
}

/// Synthesize a companion activation code, `RL-XXXX-XXXX`.
pub fn synthesize_activation_code() -> String {
    let mut rng = rand::thread_rng();
    let mut pick = |n: usize| -> String {
        (0..n)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    };
    format!("RL-{}-{}", pick(4), pick(4))
}

/// Build the fixed-grammar scannable string embedding the activation code
/// and the identifier: `LPA:1$<host>$<code>$<iccid>`.
///
/// The format is presentational; nothing else in the engine parses it back.
pub fn activation_payload(iccid: &str, activation_code: &str) -> String {
    format!(
        "LPA:1${}${}${}",
        RSP_HOST,
        activation_code,
        crate::codec::strip(iccid)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{parse, validate};

    #[test]
    fn test_synthesized_identifiers_always_validate() {
        for _ in 0..200 {
            let id = synthesize("US", 42);
            assert_eq!(id.len(), 19);
            assert!(validate(&id), "synthesized {} failed validation", id);
            assert!(parse(&id).is_ok());
        }
    }

    #[test]
    fn test_synthesize_embeds_country_and_plan() {
        let id = synthesize("JP", 7);
        let info = parse(&id).unwrap();
        assert_eq!(info.prefix, "8981700");
        assert_eq!(info.country_code, "JP");
        assert_eq!(info.plan_id, "007");
    }

    #[test]
    fn test_unknown_country_uses_generic_prefix() {
        let id = synthesize("ZZ", 1);
        let info = parse(&id).unwrap();
        assert_eq!(info.country_code, "WW");
    }

    #[test]
    fn test_plan_id_wraps_at_three_digits() {
        let id = synthesize("US", 1042);
        let info = parse(&id).unwrap();
        assert_eq!(info.plan_id, "042");
    }

    #[test]
    fn test_activation_code_grammar() {
        let code = synthesize_activation_code();
        assert_eq!(code.len(), 12);
        assert!(code.starts_with("RL-"));
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 4);
        assert!(!code.contains('0') && !code.contains('O'));
    }

    #[test]
    fn test_activation_payload_grammar() {
        let payload = activation_payload("8910 1001 2345 6780 015", "RL-AAAA-BBBB");
        assert_eq!(
            payload,
            "LPA:1$rsp.roamline.net$RL-AAAA-BBBB$8910100123456780015"
        );
    }
}
