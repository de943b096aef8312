//! Static carrier prefix table.
//!
//! Maps the 7-digit identifier prefix to a country/provider pair for `parse`
//! and the reverse direction for `synthesize`. Unknown prefixes resolve to a
//! generic worldwide entry; adding a carrier is a one-line change here.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// One row of the prefix table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixEntry {
    pub prefix: &'static str,
    pub country_code: &'static str,
    pub country_name: &'static str,
    pub provider: &'static str,
}

/// Fallback entry for prefixes (and countries) the table does not know.
pub const GENERIC: PrefixEntry = PrefixEntry {
    prefix: "8988210",
    country_code: "WW",
    country_name: "Worldwide",
    provider: "Roamline Global",
};

const ENTRIES: &[PrefixEntry] = &[
    PrefixEntry { prefix: "8910100", country_code: "US", country_name: "United States", provider: "AmeriCell" },
    PrefixEntry { prefix: "8944200", country_code: "GB", country_name: "United Kingdom", provider: "Albion Mobile" },
    PrefixEntry { prefix: "8933010", country_code: "FR", country_name: "France", provider: "Horizon Telecom" },
    PrefixEntry { prefix: "8949020", country_code: "DE", country_name: "Germany", provider: "Funknetz" },
    PrefixEntry { prefix: "8934050", country_code: "ES", country_name: "Spain", provider: "Iberia Movil" },
    PrefixEntry { prefix: "8939100", country_code: "IT", country_name: "Italy", provider: "Stivale Mobile" },
    PrefixEntry { prefix: "8981700", country_code: "JP", country_name: "Japan", provider: "Sakura Net" },
    PrefixEntry { prefix: "8965010", country_code: "SG", country_name: "Singapore", provider: "Merlion Telecom" },
    PrefixEntry { prefix: "8966080", country_code: "TH", country_name: "Thailand", provider: "Siam Connect" },
    PrefixEntry { prefix: "8990100", country_code: "TR", country_name: "Turkiye", provider: "Anadolu Cell" },
    PrefixEntry { prefix: "8961300", country_code: "AU", country_name: "Australia", provider: "Southern Cross" },
    PrefixEntry { prefix: "8997120", country_code: "AE", country_name: "United Arab Emirates", provider: "Gulf Wave" },
];

lazy_static! {
    static ref BY_PREFIX: HashMap<&'static str, &'static PrefixEntry> =
        ENTRIES.iter().map(|e| (e.prefix, e)).collect();
    static ref BY_COUNTRY: HashMap<&'static str, &'static PrefixEntry> =
        ENTRIES.iter().map(|e| (e.country_code, e)).collect();
}

/// Look up the table entry for a 7-digit prefix, falling back to [`GENERIC`].
pub fn lookup_prefix(prefix: &str) -> &'static PrefixEntry {
    BY_PREFIX.get(prefix).copied().unwrap_or(&GENERIC)
}

/// Look up the synthesis prefix for a country code, falling back to
/// [`GENERIC`]. Matching is case-insensitive on ASCII.
pub fn prefix_for_country(country_code: &str) -> &'static PrefixEntry {
    let upper = country_code.trim().to_ascii_uppercase();
    BY_COUNTRY.get(upper.as_str()).copied().unwrap_or(&GENERIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prefix() {
        let entry = lookup_prefix("8944200");
        assert_eq!(entry.country_code, "GB");
        assert_eq!(entry.provider, "Albion Mobile");
    }

    #[test]
    fn test_unknown_prefix_is_generic() {
        assert_eq!(lookup_prefix("0000000"), &GENERIC);
        assert_eq!(lookup_prefix(""), &GENERIC);
    }

    #[test]
    fn test_country_lookup_is_case_insensitive() {
        assert_eq!(prefix_for_country("jp").prefix, "8981700");
        assert_eq!(prefix_for_country(" JP ").prefix, "8981700");
        assert_eq!(prefix_for_country("ZZ"), &GENERIC);
    }

    #[test]
    fn test_all_prefixes_are_seven_digits() {
        for entry in ENTRIES {
            assert_eq!(entry.prefix.len(), 7, "prefix {}", entry.prefix);
            assert!(entry.prefix.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
