//! Upstream field-name fallback chains.
//!
//! Every upstream integration so far has renamed at least one of these
//! fields, so resolution is data-driven: the transformer walks each chain
//! in order and takes the first usable value. Supporting a newly observed
//! alias is a one-line addition to the right table. Order matters: the
//! canonical spelling and its camelCase twin come first, generic catch-alls
//! ("id", "name", "data") last.

/// Status text candidates. The record's bucket tag is the implicit tail of
/// this chain.
pub const STATUS_FIELDS: &[&str] = &[
    "status",
    "state",
    "sim_status",
    "simStatus",
    "bundle_state",
    "bundleState",
    "esim_status",
    "esimStatus",
];

/// Total allowance candidates; the flag marks explicit byte-count fields.
pub const TOTAL_QUOTA_FIELDS: &[(&str, bool)] = &[
    ("total_volume", false),
    ("totalVolume", false),
    ("total_data", false),
    ("totalData", false),
    ("data_amount", false),
    ("dataAmount", false),
    ("total_bytes", true),
    ("totalBytes", true),
    ("volume", false),
    ("quota", false),
    ("package_size", false),
    ("packageSize", false),
    ("data", false),
    ("total", false),
];

/// Remaining allowance candidates, independent of the total chain.
pub const REMAINING_QUOTA_FIELDS: &[(&str, bool)] = &[
    ("remaining_volume", false),
    ("remainingVolume", false),
    ("remaining_data", false),
    ("remainingData", false),
    ("data_balance", false),
    ("dataBalance", false),
    ("remaining_bytes", true),
    ("remainingBytes", true),
    ("data_left", false),
    ("dataLeft", false),
    ("balance", false),
    ("remaining", false),
    ("left", false),
];

pub const EXPIRY_FIELDS: &[&str] = &[
    "expires_at",
    "expiresAt",
    "expiry",
    "expire_at",
    "expireAt",
    "expiration",
    "expiry_date",
    "expiryDate",
    "valid_until",
    "validUntil",
    "valid_till",
    "validTill",
    "end_date",
    "endDate",
];

pub const CREATED_FIELDS: &[&str] = &[
    "created_at",
    "createdAt",
    "purchased_at",
    "purchasedAt",
    "purchase_date",
    "purchaseDate",
    "start_date",
    "startDate",
    "activated_at",
    "activatedAt",
    "date",
];

pub const DURATION_FIELDS: &[&str] = &[
    "duration",
    "duration_days",
    "durationDays",
    "validity",
    "validity_days",
    "validityDays",
    "period",
    "days",
    "plan_days",
    "planDays",
];

pub const IDENTIFIER_FIELDS: &[&str] = &[
    "iccid",
    "sim_iccid",
    "simIccid",
    "identifier",
    "sim_number",
    "simNumber",
    "card_number",
    "cardNumber",
    "serial_number",
    "serialNumber",
    "serial",
    "sim_id",
    "simId",
    "id",
];

pub const COUNTRY_CODE_FIELDS: &[&str] =
    &["country_code", "countryCode", "country_iso", "countryIso", "iso"];

pub const COUNTRY_NAME_FIELDS: &[&str] =
    &["country", "country_name", "countryName", "region", "destination"];

pub const PLAN_LABEL_FIELDS: &[&str] = &[
    "plan",
    "plan_name",
    "planName",
    "package",
    "package_name",
    "packageName",
    "bundle",
    "bundle_name",
    "bundleName",
    "name",
    "title",
];

pub const INSTALL_URL_FIELDS: &[&str] = &[
    "qr_code",
    "qrCode",
    "qr_code_url",
    "qrCodeUrl",
    "install_url",
    "installUrl",
    "activation_url",
    "activationUrl",
    "smdp_address",
    "smdpAddress",
    "universal_link",
    "universalLink",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_keys_probe_last() {
        // "id" is too generic to shadow a real identifier field, and "data"
        // is an entire-record key in some payloads.
        assert_eq!(IDENTIFIER_FIELDS.last(), Some(&"id"));
        assert!(
            TOTAL_QUOTA_FIELDS.iter().position(|(f, _)| *f == "data")
                > TOTAL_QUOTA_FIELDS
                    .iter()
                    .position(|(f, _)| *f == "total_volume")
        );
    }

    #[test]
    fn test_byte_hints_only_on_byte_fields() {
        for (field, hint) in TOTAL_QUOTA_FIELDS.iter().chain(REMAINING_QUOTA_FIELDS) {
            assert_eq!(*hint, field.to_lowercase().contains("bytes"), "{}", field);
        }
    }
}
