//! Mod-10 (Luhn) checksum over decimal digit strings.
//!
//! Every second digit from the right is doubled, 9 is subtracted from
//! doubled values above 9, and the total must be divisible by 10.

/// Check a full digit string (including its trailing checksum digit).
///
/// Non-digit input yields `false`; callers strip separators first.
pub fn verify(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let mut sum = 0u32;
    for (i, b) in digits.bytes().rev().enumerate() {
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Compute the checksum digit for a payload (the digits before the checksum).
///
/// Appending the returned digit makes the whole string pass [`verify`].
pub fn checksum(payload: &str) -> Option<u8> {
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut sum = 0u32;
    for (i, b) in payload.bytes().rev().enumerate() {
        let mut d = u32::from(b - b'0');
        // The appended checksum occupies the rightmost slot, so the payload's
        // own rightmost digit is the first doubled one.
        if i % 2 == 0 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    Some(((10 - sum % 10) % 10) as u8)
}
