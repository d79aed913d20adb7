//! ISO 7064 MOD 97-10 check used by IBANs and RF creditor references.

/// Check an IBAN or RF reference (spaces ignored, case-insensitive).
///
/// The first four characters move to the end, letters become two-digit
/// numbers (A = 10 … Z = 35) and the result must be 1 modulo 97.
pub fn mod97_valid(reference: &str) -> bool {
    let compact: Vec<char> = reference
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if compact.len() < 5 || !compact.iter().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let rearranged = compact[4..].iter().chain(compact[..4].iter());
    let mut remainder: u32 = 0;
    for c in rearranged {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }

    remainder == 1
}
