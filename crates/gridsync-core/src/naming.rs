//! Deterministic names for managed remote resources.
//!
//! Remote names are tightly constrained in length and charset, which leaves little
//! room to describe the owning consumer. Instead, a CRC-32 (IEEE) checksum of the
//! consumer identity is appended in decimal form to a fixed prefix (the salt).
//! The output must stay byte-for-byte stable: previously created resources are
//! found again by recomputing their name.

/// Returns `salt` followed by the decimal CRC-32 of `input`.
pub fn checksum_name(salt: &str, input: &str) -> String {
    format!("{salt}{}", crc32fast::hash(input.as_bytes()))
}

/// Returns a stable name for the consumer identified by `namespace` and `name`.
pub fn deterministic_name(namespace: &str, name: &str, salt: &str) -> String {
    checksum_name(salt, &format!("{namespace}/{name}"))
}
