//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Parse only the form `generate()` ids are displayed in (lowercase, hyphenated)
///
/// Uppercase, simple, braced and `urn:uuid:` spellings of the same value are rejected.
pub fn parse_canonical(s: &str) -> Option<Uuid> {
    parse(s)
        .ok()
        .filter(|uuid| uuid.hyphenated().to_string() == s)
}
