/// Prefix shared by every key this gateway provisions
pub const KEY_NAME_PREFIX: &str = "Goose Hacknight - ";

/// Upstream key name for an attendee email. Used verbatim for duplicate checks.
pub fn key_name(email: &str) -> String {
    format!("{}{}", KEY_NAME_PREFIX, email)
}

/// Human-readable label: the first `@` becomes `-at-`, nothing else changes.
pub fn key_label(email: &str) -> String {
    email.replacen('@', "-at-", 1)
}
