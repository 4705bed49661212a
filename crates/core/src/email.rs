//! Email address normalization.
//!
//! Addresses are stored and looked up lowercased so that sign-in, password
//! reset, and registration agree on a single canonical form.

/// Trim surrounding whitespace and lowercase an email address.
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn already_normal_is_unchanged() {
        assert_eq!(normalize("a@x.com"), "a@x.com");
    }
}
