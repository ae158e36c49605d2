//! Canonical forms for the fields that identify a contractor.

/// Trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Canadian postal code in `A1A 1A1` form.
///
/// All whitespace is removed and letters uppercased; a 6-character result
/// gets a space after the third character. Anything else is returned
/// compacted but otherwise unchanged. Applying this twice gives the same
/// result as applying it once.
pub fn normalize_postal_code(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    if compact.chars().count() == 6 {
        let (head, tail) = compact.split_at(compact.char_indices().nth(3).map_or(3, |(i, _)| i));
        format!("{} {}", head, tail)
    } else {
        compact
    }
}

/// Trimmed text, or `None` when nothing is left.
pub fn clean_optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");
    }

    #[test]
    fn test_postal_code_formats() {
        assert_eq!(normalize_postal_code("a1a1a1"), "A1A 1A1");
        assert_eq!(normalize_postal_code(" m5v 2t6 "), "M5V 2T6");
        assert_eq!(normalize_postal_code("K1A\t0B1"), "K1A 0B1");
    }

    #[test]
    fn test_postal_code_is_idempotent() {
        let once = normalize_postal_code("h2x1y4");
        assert_eq!(normalize_postal_code(&once), once);
    }

    #[test]
    fn test_postal_code_other_lengths_pass_through() {
        assert_eq!(normalize_postal_code("12345"), "12345");
        assert_eq!(normalize_postal_code("a1a 1a1x"), "A1A1A1X");
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional("  Toronto "), Some("Toronto".to_string()));
        assert_eq!(clean_optional("   "), None);
    }
}
