// Shared helpers

/// Upper bound on token characters shown in logs
const TOKEN_LOG_PREFIX: usize = 8;

/// Shorten a bearer token for logging
///
/// Shows at most a quarter of the token, capped at `TOKEN_LOG_PREFIX`
/// characters. Tokens too short to spare a character are fully masked.
pub fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    let shown = (len / 4).min(TOKEN_LOG_PREFIX);
    if shown == 0 {
        return "*".repeat(len);
    }

    let prefix: String = token.chars().take(shown).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_long_token() {
        // 41 characters: capped at 8
        assert_eq!(
            mask_token("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhZG1pbiJ9"),
            "eyJhbGci..."
        );
    }

    #[test]
    fn test_mask_medium_token_shows_a_quarter() {
        assert_eq!(mask_token("abcdefghi"), "ab...");
        assert_eq!(mask_token("abcdefghijkl"), "abc...");
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGc...");
    }

    #[test]
    fn test_mask_short_token_hides_everything() {
        assert_eq!(mask_token("T1"), "**");
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token(""), "");
    }
}
