/// What a search-bar submission denotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// Address-shaped input; navigate straight to the address view
    LiteralAddress(String),
    /// Anything else; goes to `/search`
    FreeText(String),
}

impl QueryKind {
    pub fn as_str(&self) -> &str {
        match self {
            QueryKind::LiteralAddress(s) | QueryKind::FreeText(s) => s,
        }
    }
}

const MIN_BODY_LEN: usize = 25;
const MAX_BODY_LEN: usize = 62;

/// Classify already-trimmed, non-empty input.
///
/// Pure and deterministic. No checksum is verified: an address-shaped
/// string that does not exist still classifies as `LiteralAddress` and
/// the later fetch reports not-found.
pub fn classify(raw: &str) -> QueryKind {
    if is_address_shaped(raw) {
        QueryKind::LiteralAddress(raw.to_string())
    } else {
        QueryKind::FreeText(raw.to_string())
    }
}

/// `1`, `3` or `bc1`, then 25..=62 characters of the Base58-like alphabet
/// (ASCII digits and letters without `0`, `O`, `I`, `l`)
pub fn is_address_shaped(s: &str) -> bool {
    let body = if let Some(rest) = s.strip_prefix("bc1") {
        rest
    } else if let Some(rest) = s.strip_prefix('1').or_else(|| s.strip_prefix('3')) {
        rest
    } else {
        return false;
    };

    (MIN_BODY_LEN..=MAX_BODY_LEN).contains(&body.len()) && body.chars().all(is_address_char)
}

#[inline]
fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_address_is_literal() {
        let q = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
        assert_eq!(classify(q), QueryKind::LiteralAddress(q.to_string()));
    }

    #[test]
    fn p2sh_and_bech32_prefixes() {
        assert!(is_address_shaped("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy"));
        assert!(is_address_shaped("bc1qar9dzyhxqzsjkgcvmjm8q9t4hxn4x4p7e6g4nh"));
    }

    #[test]
    fn too_short_is_free_text() {
        assert_eq!(classify("bc1qxyz"), QueryKind::FreeText("bc1qxyz".to_string()));
        // 24 body chars
        assert!(!is_address_shaped(&format!("1{}", "a".repeat(24))));
        assert!(is_address_shaped(&format!("1{}", "a".repeat(25))));
    }

    #[test]
    fn too_long_is_free_text() {
        assert!(is_address_shaped(&format!("3{}", "b".repeat(62))));
        assert!(!is_address_shaped(&format!("3{}", "b".repeat(63))));
    }

    #[test]
    fn ambiguous_glyphs_reject() {
        let base = "1A1zP1eP5QGefi2DMPTfTL5SLmv7Divf";
        for bad in ['0', 'O', 'I', 'l'] {
            let q = format!("{base}{bad}a");
            assert_eq!(classify(&q), QueryKind::FreeText(q.clone()), "glyph {bad}");
        }
    }

    #[test]
    fn wrong_prefix_or_text_is_free_text() {
        assert!(!is_address_shaped("2A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(!is_address_shaped("tb1qar9dzyhxqzsjkgcvmjm8q9t4hxn4x4p7e6g4nh"));
        assert_eq!(
            classify("hello world"),
            QueryKind::FreeText("hello world".to_string())
        );
        assert!(!is_address_shaped(""));
        // whitespace and punctuation are outside the alphabet
        assert!(!is_address_shaped("1A1zP1eP5QGefi2DMPTfTL5SLm v7DivfNa"));
        assert!(!is_address_shaped("1A1zP1eP5QGefi2DMPTfTL5SLm-v7DivfNa"));
    }

    #[test]
    fn classification_is_deterministic() {
        let q = "satoshi";
        assert_eq!(classify(q), classify(q));
        assert_eq!(classify(q).as_str(), "satoshi");
    }
}
