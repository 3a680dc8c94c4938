use std::fmt;

/// Ordered keyword list loaded once at startup.
///
/// Matching is a case-insensitive raw substring test: a keyword matches
/// anywhere in the body, including inside longer words.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<String>,
    /// Case-folded copies, index-aligned with `keywords`
    folded: Vec<String>,
}

impl KeywordSet {
    /// Build from already-split keywords. Blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.into().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let folded = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self { keywords, folded }
    }

    /// Parse a comma-separated list such as `"긴급, 공지"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Keywords found in `body`, in configured order and casing.
    /// A missing or empty body never matches, and neither does an empty set.
    pub fn find_matches(&self, body: Option<&str>) -> Vec<&str> {
        let body = match body {
            Some(b) if !b.is_empty() => b.to_lowercase(),
            _ => return Vec::new(),
        };

        self.keywords
            .iter()
            .zip(&self.folded)
            .filter(|(_, folded)| body.contains(folded.as_str()))
            .map(|(keyword, _)| keyword.as_str())
            .collect()
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_drops_blanks() {
        let set = KeywordSet::parse(" alpha ,, beta,  ");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        assert_eq!(set.to_string(), "alpha, beta");
    }

    #[test]
    fn test_korean_keyword_found() {
        let set = KeywordSet::parse("긴급,공지");
        assert_eq!(set.find_matches(Some("오늘 긴급 회의가 있습니다")), vec!["긴급"]);
    }

    #[test]
    fn test_match_ignores_case_and_echoes_configured_casing() {
        let set = KeywordSet::parse("Rust,TOKIO");
        let body = "We ship rust services on Tokio";
        let expected = vec!["Rust", "TOKIO"];
        assert_eq!(set.find_matches(Some(body)), expected);
        assert_eq!(set.find_matches(Some(body.to_uppercase().as_str())), expected);
        assert_eq!(set.find_matches(Some(body.to_lowercase().as_str())), expected);
    }

    #[test]
    fn test_matches_keep_configured_order() {
        let set = KeywordSet::parse("b,a,c");
        assert_eq!(set.find_matches(Some("a c b")), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_substring_inside_word_matches() {
        let set = KeywordSet::parse("cat");
        assert_eq!(set.find_matches(Some("concatenate")), vec!["cat"]);
    }

    #[test]
    fn test_empty_or_missing_body_never_matches() {
        let set = KeywordSet::parse("test");
        assert!(set.find_matches(Some("")).is_empty());
        assert!(set.find_matches(None).is_empty());
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = KeywordSet::parse("");
        assert!(set.is_empty());
        assert!(set.find_matches(Some("anything at all")).is_empty());
    }

    #[test]
    fn test_no_match() {
        let set = KeywordSet::parse("긴급");
        assert!(set.find_matches(Some("평범한 하루")).is_empty());
    }
}
