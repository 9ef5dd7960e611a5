use indexmap::IndexMap;

/// Shapes raw mapping keys into usable element names.
///
/// Formatting never fails; every step is a no-op unless configured.
#[derive(Debug, Clone, Default)]
pub struct NameFormatter {
    key_map: IndexMap<String, String>,
    whitespace_replacement: Option<String>,
    numeric_prefix: Option<String>,
    illegal_char_replacement: Option<String>,
}

impl NameFormatter {
    pub fn new(
        key_map: IndexMap<String, String>,
        whitespace_replacement: Option<String>,
        numeric_prefix: Option<String>,
        illegal_char_replacement: Option<String>,
    ) -> Self {
        Self {
            key_map,
            whitespace_replacement,
            numeric_prefix,
            illegal_char_replacement,
        }
    }

    /// Produce the element name for a raw mapping key.
    ///
    /// A remap-table hit returns the mapped name untouched and skips every
    /// other step; otherwise spaces are substituted, a leading digit gets the
    /// configured prefix, and illegal characters are substituted, in that
    /// order.
    pub fn format(&self, raw: &str) -> String {
        if let Some(mapped) = self.key_map.get(raw) {
            return mapped.clone();
        }

        let mut name = match &self.whitespace_replacement {
            Some(replacement) => raw.replace(' ', replacement),
            None => raw.to_string(),
        };

        if let Some(prefix) = &self.numeric_prefix {
            if name.chars().next().is_some_and(char::is_numeric) {
                name.insert_str(0, prefix);
            }
        }

        if let Some(replacement) = &self.illegal_char_replacement {
            name = replace_illegal_chars(&name, replacement);
        }

        name
    }
}

/// Single left-to-right pass: every character outside `[A-Za-z0-9_.-]`, and
/// additionally a leading `.`, becomes one copy of `replacement`. Adjacent
/// offenders each get their own copy; replacement text is never re-scanned.
fn replace_illegal_chars(name: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (position, c) in name.chars().enumerate() {
        let legal = c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
        if !legal || (position == 0 && c == '.') {
            out.push_str(replacement);
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(
        whitespace: Option<&str>,
        prefix: Option<&str>,
        illegal: Option<&str>,
    ) -> NameFormatter {
        NameFormatter::new(
            IndexMap::new(),
            whitespace.map(str::to_string),
            prefix.map(str::to_string),
            illegal.map(str::to_string),
        )
    }

    #[test]
    fn unconfigured_is_passthrough() {
        let f = NameFormatter::default();
        assert_eq!(f.format("a key with spaces & more"), "a key with spaces & more");
    }

    #[test]
    fn whitespace_replacement() {
        let f = formatter(Some("_"), None, None);
        assert_eq!(f.format("a b"), "a_b");
        assert_eq!(f.format("a  b"), "a__b");
    }

    #[test]
    fn numeric_prefix() {
        let f = formatter(None, Some("n"), None);
        assert_eq!(f.format("3abc"), "n3abc");
        assert_eq!(f.format("abc3"), "abc3");
        assert_eq!(f.format(""), "");
    }

    #[test]
    fn illegal_char_replacement() {
        let f = formatter(None, None, Some("-"));
        assert_eq!(f.format("a#b"), "a-b");
        assert_eq!(f.format(".hidden"), "-hidden");
        assert_eq!(f.format("a.b"), "a.b");
        assert_eq!(f.format("under_score"), "under_score");
    }

    #[test]
    fn adjacent_illegal_chars_each_get_one_copy() {
        let f = formatter(None, None, Some("--"));
        assert_eq!(f.format("a##b"), "a----b");
        assert_eq!(f.format("#"), "--");
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        // '#' maps to '@', itself illegal; one pass means it survives.
        let f = formatter(None, None, Some("@"));
        assert_eq!(f.format("a#b"), "a@b");
    }

    #[test]
    fn remap_short_circuits_other_steps() {
        let mut key_map = IndexMap::new();
        key_map.insert("some key".to_string(), "someKey".to_string());
        key_map.insert("some&key".to_string(), "someAndKey".to_string());
        let f = NameFormatter::new(
            key_map,
            Some("_".to_string()),
            Some("n".to_string()),
            Some("-".to_string()),
        );
        assert_eq!(f.format("some key"), "someKey");
        assert_eq!(f.format("some&key"), "someAndKey");
        // Not in the table: the replacement steps apply.
        assert_eq!(f.format("other key"), "other_key");
    }

    #[test]
    fn all_steps_in_order() {
        let f = formatter(Some("_"), Some("n"), Some("-"));
        assert_eq!(f.format("3 a#b"), "n3_a-b");
    }

    #[test]
    fn format_is_idempotent() {
        let f = formatter(Some("_"), Some("n"), Some("-"));
        for raw in ["3 a#b", "a b", ".x", "plain"] {
            let once = f.format(raw);
            assert_eq!(f.format(&once), once);
        }
    }
}
