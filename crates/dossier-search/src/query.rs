//! FTS5 match-expression construction.
//!
//! User query text never reaches the `MATCH` operand raw: FTS5 treats bare
//! input as its own query language (AND/OR/NOT, parens, column filters), so
//! an unescaped query is at best a syntax error and at worst a way to probe
//! other columns. Every token is emitted as a quoted string instead.
//!
//! Supported input forms:
//! - bare words — implicit AND: `marketing plan` → `"marketing" "plan"`
//! - quoted phrases — kept as phrases: `"annual report"` → `"annual report"`
//! - trailing-star prefixes: `market*` → `"market"*`
//!
//! Everything else (punctuation, operators) is stripped. An input with no
//! searchable tokens yields `None`; callers short-circuit to an empty result
//! instead of sending `MATCH ''`.

/// Build a sanitized FTS5 match expression from raw query text.
pub fn build_match_expr(query: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    for (i, segment) in query.split('"').enumerate() {
        let quoted = i % 2 == 1;
        if quoted {
            // Inside a user phrase: keep token order as one FTS5 phrase.
            let tokens: Vec<String> = segment
                .split_whitespace()
                .filter_map(|word| clean_token(word).map(|(token, _)| token))
                .collect();
            if !tokens.is_empty() {
                parts.push(format!("\"{}\"", tokens.join(" ")));
            }
        } else {
            for word in segment.split_whitespace() {
                if let Some((token, prefix)) = clean_token(word) {
                    if prefix {
                        parts.push(format!("\"{token}\"*"));
                    } else {
                        parts.push(format!("\"{token}\""));
                    }
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Strip a word down to its token characters.
///
/// Returns the cleaned token and whether the word asked for prefix matching
/// (trailing `*`). Words with no token characters are dropped.
fn clean_token(word: &str) -> Option<(String, bool)> {
    let prefix = word.ends_with('*');
    let token: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if token.is_empty() {
        None
    } else {
        Some((token, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        assert_eq!(build_match_expr("marketing"), Some("\"marketing\"".into()));
    }

    #[test]
    fn test_multiple_tokens_implicit_and() {
        assert_eq!(
            build_match_expr("marketing plan"),
            Some("\"marketing\" \"plan\"".into())
        );
    }

    #[test]
    fn test_quoted_phrase_preserved() {
        assert_eq!(
            build_match_expr("\"annual report\" budget"),
            Some("\"annual report\" \"budget\"".into())
        );
    }

    #[test]
    fn test_prefix_token() {
        assert_eq!(build_match_expr("market*"), Some("\"market\"*".into()));
    }

    #[test]
    fn test_operators_are_neutralized() {
        // FTS5 keywords and column filters must not survive as syntax.
        assert_eq!(
            build_match_expr("title:secret OR (admin)"),
            Some("\"titlesecret\" \"OR\" \"admin\"".into())
        );
    }

    #[test]
    fn test_punctuation_only_is_none() {
        assert_eq!(build_match_expr("!!! --- ???"), None);
        assert_eq!(build_match_expr("   "), None);
        assert_eq!(build_match_expr("\"\""), None);
    }

    #[test]
    fn test_unbalanced_quote() {
        assert_eq!(
            build_match_expr("\"annual report"),
            Some("\"annual report\"".into())
        );
    }

    #[test]
    fn test_embedded_quote_cannot_escape() {
        // A quote in the middle of a word toggles phrase mode but can never
        // smuggle a raw quote into the output.
        let expr = build_match_expr("mar\"keting").unwrap();
        assert_eq!(expr, "\"mar\" \"keting\"");
    }

    #[test]
    fn test_unicode_tokens_kept() {
        assert_eq!(build_match_expr("café 2024"), Some("\"café\" \"2024\"".into()));
    }
}
