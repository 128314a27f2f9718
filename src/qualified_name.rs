//! Qualified-name extraction at the cursor
//! Walks the raw input line to find the dotted name the user is typing

/// How the word under the cursor is quoted. Candidates are re-wrapped in the
/// same style so a completion never changes the user's quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    #[default]
    None,
    DoubleQuoted,
    Bracketed,
}

impl QuoteStyle {
    /// Determined by the first character of the word being completed.
    pub fn of_word(word: &str) -> QuoteStyle {
        match word.chars().next() {
            Some('[') => QuoteStyle::Bracketed,
            Some('"') => QuoteStyle::DoubleQuoted,
            _ => QuoteStyle::None,
        }
    }

    /// Wraps a raw candidate in this quoting style.
    pub fn apply(&self, candidate: &str) -> String {
        match self {
            QuoteStyle::None => candidate.to_string(),
            QuoteStyle::DoubleQuoted => format!("\"{candidate}\""),
            QuoteStyle::Bracketed => format!("[{candidate}]"),
        }
    }
}

/// Extracts the dotted name parts the cursor is sitting on.
///
/// Scans the line up to `cursor`, accumulating `word`, `"quoted word"`, and
/// `[bracketed word]` constructs. A `.` that ends the text or is followed by
/// another `.` contributes an empty part: the user has named a position
/// they intend to fill in (`catalog..table`). Any other character resets the
/// accumulator, so only the name immediately at the cursor survives.
///
/// Parts are raw: delimiters stripped, case untouched.
pub fn name_parts_at(line: &str, cursor: usize) -> Vec<String> {
    let prefix = line.get(..cursor).unwrap_or(line);
    let mut parts: Vec<String> = Vec::new();
    let mut chars = prefix.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_alphabetic() || ch == '_' || ch == '@' {
            let mut word = String::new();
            word.push(ch);
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            parts.push(word);
        } else if ch == '"' {
            let mut word = String::new();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        word.push('"');
                    } else {
                        break;
                    }
                } else {
                    word.push(c);
                }
            }
            parts.push(word);
        } else if ch == '[' {
            let mut word = String::new();
            for c in chars.by_ref() {
                if c == ']' {
                    break;
                }
                word.push(c);
            }
            parts.push(word);
        } else if ch == '.' {
            let next = chars.peek().copied();
            if next.is_none() || next == Some('.') {
                parts.push(String::new());
            }
        } else {
            parts.clear();
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SELECT * FROM t1 WHERE a", vec!["a"])]
    #[case("SELECT * FROM t1 WHERE a.b", vec!["a", "b"])]
    #[case("SELECT * FROM t1 WHERE a.", vec!["a", ""])]
    #[case("SELECT * FROM cat..tab", vec!["cat", "", "tab"])]
    #[case("SELECT * FROM cat..", vec!["cat", "", ""])]
    #[case("UPDATE c.s.t.", vec!["c", "s", "t", ""])]
    fn test_dotted_names(#[case] line: &str, #[case] expected: Vec<&str>) {
        assert_eq!(name_parts_at(line, line.len()), expected);
    }

    #[rstest]
    #[case("INSERT INTO orders (", Vec::<&str>::new())]
    #[case("SELECT a, b", vec!["b"])]
    #[case("WHERE x = y", vec!["y"])]
    #[case("", Vec::<&str>::new())]
    fn test_resets_on_non_name_characters(#[case] line: &str, #[case] expected: Vec<&str>) {
        assert_eq!(name_parts_at(line, line.len()), expected);
    }

    #[test]
    fn test_quoted_and_bracketed_parts() {
        let parts = name_parts_at("SELECT * FROM \"My Schema\".[My Table].col", 40);
        assert_eq!(parts, vec!["My Schema", "My Table", "col"]);
    }

    #[test]
    fn test_unterminated_bracket_at_cursor() {
        let line = "SELECT * FROM [My Ta";
        assert_eq!(name_parts_at(line, line.len()), vec!["My Ta"]);
    }

    #[test]
    fn test_unterminated_quote_at_cursor() {
        let line = "SELECT * FROM \"My Ta";
        assert_eq!(name_parts_at(line, line.len()), vec!["My Ta"]);
    }

    #[test]
    fn test_doubled_quote_inside_quoted_word() {
        let line = "FROM \"a\"\"b\"";
        assert_eq!(name_parts_at(line, line.len()), vec!["a\"b"]);
    }

    #[test]
    fn test_cursor_mid_line() {
        let line = "SELECT x FROM tab WHERE 1=1";
        // Cursor right after "tab".
        assert_eq!(name_parts_at(line, 17), vec!["tab"]);
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        assert_eq!(name_parts_at("abc", 100), vec!["abc"]);
    }

    #[test]
    fn test_variable_word_keeps_marker() {
        let line = "EXEC myproc @p2";
        assert_eq!(name_parts_at(line, line.len()), vec!["@p2"]);
    }

    #[test]
    fn test_adjacent_quoted_word_extends_name() {
        // No separator between a bare word and a quoted word joins them,
        // matching how the scan accretes parts.
        let line = "ab\"cd\"";
        assert_eq!(name_parts_at(line, line.len()), vec!["ab", "cd"]);
    }

    #[rstest]
    #[case("", QuoteStyle::None)]
    #[case("plain", QuoteStyle::None)]
    #[case("\"My T", QuoteStyle::DoubleQuoted)]
    #[case("[My T", QuoteStyle::Bracketed)]
    fn test_quote_style_detection(#[case] word: &str, #[case] expected: QuoteStyle) {
        assert_eq!(QuoteStyle::of_word(word), expected);
    }

    #[test]
    fn test_quote_style_apply() {
        assert_eq!(QuoteStyle::None.apply("tab"), "tab");
        assert_eq!(QuoteStyle::DoubleQuoted.apply("tab"), "\"tab\"");
        assert_eq!(QuoteStyle::Bracketed.apply("My Table"), "[My Table]");
    }
}
