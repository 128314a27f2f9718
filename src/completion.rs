//! Completion entry point and line-editor integration
//! One pass per tab press: extract the name at the cursor, re-parse the
//! statement, run the strategy, re-quote the results

use nu_ansi_term::{Color, Style};
use reedline::{Completer, Span, Suggestion};
use tracing::debug;

use crate::completer::{Candidate, CandidateKind, completion_candidates};
use crate::completion_provider::MetadataProvider;
use crate::config::CompletionConfig;
use crate::qualified_name::{QuoteStyle, name_parts_at};
use crate::sql_context::SqlContext;
use crate::sql_parser::parse;

/// Completes the name under the cursor.
///
/// `buffer_before` is statement text entered on earlier lines, `line` is the
/// line being edited, and `word` is the token the line editor identified
/// under the cursor, used only to detect quoting. Candidates come back in
/// discovery order, wrapped in the same quoting the user was typing.
pub fn complete(
    provider: &mut dyn MetadataProvider,
    config: &CompletionConfig,
    buffer_before: &str,
    line: &str,
    cursor: usize,
    word: &str,
) -> Vec<String> {
    candidates_at(provider, config, buffer_before, line, cursor, word)
        .into_iter()
        .map(|candidate| candidate.text)
        .collect()
}

/// [`complete`] with each candidate's kind kept, so menu entries can be
/// styled and annotated.
fn candidates_at(
    provider: &mut dyn MetadataProvider,
    config: &CompletionConfig,
    buffer_before: &str,
    line: &str,
    cursor: usize,
    word: &str,
) -> Vec<Candidate> {
    let parts = name_parts_at(line, cursor);
    let quote = QuoteStyle::of_word(word);

    // The statement under analysis is everything entered so far plus the
    // whole line under edit, not just the part before the cursor.
    let sql = format!("{buffer_before}{line}");
    let context = SqlContext::from_events(parse(&sql, config));

    let mut candidates = completion_candidates(provider, &context, &parts);
    if quote != QuoteStyle::None {
        for candidate in &mut candidates {
            candidate.text = quote.apply(&candidate.text);
        }
    }
    candidates
}

/// Start of the word under the cursor. Whitespace, `(` and `,` end a word;
/// `.` does not, so a qualifier chain stays one word; an unclosed `"` or `[`
/// swallows everything up to the cursor.
fn word_start(line: &str, pos: usize) -> usize {
    let prefix = line.get(..pos).unwrap_or(line);
    let mut start = 0;
    let mut delimiter: Option<char> = None;
    for (idx, ch) in prefix.char_indices() {
        match delimiter {
            Some('"') if ch == '"' => delimiter = None,
            Some('[') if ch == ']' => delimiter = None,
            Some(_) => {}
            None => {
                if ch == '"' || ch == '[' {
                    delimiter = Some(ch);
                } else if ch.is_whitespace() || ch == '(' || ch == ',' {
                    start = idx + ch.len_utf8();
                }
            }
        }
    }
    start
}

/// Offset within `word` of its final dot-separated part. Only that part is
/// replaced on accept, so `dbo.ord` completes to `dbo.orders`. Dots inside
/// quotes or brackets stay part of the name.
fn part_offset(word: &str) -> usize {
    let mut offset = 0;
    let mut delimiter: Option<char> = None;
    for (idx, ch) in word.char_indices() {
        match delimiter {
            Some('"') if ch == '"' => delimiter = None,
            Some('[') if ch == ']' => delimiter = None,
            Some(_) => {}
            None => {
                if ch == '"' || ch == '[' {
                    delimiter = Some(ch);
                } else if ch == '.' {
                    offset = idx + 1;
                }
            }
        }
    }
    offset
}

/// Menu color per candidate kind.
fn kind_style(kind: CandidateKind) -> Style {
    let color = match kind {
        CandidateKind::Catalog => Color::Yellow,
        CandidateKind::Schema => Color::Cyan,
        CandidateKind::Table => Color::Green,
        CandidateKind::Column => Color::LightGreen,
        CandidateKind::Procedure => Color::Magenta,
        CandidateKind::Parameter => Color::LightMagenta,
        CandidateKind::Alias => Color::Blue,
    };
    Style::new().fg(color)
}

/// Reedline completer backed by live database metadata.
///
/// The editor hands `complete` only the line being edited; statement text
/// from earlier lines of a multi-line statement is carried in the buffer and
/// must be kept current by the surrounding prompt loop.
pub struct SqlCompleter {
    provider: Box<dyn MetadataProvider>,
    config: CompletionConfig,
    buffer: String,
}

impl SqlCompleter {
    pub fn new(provider: Box<dyn MetadataProvider>, config: CompletionConfig) -> Self {
        Self {
            provider,
            config,
            buffer: String::new(),
        }
    }

    /// Replaces the accumulated statement text from earlier lines.
    pub fn set_buffer(&mut self, sql: impl Into<String>) {
        self.buffer = sql.into();
    }

    /// Drops the accumulated statement text, after execution or a clear.
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }
}

impl Completer for SqlCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        debug!("completion request: line={line:?}, pos={pos}");
        if self.buffer.is_empty() && line.is_empty() {
            return Vec::new();
        }
        let pos = pos.min(line.len());
        let start = word_start(line, pos);
        let word = &line[start..pos];
        let replace_from = start + part_offset(word);

        candidates_at(
            self.provider.as_mut(),
            &self.config,
            &self.buffer,
            line,
            pos,
            &line[replace_from..pos],
        )
        .into_iter()
        .map(|candidate| {
            let kind = candidate.kind;
            Suggestion {
                value: candidate.text,
                description: Some(kind.to_string()),
                span: Span {
                    start: replace_from,
                    end: pos,
                },
                append_whitespace: !matches!(
                    kind,
                    CandidateKind::Catalog | CandidateKind::Schema | CandidateKind::Alias
                ),
                extra: None,
                style: Some(kind_style(kind)),
            }
        })
        .collect()
    }
}

// NoopCompleter that does nothing - used when autocomplete is disabled
pub struct NoopCompleter {}

impl Completer for NoopCompleter {
    fn complete(&mut self, _line: &str, _pos: usize) -> Vec<Suggestion> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion_provider::MockMetadataProvider;
    use rstest::rstest;

    fn row2(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    fn row3(a: &str, b: &str, c: &str) -> (String, String, String) {
        (a.to_string(), b.to_string(), c.to_string())
    }

    fn row4(a: &str, b: &str, c: &str, d: &str) -> (String, String, String, String) {
        (a.to_string(), b.to_string(), c.to_string(), d.to_string())
    }

    fn sample_provider() -> MockMetadataProvider {
        // RUST_LOG=debug shows strategy selection and lookup tracing.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        MockMetadataProvider {
            catalogs: vec!["db1".to_string(), "db2".to_string()],
            schemas: vec![row2("db1", "dbo")],
            tables: vec![
                row3("db1", "dbo", "orders"),
                row3("db1", "dbo", "order_items"),
                row3("db1", "dbo", "My Table"),
            ],
            columns: vec![
                row4("db1", "dbo", "orders", "id"),
                row4("db1", "dbo", "orders", "amount"),
            ],
            current: Some("db1".to_string()),
            ..Default::default()
        }
    }

    fn sample_completer() -> SqlCompleter {
        SqlCompleter::new(Box::new(sample_provider()), CompletionConfig::default())
    }

    #[rstest]
    #[case("SELECT * FROM ord", 17, 14)]
    #[case("SELECT a,b", 10, 9)]
    #[case("f(x", 3, 2)]
    #[case("FROM [My Ta", 11, 5)]
    #[case("WHERE \"a b\".c", 13, 6)]
    #[case("", 0, 0)]
    fn test_word_start(#[case] line: &str, #[case] pos: usize, #[case] expected: usize) {
        assert_eq!(word_start(line, pos), expected);
    }

    #[rstest]
    #[case("ord", 0)]
    #[case("dbo.ord", 4)]
    #[case("c.s.t", 4)]
    #[case("dbo.", 4)]
    #[case("\"a.b\".c", 6)]
    #[case("[My Ta", 0)]
    fn test_part_offset(#[case] word: &str, #[case] expected: usize) {
        assert_eq!(part_offset(word), expected);
    }

    #[test]
    fn test_bracketed_word_yields_bracketed_candidates() {
        let mut provider = sample_provider();
        let config = CompletionConfig::default();
        let line = "SELECT * FROM [My Ta";
        let out = complete(&mut provider, &config, "", line, line.len(), "[My Ta");
        assert_eq!(out, vec!["[My Table]".to_string()]);
    }

    #[test]
    fn test_quoted_word_yields_quoted_candidates() {
        let mut provider = sample_provider();
        let config = CompletionConfig::default();
        let line = "SELECT id FROM \"or";
        let out = complete(&mut provider, &config, "", line, line.len(), "\"or");
        assert_eq!(
            out,
            vec!["\"orders\"".to_string(), "\"order_items\"".to_string()]
        );
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut provider = sample_provider();
        let config = CompletionConfig::default();
        let line = "SELECT * FROM or";
        let first = complete(&mut provider, &config, "", line, line.len(), "or");
        let second = complete(&mut provider, &config, "", line, line.len(), "or");
        assert_eq!(first, second);
        assert_eq!(first, vec!["orders".to_string(), "order_items".to_string()]);
    }

    #[test]
    fn test_prior_lines_supply_the_statement() {
        let mut provider = sample_provider();
        let config = CompletionConfig::default();

        // The current line alone names no statement.
        let bare = complete(&mut provider, &config, "", "FROM ord", 8, "ord");
        assert!(bare.is_empty());

        let out = complete(
            &mut provider,
            &config,
            "SELECT id, amount\n",
            "FROM ord",
            8,
            "ord",
        );
        assert_eq!(out, vec!["orders".to_string(), "order_items".to_string()]);
    }

    #[test]
    fn test_suggestions_replace_only_the_final_part() {
        let mut completer = sample_completer();
        let line = "SELECT * FROM dbo.ord";
        let suggestions = completer.complete(line, line.len());
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["orders", "order_items"]);
        for suggestion in &suggestions {
            assert_eq!(suggestion.span.start, 18);
            assert_eq!(suggestion.span.end, 21);
            assert!(suggestion.append_whitespace);
            assert!(suggestion.style.is_some());
        }
        assert_eq!(suggestions[0].description.as_deref(), Some("table"));
    }

    #[test]
    fn test_bracketed_word_through_the_editor() {
        let mut completer = sample_completer();
        let line = "SELECT * FROM [or";
        let suggestions = completer.complete(line, line.len());
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["[orders]", "[order_items]"]);
        // The span covers the opening bracket so the replacement stays quoted.
        assert_eq!(suggestions[0].span.start, 14);
    }

    #[test]
    fn test_catalog_and_schema_suggestions_expect_a_qualifier_dot() {
        let mut completer = sample_completer();
        let line = "USE d";
        let suggestions = completer.complete(line, line.len());
        let kinds: Vec<&str> = suggestions
            .iter()
            .filter_map(|s| s.description.as_deref())
            .collect();
        assert_eq!(kinds, vec!["catalog", "catalog", "schema"]);
        assert!(suggestions.iter().all(|s| !s.append_whitespace));
    }

    #[test]
    fn test_buffer_carries_earlier_lines() {
        let mut completer = sample_completer();
        completer.set_buffer("INSERT INTO orders\n");
        let suggestions = completer.complete("(", 1);
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["id", "amount"]);

        completer.clear_buffer();
        assert!(completer.complete("(", 1).is_empty());
        assert!(completer.complete("", 0).is_empty());
    }

    #[test]
    fn test_noop_completer_offers_nothing() {
        let mut completer = NoopCompleter {};
        assert!(completer.complete("SELECT * FROM or", 16).is_empty());
    }

    #[test]
    fn test_every_candidate_kind_styled_distinctly() {
        use strum::IntoEnumIterator;

        let kinds: Vec<CandidateKind> = CandidateKind::iter().collect();
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(kind_style(*a), kind_style(*b), "{a} and {b} share a style");
            }
        }
    }
}
