//! Lexical scanner for SQL text
//! Produces a lazy, paren-depth-aware token stream with one-token peek/unget

use std::iter::Peekable;
use std::str::CharIndices;

/// What a token is, lexically. Statement grammar is the parser's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    QuotedIdentifier,
    BracketedIdentifier,
    Punctuation,
    Operator,
    ParameterMarker,
}

/// A lexical unit with its byte span in the source text. Quoted and
/// bracketed identifiers carry their content with the delimiters stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// True for anything that can begin a qualified object name.
    pub fn is_name(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::BracketedIdentifier
        )
    }

    /// True when the spelling was quoted or bracketed (case-folds differently).
    pub fn is_quoted(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::QuotedIdentifier | TokenKind::BracketedIdentifier
        )
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    /// Case-insensitive keyword test. Quoted identifiers never match:
    /// `"from"` is a name, `from` is a keyword.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Uppercased text for table-driven keyword dispatch.
    pub fn upper(&self) -> String {
        self.text.to_uppercase()
    }
}

fn is_name_begin(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Streaming scanner over one SQL buffer.
///
/// Comments, single-quoted string literals, `@name` variables, and numeric
/// literals are consumed silently; none of them influence what the parser
/// looks for. An unterminated quote or comment runs to end of input rather
/// than failing. `paren_depth` tracks `(`/`)` as they are produced and is
/// readjusted when one is pushed back.
pub struct SqlLexer<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    paren_depth: i32,
    pushed: Option<Token>,
}

impl<'a> SqlLexer<'a> {
    pub fn new(text: &'a str) -> Self {
        SqlLexer {
            text,
            chars: text.char_indices().peekable(),
            paren_depth: 0,
            pushed: None,
        }
    }

    /// Current open-paren nesting. Can go negative on unbalanced input; the
    /// parser's recovery logic only compares depths, never indexes by them.
    pub fn paren_depth(&self) -> i32 {
        self.paren_depth
    }

    /// Forgets accumulated nesting. A statement terminator orphans whatever
    /// parens the dead statement left open.
    pub fn reset_depth(&mut self) {
        self.paren_depth = 0;
    }

    /// Pushes one token back. Callers never stack more than one.
    pub fn unget(&mut self, token: Token) {
        debug_assert!(self.pushed.is_none(), "unget is one token deep");
        if token.is_punct("(") {
            self.paren_depth -= 1;
        } else if token.is_punct(")") {
            self.paren_depth += 1;
        }
        self.pushed = Some(token);
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Option<Token> {
        let token = self.next_token()?;
        self.unget(token.clone());
        Some(token)
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pushed.take() {
            if token.is_punct("(") {
                self.paren_depth += 1;
            } else if token.is_punct(")") {
                self.paren_depth -= 1;
            }
            return Some(token);
        }

        loop {
            self.skip_insignificant();
            let (start, ch) = *self.chars.peek()?;

            if ch == '\'' {
                self.chars.next();
                self.skip_quoted(ch);
                continue;
            }
            if ch == '@' {
                self.chars.next();
                while let Some(&(_, c)) = self.chars.peek() {
                    if is_name_char(c) {
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                continue;
            }
            if ch.is_ascii_digit() || (ch == '.' && self.second_char().is_some_and(|c| c.is_ascii_digit())) {
                self.chars.next();
                while let Some(&(_, c)) = self.chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                continue;
            }

            return Some(match ch {
                '"' => {
                    self.chars.next();
                    let (content, end) = self.read_quoted(ch);
                    Token {
                        text: content,
                        kind: TokenKind::QuotedIdentifier,
                        start,
                        end,
                    }
                }
                '[' => {
                    self.chars.next();
                    let (content, end) = self.read_bracketed();
                    Token {
                        text: content,
                        kind: TokenKind::BracketedIdentifier,
                        start,
                        end,
                    }
                }
                '?' => {
                    self.chars.next();
                    Token {
                        text: "?".to_string(),
                        kind: TokenKind::ParameterMarker,
                        start,
                        end: start + 1,
                    }
                }
                '(' | ')' | ',' | ';' | '.' => {
                    self.chars.next();
                    if ch == '(' {
                        self.paren_depth += 1;
                    } else if ch == ')' {
                        self.paren_depth -= 1;
                    }
                    Token {
                        text: ch.to_string(),
                        kind: TokenKind::Punctuation,
                        start,
                        end: start + ch.len_utf8(),
                    }
                }
                c if is_name_begin(c) => {
                    let mut end = start + c.len_utf8();
                    self.chars.next();
                    while let Some(&(pos, c)) = self.chars.peek() {
                        if is_name_char(c) {
                            end = pos + c.len_utf8();
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    Token {
                        text: self.text[start..end].to_string(),
                        kind: TokenKind::Identifier,
                        start,
                        end,
                    }
                }
                c => {
                    // Everything else (=, <, *, +, ...) is a one-character
                    // operator; the parser only ever looks for `=`.
                    self.chars.next();
                    Token {
                        text: c.to_string(),
                        kind: TokenKind::Operator,
                        start,
                        end: start + c.len_utf8(),
                    }
                }
            });
        }
    }

    fn second_char(&self) -> Option<char> {
        let mut look = self.chars.clone();
        look.next();
        look.next().map(|(_, c)| c)
    }

    /// Skips whitespace, `--` line comments, and `/* */` block comments.
    fn skip_insignificant(&mut self) {
        loop {
            let Some(&(_, c)) = self.chars.peek() else {
                return;
            };
            if c.is_whitespace() {
                self.chars.next();
            } else if c == '-' && self.second_char() == Some('-') {
                self.chars.next();
                self.chars.next();
                for (_, c) in self.chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c == '/' && self.second_char() == Some('*') {
                self.chars.next();
                self.chars.next();
                let mut prev = ' ';
                for (_, c) in self.chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            } else {
                return;
            }
        }
    }

    /// Consumes a quoted region, honoring doubled-quote escapes. The opening
    /// quote has already been consumed; the content is discarded.
    fn skip_quoted(&mut self, quote: char) {
        while let Some((_, c)) = self.chars.next() {
            if c == quote {
                if self.chars.peek().map(|&(_, c)| c) == Some(quote) {
                    self.chars.next();
                } else {
                    return;
                }
            }
        }
    }

    /// Like `skip_quoted` but keeps the content. Doubled quotes collapse to
    /// one. Returns the content and the byte offset just past the region.
    fn read_quoted(&mut self, quote: char) -> (String, usize) {
        let mut content = String::new();
        let mut end = self.text.len();
        while let Some((pos, c)) = self.chars.next() {
            if c == quote {
                if self.chars.peek().map(|&(_, c)| c) == Some(quote) {
                    self.chars.next();
                    content.push(quote);
                } else {
                    end = pos + c.len_utf8();
                    break;
                }
            } else {
                content.push(c);
            }
        }
        (content, end)
    }

    /// Consumes up to the closing `]`. Brackets do not nest and have no
    /// escape; an unterminated bracket runs to end of input.
    fn read_bracketed(&mut self) -> (String, usize) {
        let mut content = String::new();
        let mut end = self.text.len();
        for (pos, c) in self.chars.by_ref() {
            if c == ']' {
                end = pos + 1;
                break;
            }
            content.push(c);
        }
        (content, end)
    }
}

impl Iterator for SqlLexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn texts(sql: &str) -> Vec<String> {
        SqlLexer::new(sql).map(|t| t.text).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens: Vec<Token> = SqlLexer::new("SELECT a.b, c FROM t").collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["SELECT", "a", ".", "b", ",", "c", "FROM", "t"]);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 6);
    }

    #[rstest]
    #[case("SELECT -- trailing comment\nx", vec!["SELECT", "x"])]
    #[case("SELECT /* block */ x", vec!["SELECT", "x"])]
    #[case("SELECT /* unterminated x", vec!["SELECT"])]
    #[case("a -- eol comment with no newline", vec!["a"])]
    fn test_comments_are_skipped(#[case] sql: &str, #[case] expected: Vec<&str>) {
        assert_eq!(texts(sql), expected);
    }

    #[rstest]
    #[case("WHERE x = 'don''t'", vec!["WHERE", "x", "="])]
    #[case("'unterminated literal", Vec::<&str>::new())]
    #[case("VALUES ('a', 'b')", vec!["VALUES", "(", ",", ")"])]
    fn test_string_literals_are_skipped(#[case] sql: &str, #[case] expected: Vec<&str>) {
        assert_eq!(texts(sql), expected);
    }

    #[test]
    fn test_quoted_identifier() {
        let tokens: Vec<Token> = SqlLexer::new("\"My \"\"odd\"\" Table\"").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier);
        assert_eq!(tokens[0].text, "My \"odd\" Table");
    }

    #[test]
    fn test_bracketed_identifier() {
        let tokens: Vec<Token> = SqlLexer::new("[My Table].[col]").collect();
        assert_eq!(tokens[0].kind, TokenKind::BracketedIdentifier);
        assert_eq!(tokens[0].text, "My Table");
        assert_eq!(tokens[1].text, ".");
        assert_eq!(tokens[2].text, "col");
    }

    #[test]
    fn test_unterminated_bracket_runs_to_end() {
        let tokens: Vec<Token> = SqlLexer::new("[My Tab").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "My Tab");
    }

    #[rstest]
    #[case("EXEC @rc = proc1", vec!["EXEC", "=", "proc1"])]
    #[case("SELECT TOP 10 x", vec!["SELECT", "TOP", "x"])]
    #[case("WHERE x > 1.5", vec!["WHERE", "x", ">"])]
    #[case("WHERE x > .5", vec!["WHERE", "x", ">"])]
    fn test_variables_and_numbers_are_skipped(#[case] sql: &str, #[case] expected: Vec<&str>) {
        assert_eq!(texts(sql), expected);
    }

    #[test]
    fn test_parameter_marker() {
        let tokens: Vec<Token> = SqlLexer::new("VALUES (?)").collect();
        assert_eq!(tokens[2].kind, TokenKind::ParameterMarker);
    }

    #[test]
    fn test_paren_depth_tracking() {
        let mut lexer = SqlLexer::new("((a))");
        assert_eq!(lexer.paren_depth(), 0);
        lexer.next_token();
        assert_eq!(lexer.paren_depth(), 1);
        lexer.next_token();
        assert_eq!(lexer.paren_depth(), 2);
        lexer.next_token(); // a
        let close = lexer.next_token().unwrap();
        assert_eq!(lexer.paren_depth(), 1);

        // Pushing the ')' back restores the depth it undid.
        lexer.unget(close);
        assert_eq!(lexer.paren_depth(), 2);
        lexer.next_token();
        assert_eq!(lexer.paren_depth(), 1);
        lexer.next_token();
        assert_eq!(lexer.paren_depth(), 0);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = SqlLexer::new("FROM t");
        let peeked = lexer.peek_token().unwrap();
        assert_eq!(peeked.text, "FROM");
        let taken = lexer.next_token().unwrap();
        assert_eq!(taken, peeked);
        assert_eq!(lexer.next_token().unwrap().text, "t");
        assert!(lexer.next_token().is_none());
    }

    #[test]
    fn test_keyword_matching_ignores_quoting() {
        let mut lexer = SqlLexer::new("from \"from\"");
        assert!(lexer.next_token().unwrap().is_keyword("FROM"));
        assert!(!lexer.next_token().unwrap().is_keyword("FROM"));
    }

    #[test]
    fn test_unbalanced_parens_go_negative() {
        let mut lexer = SqlLexer::new("a))");
        lexer.next_token();
        lexer.next_token();
        lexer.next_token();
        assert_eq!(lexer.paren_depth(), -2);
    }
}
