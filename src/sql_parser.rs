//! Lenient SQL statement parser for completion
//! Single-pass recursive descent emitting structural events, tolerant of
//! incomplete and malformed input

use crate::config::CompletionConfig;
use crate::sql_lexer::{SqlLexer, Token, TokenKind};
use tracing::debug;

/// Keywords that begin a new top-level statement.
const STATEMENTS: &[&str] = &[
    "ALTER", "BEGIN", "BREAK", "CALL", "COMMIT", "CREATE", "DBCC", "DECLARE", "DELETE", "DROP",
    "DUMP", "END", "EXEC", "EXECUTE", "FETCH", "GOTO", "GRANT", "IF", "INSERT", "LOAD",
    "ROLLBACK", "SELECT", "UPDATE", "USE", "WHILE",
];

/// Clause keywords reported while inside a DML statement.
const CLAUSES: &[&str] = &["COMPUTE", "FROM", "GROUP", "HAVING", "ORDER", "SET", "WHERE"];

/// Join words that continue a FROM list rather than ending it.
const JOIN_QUALIFIERS: &[&str] = &["CROSS", "FULL", "INNER", "LEFT", "NATURAL", "OUTER", "RIGHT"];

fn is_reserved(upper: &str) -> bool {
    STATEMENTS.contains(&upper)
        || CLAUSES.contains(&upper)
        || JOIN_QUALIFIERS.contains(&upper)
        || matches!(
            upper,
            "JOIN"
                | "ON"
                | "AS"
                | "INTO"
                | "VALUES"
                | "WITH"
                | "TABLE"
                | "TOP"
                | "DISTINCT"
                | "ALL"
                | "BY"
                | "AT"
                | "FOR"
                | "UNION"
                | "INTERSECT"
                | "MINUS"
        )
}

/// A referenced or named database object. `schema`/`catalog` hold an empty
/// string when the user wrote an explicitly skipped qualifier (`master..t`).
/// A derived table has no `name`; its projection or column-alias list, when
/// enumerable, lands in `columns`.
#[derive(Debug, Clone, Default)]
pub struct ObjectRef {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub columns: Option<Vec<String>>,
}

impl PartialEq for ObjectRef {
    /// Identity is the four name fields; `columns` is derived data.
    fn eq(&self, other: &Self) -> bool {
        self.catalog == other.catalog
            && self.schema == other.schema
            && self.name == other.name
            && self.alias == other.alias
    }
}

impl Eq for ObjectRef {}

impl ObjectRef {
    /// Builds a ref from dotted name parts, most-qualified first:
    /// `name`, `schema.name`, `catalog.schema.name`. Parts past the third
    /// (a column) do not identify the object and are ignored.
    pub fn from_parts(parts: &[String]) -> ObjectRef {
        let mut obj = ObjectRef::default();
        match parts {
            [] => {}
            [name] => obj.name = Some(name.clone()),
            [schema, name] => {
                obj.schema = Some(schema.clone());
                obj.name = Some(name.clone());
            }
            [catalog, schema, name, ..] => {
                obj.catalog = Some(catalog.clone());
                obj.schema = Some(schema.clone());
                obj.name = Some(name.clone());
            }
        }
        obj
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut wrote = false;
        for part in [&self.catalog, &self.schema, &self.name].into_iter().flatten() {
            if wrote {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
            wrote = true;
        }
        if let Some(alias) = &self.alias {
            if wrote {
                write!(f, " ")?;
            }
            write!(f, "{alias}")?;
        }
        Ok(())
    }
}

/// Structural events in the order the statement text produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    StatementStarted(String),
    ClauseEntered(String),
    SubqueryEntered,
    SubqueryExited,
    TableReference(ObjectRef),
    ProcedureReference(ObjectRef),
}

/// Control-flow result threaded up through the parse routines. Never leaves
/// `parse`: a closing paren is handled by the call level whose construct it
/// closes, a statement boundary unwinds to the statement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseOutcome {
    Continue,
    /// A `)` was consumed; carries the lexer depth observed after it.
    ClosingParen(i32),
    /// A bare `;` was consumed.
    StatementBoundary,
}

/// Parses a whole buffer and returns the events it produced. Malformed or
/// incomplete SQL yields partial events, never an error.
pub fn parse(sql: &str, config: &CompletionConfig) -> Vec<ParseEvent> {
    let mut parser = SqlParser {
        lexer: SqlLexer::new(sql),
        config,
        events: Vec::new(),
        in_dml: false,
    };
    parser.run();
    debug!("parsed {} events from {} bytes", parser.events.len(), sql.len());
    parser.events
}

struct SqlParser<'a> {
    lexer: SqlLexer<'a>,
    config: &'a CompletionConfig,
    events: Vec<ParseEvent>,
    in_dml: bool,
}

impl SqlParser<'_> {
    /// Top-level statement loop. Both recovery outcomes are terminal here:
    /// a closing paren that made it this far matches no construct, and a
    /// statement boundary just means scanning continues afterward.
    fn run(&mut self) {
        while let Some(token) = self.lexer.next_token() {
            if token.is_punct(";") {
                // A dead statement may leave parens unbalanced; the next one
                // starts at depth zero regardless.
                self.lexer.reset_depth();
                continue;
            }
            if token.kind != TokenKind::Identifier {
                continue;
            }
            let upper = token.upper();
            let outcome = if self.lexer.paren_depth() == 0 && self.is_statement_start(&upper) {
                self.parse_statement(&upper)
            } else if upper == "SELECT" && self.lexer.paren_depth() > 0 {
                self.parse_subquery().0
            } else if self.in_dml && CLAUSES.contains(&upper.as_str()) {
                self.events.push(ParseEvent::ClauseEntered(upper.clone()));
                if upper == "FROM" {
                    self.parse_from_clause()
                } else {
                    ParseOutcome::Continue
                }
            } else {
                ParseOutcome::Continue
            };
            if outcome == ParseOutcome::StatementBoundary {
                self.lexer.reset_depth();
            }
        }
    }

    fn is_statement_start(&mut self, upper: &str) -> bool {
        if !STATEMENTS.contains(&upper) {
            return false;
        }
        // FETCH FIRST is the row-limit clause, not a cursor FETCH statement.
        if upper == "FETCH"
            && self
                .lexer
                .peek_token()
                .is_some_and(|t| t.is_keyword("FIRST"))
        {
            return false;
        }
        true
    }

    fn parse_statement(&mut self, upper: &str) -> ParseOutcome {
        self.in_dml = matches!(upper, "SELECT" | "INSERT" | "UPDATE" | "DELETE");
        let canonical = if upper == "EXEC" { "EXECUTE" } else { upper };
        self.events
            .push(ParseEvent::StatementStarted(canonical.to_string()));
        match canonical {
            "INSERT" => self.parse_insert(),
            "UPDATE" => self.parse_update(),
            "DELETE" => self.parse_delete(),
            "EXECUTE" | "CALL" => self.parse_procedure_call(),
            // SELECT reaches its FROM through the clause path.
            _ => ParseOutcome::Continue,
        }
    }

    fn normalize(&self, token: &Token) -> String {
        self.config.normalize(&token.text, token.is_quoted())
    }

    /// Reads the rest of a dotted name whose first token is already in hand.
    /// `a..b` keeps the skipped qualifier as an empty part.
    fn parse_object_name(&mut self, first: Token) -> ObjectRef {
        let mut parts = vec![self.normalize(&first)];
        loop {
            match self.lexer.peek_token() {
                Some(t) if t.is_punct(".") => {
                    self.lexer.next_token();
                }
                _ => break,
            }
            match self.lexer.next_token() {
                Some(t) if t.is_punct(".") => {
                    parts.push(String::new());
                    self.lexer.unget(t);
                }
                Some(t) if t.is_name() => parts.push(self.normalize(&t)),
                Some(t) => {
                    self.lexer.unget(t);
                    break;
                }
                None => break,
            }
        }
        ObjectRef::from_parts(&parts)
    }

    fn parse_insert(&mut self) -> ParseOutcome {
        let Some(mut token) = self.lexer.next_token() else {
            return ParseOutcome::Continue;
        };
        if token.is_keyword("INTO") {
            match self.lexer.next_token() {
                Some(t) => token = t,
                None => return ParseOutcome::Continue,
            }
        }
        if token.is_name() && !(token.kind == TokenKind::Identifier && is_reserved(&token.upper()))
        {
            let target = self.parse_object_name(token);
            self.events.push(ParseEvent::TableReference(target));
        } else {
            self.lexer.unget(token);
        }
        ParseOutcome::Continue
    }

    fn parse_update(&mut self) -> ParseOutcome {
        let Some(mut token) = self.lexer.next_token() else {
            return ParseOutcome::Continue;
        };
        if token.is_keyword("TOP") {
            let outcome = self.skip_top_count();
            if outcome != ParseOutcome::Continue {
                return outcome;
            }
            match self.lexer.next_token() {
                Some(t) => token = t,
                None => return ParseOutcome::Continue,
            }
        }
        if token.is_punct("(") {
            return self.parse_parenthesized_source();
        }
        if token.is_name() && !(token.kind == TokenKind::Identifier && is_reserved(&token.upper()))
        {
            let target = self.parse_object_name(token);
            self.events.push(ParseEvent::TableReference(target));
        } else {
            self.lexer.unget(token);
        }
        ParseOutcome::Continue
    }

    fn parse_delete(&mut self) -> ParseOutcome {
        let Some(mut token) = self.lexer.next_token() else {
            return ParseOutcome::Continue;
        };
        if token.is_keyword("TOP") {
            let outcome = self.skip_top_count();
            if outcome != ParseOutcome::Continue {
                return outcome;
            }
            match self.lexer.next_token() {
                Some(t) => token = t,
                None => return ParseOutcome::Continue,
            }
        }
        if token.is_keyword("FROM") {
            match self.lexer.next_token() {
                Some(t) => token = t,
                None => return ParseOutcome::Continue,
            }
        }
        // Comma-separated table list; delete knows no ANSI joins.
        loop {
            if !token.is_name()
                || (token.kind == TokenKind::Identifier && is_reserved(&token.upper()))
            {
                self.lexer.unget(token);
                return ParseOutcome::Continue;
            }
            let mut target = self.parse_object_name(token);
            target.alias = self.try_alias();
            self.events.push(ParseEvent::TableReference(target));
            match self.lexer.next_token() {
                Some(t) if t.is_punct(",") => match self.lexer.next_token() {
                    Some(next) => token = next,
                    None => return ParseOutcome::Continue,
                },
                Some(t) => {
                    self.lexer.unget(t);
                    return ParseOutcome::Continue;
                }
                None => return ParseOutcome::Continue,
            }
        }
    }

    /// CALL/EXECUTE target. The scanner discarded any `@return_code`
    /// variable, so that form shows up as a leading `=`.
    fn parse_procedure_call(&mut self) -> ParseOutcome {
        let Some(mut token) = self.lexer.next_token() else {
            return ParseOutcome::Continue;
        };
        if token.kind == TokenKind::Operator && token.text == "=" {
            match self.lexer.next_token() {
                Some(t) => token = t,
                None => return ParseOutcome::Continue,
            }
        }
        if token.is_name() && !(token.kind == TokenKind::Identifier && is_reserved(&token.upper()))
        {
            let proc = self.parse_object_name(token);
            self.events.push(ParseEvent::ProcedureReference(proc));
        } else {
            self.lexer.unget(token);
        }
        ParseOutcome::Continue
    }

    /// The count itself is invisible (numbers are discarded), but `TOP (10)`
    /// leaves its parens behind.
    fn skip_top_count(&mut self) -> ParseOutcome {
        match self.lexer.peek_token() {
            Some(t) if t.is_punct("(") => {
                self.lexer.next_token();
                self.consume_parenthesized()
            }
            _ => ParseOutcome::Continue,
        }
    }

    /// Parses a subquery whose SELECT keyword was just consumed. Emits the
    /// entry/exit events and, when the projection is a plain name list,
    /// returns it for derived-table column capture. Ends when the paren that
    /// contains the SELECT closes, at a `;`, or at end of input (the cursor
    /// is then still inside the subquery, which is exactly the state the
    /// completer wants).
    fn parse_subquery(&mut self) -> (ParseOutcome, Option<Vec<String>>) {
        let close_depth = self.lexer.paren_depth() - 1;
        self.events.push(ParseEvent::SubqueryEntered);
        let projection = self.try_collect_projection();

        loop {
            let Some(token) = self.lexer.next_token() else {
                return (ParseOutcome::Continue, projection);
            };
            if token.is_punct(")") {
                let depth = self.lexer.paren_depth();
                if depth <= close_depth {
                    self.events.push(ParseEvent::SubqueryExited);
                    let outcome = if depth < close_depth {
                        ParseOutcome::ClosingParen(depth)
                    } else {
                        ParseOutcome::Continue
                    };
                    return (outcome, projection);
                }
                continue;
            }
            if token.is_punct(";") {
                // The statement died mid-subquery; no exit event, the next
                // statement will reset the scope stack.
                return (ParseOutcome::StatementBoundary, projection);
            }
            if token.kind != TokenKind::Identifier {
                continue;
            }
            let upper = token.upper();
            let outcome = if upper == "SELECT" {
                self.parse_subquery().0
            } else if CLAUSES.contains(&upper.as_str()) {
                self.events.push(ParseEvent::ClauseEntered(upper.clone()));
                if upper == "FROM" {
                    self.parse_from_clause()
                } else {
                    ParseOutcome::Continue
                }
            } else {
                ParseOutcome::Continue
            };
            match outcome {
                ParseOutcome::Continue => {}
                ParseOutcome::ClosingParen(depth) => {
                    if depth <= close_depth {
                        self.events.push(ParseEvent::SubqueryExited);
                        let outcome = if depth < close_depth {
                            ParseOutcome::ClosingParen(depth)
                        } else {
                            ParseOutcome::Continue
                        };
                        return (outcome, projection);
                    }
                }
                ParseOutcome::StatementBoundary => {
                    return (ParseOutcome::StatementBoundary, projection);
                }
            }
        }
    }

    /// Attempts to read `a, b.c, d AS e` up to FROM. Anything else (stars,
    /// expressions, reserved words) makes the projection non-enumerable.
    /// FROM itself is never consumed.
    fn try_collect_projection(&mut self) -> Option<Vec<String>> {
        let mut columns = Vec::new();
        loop {
            let first = self.lexer.peek_token()?;
            if !first.is_name()
                || (first.kind == TokenKind::Identifier && is_reserved(&first.upper()))
            {
                return None;
            }
            self.lexer.next_token();
            let mut column = self.normalize(&first);

            // Qualified projections keep only the column part.
            loop {
                match self.lexer.peek_token() {
                    Some(t) if t.is_punct(".") => {
                        self.lexer.next_token();
                        match self.lexer.next_token() {
                            Some(t) if t.is_name() => column = self.normalize(&t),
                            _ => return None,
                        }
                    }
                    _ => break,
                }
            }

            // An alias renames the output column.
            match self.lexer.peek_token() {
                Some(t) if t.is_keyword("AS") => {
                    self.lexer.next_token();
                    match self.lexer.next_token() {
                        Some(t) if t.is_name() => column = self.normalize(&t),
                        _ => return None,
                    }
                }
                Some(t)
                    if t.is_name()
                        && !(t.kind == TokenKind::Identifier && is_reserved(&t.upper())) =>
                {
                    self.lexer.next_token();
                    column = self.normalize(&t);
                }
                _ => {}
            }
            columns.push(column);

            match self.lexer.peek_token() {
                Some(t) if t.is_punct(",") => {
                    self.lexer.next_token();
                }
                Some(t) if t.is_keyword("FROM") => return Some(columns),
                _ => return None,
            }
        }
    }

    /// Parses the table sources of a FROM list: plain names, derived tables,
    /// TABLE() calls, comma and ANSI joins, aliases. Returns when a clause
    /// keyword or statement keyword follows (pushed back for the statement
    /// loop), when the enclosing paren closes, or at `;`/end of input.
    fn parse_from_clause(&mut self) -> ParseOutcome {
        loop {
            // One table source.
            let Some(token) = self.lexer.next_token() else {
                return ParseOutcome::Continue;
            };
            if token.is_punct(")") {
                return ParseOutcome::ClosingParen(self.lexer.paren_depth());
            }
            if token.is_punct(";") {
                return ParseOutcome::StatementBoundary;
            }
            if token.is_punct(",") {
                continue;
            }
            if token.is_punct("(") {
                let outcome = self.parse_parenthesized_source();
                if outcome != ParseOutcome::Continue {
                    return outcome;
                }
            } else if token.kind == TokenKind::Identifier && self.ends_from_list(&token) {
                return ParseOutcome::Continue;
            } else if token.is_keyword("TABLE")
                && self.lexer.peek_token().is_some_and(|t| t.is_punct("("))
            {
                self.lexer.next_token();
                let outcome = self.consume_parenthesized();
                if outcome != ParseOutcome::Continue {
                    return outcome;
                }
                let (alias, columns, outcome) = self.try_alias_and_columns();
                if alias.is_some() {
                    self.events.push(ParseEvent::TableReference(ObjectRef {
                        alias,
                        columns,
                        ..ObjectRef::default()
                    }));
                }
                if outcome != ParseOutcome::Continue {
                    return outcome;
                }
            } else if token.is_name() {
                let mut table = self.parse_object_name(token);
                let (alias, columns, outcome) = self.try_alias_and_columns();
                table.alias = alias;
                if columns.is_some() {
                    table.columns = columns;
                }
                self.events.push(ParseEvent::TableReference(table));
                if outcome != ParseOutcome::Continue {
                    return outcome;
                }
            } else {
                // An operator or marker where a table should be: this FROM
                // list is done.
                self.lexer.unget(token);
                return ParseOutcome::Continue;
            }

            // Scan past hints and join conditions to the next source.
            let mut in_on = false;
            loop {
                let Some(token) = self.lexer.next_token() else {
                    return ParseOutcome::Continue;
                };
                if token.is_punct(")") {
                    return ParseOutcome::ClosingParen(self.lexer.paren_depth());
                }
                if token.is_punct(";") {
                    return ParseOutcome::StatementBoundary;
                }
                if token.is_punct(",") {
                    if in_on {
                        self.events
                            .push(ParseEvent::ClauseEntered("FROM".to_string()));
                    }
                    break;
                }
                if token.is_punct("(") {
                    let outcome = match self.lexer.peek_token() {
                        Some(t) if t.is_keyword("SELECT") => {
                            self.lexer.next_token();
                            self.parse_subquery().0
                        }
                        _ => self.consume_parenthesized(),
                    };
                    match outcome {
                        ParseOutcome::Continue => continue,
                        other => return other,
                    }
                }
                if token.kind != TokenKind::Identifier {
                    continue;
                }
                let upper = token.upper();
                if upper == "ON" {
                    if !in_on {
                        self.events.push(ParseEvent::ClauseEntered("ON".to_string()));
                        in_on = true;
                    }
                    continue;
                }
                if upper == "JOIN" {
                    if in_on {
                        self.events
                            .push(ParseEvent::ClauseEntered("FROM".to_string()));
                    }
                    break;
                }
                if JOIN_QUALIFIERS.contains(&upper.as_str()) {
                    continue;
                }
                if self.ends_from_list(&token) {
                    return ParseOutcome::Continue;
                }
            }
        }
    }

    /// Boundary test for FROM-list parsing. Clause and statement keywords
    /// are pushed back so the statement loop reports them (it knows FETCH
    /// FIRST is a row limit, not a cursor FETCH); two-word boundaries
    /// (AT ISOLATION, FOR READ/UPDATE/BROWSE) are consumed whole so their
    /// second word cannot masquerade as a statement start.
    fn ends_from_list(&mut self, token: &Token) -> bool {
        let upper = token.upper();
        match upper.as_str() {
            "WHERE" | "GROUP" | "ORDER" | "HAVING" | "UNION" | "INTERSECT" | "MINUS"
            | "COMPUTE" => {
                self.lexer.unget(token.clone());
                true
            }
            "AT" => {
                if self
                    .lexer
                    .peek_token()
                    .is_some_and(|t| t.is_keyword("ISOLATION"))
                {
                    self.lexer.next_token();
                    true
                } else {
                    false
                }
            }
            "FOR" => {
                let follows = self.lexer.peek_token().is_some_and(|t| {
                    t.is_keyword("READ") || t.is_keyword("UPDATE") || t.is_keyword("BROWSE")
                });
                if follows {
                    self.lexer.next_token();
                    true
                } else {
                    false
                }
            }
            _ => {
                if STATEMENTS.contains(&upper.as_str()) {
                    self.lexer.unget(token.clone());
                    true
                } else {
                    false
                }
            }
        }
    }

    /// A parenthesized table source whose `(` was just consumed: either a
    /// derived table or guts (a join expression) this parser does not model.
    fn parse_parenthesized_source(&mut self) -> ParseOutcome {
        match self.lexer.peek_token() {
            Some(t) if t.is_keyword("SELECT") => {
                self.lexer.next_token();
                let (outcome, projection) = self.parse_subquery();
                if outcome != ParseOutcome::Continue {
                    return outcome;
                }
                let (alias, columns, outcome) = self.try_alias_and_columns();
                self.events.push(ParseEvent::TableReference(ObjectRef {
                    alias,
                    columns: columns.or(projection),
                    ..ObjectRef::default()
                }));
                outcome
            }
            _ => {
                let outcome = self.consume_parenthesized();
                if outcome != ParseOutcome::Continue {
                    return outcome;
                }
                let (alias, columns, outcome) = self.try_alias_and_columns();
                if alias.is_some() {
                    self.events.push(ParseEvent::TableReference(ObjectRef {
                        alias,
                        columns,
                        ..ObjectRef::default()
                    }));
                }
                outcome
            }
        }
    }

    /// `AS alias`, bare alias, and an optional trailing `(c1, c2)` column
    /// alias list. Reserved words never become aliases.
    fn try_alias_and_columns(&mut self) -> (Option<String>, Option<Vec<String>>, ParseOutcome) {
        let alias = self.try_alias();
        if alias.is_none() {
            return (None, None, ParseOutcome::Continue);
        }
        match self.lexer.peek_token() {
            Some(t) if t.is_punct("(") => {
                self.lexer.next_token();
                let (columns, outcome) = self.parse_column_alias_list();
                (alias, columns, outcome)
            }
            _ => (alias, None, ParseOutcome::Continue),
        }
    }

    fn try_alias(&mut self) -> Option<String> {
        let token = self.lexer.next_token()?;
        if token.is_keyword("AS") {
            return match self.lexer.next_token() {
                Some(t) if t.is_name() => Some(self.normalize(&t)),
                Some(t) => {
                    self.lexer.unget(t);
                    None
                }
                None => None,
            };
        }
        if token.is_name() && !(token.kind == TokenKind::Identifier && is_reserved(&token.upper()))
        {
            return Some(self.normalize(&token));
        }
        self.lexer.unget(token);
        None
    }

    /// `(c1, c2, ...)` after an alias. Anything but names and commas means
    /// this was not a column list; the rest of the parens is drained.
    fn parse_column_alias_list(&mut self) -> (Option<Vec<String>>, ParseOutcome) {
        let close_depth = self.lexer.paren_depth() - 1;
        let mut columns = Vec::new();
        loop {
            let Some(token) = self.lexer.next_token() else {
                return (None, ParseOutcome::Continue);
            };
            if token.is_punct(")") {
                let depth = self.lexer.paren_depth();
                let outcome = if depth < close_depth {
                    ParseOutcome::ClosingParen(depth)
                } else {
                    ParseOutcome::Continue
                };
                let columns = if columns.is_empty() { None } else { Some(columns) };
                return (columns, outcome);
            }
            if token.is_punct(";") {
                return (None, ParseOutcome::StatementBoundary);
            }
            if token.is_punct(",") {
                continue;
            }
            if token.is_name() {
                columns.push(self.normalize(&token));
                continue;
            }
            let outcome = self.consume_until_close(close_depth);
            return (None, outcome);
        }
    }

    /// Consumes uninterpreted paren contents; the `(` was just consumed.
    fn consume_parenthesized(&mut self) -> ParseOutcome {
        self.consume_until_close(self.lexer.paren_depth() - 1)
    }

    /// Drains tokens until a `)` brings the lexer back to `close_depth`.
    /// Nested parens need no recursion: only the depth matters. Ends quietly
    /// at end of input.
    fn consume_until_close(&mut self, close_depth: i32) -> ParseOutcome {
        loop {
            let Some(token) = self.lexer.next_token() else {
                return ParseOutcome::Continue;
            };
            if token.is_punct(")") {
                let depth = self.lexer.paren_depth();
                if depth <= close_depth {
                    return if depth < close_depth {
                        ParseOutcome::ClosingParen(depth)
                    } else {
                        ParseOutcome::Continue
                    };
                }
            } else if token.is_punct(";") {
                return ParseOutcome::StatementBoundary;
            }
        }
    }
}
