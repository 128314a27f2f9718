//! Reduces parse events into the statement state completion works from

use crate::sql_parser::{ObjectRef, ParseEvent};

/// What the statement looks like at the cursor: which statement is being
/// written, which clause the cursor sits in, and every table or procedure
/// referenced so far. References live in a stack of scopes so that a closed
/// subquery takes its references with it, while an unterminated one (the
/// cursor is still inside) keeps them visible.
#[derive(Debug, Clone)]
pub struct SqlContext {
    statement: Option<String>,
    clause: Option<String>,
    scopes: Vec<Vec<ObjectRef>>,
    saved_clauses: Vec<Option<String>>,
}

impl Default for SqlContext {
    fn default() -> Self {
        SqlContext {
            statement: None,
            clause: None,
            scopes: vec![Vec::new()],
            saved_clauses: Vec::new(),
        }
    }
}

impl SqlContext {
    pub fn new() -> Self {
        SqlContext::default()
    }

    /// Folds a whole event stream, typically straight out of
    /// [`parse`](crate::sql_parser::parse).
    pub fn from_events(events: impl IntoIterator<Item = ParseEvent>) -> Self {
        let mut context = SqlContext::new();
        for event in events {
            context.apply(event);
        }
        context
    }

    pub fn apply(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::StatementStarted(statement) => {
                // A new statement owns the whole context, even when the
                // previous one died inside an unclosed subquery.
                self.scopes.truncate(1);
                self.scopes[0].clear();
                self.saved_clauses.clear();
                self.clause = None;
                self.statement = Some(statement);
            }
            ParseEvent::ClauseEntered(clause) => {
                self.clause = Some(clause);
            }
            ParseEvent::SubqueryEntered => {
                self.saved_clauses.push(self.clause.take());
                self.scopes.push(Vec::new());
            }
            ParseEvent::SubqueryExited => {
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
                if let Some(saved) = self.saved_clauses.pop() {
                    self.clause = saved;
                }
            }
            ParseEvent::TableReference(obj) | ParseEvent::ProcedureReference(obj) => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.push(obj);
                }
            }
        }
    }

    /// Statement keyword in canonical form (`EXEC` reports as `EXECUTE`),
    /// or `None` before any statement has begun.
    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    /// The clause the cursor sits in, or `None` between the statement
    /// keyword and its first clause.
    pub fn current_clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }

    /// Every reference visible at the cursor, outermost scope first.
    pub fn references(&self) -> Vec<&ObjectRef> {
        self.scopes.iter().flatten().collect()
    }
}
