//! Context-aware tab completion for interactive SQL shells.
//!
//! One pass runs per completion request: [`sql_lexer`] tokenizes the
//! statement buffer, [`sql_parser`] emits structural events, [`sql_context`]
//! reduces them to the statement, clause, and table references in scope at
//! the cursor, and [`completer`] turns that picture plus the dotted name
//! under the cursor into candidates from a [`MetadataProvider`].
//! [`completion`] ties the pipeline to a reedline editor.

pub mod completer;
pub mod completion;
pub mod completion_provider;
pub mod config;
pub mod qualified_name;
pub mod sql_context;
pub mod sql_lexer;
pub mod sql_parser;

pub use completer::{
    Candidate, CandidateKind, CompletionScope, CompletionStrategy, completion_candidates,
};
pub use completion::{NoopCompleter, SqlCompleter, complete};
pub use completion_provider::{MetadataError, MetadataProvider};
pub use config::{CompletionConfig, IdentifierCase};
pub use qualified_name::{QuoteStyle, name_parts_at};
pub use sql_context::SqlContext;
pub use sql_parser::{ObjectRef, ParseEvent, parse};
