//! Completion strategies
//! Turns statement context plus the word under the cursor into candidates,
//! querying a [`MetadataProvider`] where the statement text alone is not
//! enough

use std::collections::HashSet;

use strum::{Display, EnumIter};
use tracing::debug;

use crate::completion_provider::MetadataProvider;
use crate::sql_context::SqlContext;
use crate::sql_parser::ObjectRef;

/// Which object kinds a generic lookup should offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionScope {
    pub catalogs: bool,
    pub schemas: bool,
    pub tables: bool,
    pub columns: bool,
    pub procedures: bool,
}

impl CompletionScope {
    /// Catalogs, schemas, tables, and columns; the default for statements
    /// with no dedicated strategy.
    pub const OBJECTS: CompletionScope = CompletionScope {
        catalogs: true,
        schemas: true,
        tables: true,
        columns: true,
        procedures: false,
    };

    pub const PROCEDURES: CompletionScope = CompletionScope {
        catalogs: false,
        schemas: false,
        tables: false,
        columns: false,
        procedures: true,
    };
}

/// How completion behaves for the statement being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStrategy {
    /// No statement yet: nothing to offer.
    Null,
    /// Plain positional lookups by qualifier chain.
    Generic(CompletionScope),
    /// SELECT/UPDATE/DELETE: scope to the tables the statement references.
    QueryScoped,
    /// INSERT: target table columns first, generic objects as fallback.
    InsertTarget,
    /// EXECUTE/CALL: procedure names, then parameters of the named one.
    ProcedureCall,
}

impl CompletionStrategy {
    pub fn for_statement(statement: Option<&str>) -> CompletionStrategy {
        match statement {
            None => CompletionStrategy::Null,
            Some("SELECT" | "UPDATE" | "DELETE") => CompletionStrategy::QueryScoped,
            Some("INSERT") => CompletionStrategy::InsertTarget,
            Some("EXECUTE" | "CALL") => CompletionStrategy::ProcedureCall,
            Some(_) => CompletionStrategy::Generic(CompletionScope::OBJECTS),
        }
    }
}

/// What kind of object a candidate names; drives display styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CandidateKind {
    Catalog,
    Schema,
    Table,
    Column,
    Procedure,
    Parameter,
    Alias,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub kind: CandidateKind,
}

/// Candidate accumulator: discovery order, first occurrence of a name wins.
#[derive(Debug, Default)]
struct CandidateSet {
    items: Vec<Candidate>,
    seen: HashSet<String>,
}

impl CandidateSet {
    fn add(&mut self, text: impl Into<String>, kind: CandidateKind) {
        let text = text.into();
        if self.seen.insert(text.clone()) {
            self.items.push(Candidate { text, kind });
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

/// Produces the completion candidates for one tab press: the statement
/// context selects a strategy, the dotted name parts select the lookups.
/// Provider failures surface as missing candidates, never as errors.
pub fn completion_candidates(
    provider: &mut dyn MetadataProvider,
    context: &SqlContext,
    parts: &[String],
) -> Vec<Candidate> {
    let strategy = CompletionStrategy::for_statement(context.statement());
    debug!(
        "completing {:?} with {strategy:?}, {} name parts",
        context.statement(),
        parts.len()
    );
    let mut set = CandidateSet::default();
    match strategy {
        CompletionStrategy::Null => {}
        CompletionStrategy::Generic(scope) => {
            generic_completions(&mut set, provider, scope, parts);
        }
        CompletionStrategy::QueryScoped => {
            query_scoped_completions(&mut set, provider, context, parts);
        }
        CompletionStrategy::InsertTarget => {
            insert_target_completions(&mut set, provider, context, parts);
        }
        CompletionStrategy::ProcedureCall => {
            procedure_call_completions(&mut set, provider, context, parts);
        }
    }
    set.into_vec()
}

fn current_catalog(provider: &mut dyn MetadataProvider) -> Option<String> {
    match provider.current_catalog() {
        Ok(catalog) => catalog,
        Err(error) => {
            debug!("current catalog unavailable: {error}");
            None
        }
    }
}

fn prefixed(part: &str) -> String {
    format!("{part}%")
}

/// Positional lookups: with N dotted parts the last is a prefix and the
/// ones before it qualify, so `a.b.<TAB>` asks for tables of schema `a.b`'s
/// interpretation at each enabled kind.
fn generic_completions(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    scope: CompletionScope,
    parts: &[String],
) {
    let current = current_catalog(provider);
    let current = current.as_deref();

    if scope.catalogs {
        match parts {
            [] => add_catalogs(set, provider, None),
            [name] => add_catalogs(set, provider, Some(prefixed(name).as_str())),
            _ => {}
        }
    }
    if scope.schemas {
        match parts {
            [] => add_schemas(set, provider, current, None),
            [name] => add_schemas(set, provider, current, Some(prefixed(name).as_str())),
            [catalog, name] => add_schemas(
                set,
                provider,
                Some(catalog.as_str()),
                Some(prefixed(name).as_str()),
            ),
            _ => {}
        }
    }
    if scope.tables {
        match parts {
            [] => add_tables(set, provider, current, "%", "%"),
            [name] => add_tables(set, provider, current, "%", &prefixed(name)),
            [schema, name] => add_tables(set, provider, current, schema, &prefixed(name)),
            [catalog, schema, name] => {
                add_tables(set, provider, Some(catalog.as_str()), schema, &prefixed(name));
            }
            _ => {}
        }
    }
    if scope.columns {
        match parts {
            [table, name] => add_columns(set, provider, current, "%", table, &prefixed(name)),
            [schema, table, name] => {
                add_columns(set, provider, current, schema, table, &prefixed(name));
            }
            [catalog, schema, table, name] => {
                add_columns(
                    set,
                    provider,
                    Some(catalog.as_str()),
                    schema,
                    table,
                    &prefixed(name),
                );
            }
            _ => {}
        }
    }
    if scope.procedures {
        match parts {
            [] => add_procedures(set, provider, current, "%", "%"),
            [name] => add_procedures(set, provider, current, "%", &prefixed(name)),
            [schema, name] => add_procedures(set, provider, current, schema, &prefixed(name)),
            [catalog, schema, name] => {
                add_procedures(set, provider, Some(catalog.as_str()), schema, &prefixed(name));
            }
            _ => {}
        }
    }
}

/// SELECT/UPDATE/DELETE completion. Outside the FROM clause, a statement
/// that references tables completes against those references; everything
/// else (including re-typing one of the referenced names, which means the
/// user is reaching for a different object) widens to generic lookups.
fn query_scoped_completions(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    context: &SqlContext,
    parts: &[String],
) {
    let references = context.references();
    if !references.is_empty()
        && context.current_clause() != Some("FROM")
        && !is_editing_reference(&references, parts)
    {
        referenced_completions(set, &references, parts);
        columns_of_references(set, provider, &references, parts);
        return;
    }
    generic_completions(set, provider, CompletionScope::OBJECTS, parts);
}

/// INSERT completion: the target table's columns, then generic object
/// lookups when no column matched (the target itself is still being typed).
fn insert_target_completions(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    context: &SqlContext,
    parts: &[String],
) {
    let references = context.references();
    let before = set.len();
    columns_of_references(set, provider, &references, parts);
    if set.len() == before {
        generic_completions(set, provider, CompletionScope::OBJECTS, parts);
    }
}

/// EXECUTE/CALL completion: all procedures while none is named, procedure
/// names while one is being typed, its parameters afterward. A synthetic
/// RETURN_VALUE parameter is never offered. When the user types the `@`
/// marker but the backend reports bare names, the marker is restored on the
/// candidates so the replacement stays consistent.
fn procedure_call_completions(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    context: &SqlContext,
    parts: &[String],
) {
    let references = context.references();
    if references.is_empty() {
        let current = current_catalog(provider);
        add_procedures(set, provider, current.as_deref(), "%", "%");
        return;
    }
    if is_editing_reference(&references, parts) {
        generic_completions(set, provider, CompletionScope::PROCEDURES, parts);
        return;
    }

    let procedure = references[0];
    let Some(name) = procedure.name.as_deref() else {
        return;
    };
    let word = parts.last().map(String::as_str).unwrap_or("");
    let wants_marker = word.starts_with('@');
    let prefix = word.strip_prefix('@').unwrap_or(word);
    let current = current_catalog(provider);
    let catalog = procedure.catalog.as_deref().or(current.as_deref());
    match provider.list_procedure_parameters(
        catalog,
        procedure.schema.as_deref().unwrap_or("%"),
        name,
        &prefixed(prefix),
    ) {
        Ok(parameters) => {
            for parameter in parameters {
                if parameter
                    .trim_start_matches('@')
                    .eq_ignore_ascii_case("RETURN_VALUE")
                {
                    continue;
                }
                if wants_marker && !parameter.starts_with('@') {
                    set.add(format!("@{parameter}"), CandidateKind::Parameter);
                } else {
                    set.add(parameter, CandidateKind::Parameter);
                }
            }
        }
        Err(error) => debug!("procedure parameter lookup failed: {error}"),
    }
}

/// True when the typed parts exactly name one of the references.
fn is_editing_reference(references: &[&ObjectRef], parts: &[String]) -> bool {
    if parts.is_empty() {
        return false;
    }
    let typed = ObjectRef::from_parts(parts);
    references.iter().any(|reference| **reference == typed)
}

/// Offers the referenced objects' own names: aliases, catalogs, schemas,
/// and table names that extend what was typed. No metadata lookups.
fn referenced_completions(set: &mut CandidateSet, references: &[&ObjectRef], parts: &[String]) {
    for reference in references {
        if let Some(alias) = &reference.alias {
            let matched = match parts {
                [] => true,
                [p] => alias.starts_with(p.as_str()),
                _ => false,
            };
            if matched && !alias.is_empty() {
                set.add(alias.clone(), CandidateKind::Alias);
            }
        }
        if let Some(catalog) = &reference.catalog {
            let matched = match parts {
                [] => true,
                [p] => catalog.starts_with(p.as_str()),
                _ => false,
            };
            if matched && !catalog.is_empty() {
                set.add(catalog.clone(), CandidateKind::Catalog);
            }
        }
        if let Some(schema) = &reference.schema {
            let matched = match parts {
                [] => true,
                [p] => schema.starts_with(p.as_str()),
                [c, p] => {
                    reference.catalog.as_deref() == Some(c.as_str())
                        && schema.starts_with(p.as_str())
                }
                _ => false,
            };
            if matched && !schema.is_empty() {
                set.add(schema.clone(), CandidateKind::Schema);
            }
        }
        if let Some(name) = &reference.name {
            let matched = match parts {
                [] => true,
                [p] => name.starts_with(p.as_str()),
                [s, p] => {
                    reference.schema.as_deref() == Some(s.as_str())
                        && name.starts_with(p.as_str())
                }
                [c, s, p] => {
                    reference.catalog.as_deref() == Some(c.as_str())
                        && reference.schema.as_deref() == Some(s.as_str())
                        && name.starts_with(p.as_str())
                }
                _ => false,
            };
            if matched && !name.is_empty() {
                set.add(name.clone(), CandidateKind::Table);
            }
        }
    }
}

/// Column completion against each reference the typed parts could mean.
/// A derived table answers from its captured column list without touching
/// the provider; a named table becomes a metadata lookup with the
/// reference's own qualifiers filled in.
fn columns_of_references(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    references: &[&ObjectRef],
    parts: &[String],
) {
    let current = current_catalog(provider);
    for reference in references {
        match reference.name.as_deref() {
            None => {
                let Some(columns) = &reference.columns else {
                    continue;
                };
                let prefix = match parts {
                    [] => Some(""),
                    [p] => Some(p.as_str()),
                    [q, p] if reference.alias.as_deref() == Some(q.as_str()) => Some(p.as_str()),
                    _ => None,
                };
                if let Some(prefix) = prefix {
                    for column in columns {
                        if column.starts_with(prefix) {
                            set.add(column.clone(), CandidateKind::Column);
                        }
                    }
                }
            }
            Some(name) => {
                let prefix = match parts {
                    [] => Some(""),
                    [p] => Some(p.as_str()),
                    [q, p]
                        if reference.alias.as_deref() == Some(q.as_str()) || name == q.as_str() =>
                    {
                        Some(p.as_str())
                    }
                    [s, t, p]
                        if reference.schema.as_deref() == Some(s.as_str())
                            && name == t.as_str() =>
                    {
                        Some(p.as_str())
                    }
                    [c, s, t, p]
                        if reference.catalog.as_deref() == Some(c.as_str())
                            && reference.schema.as_deref() == Some(s.as_str())
                            && name == t.as_str() =>
                    {
                        Some(p.as_str())
                    }
                    _ => None,
                };
                if let Some(prefix) = prefix {
                    add_columns(
                        set,
                        provider,
                        reference.catalog.as_deref().or(current.as_deref()),
                        reference.schema.as_deref().unwrap_or("%"),
                        name,
                        &prefixed(prefix),
                    );
                }
            }
        }
    }
}

fn add_catalogs(set: &mut CandidateSet, provider: &mut dyn MetadataProvider, prefix: Option<&str>) {
    match provider.list_catalogs(prefix) {
        Ok(catalogs) => {
            for catalog in catalogs {
                set.add(catalog, CandidateKind::Catalog);
            }
        }
        Err(error) => debug!("catalog lookup failed: {error}"),
    }
}

fn add_schemas(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    catalog: Option<&str>,
    prefix: Option<&str>,
) {
    match provider.list_schemas(catalog, prefix) {
        Ok(schemas) => {
            for schema in schemas {
                set.add(schema, CandidateKind::Schema);
            }
        }
        Err(error) => debug!("schema lookup failed: {error}"),
    }
}

fn add_tables(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    catalog: Option<&str>,
    schema_pattern: &str,
    name_pattern: &str,
) {
    match provider.list_tables(catalog, schema_pattern, name_pattern, None) {
        Ok(tables) => {
            for table in tables {
                set.add(table, CandidateKind::Table);
            }
        }
        Err(error) => debug!("table lookup failed: {error}"),
    }
}

fn add_columns(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    catalog: Option<&str>,
    schema_pattern: &str,
    table_pattern: &str,
    column_pattern: &str,
) {
    match provider.list_columns(catalog, schema_pattern, table_pattern, column_pattern) {
        Ok(columns) => {
            for column in columns {
                set.add(column, CandidateKind::Column);
            }
        }
        Err(error) => debug!("column lookup failed: {error}"),
    }
}

fn add_procedures(
    set: &mut CandidateSet,
    provider: &mut dyn MetadataProvider,
    catalog: Option<&str>,
    schema_pattern: &str,
    name_pattern: &str,
) {
    match provider.list_procedures(catalog, schema_pattern, name_pattern) {
        Ok(procedures) => {
            for procedure in procedures {
                set.add(procedure, CandidateKind::Procedure);
            }
        }
        Err(error) => debug!("procedure lookup failed: {error}"),
    }
}
