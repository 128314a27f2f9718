//! Database metadata provider trait
//! Defines the narrow introspection interface the completion engine consumes

use thiserror::Error;

/// Errors a metadata provider may raise. The completion engine never
/// propagates these; they are logged and treated as zero results.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Metadata operation not supported: {0}")]
    Unsupported(&'static str),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Metadata lookup failed: {0}")]
    LookupFailed(String),
}

/// Synchronous database introspection, owned by the surrounding session.
///
/// Name patterns follow the usual metadata convention: `%` matches anything,
/// and callers append their own trailing `%` when they mean a prefix. A
/// `None` catalog means "any catalog".
pub trait MetadataProvider: Send {
    /// Catalog names, optionally restricted to a prefix.
    fn list_catalogs(&mut self, prefix: Option<&str>) -> Result<Vec<String>, MetadataError>;

    /// Schema names within a catalog. Backends without schema support may
    /// return an empty list.
    fn list_schemas(
        &mut self,
        catalog: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, MetadataError>;

    /// Table and view names matching the given patterns.
    fn list_tables(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
        type_filter: Option<&[&str]>,
    ) -> Result<Vec<String>, MetadataError>;

    /// Column names of tables matching the given patterns.
    fn list_columns(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        table_pattern: &str,
        column_pattern: &str,
    ) -> Result<Vec<String>, MetadataError>;

    /// Stored procedure names matching the given patterns.
    fn list_procedures(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Result<Vec<String>, MetadataError>;

    /// Parameter names of one procedure. Drivers commonly report a synthetic
    /// `RETURN_VALUE` row; the caller filters it out.
    fn list_procedure_parameters(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        procedure: &str,
        param_pattern: &str,
    ) -> Result<Vec<String>, MetadataError>;

    /// The connection's current default catalog, if it has one.
    fn current_catalog(&mut self) -> Result<Option<String>, MetadataError>;
}

/// Mock implementation for testing. Matches patterns the way a typical
/// case-folding backend does: `%` is a wildcard, a trailing `%` makes the
/// rest a prefix, comparison is case-insensitive.
#[cfg(test)]
pub struct MockMetadataProvider {
    pub catalogs: Vec<String>,
    /// (catalog, schema)
    pub schemas: Vec<(String, String)>,
    /// (catalog, schema, table)
    pub tables: Vec<(String, String, String)>,
    /// (catalog, schema, table, column)
    pub columns: Vec<(String, String, String, String)>,
    /// (catalog, schema, procedure)
    pub procedures: Vec<(String, String, String)>,
    /// (catalog, schema, procedure, parameter)
    pub parameters: Vec<(String, String, String, String)>,
    pub current: Option<String>,
    /// When set, every lookup fails; used to check error swallowing.
    pub fail: bool,
    /// Record of every lookup issued, for scoping assertions.
    pub calls: Vec<String>,
}

#[cfg(test)]
impl Default for MockMetadataProvider {
    fn default() -> Self {
        MockMetadataProvider {
            catalogs: Vec::new(),
            schemas: Vec::new(),
            tables: Vec::new(),
            columns: Vec::new(),
            procedures: Vec::new(),
            parameters: Vec::new(),
            current: None,
            fail: false,
            calls: Vec::new(),
        }
    }
}

#[cfg(test)]
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == "%" {
        return true;
    }
    let (head, wildcard) = match pattern.strip_suffix('%') {
        Some(head) => (head, true),
        None => (pattern, false),
    };
    let head = head.to_lowercase();
    let value = value.to_lowercase();
    if wildcard {
        value.starts_with(&head)
    } else {
        value == head
    }
}

#[cfg(test)]
fn opt_matches(filter: Option<&str>, value: &str) -> bool {
    match filter {
        None => true,
        Some(f) => pattern_matches(f, value),
    }
}

#[cfg(test)]
fn prefix_matches(prefix: Option<&str>, value: &str) -> bool {
    match prefix {
        None => true,
        Some(p) => pattern_matches(&format!("{p}%"), value),
    }
}

#[cfg(test)]
impl MockMetadataProvider {
    fn check(&mut self, call: String) -> Result<(), MetadataError> {
        self.calls.push(call);
        if self.fail {
            Err(MetadataError::LookupFailed("mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl MetadataProvider for MockMetadataProvider {
    fn list_catalogs(&mut self, prefix: Option<&str>) -> Result<Vec<String>, MetadataError> {
        self.check(format!("catalogs({prefix:?})"))?;
        Ok(self
            .catalogs
            .iter()
            .filter(|c| prefix_matches(prefix, c))
            .cloned()
            .collect())
    }

    fn list_schemas(
        &mut self,
        catalog: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, MetadataError> {
        self.check(format!("schemas({catalog:?}, {prefix:?})"))?;
        Ok(self
            .schemas
            .iter()
            .filter(|(c, s)| opt_matches(catalog, c) && prefix_matches(prefix, s))
            .map(|(_, s)| s.clone())
            .collect())
    }

    fn list_tables(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
        _type_filter: Option<&[&str]>,
    ) -> Result<Vec<String>, MetadataError> {
        self.check(format!(
            "tables({catalog:?}, {schema_pattern}, {name_pattern})"
        ))?;
        Ok(self
            .tables
            .iter()
            .filter(|(c, s, t)| {
                opt_matches(catalog, c)
                    && pattern_matches(schema_pattern, s)
                    && pattern_matches(name_pattern, t)
            })
            .map(|(_, _, t)| t.clone())
            .collect())
    }

    fn list_columns(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        table_pattern: &str,
        column_pattern: &str,
    ) -> Result<Vec<String>, MetadataError> {
        self.check(format!(
            "columns({catalog:?}, {schema_pattern}, {table_pattern}, {column_pattern})"
        ))?;
        Ok(self
            .columns
            .iter()
            .filter(|(c, s, t, col)| {
                opt_matches(catalog, c)
                    && pattern_matches(schema_pattern, s)
                    && pattern_matches(table_pattern, t)
                    && pattern_matches(column_pattern, col)
            })
            .map(|(_, _, _, col)| col.clone())
            .collect())
    }

    fn list_procedures(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Result<Vec<String>, MetadataError> {
        self.check(format!(
            "procedures({catalog:?}, {schema_pattern}, {name_pattern})"
        ))?;
        Ok(self
            .procedures
            .iter()
            .filter(|(c, s, p)| {
                opt_matches(catalog, c)
                    && pattern_matches(schema_pattern, s)
                    && pattern_matches(name_pattern, p)
            })
            .map(|(_, _, p)| p.clone())
            .collect())
    }

    fn list_procedure_parameters(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: &str,
        procedure: &str,
        param_pattern: &str,
    ) -> Result<Vec<String>, MetadataError> {
        self.check(format!(
            "parameters({catalog:?}, {schema_pattern}, {procedure}, {param_pattern})"
        ))?;
        Ok(self
            .parameters
            .iter()
            .filter(|(c, s, p, param)| {
                opt_matches(catalog, c)
                    && pattern_matches(schema_pattern, s)
                    && pattern_matches(procedure, p)
                    && pattern_matches(param_pattern, param)
            })
            .map(|(_, _, _, param)| param.clone())
            .collect())
    }

    fn current_catalog(&mut self) -> Result<Option<String>, MetadataError> {
        if self.fail {
            return Err(MetadataError::LookupFailed("mock failure".to_string()));
        }
        Ok(self.current.clone())
    }
}
