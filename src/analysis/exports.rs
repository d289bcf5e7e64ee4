//! Pattern export classification.
//!
//! Given one top-level statement, decide which exports it contributes to
//! the pattern catalog and describe each one as an [`ExportInfo`]. The
//! classifier dispatches on the statement's shape:
//!
//! - exported variable statements yield the first declaration with a type
//!   annotation
//! - exported named classes yield the class itself
//! - `export default expr` / `export = expr` yield the aliased declaration
//! - `export { a, b as c }` yields one record per specifier
//!
//! Every other shape yields nothing. Resolution failures never raise;
//! they simply contribute no record.

use std::fmt;

use serde::Serialize;

use super::doc_tags::{extract_tags, DocumentationTags};
use super::types::{
    Declaration, DeclarationRef, DeclarationResolver, TypeDescriptor, TypeResolver,
};
use crate::parser::ast::{
    ClassDeclaration, ExportAssignment, ExportClause, ExportDeclaration, Statement,
    StatementKind, VariableDeclaration, VariableStatement,
};

/// Coarse category of a pattern, taken from the `@patternType` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PatternTypeKind {
    #[default]
    Pattern,
    SyntheticPage,
    SyntheticPlaceholder,
    SyntheticText,
    SyntheticBox,
    SyntheticConditional,
    SyntheticImage,
    SyntheticLink,
    /// Unrecognized tag value, kept verbatim
    Other(String),
}

impl PatternTypeKind {
    /// The tag value for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            PatternTypeKind::Pattern => "pattern",
            PatternTypeKind::SyntheticPage => "synthetic:page",
            PatternTypeKind::SyntheticPlaceholder => "synthetic:placeholder",
            PatternTypeKind::SyntheticText => "synthetic:text",
            PatternTypeKind::SyntheticBox => "synthetic:box",
            PatternTypeKind::SyntheticConditional => "synthetic:conditional",
            PatternTypeKind::SyntheticImage => "synthetic:image",
            PatternTypeKind::SyntheticLink => "synthetic:link",
            PatternTypeKind::Other(value) => value,
        }
    }

    /// Returns true for the built-in synthetic kinds.
    pub fn is_synthetic(&self) -> bool {
        self.as_str().starts_with("synthetic:")
    }
}

impl From<&str> for PatternTypeKind {
    fn from(value: &str) -> Self {
        match value {
            "pattern" => PatternTypeKind::Pattern,
            "synthetic:page" => PatternTypeKind::SyntheticPage,
            "synthetic:placeholder" => PatternTypeKind::SyntheticPlaceholder,
            "synthetic:text" => PatternTypeKind::SyntheticText,
            "synthetic:box" => PatternTypeKind::SyntheticBox,
            "synthetic:conditional" => PatternTypeKind::SyntheticConditional,
            "synthetic:image" => PatternTypeKind::SyntheticImage,
            "synthetic:link" => PatternTypeKind::SyntheticLink,
            other => PatternTypeKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PatternTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for PatternTypeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One pattern export found in a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportInfo<'a> {
    /// Export identifier; `None` for default exports and export assignments.
    pub export_name: Option<String>,
    /// Human label from `@name`.
    pub display_name: Option<String>,
    /// `@description`, or empty.
    pub description: String,
    /// `@icon`, or empty.
    pub icon: String,
    /// Resolved structural type of the export.
    pub export_type: TypeDescriptor,
    pub pattern_type: PatternTypeKind,
    /// Set by `@ignore`; consumers must skip the export.
    pub ignore: bool,
    /// The statement this record came from.
    pub statement: &'a Statement,
}

/// Metadata shared by every record a statement produces.
#[derive(Debug, Clone, PartialEq)]
struct ExportMetadata {
    is_default: bool,
    ignore: bool,
    display_name: Option<String>,
    description: String,
    icon: String,
    pattern_type: PatternTypeKind,
}

impl ExportMetadata {
    fn new(statement: &Statement, tags: &DocumentationTags) -> Self {
        Self {
            is_default: statement.is_default(),
            ignore: tags.is_ignored(),
            display_name: tags.name().map(str::to_string),
            description: tags.description().unwrap_or_default().to_string(),
            icon: tags.icon().unwrap_or_default().to_string(),
            pattern_type: tags
                .pattern_type()
                .map(PatternTypeKind::from)
                .unwrap_or_default(),
        }
    }

    /// The export name for a declared identifier, dropped for default exports.
    fn export_name(&self, name: &str) -> Option<String> {
        if self.is_default {
            None
        } else {
            Some(name.to_string())
        }
    }

    fn record<'a>(
        &self,
        statement: &'a Statement,
        export_name: Option<String>,
        export_type: TypeDescriptor,
    ) -> ExportInfo<'a> {
        ExportInfo {
            export_name,
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            export_type,
            pattern_type: self.pattern_type.clone(),
            ignore: self.ignore,
            statement,
        }
    }
}

/// Find the first declaration of a variable statement that carries an
/// explicit type annotation.
///
/// Only this declaration can become a pattern: later typed declarations in
/// the same statement are never reported.
pub fn first_typed_declaration(statement: &VariableStatement) -> Option<&VariableDeclaration> {
    statement
        .declarations
        .iter()
        .find(|d| d.type_annotation.is_some())
}

/// Classify one top-level statement into zero or more pattern exports.
pub fn classify<'a, R>(statement: &'a Statement, resolver: &R) -> Vec<ExportInfo<'a>>
where
    R: TypeResolver + DeclarationResolver,
{
    let tags = extract_tags(statement);
    let metadata = ExportMetadata::new(statement, &tags);

    let records = match &statement.kind {
        StatementKind::Variable(_) | StatementKind::Class(_) if !statement.modifiers.exported => {
            Vec::new()
        }
        StatementKind::Variable(variable) => {
            classify_variable(statement, variable, &metadata, resolver)
        }
        StatementKind::Class(class) => classify_class(statement, class, &metadata, resolver),
        StatementKind::ExportAssignment(assignment) => {
            classify_export_assignment(statement, assignment, &metadata, resolver)
        }
        StatementKind::ExportDeclaration(declaration) => {
            classify_export_declaration(statement, declaration, &metadata, resolver)
        }
        StatementKind::Interface(_)
        | StatementKind::TypeAlias(_)
        | StatementKind::Function(_)
        | StatementKind::Import(_)
        | StatementKind::Other { .. } => Vec::new(),
    };

    if !records.is_empty() {
        log::trace!(
            "line {}: {} {} export(s)",
            statement.span.line,
            statement.kind_label(),
            records.len()
        );
    }

    records
}

/// Classify every statement of a module, preserving statement order.
pub fn classify_statements<'a, R>(statements: &'a [Statement], resolver: &R) -> Vec<ExportInfo<'a>>
where
    R: TypeResolver + DeclarationResolver,
{
    statements
        .iter()
        .flat_map(|statement| classify(statement, resolver))
        .collect()
}

fn classify_variable<'a, R>(
    statement: &'a Statement,
    variable: &'a VariableStatement,
    metadata: &ExportMetadata,
    resolver: &R,
) -> Vec<ExportInfo<'a>>
where
    R: TypeResolver,
{
    let Some(declaration) = first_typed_declaration(variable) else {
        return Vec::new();
    };

    let typed = variable
        .declarations
        .iter()
        .filter(|d| d.type_annotation.is_some())
        .count();
    if typed > 1 {
        log::debug!(
            "line {}: {} typed declarations in one statement, only '{}' is reported",
            statement.span.line,
            typed,
            declaration.name
        );
    }

    resolver
        .resolve_type(DeclarationRef::local(Declaration::Variable(declaration)))
        .map(|export_type| {
            metadata.record(statement, metadata.export_name(&declaration.name), export_type)
        })
        .into_iter()
        .collect()
}

fn classify_class<'a, R>(
    statement: &'a Statement,
    class: &'a ClassDeclaration,
    metadata: &ExportMetadata,
    resolver: &R,
) -> Vec<ExportInfo<'a>>
where
    R: TypeResolver,
{
    let Some(name) = &class.name else {
        log::debug!(
            "line {}: unnamed class is not a pattern",
            statement.span.line
        );
        return Vec::new();
    };

    resolver
        .resolve_type(DeclarationRef::local(Declaration::Class(class)))
        .map(|export_type| metadata.record(statement, metadata.export_name(name), export_type))
        .into_iter()
        .collect()
}

fn classify_export_assignment<'a, R>(
    statement: &'a Statement,
    assignment: &ExportAssignment,
    metadata: &ExportMetadata,
    resolver: &R,
) -> Vec<ExportInfo<'a>>
where
    R: TypeResolver + DeclarationResolver,
{
    let Some(declaration) = resolver.resolve_aliased_declaration(&assignment.expression) else {
        log::debug!(
            "line {}: export assignment does not alias a declaration",
            statement.span.line
        );
        return Vec::new();
    };

    resolver
        .resolve_type(declaration)
        .map(|export_type| metadata.record(statement, None, export_type))
        .into_iter()
        .collect()
}

fn classify_export_declaration<'a, R>(
    statement: &'a Statement,
    declaration: &ExportDeclaration,
    metadata: &ExportMetadata,
    resolver: &R,
) -> Vec<ExportInfo<'a>>
where
    R: TypeResolver + DeclarationResolver,
{
    let specifiers = match &declaration.clause {
        Some(ExportClause::Named(specifiers)) => specifiers,
        Some(ExportClause::Namespace(_)) | None => return Vec::new(),
    };

    specifiers
        .iter()
        .filter_map(|specifier| {
            let export_type = resolver
                .resolve_export_specifier(specifier, declaration.source.as_deref())
                .and_then(|target| resolver.resolve_type(target));

            match export_type {
                Some(export_type) => Some(metadata.record(
                    statement,
                    metadata.export_name(&specifier.exported),
                    export_type,
                )),
                None => {
                    log::debug!(
                        "line {}: could not resolve the type of export '{}'",
                        statement.span.line,
                        specifier.exported
                    );
                    None
                }
            }
        })
        .collect()
}
