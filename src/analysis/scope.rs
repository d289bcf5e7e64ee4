//! Module-local symbol table.
//!
//! A [`ModuleScope`] indexes the declarations, import bindings and
//! exports of one module by name. It stores statement indices rather than
//! references so it can live next to the module it describes.

use std::collections::HashMap;

use super::types::Declaration;
use crate::parser::ast::{
    ExportClause, Expression, ImportBinding, ImportDeclaration, Statement, StatementKind,
};

/// What kind of declaration a symbol points at within its statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolSlot {
    /// Index into a variable statement's declarations
    Declarator(usize),
    Class,
    Interface,
    TypeAlias,
    Function,
    /// Index into an import statement's bindings
    Import(usize),
}

/// Location of a named declaration inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRef {
    statement: usize,
    slot: SymbolSlot,
}

impl SymbolRef {
    /// Returns true if the symbol is an import binding.
    pub fn is_import(&self) -> bool {
        matches!(self.slot, SymbolSlot::Import(_))
    }
}

/// How a module exposes one of its export names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Exported directly by its declaration (`export class Foo {}`)
    Symbol(SymbolRef),
    /// `export { local as name }`
    Local(String),
    /// `export default expr` / `export = expr`; holds the statement index
    Expression(usize),
    /// `export { name as alias } from 'source'`
    ReExport { source: String, name: String },
}

/// Name tables for a single module.
#[derive(Debug, Clone, Default)]
pub struct ModuleScope {
    values: HashMap<String, SymbolRef>,
    types: HashMap<String, SymbolRef>,
    exports: HashMap<String, ExportTarget>,
    star_exports: Vec<String>,
}

impl ModuleScope {
    /// Index the statements of a module. The first declaration of a name wins.
    pub fn build(statements: &[Statement]) -> Self {
        let mut scope = Self::default();

        for (index, statement) in statements.iter().enumerate() {
            scope.index_statement(index, statement);
        }

        scope
    }

    fn index_statement(&mut self, index: usize, statement: &Statement) {
        let exported = statement.modifiers.exported;
        let default = statement.modifiers.default;

        match &statement.kind {
            StatementKind::Variable(variable) => {
                for (position, declaration) in variable.declarations.iter().enumerate() {
                    if !declaration.is_identifier() {
                        continue;
                    }
                    let symbol = SymbolRef {
                        statement: index,
                        slot: SymbolSlot::Declarator(position),
                    };
                    self.add_value(&declaration.name, symbol);
                    if exported {
                        self.add_export(&declaration.name, ExportTarget::Symbol(symbol));
                    }
                }
            }
            StatementKind::Class(class) => {
                let symbol = SymbolRef {
                    statement: index,
                    slot: SymbolSlot::Class,
                };
                if let Some(name) = &class.name {
                    // classes live in both namespaces
                    self.add_value(name, symbol);
                    self.add_type(name, symbol);
                }
                self.export_declaration(exported, default, class.name.as_deref(), symbol);
            }
            StatementKind::Interface(interface) => {
                let symbol = SymbolRef {
                    statement: index,
                    slot: SymbolSlot::Interface,
                };
                self.add_type(&interface.name, symbol);
                self.export_declaration(exported, default, Some(&interface.name), symbol);
            }
            StatementKind::TypeAlias(alias) => {
                let symbol = SymbolRef {
                    statement: index,
                    slot: SymbolSlot::TypeAlias,
                };
                self.add_type(&alias.name, symbol);
                self.export_declaration(exported, default, Some(&alias.name), symbol);
            }
            StatementKind::Function(function) => {
                let symbol = SymbolRef {
                    statement: index,
                    slot: SymbolSlot::Function,
                };
                if let Some(name) = &function.name {
                    self.add_value(name, symbol);
                }
                self.export_declaration(exported, default, function.name.as_deref(), symbol);
            }
            StatementKind::Import(import) => {
                for (position, binding) in import.bindings.iter().enumerate() {
                    let symbol = SymbolRef {
                        statement: index,
                        slot: SymbolSlot::Import(position),
                    };
                    self.add_value(&binding.local, symbol);
                    self.add_type(&binding.local, symbol);
                }
            }
            StatementKind::ExportAssignment(_) => {
                self.add_export("default", ExportTarget::Expression(index));
            }
            StatementKind::ExportDeclaration(declaration) => match &declaration.clause {
                Some(ExportClause::Named(specifiers)) => {
                    for specifier in specifiers {
                        let target = match &declaration.source {
                            Some(source) => ExportTarget::ReExport {
                                source: source.clone(),
                                name: specifier.local.clone(),
                            },
                            None => ExportTarget::Local(specifier.local.clone()),
                        };
                        self.add_export(&specifier.exported, target);
                    }
                }
                Some(ExportClause::Namespace(_)) => {}
                None => {
                    if let Some(source) = &declaration.source {
                        self.star_exports.push(source.clone());
                    }
                }
            },
            StatementKind::Other { .. } => {}
        }
    }

    fn export_declaration(
        &mut self,
        exported: bool,
        default: bool,
        name: Option<&str>,
        symbol: SymbolRef,
    ) {
        if !exported {
            return;
        }
        let export_name = if default { Some("default") } else { name };
        if let Some(export_name) = export_name {
            self.add_export(export_name, ExportTarget::Symbol(symbol));
        }
    }

    fn add_value(&mut self, name: &str, symbol: SymbolRef) {
        self.values.entry(name.to_string()).or_insert(symbol);
    }

    fn add_type(&mut self, name: &str, symbol: SymbolRef) {
        self.types.entry(name.to_string()).or_insert(symbol);
    }

    fn add_export(&mut self, name: &str, target: ExportTarget) {
        self.exports.entry(name.to_string()).or_insert(target);
    }

    /// Look up a name in the value namespace.
    pub fn value(&self, name: &str) -> Option<SymbolRef> {
        self.values.get(name).copied()
    }

    /// Look up a name in the type namespace.
    pub fn type_symbol(&self, name: &str) -> Option<SymbolRef> {
        self.types.get(name).copied()
    }

    /// How the module exposes an export name.
    pub fn export(&self, name: &str) -> Option<&ExportTarget> {
        self.exports.get(name)
    }

    /// Module specifiers of `export * from '...'` statements.
    pub fn star_exports(&self) -> &[String] {
        &self.star_exports
    }
}

/// Borrow the declaration a symbol points at.
///
/// Import bindings come back as [`Declaration::Import`]; following them
/// to another module is the caller's job.
pub fn declaration_at(statements: &[Statement], symbol: SymbolRef) -> Option<Declaration<'_>> {
    let statement = statements.get(symbol.statement)?;

    match (&statement.kind, symbol.slot) {
        (StatementKind::Variable(variable), SymbolSlot::Declarator(position)) => variable
            .declarations
            .get(position)
            .map(Declaration::Variable),
        (StatementKind::Class(class), SymbolSlot::Class) => Some(Declaration::Class(class)),
        (StatementKind::Interface(interface), SymbolSlot::Interface) => {
            Some(Declaration::Interface(interface))
        }
        (StatementKind::TypeAlias(alias), SymbolSlot::TypeAlias) => {
            Some(Declaration::TypeAlias(alias))
        }
        (StatementKind::Function(function), SymbolSlot::Function) => {
            Some(Declaration::Function(function))
        }
        (StatementKind::Import(import), SymbolSlot::Import(position)) => {
            import.bindings.get(position).map(Declaration::Import)
        }
        _ => None,
    }
}

/// Borrow the import statement and binding behind an import symbol.
pub fn import_at(
    statements: &[Statement],
    symbol: SymbolRef,
) -> Option<(&ImportDeclaration, &ImportBinding)> {
    let statement = statements.get(symbol.statement)?;
    match (&statement.kind, symbol.slot) {
        (StatementKind::Import(import), SymbolSlot::Import(position)) => {
            import.bindings.get(position).map(|binding| (import, binding))
        }
        _ => None,
    }
}

/// Borrow the expression of an `export default` / `export =` statement.
pub fn export_expression_at(statements: &[Statement], statement: usize) -> Option<&Expression> {
    match &statements.get(statement)?.kind {
        StatementKind::ExportAssignment(assignment) => Some(&assignment.expression),
        _ => None,
    }
}
