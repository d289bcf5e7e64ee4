//! Owned statement model for JavaScript/TypeScript modules.
//!
//! Tree-sitter nodes borrow their tree, so each top-level statement is
//! lowered into these plain data types once per parse. Everything the
//! export classifier and the resolvers need is captured here; the
//! concrete syntax tree is dropped afterwards.

use std::fmt;
use std::path::PathBuf;

use super::SourceLanguage;

/// Location of a node in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Export modifiers carried by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// `export` keyword present
    pub exported: bool,
    /// `default` keyword present
    pub default: bool,
}

/// One parsed source module: its top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModule {
    pub path: PathBuf,
    pub language: SourceLanguage,
    pub statements: Vec<Statement>,
}

/// A single top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub modifiers: Modifiers,
    /// Raw text of every `/** ... */` block attached to the statement.
    pub doc_comments: Vec<String>,
    pub span: Span,
}

impl Statement {
    /// Returns true if the statement carries the `default` export modifier.
    pub fn is_default(&self) -> bool {
        self.modifiers.default
    }

    /// Short label for diagnostics.
    pub fn kind_label(&self) -> &str {
        match &self.kind {
            StatementKind::Variable(_) => "variable",
            StatementKind::Class(_) => "class",
            StatementKind::ExportAssignment(_) => "export-assignment",
            StatementKind::ExportDeclaration(_) => "export-declaration",
            StatementKind::Interface(_) => "interface",
            StatementKind::TypeAlias(_) => "type-alias",
            StatementKind::Function(_) => "function",
            StatementKind::Import(_) => "import",
            StatementKind::Other { node_kind } => node_kind,
        }
    }
}

/// The syntactic shape of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `const a: A = ..., b = ...`
    Variable(VariableStatement),
    /// `class Foo {}` (name is absent for `export default class {}`)
    Class(ClassDeclaration),
    /// `export default expr;` or `export = expr;`
    ExportAssignment(ExportAssignment),
    /// `export { a, b as c }`, `export * from 'm'`
    ExportDeclaration(ExportDeclaration),
    Interface(InterfaceDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Function(FunctionDeclaration),
    Import(ImportDeclaration),
    /// Anything else, keyed by the tree-sitter node kind
    Other { node_kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableStatement {
    pub declaration_kind: VariableKind,
    pub declarations: Vec<VariableDeclaration>,
}

/// A single binding inside a variable statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// Source text of the binding (identifier or destructuring pattern).
    pub name: String,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

impl VariableDeclaration {
    /// Returns true if the binding is a plain identifier.
    pub fn is_identifier(&self) -> bool {
        !self.name.starts_with('{') && !self.name.starts_with('[')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: Option<String>,
    /// Text of the `extends` clause target, if any.
    pub extends: Option<String>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub name: String,
    pub kind: MemberKind,
    pub type_annotation: Option<TypeNode>,
    pub optional: bool,
    pub is_static: bool,
    /// `private` / `protected` accessibility or a `#private` name
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportAssignment {
    pub expression: Expression,
    /// `export = expr` rather than `export default expr`
    pub export_equals: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDeclaration {
    pub clause: Option<ExportClause>,
    /// Module specifier of a re-export (`from './button'`)
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportClause {
    /// `{ a, b as c }`
    Named(Vec<ExportSpecifier>),
    /// `* as ns`
    Namespace(String),
}

/// One entry of a named export list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    /// The name referenced inside the exporting module (`a` in `a as b`).
    pub local: String,
    /// The name visible to importers (`b` in `a as b`, else same as `local`).
    pub exported: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    pub name: String,
    pub extends: Vec<String>,
    pub members: Vec<PropertySignature>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDeclaration {
    pub name: String,
    pub value: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Option<String>,
    /// Source text of the parameter list, parentheses included
    pub parameters: String,
    pub return_type: Option<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub source: String,
    pub bindings: Vec<ImportBinding>,
}

/// A local name introduced by an import statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBinding {
    pub local: String,
    pub imported: ImportedName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
    Namespace,
}

/// A member of an object type or interface body.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub kind: MemberKind,
    pub type_annotation: Option<TypeNode>,
    pub optional: bool,
}

/// Lowered type syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// `Props`, `React.FC<Props>`
    Reference {
        name: String,
        arguments: Vec<TypeNode>,
    },
    /// `string`, `number`, `any`, ...
    Predefined(String),
    /// `'primary'`, `42`, `true`
    Literal(String),
    Object(Vec<PropertySignature>),
    Function {
        parameters: String,
        return_type: Option<Box<TypeNode>>,
    },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    /// Syntax not modelled above, kept as source text
    Other(String),
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Reference { name, arguments } => {
                write!(f, "{}", name)?;
                if !arguments.is_empty() {
                    write!(f, "<{}>", join_types(arguments, ", "))?;
                }
                Ok(())
            }
            TypeNode::Predefined(text) | TypeNode::Literal(text) | TypeNode::Other(text) => {
                write!(f, "{}", text)
            }
            TypeNode::Object(members) => {
                if members.is_empty() {
                    return write!(f, "{{}}");
                }
                let fields: Vec<String> = members
                    .iter()
                    .map(|m| {
                        let ty = m
                            .type_annotation
                            .as_ref()
                            .map_or_else(|| "any".to_string(), |t| t.to_string());
                        format!("{}{}: {}", m.name, if m.optional { "?" } else { "" }, ty)
                    })
                    .collect();
                write!(f, "{{ {} }}", fields.join("; "))
            }
            TypeNode::Function {
                parameters,
                return_type,
            } => match return_type {
                Some(ret) => write!(f, "{} => {}", parameters, ret),
                None => write!(f, "{} => void", parameters),
            },
            TypeNode::Union(types) => write!(f, "{}", join_types(types, " | ")),
            TypeNode::Intersection(types) => write!(f, "{}", join_types(types, " & ")),
            TypeNode::Array(element) => write!(f, "{}[]", element),
            TypeNode::Tuple(types) => write!(f, "[{}]", join_types(types, ", ")),
        }
    }
}

fn join_types(types: &[TypeNode], separator: &str) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Lowered expression syntax, limited to what declaration aliasing needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    /// `(expr)`
    Parenthesized(Box<Expression>),
    /// `expr as T`, `expr satisfies T`, `expr!`
    Assertion(Box<Expression>),
    /// `a.b`
    Member { object: Box<Expression>, property: String },
    /// `new Foo(...)`
    New { constructor: String },
    /// `foo(...)`
    Call { callee: String },
    /// Arrow function or function expression
    Function {
        parameters: String,
        return_type: Option<TypeNode>,
    },
    /// `class {}` expression
    Class(ClassDeclaration),
    /// Object literal; keys in source order
    Object(Vec<String>),
    /// Any other expression, kept as source text
    Other(String),
}
