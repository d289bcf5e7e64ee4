//! Structural type descriptors and the resolver contracts consumed by the
//! export classifier.
//!
//! The classifier never inspects a [`TypeDescriptor`]; it only attaches
//! it to the export record. Resolution itself is delegated to
//! implementations of [`TypeResolver`] and [`DeclarationResolver`] that
//! query a shared, read-only view of the parsed program.

use serde::Serialize;

use super::program::ModuleId;
use crate::parser::ast::{
    ClassDeclaration, ExportSpecifier, Expression, FunctionDeclaration, ImportBinding,
    InterfaceDeclaration, MemberKind, TypeAliasDeclaration, VariableDeclaration,
};

/// Coarse shape of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Object,
    Class,
    Function,
    Primitive,
    Literal,
    Union,
    Intersection,
    Array,
    Tuple,
    /// A named type that could not be followed to a declaration
    Reference,
    Unknown,
}

/// A member of a resolved object or class type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMember {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub optional: bool,
    pub method: bool,
}

/// Structural description of a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    /// Declared name (`Props`, `React.FC`), absent for anonymous types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: TypeKind,
    /// Source-like rendering of the type
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<TypeMember>,
    /// Type arguments of a generic reference (`Props` in `React.FC<Props>`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeDescriptor>,
    /// Constituents of a union, intersection or tuple, or an array's element
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Create a descriptor with no members or type arguments.
    pub fn new(name: Option<String>, kind: TypeKind, text: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            text: text.into(),
            members: Vec::new(),
            type_arguments: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn unknown(text: impl Into<String>) -> Self {
        Self::new(None, TypeKind::Unknown, text)
    }

    pub fn with_members(mut self, members: Vec<TypeMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_type_arguments(mut self, arguments: Vec<TypeDescriptor>) -> Self {
        self.type_arguments = arguments;
        self
    }

    pub fn with_elements(mut self, elements: Vec<TypeDescriptor>) -> Self {
        self.elements = elements;
        self
    }

    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&TypeMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Property members, skipping methods.
    pub fn properties(&self) -> impl Iterator<Item = &TypeMember> {
        self.members.iter().filter(|m| !m.method)
    }
}

impl TypeMember {
    pub fn new(name: impl Into<String>, kind: MemberKind, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            optional: false,
            method: kind == MemberKind::Method,
        }
    }
}

/// A declaration a name or expression can resolve to.
///
/// Borrows from the module that owns the declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Declaration<'a> {
    Variable(&'a VariableDeclaration),
    Class(&'a ClassDeclaration),
    Interface(&'a InterfaceDeclaration),
    TypeAlias(&'a TypeAliasDeclaration),
    Function(&'a FunctionDeclaration),
    /// An import binding whose target could not be followed
    Import(&'a ImportBinding),
}

impl<'a> Declaration<'a> {
    /// Declared name, if the declaration has one.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Declaration::Variable(v) => Some(v.name.as_str()),
            Declaration::Class(c) => c.name.as_deref(),
            Declaration::Interface(i) => Some(i.name.as_str()),
            Declaration::TypeAlias(t) => Some(t.name.as_str()),
            Declaration::Function(f) => f.name.as_deref(),
            Declaration::Import(b) => Some(b.local.as_str()),
        }
    }
}

/// A declaration plus the module that declares it.
///
/// `module` is `None` for declarations taken straight from the statement
/// being classified, which belong to the resolver's own module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclarationRef<'a> {
    pub declaration: Declaration<'a>,
    pub module: Option<ModuleId>,
}

impl<'a> DeclarationRef<'a> {
    pub fn local(declaration: Declaration<'a>) -> Self {
        Self {
            declaration,
            module: None,
        }
    }

    pub fn in_module(declaration: Declaration<'a>, module: ModuleId) -> Self {
        Self {
            declaration,
            module: Some(module),
        }
    }
}

/// Resolves a declaration to its structural type.
pub trait TypeResolver {
    /// Returns `None` only when no type can be determined; annotated
    /// variables and classes always resolve.
    fn resolve_type(&self, declaration: DeclarationRef<'_>) -> Option<TypeDescriptor>;
}

/// Follows expressions and export specifiers to the declaration they name.
pub trait DeclarationResolver {
    /// Resolve the declaration behind an expression such as `export default Foo`.
    fn resolve_aliased_declaration<'a>(
        &'a self,
        expression: &'a Expression,
    ) -> Option<DeclarationRef<'a>>;

    /// Resolve the declaration behind one specifier of `export { ... } [from '...']`.
    fn resolve_export_specifier<'a>(
        &'a self,
        specifier: &ExportSpecifier,
        source: Option<&str>,
    ) -> Option<DeclarationRef<'a>>;
}
