//! Multi-module program and the resolvers built on top of it.
//!
//! A [`Program`] owns every parsed module of a project together with its
//! [`ModuleScope`]. It is read-only once built. [`ModuleResolver`] is a
//! cheap per-module handle implementing the resolver contracts used by
//! the export classifier; it follows imports and re-exports between
//! relative modules and describes declarations structurally.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use super::exports::{classify_statements, ExportInfo};
use super::scope::{self, ExportTarget, ModuleScope, SymbolRef};
use super::types::{
    Declaration, DeclarationRef, DeclarationResolver, TypeDescriptor, TypeKind, TypeMember,
    TypeResolver,
};
use crate::parser::ast::{
    ClassDeclaration, ExportSpecifier, Expression, ImportedName, InterfaceDeclaration,
    MemberKind, PropertySignature, SourceModule, Statement, TypeNode,
};

/// Nesting limit when following type names through aliases and heritage.
const MAX_TYPE_DEPTH: usize = 8;

/// Depth past which union and tuple constituents are no longer expanded.
const MAX_FANOUT_DEPTH: usize = 2;

/// Extensions tried, in order, when resolving an extensionless specifier.
const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "mts", "js", "jsx", "mjs"];

/// Index of a module within a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

/// Names already followed during one resolution; cuts import cycles.
type Visited = HashSet<(ModuleId, String)>;

/// A set of parsed modules that can reference each other.
#[derive(Debug, Default)]
pub struct Program {
    modules: Vec<SourceModule>,
    scopes: Vec<ModuleScope>,
    by_path: HashMap<PathBuf, ModuleId>,
}

impl Program {
    /// Build a program from parsed modules. Module order is preserved.
    pub fn new(modules: Vec<SourceModule>) -> Self {
        let scopes = modules
            .iter()
            .map(|m| ModuleScope::build(&m.statements))
            .collect();
        let by_path = modules
            .iter()
            .enumerate()
            .map(|(index, m)| (normalize_path(&m.path), ModuleId(index)))
            .collect();

        Self {
            modules,
            scopes,
            by_path,
        }
    }

    /// A program containing a single module.
    pub fn from_module(module: SourceModule) -> Self {
        Self::new(vec![module])
    }

    pub fn modules(&self) -> &[SourceModule] {
        &self.modules
    }

    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len()).map(ModuleId)
    }

    pub fn module(&self, id: ModuleId) -> &SourceModule {
        &self.modules[id.0]
    }

    pub fn scope(&self, id: ModuleId) -> &ModuleScope {
        &self.scopes[id.0]
    }

    /// Find a module by path.
    pub fn module_id(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    /// Resolver bound to one module.
    pub fn resolver(&self, id: ModuleId) -> ModuleResolver<'_> {
        ModuleResolver {
            program: self,
            module: id,
        }
    }

    /// Classify every top-level statement of a module, in order.
    pub fn classify_module(&self, id: ModuleId) -> Vec<ExportInfo<'_>> {
        let resolver = self.resolver(id);
        classify_statements(&self.module(id).statements, &resolver)
    }

    fn statements(&self, id: ModuleId) -> &[Statement] {
        &self.modules[id.0].statements
    }

    /// Resolve a relative module specifier against the importing module.
    ///
    /// Bare package specifiers are never resolved.
    pub fn resolve_module_specifier(&self, from: ModuleId, specifier: &str) -> Option<ModuleId> {
        if !specifier.starts_with("./") && !specifier.starts_with("../") {
            return None;
        }

        let base = self.module(from).path.parent().unwrap_or(Path::new(""));
        let target = normalize_path(&base.join(specifier));

        if let Some(id) = self.by_path.get(&target) {
            return Some(*id);
        }

        // `./button.js` may refer to `button.ts`
        let stem = match target.extension().and_then(|e| e.to_str()) {
            Some("js" | "jsx" | "mjs") => target.with_extension(""),
            _ => target.clone(),
        };

        let candidates = RESOLVE_EXTENSIONS
            .iter()
            .map(|ext| append_extension(&stem, ext))
            .chain(
                RESOLVE_EXTENSIONS
                    .iter()
                    .map(|ext| target.join(format!("index.{}", ext))),
            );

        for candidate in candidates {
            if let Some(id) = self.by_path.get(&candidate) {
                return Some(*id);
            }
        }

        None
    }

    fn located(&self, module: ModuleId, symbol: SymbolRef) -> Option<DeclarationRef<'_>> {
        scope::declaration_at(self.statements(module), symbol)
            .map(|declaration| DeclarationRef::in_module(declaration, module))
    }

    /// Resolve a name in a module's value namespace, following imports.
    fn resolve_value(
        &self,
        module: ModuleId,
        name: &str,
        visited: &mut Visited,
    ) -> Option<DeclarationRef<'_>> {
        let symbol = self.scope(module).value(name)?;
        self.follow_symbol(module, symbol, visited)
    }

    /// Resolve a possibly qualified type name (`Props`, `ns.Props`).
    fn resolve_type_name(
        &self,
        module: ModuleId,
        name: &str,
        visited: &mut Visited,
    ) -> Option<DeclarationRef<'_>> {
        if let Some((namespace, member)) = name.split_once('.') {
            let target = self.namespace_target(module, namespace)?;
            return self.resolve_export(target, member, visited);
        }

        let symbol = self.scope(module).type_symbol(name)?;
        self.follow_symbol(module, symbol, visited)
    }

    /// Module behind `import * as namespace from '...'`.
    fn namespace_target(&self, module: ModuleId, namespace: &str) -> Option<ModuleId> {
        let symbol = self.scope(module).value(namespace)?;
        let (import, binding) = scope::import_at(self.statements(module), symbol)?;
        if binding.imported != ImportedName::Namespace {
            return None;
        }
        self.resolve_module_specifier(module, &import.source)
    }

    /// Turn a symbol into a declaration, following import bindings.
    fn follow_symbol(
        &self,
        module: ModuleId,
        symbol: SymbolRef,
        visited: &mut Visited,
    ) -> Option<DeclarationRef<'_>> {
        if !symbol.is_import() {
            return self.located(module, symbol);
        }

        let (import, binding) = scope::import_at(self.statements(module), symbol)?;
        let followed = self
            .resolve_module_specifier(module, &import.source)
            .and_then(|target| match &binding.imported {
                ImportedName::Default => self.resolve_export(target, "default", visited),
                ImportedName::Named(name) => self.resolve_export(target, name, visited),
                ImportedName::Namespace => None,
            });

        // an unresolvable import still names a declaration, just not one we can see
        followed.or_else(|| self.located(module, symbol))
    }

    /// Resolve the declaration a module exports under `name`.
    fn resolve_export(
        &self,
        module: ModuleId,
        name: &str,
        visited: &mut Visited,
    ) -> Option<DeclarationRef<'_>> {
        if !visited.insert((module, name.to_string())) {
            log::debug!(
                "import cycle while resolving '{}' in {}",
                name,
                self.module(module).path.display()
            );
            return None;
        }

        let scope = self.scope(module);
        match scope.export(name) {
            Some(ExportTarget::Symbol(symbol)) => self.follow_symbol(module, *symbol, visited),
            Some(ExportTarget::Local(local)) => self
                .resolve_value(module, local, visited)
                .or_else(|| self.resolve_type_name(module, local, visited)),
            Some(ExportTarget::Expression(statement)) => {
                let expression = scope::export_expression_at(self.statements(module), *statement)?;
                self.resolve_expression(module, expression, visited)
            }
            Some(ExportTarget::ReExport { source, name }) => {
                let target = self.resolve_module_specifier(module, source)?;
                self.resolve_export(target, name, visited)
            }
            None if name != "default" => scope.star_exports().iter().find_map(|source| {
                let target = self.resolve_module_specifier(module, source)?;
                self.resolve_export(target, name, visited)
            }),
            None => None,
        }
    }

    /// Resolve the declaration an expression refers to.
    fn resolve_expression<'p>(
        &'p self,
        module: ModuleId,
        expression: &'p Expression,
        visited: &mut Visited,
    ) -> Option<DeclarationRef<'p>> {
        match expression {
            Expression::Identifier(name) => self.resolve_value(module, name, visited),
            Expression::Parenthesized(inner) | Expression::Assertion(inner) => {
                self.resolve_expression(module, inner, visited)
            }
            Expression::Member { object, property } => match object.as_ref() {
                Expression::Identifier(namespace) => {
                    let target = self.namespace_target(module, namespace)?;
                    self.resolve_export(target, property, visited)
                }
                _ => None,
            },
            Expression::Class(class) => Some(DeclarationRef::in_module(
                Declaration::Class(class),
                module,
            )),
            _ => None,
        }
    }

    /// Describe the type of a declaration found in `module`.
    fn describe_declaration(
        &self,
        module: ModuleId,
        declaration: Declaration<'_>,
        depth: usize,
    ) -> Option<TypeDescriptor> {
        match declaration {
            Declaration::Variable(variable) => {
                if let Some(annotation) = &variable.type_annotation {
                    return Some(self.describe_type(module, annotation, depth));
                }
                let initializer = variable.initializer.as_ref()?;
                self.describe_initializer(module, initializer, depth)
            }
            Declaration::Class(class) => Some(self.describe_class(module, class, depth)),
            Declaration::Interface(interface) => {
                Some(self.describe_interface(module, interface, depth))
            }
            Declaration::TypeAlias(alias) => {
                let mut descriptor = self.describe_type(module, &alias.value, depth);
                descriptor.name = Some(alias.name.clone());
                Some(descriptor)
            }
            Declaration::Function(function) => {
                let return_type = function
                    .return_type
                    .as_ref()
                    .map_or_else(|| "void".to_string(), |t| t.to_string());
                Some(TypeDescriptor::new(
                    function.name.clone(),
                    TypeKind::Function,
                    format!("{} => {}", function.parameters, return_type),
                ))
            }
            Declaration::Import(_) => None,
        }
    }

    /// Infer a type from an unannotated initializer.
    fn describe_initializer(
        &self,
        module: ModuleId,
        initializer: &Expression,
        depth: usize,
    ) -> Option<TypeDescriptor> {
        if depth > MAX_TYPE_DEPTH {
            return None;
        }

        match initializer {
            Expression::Class(class) => Some(self.describe_class(module, class, depth + 1)),
            Expression::Function {
                parameters,
                return_type,
            } => {
                let return_type = return_type
                    .as_ref()
                    .map_or_else(|| "void".to_string(), |t| t.to_string());
                Some(TypeDescriptor::new(
                    None,
                    TypeKind::Function,
                    format!("{} => {}", parameters, return_type),
                ))
            }
            Expression::New { constructor } => {
                let mut visited = Visited::new();
                match self.resolve_value(module, constructor, &mut visited) {
                    Some(DeclarationRef {
                        declaration: Declaration::Class(class),
                        module: owner,
                    }) => Some(self.describe_class(owner.unwrap_or(module), class, depth + 1)),
                    _ => Some(TypeDescriptor::new(
                        Some(constructor.clone()),
                        TypeKind::Reference,
                        constructor.clone(),
                    )),
                }
            }
            Expression::Object(keys) => {
                let members = keys
                    .iter()
                    .map(|key| TypeMember::new(key.clone(), MemberKind::Property, "any"))
                    .collect();
                Some(
                    TypeDescriptor::new(None, TypeKind::Object, format!("{{ {} }}", keys.join("; ")))
                        .with_members(members),
                )
            }
            Expression::Identifier(name) => {
                let mut visited = Visited::new();
                let target = self.resolve_value(module, name, &mut visited)?;
                self.describe_declaration(
                    target.module.unwrap_or(module),
                    target.declaration,
                    depth + 1,
                )
            }
            Expression::Parenthesized(inner) | Expression::Assertion(inner) => {
                self.describe_initializer(module, inner, depth + 1)
            }
            Expression::Member { .. } | Expression::Call { .. } | Expression::Other(_) => None,
        }
    }

    fn describe_class(
        &self,
        module: ModuleId,
        class: &ClassDeclaration,
        depth: usize,
    ) -> TypeDescriptor {
        let mut members = Vec::new();

        if let Some(base) = &class.extends {
            if depth < MAX_TYPE_DEPTH {
                let base_name = base.split('<').next().unwrap_or(base).trim();
                let mut visited = Visited::new();
                if let Some(DeclarationRef {
                    declaration: Declaration::Class(base_class),
                    module: owner,
                }) = self.resolve_value(module, base_name, &mut visited)
                {
                    let inherited =
                        self.describe_class(owner.unwrap_or(module), base_class, depth + 1);
                    members.extend(inherited.members);
                }
            }
        }

        for member in class.members.iter().filter(|m| !m.is_private && !m.is_static) {
            let type_text = member
                .type_annotation
                .as_ref()
                .map_or_else(|| "any".to_string(), |t| t.to_string());
            let mut descriptor = TypeMember::new(member.name.clone(), member.kind, type_text);
            descriptor.optional = member.optional;
            override_member(&mut members, descriptor);
        }

        let name = class.name.clone();
        let text = name.clone().unwrap_or_else(|| "class".to_string());
        TypeDescriptor::new(name, TypeKind::Class, text).with_members(members)
    }

    fn describe_interface(
        &self,
        module: ModuleId,
        interface: &InterfaceDeclaration,
        depth: usize,
    ) -> TypeDescriptor {
        let mut members = Vec::new();

        if depth < MAX_TYPE_DEPTH {
            for base in &interface.extends {
                let base_name = base.split('<').next().unwrap_or(base).trim();
                let mut visited = Visited::new();
                if let Some(target) = self.resolve_type_name(module, base_name, &mut visited) {
                    if let Some(inherited) = self.describe_declaration(
                        target.module.unwrap_or(module),
                        target.declaration,
                        depth + 1,
                    ) {
                        members.extend(inherited.members);
                    }
                }
            }
        }

        for member in &interface.members {
            override_member(&mut members, property_member(member));
        }

        TypeDescriptor::new(
            Some(interface.name.clone()),
            TypeKind::Object,
            interface.name.clone(),
        )
        .with_members(members)
    }

    /// Describe a type annotation written in `module`.
    fn describe_type(&self, module: ModuleId, node: &TypeNode, depth: usize) -> TypeDescriptor {
        let text = node.to_string();

        match node {
            TypeNode::Reference { name, arguments } => {
                let arguments: Vec<TypeDescriptor> = arguments
                    .iter()
                    .map(|a| self.describe_type(module, a, depth + 1))
                    .collect();

                if depth < MAX_TYPE_DEPTH {
                    let mut visited = Visited::new();
                    let resolved = self
                        .resolve_type_name(module, name, &mut visited)
                        .and_then(|target| {
                            self.describe_declaration(
                                target.module.unwrap_or(module),
                                target.declaration,
                                depth + 1,
                            )
                        });
                    if let Some(descriptor) = resolved {
                        return descriptor.with_type_arguments(arguments);
                    }
                }

                TypeDescriptor::new(Some(name.clone()), TypeKind::Reference, text)
                    .with_type_arguments(arguments)
            }
            TypeNode::Predefined(_) => TypeDescriptor::new(None, TypeKind::Primitive, text),
            TypeNode::Literal(_) => TypeDescriptor::new(None, TypeKind::Literal, text),
            TypeNode::Object(members) => TypeDescriptor::new(None, TypeKind::Object, text)
                .with_members(members.iter().map(property_member).collect()),
            TypeNode::Function { .. } => TypeDescriptor::new(None, TypeKind::Function, text),
            TypeNode::Union(types) => TypeDescriptor::new(None, TypeKind::Union, text)
                .with_elements(self.describe_all(module, types, depth)),
            TypeNode::Intersection(types) => {
                // repeated constituents add no members
                let mut seen = HashSet::new();
                let elements: Vec<TypeDescriptor> = types
                    .iter()
                    .filter(|t| seen.insert(t.to_string()))
                    .map(|t| self.describe_type(module, t, depth + 1))
                    .collect();
                let mut members = Vec::new();
                for element in &elements {
                    for member in &element.members {
                        override_member(&mut members, member.clone());
                    }
                }
                TypeDescriptor::new(None, TypeKind::Intersection, text)
                    .with_members(members)
                    .with_elements(elements)
            }
            TypeNode::Array(element) => TypeDescriptor::new(None, TypeKind::Array, text)
                .with_elements(vec![self.describe_type(module, element, depth + 1)]),
            TypeNode::Tuple(types) => TypeDescriptor::new(None, TypeKind::Tuple, text)
                .with_elements(self.describe_all(module, types, depth)),
            TypeNode::Other(_) => TypeDescriptor::unknown(text),
        }
    }

    fn describe_all(&self, module: ModuleId, types: &[TypeNode], depth: usize) -> Vec<TypeDescriptor> {
        let depth = if depth >= MAX_FANOUT_DEPTH {
            MAX_TYPE_DEPTH
        } else {
            depth + 1
        };
        types
            .iter()
            .map(|t| self.describe_type(module, t, depth))
            .collect()
    }
}

fn property_member(signature: &PropertySignature) -> TypeMember {
    let type_text = signature
        .type_annotation
        .as_ref()
        .map_or_else(|| "any".to_string(), |t| t.to_string());
    let mut member = TypeMember::new(signature.name.clone(), signature.kind, type_text);
    member.optional = signature.optional;
    member
}

/// Insert a member, replacing an inherited one with the same name.
fn override_member(members: &mut Vec<TypeMember>, member: TypeMember) {
    match members.iter_mut().find(|m| m.name == member.name) {
        Some(existing) => *existing = member,
        None => members.push(member),
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// Lexically normalize a path, collapsing `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolver bound to one module of a [`Program`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleResolver<'p> {
    program: &'p Program,
    module: ModuleId,
}

impl TypeResolver for ModuleResolver<'_> {
    fn resolve_type(&self, declaration: DeclarationRef<'_>) -> Option<TypeDescriptor> {
        let module = declaration.module.unwrap_or(self.module);
        self.program
            .describe_declaration(module, declaration.declaration, 0)
    }
}

impl DeclarationResolver for ModuleResolver<'_> {
    fn resolve_aliased_declaration<'a>(
        &'a self,
        expression: &'a Expression,
    ) -> Option<DeclarationRef<'a>> {
        let mut visited = Visited::new();
        self.program
            .resolve_expression(self.module, expression, &mut visited)
    }

    fn resolve_export_specifier<'a>(
        &'a self,
        specifier: &ExportSpecifier,
        source: Option<&str>,
    ) -> Option<DeclarationRef<'a>> {
        let mut visited = Visited::new();
        match source {
            Some(source) => {
                let target = self.program.resolve_module_specifier(self.module, source)?;
                self.program
                    .resolve_export(target, &specifier.local, &mut visited)
            }
            None => self
                .program
                .resolve_value(self.module, &specifier.local, &mut visited)
                .or_else(|| {
                    self.program
                        .resolve_type_name(self.module, &specifier.local, &mut visited)
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ModuleParser, SourceLanguage};

    fn module(path: &str, source: &str) -> SourceModule {
        let mut parser = ModuleParser::new().unwrap();
        let language = SourceLanguage::from_path(Path::new(path)).unwrap();
        parser.parse_source(source, language, Path::new(path)).unwrap()
    }

    fn specifier(name: &str) -> ExportSpecifier {
        ExportSpecifier {
            local: name.to_string(),
            exported: name.to_string(),
            span: Default::default(),
        }
    }

    // ===== Path Handling =====

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("src/components/../button/./index.ts")),
            PathBuf::from("src/button/index.ts")
        );
        assert_eq!(normalize_path(Path::new("../a.ts")), PathBuf::from("../a.ts"));
    }

    #[test]
    fn test_resolve_module_specifier() {
        let program = Program::new(vec![
            module("src/index.ts", ""),
            module("src/button.tsx", ""),
            module("src/layout/index.ts", ""),
            module("src/icon.ts", ""),
        ]);
        let index = program.module_id(Path::new("src/index.ts")).unwrap();

        let button = program.resolve_module_specifier(index, "./button").unwrap();
        assert_eq!(program.module(button).path, PathBuf::from("src/button.tsx"));

        let layout = program.resolve_module_specifier(index, "./layout").unwrap();
        assert_eq!(
            program.module(layout).path,
            PathBuf::from("src/layout/index.ts")
        );

        let icon = program.resolve_module_specifier(index, "./icon.js").unwrap();
        assert_eq!(program.module(icon).path, PathBuf::from("src/icon.ts"));

        assert!(program.resolve_module_specifier(index, "react").is_none());
        assert!(program.resolve_module_specifier(index, "./missing").is_none());
    }

    // ===== Type Resolution =====

    #[test]
    fn test_interface_members_resolved_through_annotation() {
        let program = Program::from_module(module(
            "button.ts",
            r#"
interface Base { id: string }
interface Props extends Base { label: string; disabled?: boolean }
export const Button: Props = { id: '', label: '' };
"#,
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("Button"), None)
            .unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();

        assert_eq!(descriptor.name.as_deref(), Some("Props"));
        assert_eq!(descriptor.kind, TypeKind::Object);
        let names: Vec<_> = descriptor.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label", "disabled"]);
        assert!(descriptor.member("disabled").unwrap().optional);
    }

    #[test]
    fn test_generic_reference_keeps_arguments() {
        let program = Program::from_module(module(
            "box.tsx",
            r#"
type BoxProps = { padding: number };
export const Box: React.FC<BoxProps> = () => null;
"#,
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("Box"), None)
            .unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();

        assert_eq!(descriptor.kind, TypeKind::Reference);
        assert_eq!(descriptor.name.as_deref(), Some("React.FC"));
        assert_eq!(descriptor.type_arguments.len(), 1);
        assert_eq!(descriptor.type_arguments[0].name.as_deref(), Some("BoxProps"));
        assert!(descriptor.type_arguments[0].member("padding").is_some());
    }

    #[test]
    fn test_class_members_include_inherited() {
        let program = Program::from_module(module(
            "widget.ts",
            r#"
class Base { id: string; private hidden: number; }
export class Widget extends Base { label: string; static count = 0; }
"#,
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("Widget"), None)
            .unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();

        assert_eq!(descriptor.kind, TypeKind::Class);
        let names: Vec<_> = descriptor.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label"]);
    }

    #[test]
    fn test_unknown_type_reference_still_resolves() {
        let program = Program::from_module(module(
            "x.ts",
            "export const x: Missing = 1 as any;",
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("x"), None)
            .unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();
        assert_eq!(descriptor.kind, TypeKind::Reference);
        assert_eq!(descriptor.text, "Missing");
    }

    #[test]
    fn test_self_referencing_alias_terminates() {
        let program = Program::from_module(module(
            "tree.ts",
            "type Tree = { children: Tree[] } | Tree;\nexport const t: Tree = {} as any;",
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("t"), None)
            .unwrap();
        assert!(resolver.resolve_type(declaration).is_some());
    }

    fn descriptor_count(descriptor: &TypeDescriptor) -> usize {
        1 + descriptor
            .elements
            .iter()
            .chain(&descriptor.type_arguments)
            .map(descriptor_count)
            .sum::<usize>()
    }

    #[test]
    fn test_wide_alias_chain_is_bounded() {
        let program = Program::from_module(module(
            "wide.ts",
            r#"
type T8 = { leaf: string };
type T7 = T8 | T8 | T8 | T8;
type T6 = T7 | T7 | T7 | T7;
type T5 = T6 | T6 | T6 | T6;
type T4 = T5 | T5 | T5 | T5;
type T3 = T4 | T4 | T4 | T4;
type T2 = T3 | T3 | T3 | T3;
type T1 = T2 | T2 | T2 | T2;
type T0 = T1 | T1 | T1 | T1;
export const wide: T0 = {} as any;
"#,
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("wide"), None)
            .unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();

        assert_eq!(descriptor.name.as_deref(), Some("T0"));
        assert_eq!(descriptor.kind, TypeKind::Union);
        assert_eq!(descriptor.elements.len(), 4);
        assert_eq!(descriptor.elements[0].name.as_deref(), Some("T1"));
        assert_eq!(descriptor.elements[0].kind, TypeKind::Union);
        assert_eq!(descriptor.elements[0].elements[0].kind, TypeKind::Reference);
        assert_eq!(descriptor.elements[0].elements[0].name.as_deref(), Some("T2"));
        assert!(descriptor_count(&descriptor) < 100);
    }

    #[test]
    fn test_intersection_members_merged_under_generic() {
        let program = Program::from_module(module(
            "card.tsx",
            r#"
interface Base { id: string }
type Extra = { title: string };
type CardProps = Base & Extra & Base;
export const Card: React.FC<CardProps> = () => null;
"#,
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("Card"), None)
            .unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();

        let props = &descriptor.type_arguments[0];
        assert_eq!(props.kind, TypeKind::Intersection);
        assert_eq!(props.elements.len(), 2);
        let names: Vec<_> = props.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title"]);
    }

    // ===== Declaration Aliasing =====

    #[test]
    fn test_aliased_declaration_through_assertion() {
        let program = Program::from_module(module(
            "a.ts",
            "class Widget {}\nexport default (Widget as any);",
        ));
        let resolver = program.resolver(ModuleId(0));
        let expression = Expression::Parenthesized(Box::new(Expression::Assertion(Box::new(
            Expression::Identifier("Widget".to_string()),
        ))));
        let declaration = resolver.resolve_aliased_declaration(&expression).unwrap();
        assert_eq!(declaration.declaration.name(), Some("Widget"));
    }

    #[test]
    fn test_aliased_declaration_missing() {
        let program = Program::from_module(module("a.ts", "export default 42;"));
        let resolver = program.resolver(ModuleId(0));
        assert!(resolver
            .resolve_aliased_declaration(&Expression::Other("42".to_string()))
            .is_none());
        assert!(resolver
            .resolve_aliased_declaration(&Expression::Identifier("nothing".to_string()))
            .is_none());
    }

    #[test]
    fn test_import_followed_across_modules() {
        let program = Program::new(vec![
            module(
                "src/props.ts",
                "export interface ButtonProps { label: string }",
            ),
            module(
                "src/button.ts",
                r#"
import { ButtonProps } from './props';
const Button: ButtonProps = { label: '' };
export default Button;
"#,
            ),
        ]);
        let button = program.module_id(Path::new("src/button.ts")).unwrap();
        let resolver = program.resolver(button);

        let expression = Expression::Identifier("Button".to_string());
        let declaration = resolver.resolve_aliased_declaration(&expression).unwrap();
        let descriptor = resolver.resolve_type(declaration).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("ButtonProps"));
        assert!(descriptor.member("label").is_some());
    }

    #[test]
    fn test_re_export_followed() {
        let program = Program::new(vec![
            module("lib/button.ts", "export class Button { label: string }"),
            module("lib/index.ts", "export { Button as PrimaryButton } from './button';"),
        ]);
        let index = program.module_id(Path::new("lib/index.ts")).unwrap();
        let resolver = program.resolver(index);

        let declaration = resolver
            .resolve_export_specifier(&specifier("Button"), Some("./button"))
            .unwrap();
        let button = program.module_id(Path::new("lib/button.ts")).unwrap();
        assert_eq!(declaration.module, Some(button));
        assert_eq!(
            resolver.resolve_type(declaration).unwrap().kind,
            TypeKind::Class
        );
    }

    #[test]
    fn test_star_export_followed() {
        let program = Program::new(vec![
            module("lib/text.ts", "export class Text {}"),
            module("lib/all.ts", "export * from './text';"),
            module("lib/index.ts", "export { Text } from './all';"),
        ]);
        let index = program.module_id(Path::new("lib/index.ts")).unwrap();
        let resolver = program.resolver(index);

        let declaration = resolver
            .resolve_export_specifier(&specifier("Text"), Some("./all"))
            .unwrap();
        assert_eq!(declaration.declaration.name(), Some("Text"));
    }

    #[test]
    fn test_import_cycle_terminates() {
        let program = Program::new(vec![
            module("a.ts", "export { X } from './b';"),
            module("b.ts", "export { X } from './a';"),
        ]);
        let a = program.module_id(Path::new("a.ts")).unwrap();
        let resolver = program.resolver(a);
        assert!(resolver
            .resolve_export_specifier(&specifier("X"), Some("./b"))
            .is_none());
    }

    // ===== Sharing =====

    #[test]
    fn test_modules_classified_concurrently() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Program>();
        assert_sync::<ModuleResolver<'static>>();

        let program = Program::new(vec![
            module("lib/a.ts", "export class A {}"),
            module("lib/b.ts", "export class B {}\nexport { A } from './a';"),
        ]);

        let counts: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = program
                .module_ids()
                .map(|id| {
                    let program = &program;
                    s.spawn(move || program.classify_module(id).len())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn test_package_import_is_unresolved_type() {
        let program = Program::from_module(module(
            "a.ts",
            "import { Button } from '@acme/ui';\nexport { Button };",
        ));
        let resolver = program.resolver(ModuleId(0));
        let declaration = resolver
            .resolve_export_specifier(&specifier("Button"), None)
            .unwrap();
        assert!(matches!(declaration.declaration, Declaration::Import(_)));
        assert!(resolver.resolve_type(declaration).is_none());
    }
}
