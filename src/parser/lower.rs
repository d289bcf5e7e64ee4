//! Lowering from the tree-sitter concrete syntax tree into the owned
//! statement model in [`super::ast`].
//!
//! Node kinds follow `tree-sitter-javascript` and `tree-sitter-typescript`;
//! both grammars share the statement and expression kinds used here.

use tree_sitter::Node;

use super::ast::{
    ClassDeclaration, ClassMember, ExportAssignment, ExportClause, ExportDeclaration,
    ExportSpecifier, Expression, FunctionDeclaration, ImportBinding, ImportDeclaration,
    ImportedName, InterfaceDeclaration, MemberKind, Modifiers, PropertySignature, Span,
    Statement, StatementKind, TypeAliasDeclaration, TypeNode, VariableDeclaration,
    VariableKind, VariableStatement,
};

/// Lower every top-level statement of a parsed program, in source order.
pub(crate) fn lower_program(root: Node<'_>, source: &str) -> Vec<Statement> {
    let lowerer = Lowerer { source };
    let mut statements = Vec::new();
    let mut cursor = root.walk();

    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "comment" | "hash_bang_line" => continue,
            _ => statements.push(lowerer.statement(child)),
        }
    }

    statements
}

struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    /// Extract the text content of a node.
    fn text(&self, node: Node<'_>) -> &'s str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    fn span(&self, node: Node<'_>) -> Span {
        let position = node.start_position();
        Span {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            line: position.row + 1,
            column: position.column + 1,
        }
    }

    /// Extract string value (removes quotes).
    fn string_value(&self, node: Node<'_>) -> String {
        self.text(node)
            .trim_start_matches(['"', '\'', '`'])
            .trim_end_matches(['"', '\'', '`'])
            .to_string()
    }

    fn has_token(&self, node: Node<'_>, token: &str) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|c| c.kind() == token);
        found
    }

    fn named_children(&self, node: Node<'s>) -> Vec<Node<'s>> {
        let mut cursor = node.walk();
        let children = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect();
        children
    }

    /// Collect `/** ... */` blocks from the comments directly above a statement.
    fn doc_comments(&self, node: Node<'_>) -> Vec<String> {
        let mut docs = Vec::new();
        let mut previous = node.prev_sibling();

        while let Some(sibling) = previous {
            if sibling.kind() != "comment" {
                break;
            }
            let text = self.text(sibling);
            if text.starts_with("/**") && !text.starts_with("/**/") {
                docs.push(text.to_string());
            }
            previous = sibling.prev_sibling();
        }

        docs.reverse();
        docs
    }

    fn statement(&self, node: Node<'s>) -> Statement {
        let (kind, modifiers) = match node.kind() {
            "export_statement" => self.export_statement(node),
            _ => (self.declaration(node), Modifiers::default()),
        };

        Statement {
            kind,
            modifiers,
            doc_comments: self.doc_comments(node),
            span: self.span(node),
        }
    }

    /// Lower a declaration-like node, with or without an enclosing `export`.
    fn declaration(&self, node: Node<'s>) -> StatementKind {
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                StatementKind::Variable(self.variable_statement(node))
            }
            "class_declaration" | "abstract_class_declaration" | "class" => {
                StatementKind::Class(self.class(node))
            }
            "interface_declaration" => match self.interface(node) {
                Some(interface) => StatementKind::Interface(interface),
                None => self.other(node),
            },
            "type_alias_declaration" => match self.type_alias(node) {
                Some(alias) => StatementKind::TypeAlias(alias),
                None => self.other(node),
            },
            "function_declaration"
            | "generator_function_declaration"
            | "function_signature"
            | "function_expression"
            | "function"
            | "generator_function" => StatementKind::Function(self.function(node)),
            "import_statement" => StatementKind::Import(self.import(node)),
            "ambient_declaration" => {
                // `declare const Foo: Props;` is treated like its inner declaration
                let inner = self.named_children(node).into_iter().next();
                match inner {
                    Some(inner) => self.declaration(inner),
                    None => self.other(node),
                }
            }
            _ => self.other(node),
        }
    }

    fn other(&self, node: Node<'_>) -> StatementKind {
        StatementKind::Other {
            node_kind: node.kind().to_string(),
        }
    }

    fn export_statement(&self, node: Node<'s>) -> (StatementKind, Modifiers) {
        let mut cursor = node.walk();
        let children: Vec<Node<'s>> = node.children(&mut cursor).collect();

        let modifiers = Modifiers {
            exported: true,
            default: children.iter().any(|c| c.kind() == "default"),
        };

        if let Some(declaration) = node.child_by_field_name("declaration") {
            return (self.declaration(declaration), modifiers);
        }

        if let Some(value) = node.child_by_field_name("value") {
            let kind = match value.kind() {
                // `export default class {}` / `export default function () {}`
                "class" | "function_expression" | "function" | "generator_function" => {
                    self.declaration(value)
                }
                _ => StatementKind::ExportAssignment(ExportAssignment {
                    expression: self.expression(value),
                    export_equals: false,
                }),
            };
            return (kind, modifiers);
        }

        // `export = expr;`
        if let Some(position) = children.iter().position(|c| c.kind() == "=") {
            let expression = children[position + 1..]
                .iter()
                .find(|c| c.is_named() && c.kind() != "comment");
            if let Some(expression) = expression {
                let kind = StatementKind::ExportAssignment(ExportAssignment {
                    expression: self.expression(*expression),
                    export_equals: true,
                });
                return (kind, modifiers);
            }
        }

        let source = node
            .child_by_field_name("source")
            .map(|s| self.string_value(s));

        if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
            let specifiers = self
                .named_children(*clause)
                .into_iter()
                .filter(|c| c.kind() == "export_specifier")
                .filter_map(|c| self.export_specifier(c))
                .collect();
            let kind = StatementKind::ExportDeclaration(ExportDeclaration {
                clause: Some(ExportClause::Named(specifiers)),
                source,
            });
            return (kind, modifiers);
        }

        if let Some(namespace) = children.iter().find(|c| c.kind() == "namespace_export") {
            let name = self
                .named_children(*namespace)
                .into_iter()
                .next()
                .map(|n| self.string_value(n))
                .unwrap_or_default();
            let kind = StatementKind::ExportDeclaration(ExportDeclaration {
                clause: Some(ExportClause::Namespace(name)),
                source,
            });
            return (kind, modifiers);
        }

        if children.iter().any(|c| c.kind() == "*") {
            let kind = StatementKind::ExportDeclaration(ExportDeclaration {
                clause: None,
                source,
            });
            return (kind, modifiers);
        }

        (self.other(node), modifiers)
    }

    /// Parse a single export specifier: foo or foo as bar
    fn export_specifier(&self, node: Node<'s>) -> Option<ExportSpecifier> {
        let local = self.string_value(node.child_by_field_name("name")?);
        let exported = node
            .child_by_field_name("alias")
            .map(|alias| self.string_value(alias))
            .unwrap_or_else(|| local.clone());

        Some(ExportSpecifier {
            local,
            exported,
            span: self.span(node),
        })
    }

    fn variable_statement(&self, node: Node<'s>) -> VariableStatement {
        let declaration_kind = match node.child_by_field_name("kind").map(|k| self.text(k)) {
            Some("let") => VariableKind::Let,
            Some("const") => VariableKind::Const,
            _ if node.kind() == "lexical_declaration" => VariableKind::Const,
            _ => VariableKind::Var,
        };

        let declarations = self
            .named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
            .filter_map(|c| self.variable_declaration(c))
            .collect();

        VariableStatement {
            declaration_kind,
            declarations,
        }
    }

    fn variable_declaration(&self, node: Node<'s>) -> Option<VariableDeclaration> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let type_annotation = node
            .child_by_field_name("type")
            .and_then(|t| self.type_annotation(t));
        let initializer = node
            .child_by_field_name("value")
            .map(|v| self.expression(v));

        Some(VariableDeclaration {
            name,
            type_annotation,
            initializer,
            span: self.span(node),
        })
    }

    fn class(&self, node: Node<'s>) -> ClassDeclaration {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());

        let extends = self
            .named_children(node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")
            .and_then(|heritage| self.class_extends(heritage));

        let members = node
            .child_by_field_name("body")
            .map(|body| {
                self.named_children(body)
                    .into_iter()
                    .filter_map(|m| self.class_member(m))
                    .collect()
            })
            .unwrap_or_default();

        ClassDeclaration {
            name,
            extends,
            members,
            span: self.span(node),
        }
    }

    fn class_extends(&self, heritage: Node<'s>) -> Option<String> {
        // TypeScript wraps the target in `extends_clause`, JavaScript does not
        match self
            .named_children(heritage)
            .into_iter()
            .find(|c| c.kind() == "extends_clause")
        {
            Some(clause) => {
                let value = clause
                    .child_by_field_name("value")
                    .or_else(|| self.named_children(clause).into_iter().next())?;
                let mut text = self.text(value).to_string();
                if let Some(arguments) = clause.child_by_field_name("type_arguments") {
                    text.push_str(self.text(arguments));
                }
                Some(text)
            }
            None => self
                .named_children(heritage)
                .into_iter()
                .next()
                .map(|value| self.text(value).to_string()),
        }
    }

    fn class_member(&self, node: Node<'s>) -> Option<ClassMember> {
        let kind = match node.kind() {
            "public_field_definition" | "field_definition" => MemberKind::Property,
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                MemberKind::Method
            }
            _ => return None,
        };

        let name_node = node
            .child_by_field_name("name")
            .or_else(|| node.child_by_field_name("property"))?;
        let name = self.text(name_node).to_string();
        if name == "constructor" {
            return None;
        }

        let is_private = name_node.kind() == "private_property_identifier"
            || self
                .named_children(node)
                .into_iter()
                .filter(|c| c.kind() == "accessibility_modifier")
                .any(|c| matches!(self.text(c), "private" | "protected"));

        let type_annotation = match kind {
            MemberKind::Property => node
                .child_by_field_name("type")
                .and_then(|t| self.type_annotation(t)),
            MemberKind::Method => Some(self.call_signature_type(node)),
        };

        Some(ClassMember {
            name,
            kind,
            type_annotation,
            optional: self.has_token(node, "?"),
            is_static: self.has_token(node, "static"),
            is_private,
        })
    }

    fn interface(&self, node: Node<'s>) -> Option<InterfaceDeclaration> {
        let name = self.text(node.child_by_field_name("name")?).to_string();

        let extends = self
            .named_children(node)
            .into_iter()
            .find(|c| c.kind() == "extends_type_clause")
            .map(|clause| {
                self.named_children(clause)
                    .into_iter()
                    .map(|t| self.text(t).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let members = node
            .child_by_field_name("body")
            .map(|body| self.object_members(body))
            .unwrap_or_default();

        Some(InterfaceDeclaration {
            name,
            extends,
            members,
            span: self.span(node),
        })
    }

    fn type_alias(&self, node: Node<'s>) -> Option<TypeAliasDeclaration> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let value = self.type_node(node.child_by_field_name("value")?);

        Some(TypeAliasDeclaration {
            name,
            value,
            span: self.span(node),
        })
    }

    fn function(&self, node: Node<'s>) -> FunctionDeclaration {
        FunctionDeclaration {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            parameters: node
                .child_by_field_name("parameters")
                .map(|p| self.text(p).to_string())
                .unwrap_or_else(|| "()".to_string()),
            return_type: node
                .child_by_field_name("return_type")
                .and_then(|t| self.type_annotation(t)),
            span: self.span(node),
        }
    }

    fn import(&self, node: Node<'s>) -> ImportDeclaration {
        let source = node
            .child_by_field_name("source")
            .map(|s| self.string_value(s))
            .unwrap_or_default();

        let mut bindings = Vec::new();
        let clause = self
            .named_children(node)
            .into_iter()
            .find(|c| c.kind() == "import_clause");

        if let Some(clause) = clause {
            for child in self.named_children(clause) {
                match child.kind() {
                    "identifier" => bindings.push(ImportBinding {
                        local: self.text(child).to_string(),
                        imported: ImportedName::Default,
                    }),
                    "namespace_import" => {
                        if let Some(name) = self.named_children(child).into_iter().next() {
                            bindings.push(ImportBinding {
                                local: self.text(name).to_string(),
                                imported: ImportedName::Namespace,
                            });
                        }
                    }
                    "named_imports" => {
                        for specifier in self.named_children(child) {
                            if specifier.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = specifier.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = self.string_value(name);
                            let local = specifier
                                .child_by_field_name("alias")
                                .map(|a| self.text(a).to_string())
                                .unwrap_or_else(|| imported.clone());
                            let imported = if imported == "default" {
                                ImportedName::Default
                            } else {
                                ImportedName::Named(imported)
                            };
                            bindings.push(ImportBinding { local, imported });
                        }
                    }
                    _ => {}
                }
            }
        }

        ImportDeclaration {
            source,
            bindings,
        }
    }

    /// Lower the type inside a `: T` annotation node.
    fn type_annotation(&self, node: Node<'s>) -> Option<TypeNode> {
        if node.kind() != "type_annotation" {
            return Some(self.type_node(node));
        }
        self.named_children(node)
            .into_iter()
            .next()
            .map(|t| self.type_node(t))
    }

    fn type_node(&self, node: Node<'s>) -> TypeNode {
        match node.kind() {
            "type_identifier" | "nested_type_identifier" | "identifier" => TypeNode::Reference {
                name: self.text(node).to_string(),
                arguments: Vec::new(),
            },
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let arguments = node
                    .child_by_field_name("type_arguments")
                    .map(|args| {
                        self.named_children(args)
                            .into_iter()
                            .map(|a| self.type_node(a))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeNode::Reference { name, arguments }
            }
            "predefined_type" => TypeNode::Predefined(self.text(node).to_string()),
            "literal_type" => TypeNode::Literal(self.text(node).to_string()),
            "object_type" => TypeNode::Object(self.object_members(node)),
            "function_type" => TypeNode::Function {
                parameters: node
                    .child_by_field_name("parameters")
                    .map(|p| self.text(p).to_string())
                    .unwrap_or_else(|| "()".to_string()),
                return_type: node
                    .child_by_field_name("return_type")
                    .and_then(|t| self.type_annotation(t))
                    .map(Box::new),
            },
            "union_type" => TypeNode::Union(self.flatten_types(node, "union_type")),
            "intersection_type" => {
                TypeNode::Intersection(self.flatten_types(node, "intersection_type"))
            }
            "array_type" => match self.named_children(node).into_iter().next() {
                Some(element) => TypeNode::Array(Box::new(self.type_node(element))),
                None => TypeNode::Other(self.text(node).to_string()),
            },
            "tuple_type" => TypeNode::Tuple(
                self.named_children(node)
                    .into_iter()
                    .map(|t| self.type_node(t))
                    .collect(),
            ),
            "parenthesized_type" => match self.named_children(node).into_iter().next() {
                Some(inner) => self.type_node(inner),
                None => TypeNode::Other(self.text(node).to_string()),
            },
            _ => TypeNode::Other(self.text(node).to_string()),
        }
    }

    /// Union and intersection types nest left-recursively in the grammar.
    fn flatten_types(&self, node: Node<'s>, kind: &str) -> Vec<TypeNode> {
        let mut types = Vec::new();
        for child in self.named_children(node) {
            if child.kind() == kind {
                types.extend(self.flatten_types(child, kind));
            } else {
                types.push(self.type_node(child));
            }
        }
        types
    }

    fn object_members(&self, node: Node<'s>) -> Vec<PropertySignature> {
        self.named_children(node)
            .into_iter()
            .filter_map(|member| {
                let kind = match member.kind() {
                    "property_signature" => MemberKind::Property,
                    "method_signature" => MemberKind::Method,
                    _ => return None,
                };
                let name = self.text(member.child_by_field_name("name")?).to_string();
                let type_annotation = match kind {
                    MemberKind::Property => member
                        .child_by_field_name("type")
                        .and_then(|t| self.type_annotation(t)),
                    MemberKind::Method => Some(self.call_signature_type(member)),
                };
                Some(PropertySignature {
                    name,
                    kind,
                    type_annotation,
                    optional: self.has_token(member, "?"),
                })
            })
            .collect()
    }

    fn call_signature_type(&self, node: Node<'s>) -> TypeNode {
        TypeNode::Function {
            parameters: node
                .child_by_field_name("parameters")
                .map(|p| self.text(p).to_string())
                .unwrap_or_else(|| "()".to_string()),
            return_type: node
                .child_by_field_name("return_type")
                .and_then(|t| self.type_annotation(t))
                .map(Box::new),
        }
    }

    fn expression(&self, node: Node<'s>) -> Expression {
        match node.kind() {
            "identifier" => Expression::Identifier(self.text(node).to_string()),
            "parenthesized_expression" => match self.named_children(node).into_iter().next() {
                Some(inner) => Expression::Parenthesized(Box::new(self.expression(inner))),
                None => Expression::Other(self.text(node).to_string()),
            },
            "as_expression" | "satisfies_expression" | "non_null_expression"
            | "type_assertion" => {
                // `<T>expr` puts the type first
                let inner = self
                    .named_children(node)
                    .into_iter()
                    .find(|c| c.kind() != "type_arguments");
                match inner {
                    Some(inner) => Expression::Assertion(Box::new(self.expression(inner))),
                    None => Expression::Other(self.text(node).to_string()),
                }
            }
            "member_expression" => {
                match (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("property"),
                ) {
                    (Some(object), Some(property)) => Expression::Member {
                        object: Box::new(self.expression(object)),
                        property: self.text(property).to_string(),
                    },
                    _ => Expression::Other(self.text(node).to_string()),
                }
            }
            "new_expression" => Expression::New {
                constructor: node
                    .child_by_field_name("constructor")
                    .map(|c| self.text(c).to_string())
                    .unwrap_or_default(),
            },
            "call_expression" => Expression::Call {
                callee: node
                    .child_by_field_name("function")
                    .map(|c| self.text(c).to_string())
                    .unwrap_or_default(),
            },
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                let parameters = node
                    .child_by_field_name("parameters")
                    .or_else(|| node.child_by_field_name("parameter"))
                    .map(|p| self.text(p).to_string())
                    .unwrap_or_else(|| "()".to_string());
                Expression::Function {
                    parameters,
                    return_type: node
                        .child_by_field_name("return_type")
                        .and_then(|t| self.type_annotation(t)),
                }
            }
            "class" => Expression::Class(self.class(node)),
            "object" => Expression::Object(
                self.named_children(node)
                    .into_iter()
                    .filter_map(|entry| match entry.kind() {
                        "pair" | "method_definition" => entry
                            .child_by_field_name("key")
                            .or_else(|| entry.child_by_field_name("name"))
                            .map(|k| self.string_value(k)),
                        "shorthand_property_identifier" => Some(self.text(entry).to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => Expression::Other(self.text(node).to_string()),
        }
    }
}
