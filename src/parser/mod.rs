//! Parser module for PatternScope.
//!
//! This module parses JavaScript/TypeScript source files with tree-sitter
//! and lowers their top-level statements into an owned model that the
//! export classifier can inspect.
//!
//! # Supported Languages
//!
//! - **TypeScript** (`.ts`, `.mts`, `.cts`) - Fully supported
//! - **TSX** (`.tsx`) - Fully supported
//! - **JavaScript / JSX** - Parsed, but carry no type annotations
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use patternscope::parser::ModuleParser;
//!
//! let mut parser = ModuleParser::new()?;
//! let module = parser.parse_file(Path::new("src/button.tsx"))?;
//!
//! println!("{} statements", module.statements.len());
//! ```

pub mod ast;
mod lower;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Language, Parser};

pub use ast::{
    ClassDeclaration, ExportAssignment, ExportClause, ExportDeclaration, ExportSpecifier,
    Expression, Modifiers, SourceModule, Span, Statement, StatementKind, TypeNode,
    VariableDeclaration, VariableStatement,
};

/// Errors that can occur while reading and parsing a module.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    Syntax { path: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Jsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Determine language from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parser for turning JavaScript/TypeScript source files into [`SourceModule`]s.
pub struct ModuleParser {
    js_parser: Parser,
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl ModuleParser {
    /// Create a new ModuleParser.
    pub fn new() -> ParseResult<Self> {
        Ok(Self {
            js_parser: Self::parser_for(SourceLanguage::JavaScript)?,
            ts_parser: Self::parser_for(SourceLanguage::TypeScript)?,
            tsx_parser: Self::parser_for(SourceLanguage::Tsx)?,
        })
    }

    fn parser_for(language: SourceLanguage) -> ParseResult<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|_| ParseError::LanguageInit)?;
        Ok(parser)
    }

    /// Parse a single file.
    pub fn parse_file(&mut self, path: &Path) -> ParseResult<SourceModule> {
        let language = SourceLanguage::from_path(path).ok_or_else(|| {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            ParseError::UnsupportedFileType(ext.to_string())
        })?;

        let content = fs::read_to_string(path)?;
        self.parse_source(&content, language, path)
    }

    /// Parse source code directly.
    pub fn parse_source(
        &mut self,
        source: &str,
        language: SourceLanguage,
        path: &Path,
    ) -> ParseResult<SourceModule> {
        let parser = match language {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => &mut self.js_parser,
            SourceLanguage::TypeScript => &mut self.ts_parser,
            SourceLanguage::Tsx => &mut self.tsx_parser,
        };

        let tree = parser.parse(source, None).ok_or_else(|| ParseError::Syntax {
            path: path.display().to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            log::debug!(
                "{} contains syntax errors; analyzing recovered statements",
                path.display()
            );
        }

        Ok(SourceModule {
            path: path.to_path_buf(),
            language,
            statements: lower::lower_program(root, source),
        })
    }
}

/// Parse a single file into a module.
pub fn parse_file(path: &Path) -> ParseResult<SourceModule> {
    let mut parser = ModuleParser::new()?;
    parser.parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::ast::{ImportedName, MemberKind, VariableKind};
    use super::*;

    fn parse_ts(source: &str) -> Vec<Statement> {
        let mut parser = ModuleParser::new().unwrap();
        parser
            .parse_source(source, SourceLanguage::TypeScript, Path::new("test.ts"))
            .unwrap()
            .statements
    }

    // ===== Language Detection =====

    #[test]
    fn test_language_from_extension() {
        assert_eq!(
            SourceLanguage::from_extension("ts"),
            Some(SourceLanguage::TypeScript)
        );
        assert_eq!(
            SourceLanguage::from_extension("TSX"),
            Some(SourceLanguage::Tsx)
        );
        assert_eq!(
            SourceLanguage::from_extension("mjs"),
            Some(SourceLanguage::JavaScript)
        );
        assert_eq!(SourceLanguage::from_extension("css"), None);
    }

    #[test]
    fn test_unsupported_file_type() {
        let mut parser = ModuleParser::new().unwrap();
        let result = parser.parse_file(Path::new("styles.css"));
        assert!(matches!(result, Err(ParseError::UnsupportedFileType(ext)) if ext == "css"));
    }

    // ===== Variable Statements =====

    #[test]
    fn test_exported_const_with_annotation() {
        let statements = parse_ts("export const Button: ButtonProps = {};");
        assert_eq!(statements.len(), 1);

        let statement = &statements[0];
        assert!(statement.modifiers.exported);
        assert!(!statement.modifiers.default);

        let StatementKind::Variable(variable) = &statement.kind else {
            panic!("expected variable statement, got {:?}", statement.kind);
        };
        assert_eq!(variable.declaration_kind, VariableKind::Const);
        assert_eq!(variable.declarations.len(), 1);
        assert_eq!(variable.declarations[0].name, "Button");
        assert_eq!(
            variable.declarations[0].type_annotation,
            Some(TypeNode::Reference {
                name: "ButtonProps".to_string(),
                arguments: vec![],
            })
        );
    }

    #[test]
    fn test_multiple_declarators() {
        let statements = parse_ts("let a = 1, b: string = 'x';");
        let StatementKind::Variable(variable) = &statements[0].kind else {
            panic!("expected variable statement");
        };
        assert_eq!(variable.declaration_kind, VariableKind::Let);
        assert_eq!(variable.declarations.len(), 2);
        assert!(variable.declarations[0].type_annotation.is_none());
        assert_eq!(
            variable.declarations[1].type_annotation,
            Some(TypeNode::Predefined("string".to_string()))
        );
    }

    #[test]
    fn test_generic_annotation() {
        let statements = parse_ts("export const Box: React.FC<BoxProps> = () => null;");
        let StatementKind::Variable(variable) = &statements[0].kind else {
            panic!("expected variable statement");
        };
        let annotation = variable.declarations[0].type_annotation.as_ref().unwrap();
        assert_eq!(annotation.to_string(), "React.FC<BoxProps>");
        assert!(matches!(
            variable.declarations[0].initializer,
            Some(Expression::Function { .. })
        ));
    }

    // ===== Classes =====

    #[test]
    fn test_class_declaration() {
        let statements = parse_ts(
            r#"
export class Widget extends Base {
    public label: string;
    private secret = 1;
    size?: number;
    constructor() { super(); }
    render(): void {}
}
"#,
        );
        assert_eq!(statements.len(), 1);
        let StatementKind::Class(class) = &statements[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.name.as_deref(), Some("Widget"));
        assert_eq!(class.extends.as_deref(), Some("Base"));

        let names: Vec<_> = class.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["label", "secret", "size", "render"]);
        assert!(class.members[1].is_private);
        assert!(class.members[2].optional);
        assert_eq!(class.members[3].kind, MemberKind::Method);
    }

    #[test]
    fn test_default_class() {
        let statements = parse_ts("export default class Page {}");
        assert!(statements[0].modifiers.default);
        assert!(matches!(
            &statements[0].kind,
            StatementKind::Class(c) if c.name.as_deref() == Some("Page")
        ));
    }

    #[test]
    fn test_anonymous_default_class() {
        let statements = parse_ts("export default class {}");
        assert!(statements[0].modifiers.default);
        assert!(matches!(
            &statements[0].kind,
            StatementKind::Class(c) if c.name.is_none()
        ));
    }

    // ===== Export Forms =====

    #[test]
    fn test_export_default_expression() {
        let statements = parse_ts("export default Widget;");
        assert!(statements[0].modifiers.default);
        assert!(matches!(
            &statements[0].kind,
            StatementKind::ExportAssignment(a)
                if !a.export_equals && a.expression == Expression::Identifier("Widget".to_string())
        ));
    }

    #[test]
    fn test_export_equals() {
        let statements = parse_ts("export = Widget;");
        assert!(matches!(
            &statements[0].kind,
            StatementKind::ExportAssignment(a) if a.export_equals
        ));
    }

    #[test]
    fn test_export_clause() {
        let statements = parse_ts("export { A, B as C } from './widgets';");
        let StatementKind::ExportDeclaration(declaration) = &statements[0].kind else {
            panic!("expected export declaration");
        };
        assert_eq!(declaration.source.as_deref(), Some("./widgets"));

        let Some(ExportClause::Named(specifiers)) = &declaration.clause else {
            panic!("expected named clause");
        };
        assert_eq!(specifiers.len(), 2);
        assert_eq!(specifiers[0].local, "A");
        assert_eq!(specifiers[0].exported, "A");
        assert_eq!(specifiers[1].local, "B");
        assert_eq!(specifiers[1].exported, "C");
    }

    #[test]
    fn test_export_star() {
        let statements = parse_ts("export * from './all';");
        assert!(matches!(
            &statements[0].kind,
            StatementKind::ExportDeclaration(d) if d.clause.is_none()
        ));
    }

    // ===== Declarations Used For Resolution =====

    #[test]
    fn test_interface_and_type_alias() {
        let statements = parse_ts(
            r#"
interface Props extends BaseProps {
    label: string;
    onClick?(): void;
}
type Variant = 'primary' | 'secondary';
"#,
        );
        assert_eq!(statements.len(), 2);

        let StatementKind::Interface(interface) = &statements[0].kind else {
            panic!("expected interface");
        };
        assert_eq!(interface.name, "Props");
        assert_eq!(interface.extends, vec!["BaseProps".to_string()]);
        assert_eq!(interface.members.len(), 2);
        assert!(interface.members[1].optional);

        let StatementKind::TypeAlias(alias) = &statements[1].kind else {
            panic!("expected type alias");
        };
        assert_eq!(alias.value.to_string(), "'primary' | 'secondary'");
    }

    #[test]
    fn test_import_bindings() {
        let statements = parse_ts("import Button, { Props as ButtonProps } from './button';");
        let StatementKind::Import(import) = &statements[0].kind else {
            panic!("expected import");
        };
        assert_eq!(import.source, "./button");
        assert_eq!(import.bindings.len(), 2);
        assert_eq!(import.bindings[0].imported, ImportedName::Default);
        assert_eq!(import.bindings[1].local, "ButtonProps");
        assert_eq!(
            import.bindings[1].imported,
            ImportedName::Named("Props".to_string())
        );
    }

    // ===== Documentation Comments =====

    #[test]
    fn test_doc_comment_attached() {
        let statements = parse_ts(
            r#"
// unrelated
/**
 * @name Primary Button
 */
export const Button: Props = {};
"#,
        );
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].doc_comments.len(), 1);
        assert!(statements[0].doc_comments[0].contains("@name Primary Button"));
    }

    #[test]
    fn test_doc_comment_not_shared_across_statements() {
        let statements = parse_ts(
            r#"
/** @ignore */
export const A: Props = {};
export const B: Props = {};
"#,
        );
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].doc_comments.len(), 1);
        assert!(statements[1].doc_comments.is_empty());
    }

    #[test]
    fn test_statement_line_numbers() {
        let statements = parse_ts("import a from 'a';\n\nexport class X {}\n");
        assert_eq!(statements[0].span.line, 1);
        assert_eq!(statements[1].span.line, 3);
    }
}
