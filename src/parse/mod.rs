//! Go source front end built on tree-sitter.
//!
//! The parser is treated as a black box that produces a concrete syntax tree
//! with position info. Everything downstream (classification, call-graph
//! construction, detectors) works off the thin accessors defined here.

mod imports;

pub use imports::ImportTable;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .context("Failed to set Go language")?;
        Ok(Self { parser })
    }

    /// Parse one file. Returns an error if tree-sitter cannot produce a tree
    /// at all; a tree with ERROR nodes is still returned (best effort).
    pub fn parse(&mut self, path: &Path, source: String) -> Result<ParsedFile> {
        let tree = self
            .parser
            .parse(&source, None)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }
}

/// One parsed source file: path, original text, and the syntax tree.
/// Created in pass 1 and read-only afterwards.
pub struct ParsedFile {
    pub path: PathBuf,
    pub source: String,
    tree: Tree,
}

/// A function or method declaration with its body, if any.
pub struct FunctionDecl<'t> {
    pub name: String,
    pub node: Node<'t>,
    pub parameters: Option<Node<'t>>,
    pub body: Option<Node<'t>>,
}

/// The callee shape of a call expression. Calls through values, interfaces,
/// or higher-order parameters do not match either shape and are invisible to
/// the call graph.
pub enum Callee {
    /// `foo()` — same-package call
    Bare(String),
    /// `alias.Func()` — resolved through the import table
    Qualified { alias: String, func: String },
}

pub struct CallSite<'t> {
    pub node: Node<'t>,
    /// Node to report positions from: the selector field for qualified
    /// calls, the identifier for bare calls.
    pub name_node: Node<'t>,
    pub callee: Callee,
}

impl ParsedFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// 1-based (line, column) of a node's start.
    pub fn position(&self, node: Node<'_>) -> (usize, usize) {
        let point = node.start_position();
        (point.row + 1, point.column + 1)
    }

    /// The declared package name from the package clause.
    pub fn package_name(&self) -> Option<String> {
        let root = self.root();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() == "package_clause" {
                let mut inner = child.walk();
                for ident in child.named_children(&mut inner) {
                    if ident.kind() == "package_identifier" {
                        return Some(self.text(ident).to_string());
                    }
                }
            }
        }
        None
    }

    /// All top-level function and method declarations.
    pub fn functions(&self) -> Vec<FunctionDecl<'_>> {
        let root = self.root();
        let mut cursor = root.walk();
        let mut decls = Vec::new();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    let Some(name_node) = child.child_by_field_name("name") else {
                        continue;
                    };
                    decls.push(FunctionDecl {
                        name: self.text(name_node).to_string(),
                        node: child,
                        parameters: child.child_by_field_name("parameters"),
                        body: child.child_by_field_name("body"),
                    });
                }
                _ => {}
            }
        }
        decls
    }

    /// Call sites inside a subtree, in source order.
    pub fn calls_in<'t>(&'t self, scope: Node<'t>) -> Vec<CallSite<'t>> {
        let mut calls = Vec::new();
        preorder(scope, &mut |node| {
            if node.kind() != "call_expression" {
                return;
            }
            let Some(function) = node.child_by_field_name("function") else {
                return;
            };
            match function.kind() {
                "identifier" => calls.push(CallSite {
                    node,
                    name_node: function,
                    callee: Callee::Bare(self.text(function).to_string()),
                }),
                "selector_expression" => {
                    let operand = function.child_by_field_name("operand");
                    let field = function.child_by_field_name("field");
                    if let (Some(operand), Some(field)) = (operand, field) {
                        if operand.kind() == "identifier" {
                            calls.push(CallSite {
                                node,
                                name_node: field,
                                callee: Callee::Qualified {
                                    alias: self.text(operand).to_string(),
                                    func: self.text(field).to_string(),
                                },
                            });
                        }
                    }
                }
                _ => {}
            }
        });
        calls
    }

    /// Parameter type names of a function, rendered as `pkg.Type` for
    /// qualified types and the bare identifier otherwise. Pointers are
    /// stripped; only the structural package/name pair is kept.
    pub fn parameter_types(&self, decl: &FunctionDecl<'_>) -> Vec<String> {
        let Some(params) = decl.parameters else {
            return Vec::new();
        };
        let mut types = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "parameter_declaration" | "variadic_parameter_declaration" => {
                    if let Some(ty) = param.child_by_field_name("type") {
                        if let Some(rendered) = self.render_type(ty) {
                            types.push(rendered);
                        }
                    }
                }
                _ => {}
            }
        }
        types
    }

    fn render_type(&self, ty: Node<'_>) -> Option<String> {
        let mut node = ty;
        while node.kind() == "pointer_type" {
            node = node.named_child(0)?;
        }
        match node.kind() {
            "qualified_type" => {
                let package = node.child_by_field_name("package")?;
                let name = node.child_by_field_name("name")?;
                Some(format!("{}.{}", self.text(package), self.text(name)))
            }
            "type_identifier" => Some(self.text(node).to_string()),
            _ => None,
        }
    }
}

/// Preorder walk over a subtree.
pub fn preorder<'t>(node: Node<'t>, visit: &mut dyn FnMut(Node<'t>)) {
    visit(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        preorder(child, visit);
    }
}
