use bg_core::BgError;
use tree_sitter::{Node, Parser};

use crate::{clean_docstring, unquote_string_literal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonModule {
    pub docstring: Option<String>,
    pub items: Vec<ModuleItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleItem {
    Class(PythonClass),
    Function(PythonFunction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonClass {
    pub name: String,
    pub docstring: Option<String>,
    pub line_number: usize,
    pub methods: Vec<PythonFunction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonFunction {
    pub name: String,
    pub docstring: Option<String>,
    pub line_number: usize,
}

/// Collects the module docstring plus top-level classes and functions, with
/// the direct methods of each class. Nested definitions are not visited.
pub fn parse_python_module(source: &str) -> Result<PythonModule, BgError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::language())
        .map_err(|error| BgError::new("PYTHON_LANGUAGE_ERROR", error.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| BgError::new("PYTHON_PARSE_ERROR", "Python parser produced no tree."))?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(BgError::new(
            "PYTHON_PARSE_ERROR",
            format!("Invalid Python syntax near line {}.", line),
        ));
    }

    let mut items = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let Some(definition) = definition_of(child) else {
            continue;
        };
        match definition.kind() {
            "class_definition" => items.push(ModuleItem::Class(parse_class(definition, source)?)),
            "function_definition" => {
                items.push(ModuleItem::Function(parse_function(definition, source)?))
            }
            _ => {}
        }
    }

    Ok(PythonModule {
        docstring: block_docstring(root, source),
        items,
    })
}

fn parse_class(node: Node<'_>, source: &str) -> Result<PythonClass, BgError> {
    let name = definition_name(node, source)?;
    let body = node.child_by_field_name("body");
    let mut methods = Vec::new();
    if let Some(body) = body {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if let Some(definition) = definition_of(child) {
                if definition.kind() == "function_definition" {
                    methods.push(parse_function(definition, source)?);
                }
            }
        }
    }

    Ok(PythonClass {
        name,
        docstring: body.and_then(|body| block_docstring(body, source)),
        line_number: node.start_position().row + 1,
        methods,
    })
}

fn parse_function(node: Node<'_>, source: &str) -> Result<PythonFunction, BgError> {
    Ok(PythonFunction {
        name: definition_name(node, source)?,
        docstring: node
            .child_by_field_name("body")
            .and_then(|body| block_docstring(body, source)),
        line_number: node.start_position().row + 1,
    })
}

fn definition_of(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "class_definition" | "function_definition" => Some(node),
        "decorated_definition" => node.child_by_field_name("definition"),
        _ => None,
    }
}

fn definition_name(node: Node<'_>, source: &str) -> Result<String, BgError> {
    node.child_by_field_name("name")
        .and_then(|name| name.utf8_text(source.as_bytes()).ok())
        .map(str::to_string)
        .ok_or_else(|| {
            BgError::new(
                "PYTHON_PARSE_ERROR",
                format!(
                    "Definition without a name at line {}.",
                    node.start_position().row + 1
                ),
            )
        })
}

/// Docstring of a module or block: its first statement, when that
/// statement is a bare string literal.
fn block_docstring(block: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    let raw = literal.utf8_text(source.as_bytes()).ok()?;
    Some(clean_docstring(&unquote_string_literal(raw)))
}

fn first_error_line(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect::<Vec<_>>();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error_line)
}
