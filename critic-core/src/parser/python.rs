//! Python structure scan using tree-sitter.
//!
//! Walks the whole syntax tree breadth-first and records imports, class
//! names and function names wherever they occur, including nested scopes.
//! Levels are counted the way Python's own `ast` module counts them:
//! tree-sitter's `block`, `else`/`finally` wrappers and decorator wrappers
//! are flattened into their parent, and each `elif` sits one level below
//! the branch before it. Any source that does not parse cleanly yields no
//! structure at all.

use std::collections::VecDeque;

use tree_sitter::{Node, Parser, Tree};

use super::helpers::{
    children_by_field, contains_kind, field_text, get_node_text, has_child_of_type,
};
use crate::types::CodeStructure;

/// Statements the grammar still accepts but Python 3 rejects.
const LEGACY_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Parse Python source into a tree without syntax errors.
fn parse_tree(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;

    let tree = parser.parse(source, None)?;
    let root = tree.root_node();
    if root.has_error() || contains_kind(&root, LEGACY_STATEMENTS) {
        return None;
    }
    Some(tree)
}

/// One entry of the walk queue.
#[derive(Clone, Copy)]
enum Step<'t> {
    /// A syntax node, matched against the recorded kinds.
    Node(Node<'t>),
    /// An `elif` clause together with the clauses after it.
    Elif(Node<'t>),
}

/// Extract imports, classes and functions, or `None` if the source is not
/// valid Python.
pub fn extract_structure(source: &str) -> Option<CodeStructure> {
    let tree = parse_tree(source)?;
    let mut structure = CodeStructure::default();

    let mut queue = VecDeque::from([Step::Node(tree.root_node())]);
    while let Some(step) = queue.pop_front() {
        let node = match step {
            Step::Node(node) => node,
            Step::Elif(clause) => {
                queue.extend(elif_steps(clause));
                continue;
            }
        };

        match node.kind() {
            "import_statement" => {
                for name in children_by_field(&node, "name") {
                    structure.imports.push(imported_name(&name, source).to_string());
                }
            }
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| from_module(&m, source))
                    .unwrap_or_default();
                structure.imports.extend(from_import_targets(&node, module, source));
            }
            "future_import_statement" => {
                structure
                    .imports
                    .extend(from_import_targets(&node, "__future__", source));
            }
            "class_definition" => {
                if let Some(name) = field_text(&node, "name", source) {
                    structure.classes.push(name.to_string());
                }
            }
            // `async def` is a distinct construct and is not reported
            "function_definition" if !has_child_of_type(&node, "async") => {
                if let Some(name) = field_text(&node, "name", source) {
                    structure.functions.push(name.to_string());
                }
            }
            _ => {}
        }

        queue.extend(child_steps(node));
    }

    Some(structure)
}

/// Next level below `node`. Everything from the first `elif` on is
/// deferred to a single [`Step::Elif`].
fn child_steps(node: Node<'_>) -> Vec<Step<'_>> {
    let mut steps = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "elif_clause" {
            steps.push(Step::Elif(child));
            break;
        }
        flatten_into(child, &mut steps);
    }
    steps
}

/// Condition and body of an `elif`, then the clause that follows it.
fn elif_steps(clause: Node<'_>) -> Vec<Step<'_>> {
    let mut steps = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        flatten_into(child, &mut steps);
    }

    let mut sibling = clause.next_named_sibling();
    while let Some(next) = sibling {
        match next.kind() {
            "elif_clause" => {
                steps.push(Step::Elif(next));
                break;
            }
            "else_clause" => {
                flatten_into(next, &mut steps);
                break;
            }
            "comment" => sibling = next.next_named_sibling(),
            _ => break,
        }
    }
    steps
}

/// Queue `node`, or what it wraps when it has no node of its own in `ast`.
fn flatten_into<'t>(node: Node<'t>, steps: &mut Vec<Step<'t>>) {
    match node.kind() {
        "block" | "else_clause" | "finally_clause" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                flatten_into(child, steps);
            }
        }
        // Decorators cannot hold definitions or imports
        "decorated_definition" => {
            if let Some(definition) = node.child_by_field_name("definition") {
                steps.push(Step::Node(definition));
            }
        }
        _ => steps.push(Step::Node(node)),
    }
}

/// One-paragraph synopsis of a Python source file.
///
/// Best effort: returns an empty string for anything that does not parse.
pub fn summarize(source: &str) -> String {
    extract_structure(source)
        .map(|structure| structure.summary())
        .unwrap_or_default()
}

/// Dotted name of an `import` target, ignoring any `as` alias.
fn imported_name<'a>(node: &Node, source: &'a str) -> &'a str {
    if node.kind() == "aliased_import" {
        return field_text(node, "name", source).unwrap_or_default();
    }
    get_node_text(node, source)
}

/// Module part of `from X import ...`; relative dots are dropped.
fn from_module<'a>(node: &Node, source: &'a str) -> &'a str {
    if node.kind() == "relative_import" {
        let mut cursor = node.walk();
        let dotted = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "dotted_name");
        return dotted
            .map(|d| get_node_text(&d, source))
            .unwrap_or_default();
    }
    get_node_text(node, source)
}

/// `module.name` for every imported name; bare `name` when there is no module.
fn from_import_targets(node: &Node, module: &str, source: &str) -> Vec<String> {
    let qualify = |name: &str| {
        if module.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", module, name)
        }
    };

    let mut targets: Vec<String> = children_by_field(node, "name")
        .iter()
        .map(|name| qualify(imported_name(name, source)))
        .collect();

    if has_child_of_type(node, "wildcard_import") {
        targets.push(qualify("*"));
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functions_and_imports() {
        let source = r#"
import os

def a():
    return os.getcwd()

def b():
    pass
"#;
        let summary = summarize(source);
        let imports = summary.find("Imports: os.").unwrap();
        let functions = summary.find("Defines functions: a, b.").unwrap();
        assert!(imports < functions);
        assert!(!summary.contains("Defines classes"));
    }

    #[test]
    fn test_invalid_source_is_empty() {
        assert_eq!(summarize("def broken(:\n    return"), "");
        assert_eq!(summarize("class\n"), "");
        assert!(extract_structure("x = (1,").is_none());
    }

    #[test]
    fn test_empty_and_trivial_sources() {
        assert_eq!(summarize(""), "");
        assert_eq!(summarize("x = 1\nprint(x)\n"), "");
    }

    #[test]
    fn test_import_roots_deduplicated_and_sorted() {
        let source = r#"
import sys
import os.path as osp
from typing import List, Optional
from collections.abc import Mapping
from . import sibling
from .pkg import thing
from __future__ import annotations
from json import *
"#;
        let structure = extract_structure(source).unwrap();
        assert!(structure.imports.contains(&"os.path".to_string()));
        assert!(structure.imports.contains(&"typing.List".to_string()));
        assert!(structure.imports.contains(&"sibling".to_string()));
        assert!(structure.imports.contains(&"pkg.thing".to_string()));
        assert!(structure.imports.contains(&"__future__.annotations".to_string()));
        assert!(structure.imports.contains(&"json.*".to_string()));

        assert_eq!(
            structure.summary(),
            "Imports: __future__, collections, json, os, pkg, sibling, sys, typing."
        );
    }

    #[test]
    fn test_nested_definitions_are_found() {
        let source = r#"
class Outer:
    class Inner:
        def method(self):
            def local():
                pass
            return local

def top():
    import json
    return json
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.classes, vec!["Outer", "Inner"]);
        assert_eq!(structure.functions, vec!["top", "method", "local"]);
        assert_eq!(structure.imports, vec!["json"]);
    }

    #[test]
    fn test_decorated_definitions() {
        let source = r#"
from dataclasses import dataclass

@dataclass
class Point:
    x: int

    @property
    def norm(self):
        return abs(self.x)
"#;
        let summary = summarize(source);
        assert_eq!(
            summary,
            "Imports: dataclasses. Defines classes: Point. Defines functions: norm."
        );
    }

    #[test]
    fn test_decorated_definitions_keep_source_order() {
        let source = r#"
@register
class A:
    pass

class B:
    pass

@cache
def f():
    pass

def g():
    pass
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.classes, vec!["A", "B"]);
        assert_eq!(structure.functions, vec!["f", "g"]);
    }

    #[test]
    fn test_decorated_method_before_plain_method() {
        let source = r#"
class Config:
    @property
    def a(self):
        return 1

    def b(self):
        return 2
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.functions, vec!["a", "b"]);
    }

    #[test]
    fn test_if_else_bodies_share_a_level() {
        let source = r#"
if x:
    def f():
        pass
else:
    def g():
        pass

def h():
    def i():
        pass
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.functions, vec!["h", "f", "g", "i"]);
    }

    #[test]
    fn test_elif_nests_one_level_down() {
        let source = r#"
if a:
    def f():
        pass
elif b:
    def g():
        pass
else:
    def k():
        pass

def h():
    def i():
        pass
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.functions, vec!["h", "f", "i", "g", "k"]);
    }

    #[test]
    fn test_try_clauses_flattened() {
        let source = r#"
try:
    import json
except ImportError:
    import simplejson as json
else:
    def loads():
        pass
finally:
    def cleanup():
        pass
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.imports, vec!["json", "simplejson"]);
        assert_eq!(structure.functions, vec!["loads", "cleanup"]);
    }

    #[test]
    fn test_python2_statements_are_invalid() {
        assert_eq!(summarize("print \"hello\"\ndef f(): pass\n"), "");
        assert_eq!(summarize("exec \"x=1\"\ndef f(): pass\n"), "");
        assert!(extract_structure("def f():\n    print >>sys.stderr, 'x'\n").is_none());
    }

    #[test]
    fn test_print_call_is_valid() {
        assert_eq!(
            summarize("print(\"hello\")\ndef f():\n    pass\n"),
            "Defines functions: f."
        );
    }

    #[test]
    fn test_async_functions_not_counted() {
        let source = r#"
async def fetch():
    pass

def sync():
    pass
"#;
        let structure = extract_structure(source).unwrap();
        assert_eq!(structure.functions, vec!["sync"]);
    }
}
