//! Module-reference extraction: static imports, re-exports, dynamic
//! `import()`, `require(...)`, and bare string literals that look like
//! asset filenames.

use super::node_kinds as k;
use crate::shared::tree_sitter_util::{find_child_by_kind, node_text, walk_preorder};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSyntax {
    Static,
    Reexport,
    DynamicImport,
    Require,
    /// A bare string literal that looks like a relative asset path
    /// (`./x.json`, `../fixtures/data.yaml`). Only traversed as a
    /// dependency edge, never type-stripped.
    StringLiteralAsset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    pub specifier: String,
    pub syntax: ImportSyntax,
    pub is_type_only: bool,
}

/// Every module reference reachable from `root`.
pub fn module_references(root: Node, source: &str) -> Vec<ModuleReference> {
    let mut out = Vec::new();
    walk_preorder(root, &mut |node| match node.kind() {
        k::IMPORT_STATEMENT => {
            if let Some(spec) = string_literal_child(&node, source) {
                let is_type_only = node_text(&node, source).trim_start().starts_with("import type");
                out.push(ModuleReference {
                    specifier: spec,
                    syntax: ImportSyntax::Static,
                    is_type_only,
                });
            }
        }
        k::EXPORT_STATEMENT => {
            if find_child_by_kind(&node, "string").is_some() && node_text(&node, source).contains("from") {
                if let Some(spec) = string_literal_child(&node, source) {
                    let is_type_only = node_text(&node, source).trim_start().starts_with("export type");
                    out.push(ModuleReference {
                        specifier: spec,
                        syntax: ImportSyntax::Reexport,
                        is_type_only,
                    });
                }
            }
        }
        k::CALL_EXPRESSION => {
            if let Some((syntax, spec)) = dynamic_or_require_call(&node, source) {
                out.push(ModuleReference {
                    specifier: spec,
                    syntax,
                    is_type_only: false,
                });
            }
        }
        k::STRING => {
            if !has_import_ancestor(&node) {
                if let Some(text) = string_literal_text(&node, source) {
                    if looks_like_asset_path(&text) {
                        out.push(ModuleReference {
                            specifier: text,
                            syntax: ImportSyntax::StringLiteralAsset,
                            is_type_only: false,
                        });
                    }
                }
            }
        }
        _ => {}
    });
    out
}

fn has_import_ancestor(node: &Node) -> bool {
    let mut cur = *node;
    while let Some(parent) = cur.parent() {
        if matches!(parent.kind(), k::IMPORT_STATEMENT | k::EXPORT_STATEMENT) {
            return true;
        }
        cur = parent;
    }
    false
}

fn dynamic_or_require_call(call: &Node, source: &str) -> Option<(ImportSyntax, String)> {
    let callee = call.child_by_field_name("function")?;
    let syntax = match callee.kind() {
        "import" => ImportSyntax::DynamicImport,
        k::IDENTIFIER if node_text(&callee, source) == "require" => ImportSyntax::Require,
        _ => return None,
    };
    let args = call.child_by_field_name("arguments")?;
    let first_string = find_child_by_kind(&args, k::STRING)?;
    let spec = string_literal_text(&first_string, source)?;
    Some((syntax, spec))
}

fn string_literal_child(node: &Node, source: &str) -> Option<String> {
    let s = find_child_by_kind(node, k::STRING)?;
    string_literal_text(&s, source)
}

fn string_literal_text(string_node: &Node, source: &str) -> Option<String> {
    if string_node.kind() != k::STRING {
        return None;
    }
    if let Some(fragment) = find_child_by_kind(string_node, k::STRING_FRAGMENT) {
        return Some(node_text(&fragment, source).to_string());
    }
    let text = node_text(string_node, source);
    Some(text.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string())
}

/// A relative-looking path with a recognizable extension — the heuristic
/// used to spot string-literal asset references that aren't real imports.
fn looks_like_asset_path(text: &str) -> bool {
    if text.is_empty() || text.contains(' ') || text.len() > 4096 {
        return false;
    }
    let has_relative_prefix = text.starts_with("./") || text.starts_with("../") || text.starts_with('/');
    let has_slash = text.contains('/');
    if !has_relative_prefix && !has_slash {
        return false;
    }
    matches!(
        std::path::Path::new(text).extension().and_then(|e| e.to_str()),
        Some("json" | "yml" | "yaml" | "ts" | "tsx" | "js" | "jsx")
    )
}
