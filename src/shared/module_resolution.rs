//! Relative-path, `tsconfig` path-alias, and directory-fallback module
//! resolution, shared by the Global-Watch closure and the
//! Import-Graph Selector.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// `compilerOptions.baseUrl` / `compilerOptions.paths`, parsed from a
/// JSON-with-comments tsconfig-like file.
#[derive(Debug, Clone, Default)]
pub struct PathAliases {
    pub base_url: Option<String>,
    /// `(pattern, targets)` pairs, e.g. `("@app/*", ["src/app/*"])`.
    pub paths: Vec<(String, Vec<String>)>,
}

/// Strip `//` and `/* */` comments and trailing commas so a JSONC tsconfig
/// parses with `serde_json`. Comment markers inside string literals are
/// preserved.
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    let mut in_string = false;
    while let Some((_, ch)) = chars.next() {
        if in_string {
            out.push(ch);
            if ch == '\\' {
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ',' => {
                // Drop the comma if the next non-whitespace token closes an
                // object or array (a trailing comma).
                let mut lookahead = chars.clone();
                let mut trailing = false;
                while let Some((_, c)) = lookahead.peek().copied() {
                    if c.is_whitespace() {
                        lookahead.next();
                        continue;
                    }
                    trailing = c == '}' || c == ']';
                    break;
                }
                if !trailing {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

pub fn parse_path_aliases(tsconfig_content: &str) -> PathAliases {
    let cleaned = strip_jsonc(tsconfig_content);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) else {
        return PathAliases::default();
    };
    let options = value.get("compilerOptions");
    let base_url = options
        .and_then(|o| o.get("baseUrl"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let paths = options
        .and_then(|o| o.get("paths"))
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .map(|(pattern, targets)| {
                    let targets = targets
                        .as_array()
                        .map(|arr| arr.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
                        .unwrap_or_default();
                    (pattern.clone(), targets)
                })
                .collect()
        })
        .unwrap_or_default();
    PathAliases { base_url, paths }
}

/// Resolves a module specifier to an in-repo, repo-relative path.
pub struct ModuleResolver<'a> {
    known_files: &'a HashSet<PathBuf>,
    aliases: &'a PathAliases,
    extensions: &'a [String],
}

impl<'a> ModuleResolver<'a> {
    pub fn new(known_files: &'a HashSet<PathBuf>, aliases: &'a PathAliases, extensions: &'a [String]) -> Self {
        Self {
            known_files,
            aliases,
            extensions,
        }
    }

    /// Resolve `specifier` as imported from `from_file` (repo-relative).
    /// Returns `None` for specifiers that don't name an in-repo file
    /// (external packages, or aliases/relative paths that don't resolve).
    pub fn resolve(&self, from_file: &Path, specifier: &str) -> Option<PathBuf> {
        if specifier.starts_with('.') {
            let base = from_file.parent().unwrap_or_else(|| Path::new(""));
            return self.match_candidate(&normalize(&base.join(specifier)));
        }
        for (pattern, targets) in &self.aliases.paths {
            if let Some(rest) = match_alias_pattern(pattern, specifier) {
                for target in targets {
                    let substituted = target.replace('*', &rest);
                    if let Some(found) = self.match_candidate(&normalize(Path::new(&substituted))) {
                        return Some(found);
                    }
                }
            }
        }
        if let Some(base_url) = &self.aliases.base_url {
            if let Some(found) = self.match_candidate(&normalize(&Path::new(base_url).join(specifier))) {
                return Some(found);
            }
        }
        None
    }

    /// Parent-directory file-name fallback for asset literals: a bare
    /// file name is searched for anywhere under `from_file`'s ancestor
    /// directories before giving up.
    pub fn resolve_asset_fallback(&self, from_file: &Path, literal: &str) -> Option<PathBuf> {
        if let Some(direct) = self.resolve(from_file, literal) {
            return Some(direct);
        }
        let file_name = Path::new(literal).file_name()?;
        let mut dir = from_file.parent();
        while let Some(d) = dir {
            let candidate = d.join(file_name);
            if self.known_files.contains(&candidate) {
                return Some(candidate);
            }
            dir = d.parent().filter(|p| !p.as_os_str().is_empty());
        }
        None
    }

    fn match_candidate(&self, base: &Path) -> Option<PathBuf> {
        if self.known_files.contains(base) {
            return Some(base.to_path_buf());
        }
        for ext in self.extensions {
            let with_ext = append_suffix(base, ext);
            if self.known_files.contains(&with_ext) {
                return Some(with_ext);
            }
        }
        for ext in self.extensions {
            let index = base.join(format!("index{ext}"));
            if self.known_files.contains(&index) {
                return Some(index);
            }
        }
        None
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// `@app/*` matched against `@app/widgets/header` yields `Some("widgets/header")`.
fn match_alias_pattern(pattern: &str, specifier: &str) -> Option<String> {
    match pattern.strip_suffix('*') {
        Some(prefix) => specifier.strip_prefix(prefix).map(str::to_string),
        None => (pattern == specifier).then(|| String::new()),
    }
}

/// Collapse `.`/`..` segments without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = Vec::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.into_iter().collect()
}
