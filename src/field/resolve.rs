//! Dynamic sub-component discovery
//!
//! A page that renders `<component :is="...">` pulls its fields from the
//! components it registers. The script section is scanned, not parsed:
//! - registered names come from `key: ['A', 'b-c']` under a configured key
//! - import bindings come from `import X, { y as z } from '...'`
//!
//! Names are then paired by [`component_key`] and resolved to file paths.

use super::ComponentSections;
use crate::config::ClassifierConfig;
use crate::core::unicode::is_word_char;
use memchr::{memchr, memmem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PROJECT_ALIAS: &str = "@/";
const COMPONENT_EXTENSION: &str = "vue";

/// One `import a, { b } from 'specifier'` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBinding {
    pub names: Vec<String>,
    pub specifier: String,
}

/// A registered component paired with the import that provides it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentMatch<'a> {
    pub component: &'a str,
    pub import: &'a ImportBinding,
}

/// Whether a template renders the dynamic-component marker tag
pub fn references_dynamic_component(template: &str, config: &ClassifierConfig) -> bool {
    let needle = format!("<{}", config.dynamic_component_tag);
    memmem::find(template.as_bytes(), needle.as_bytes()).is_some()
}

/// Fold a component or binding name so `user-list`, `UserList` and `userList` compare equal
pub fn component_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve an import specifier relative to the importing component file
///
/// - `@/x` resolves under `<project_root>/src`
/// - `./x` and bare `x` resolve beside the importing file
/// - each leading `../` climbs one directory
///
/// A specifier without an extension gets `.vue`.
pub fn resolve_import_path(specifier: &str, current_file: &Path, project_root: &Path) -> PathBuf {
    let mut resolved = if let Some(rest) = specifier.strip_prefix(PROJECT_ALIAS) {
        project_root.join("src").join(rest)
    } else {
        let mut dir = current_file.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut rest = specifier;
        loop {
            if let Some(r) = rest.strip_prefix("./") {
                rest = r;
            } else if let Some(r) = rest.strip_prefix("../") {
                dir.pop();
                rest = r;
            } else {
                break;
            }
        }
        dir.join(rest)
    };

    if resolved.extension().is_none() {
        resolved.set_extension(COMPONENT_EXTENSION);
    }
    resolved
}

/// Component names listed under any configured registry key, in source order
pub fn registered_components(script: &str, config: &ClassifierConfig) -> Vec<String> {
    let mut found: Vec<(usize, Vec<String>)> = Vec::new();
    for key in config.component_registry_keys.iter().filter(|k| !k.is_empty()) {
        for at in memmem::find_iter(script.as_bytes(), key.as_bytes()) {
            if let Some(list) = array_after_key(script, at, key.len()) {
                found.push((at, string_literals(list)));
            }
        }
    }
    found.sort_by_key(|(at, _)| *at);
    found.into_iter().flat_map(|(_, names)| names).collect()
}

/// Static `import ... from '...'` statements, in source order
///
/// Side-effect imports (`import './x.css'`) and dynamic `import()` bind
/// nothing and are skipped.
pub fn parse_imports(script: &str) -> Vec<ImportBinding> {
    memmem::find_iter(script.as_bytes(), b"import")
        .filter_map(|at| import_at(script, at))
        .collect()
}

/// Pair each registered component with every import binding the same name
pub fn match_component_imports<'a>(
    components: &'a [String],
    imports: &'a [ImportBinding],
) -> Vec<ComponentMatch<'a>> {
    let mut matches = Vec::new();
    for component in components {
        let key = component_key(component);
        for import in imports {
            if import.names.iter().any(|n| component_key(n) == key) {
                matches.push(ComponentMatch {
                    component: component.as_str(),
                    import,
                });
            }
        }
    }
    matches
}

/// Paths of the registered sub-components a page renders dynamically
///
/// Empty unless the template actually uses the dynamic-component tag.
/// Registered names without a matching import are skipped.
pub fn sub_component_paths(
    template: &str,
    config: &ClassifierConfig,
    registered: &[String],
    imports: &[ImportBinding],
    current_file: &Path,
    project_root: &Path,
) -> Vec<PathBuf> {
    if !references_dynamic_component(template, config) {
        return Vec::new();
    }

    match_component_imports(registered, imports)
        .into_iter()
        .map(|m| resolve_import_path(&m.import.specifier, current_file, project_root))
        .collect()
}

/// Sub-component paths for a loaded component, from its template and script
pub fn discover_sub_components(
    sections: &ComponentSections,
    config: &ClassifierConfig,
    current_file: &Path,
    project_root: &Path,
) -> Vec<PathBuf> {
    if !references_dynamic_component(&sections.template_text, config) {
        return Vec::new();
    }
    let registered = registered_components(&sections.script_text, config);
    let imports = parse_imports(&sections.script_text);
    sub_component_paths(
        &sections.template_text,
        config,
        &registered,
        &imports,
        current_file,
        project_root,
    )
}

fn is_ident_char(c: char) -> bool {
    is_word_char(c) || c == '$'
}

/// Whether the `len` bytes at `at` form a whole identifier, not part of one
fn is_standalone(s: &str, at: usize, len: usize) -> bool {
    let before = s[..at].chars().next_back();
    let after = s[at + len..].chars().next();
    !before.is_some_and(|c| is_ident_char(c) || c == '.') && !after.is_some_and(is_ident_char)
}

/// Contents of the `[...]` in `key: [...]`, the key optionally quoted
fn array_after_key(script: &str, at: usize, key_len: usize) -> Option<&str> {
    let mut rest = &script[at + key_len..];
    match script[..at].chars().next_back() {
        Some(q @ ('\'' | '"')) => rest = rest.strip_prefix(q)?,
        Some(c) if is_ident_char(c) || c == '.' => return None,
        _ => {}
    }
    if rest.starts_with(is_ident_char) {
        return None;
    }
    let list = rest.trim_start().strip_prefix(':')?.trim_start().strip_prefix('[')?;
    let close = memchr(b']', list.as_bytes())?;
    Some(&list[..close])
}

/// Every quoted string in `list`; bare identifiers are not names
fn string_literals(list: &str) -> Vec<String> {
    let bytes = list.as_bytes();
    let mut out = Vec::new();
    let mut at = 0;
    while let Some(open) = bytes[at..].iter().position(|&b| matches!(b, b'\'' | b'"' | b'`')) {
        let open = at + open;
        let Some(len) = memchr(bytes[open], &bytes[open + 1..]) else {
            break;
        };
        out.push(list[open + 1..open + 1 + len].to_string());
        at = open + len + 2;
    }
    out
}

fn import_at(script: &str, at: usize) -> Option<ImportBinding> {
    const IMPORT: &str = "import";
    const FROM: &str = "from";

    if !is_standalone(script, at, IMPORT.len()) {
        return None;
    }
    let rest = &script[at + IMPORT.len()..];
    let from = memmem::find_iter(rest.as_bytes(), FROM.as_bytes()).find(|&f| is_standalone(rest, f, FROM.len()))?;
    let clause = &rest[..from];
    if clause.contains(['\'', '"', '`', ';', '(']) {
        return None;
    }

    let after = rest[from + FROM.len()..].trim_start();
    let quote = after.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let body = &after[1..];
    let end = body.find(quote)?;

    Some(ImportBinding {
        names: local_names(clause),
        specifier: body[..end].to_string(),
    })
}

/// Local binding names of an import clause: `A`, `{ b, c as d }`, `* as ns`
fn local_names(clause: &str) -> Vec<String> {
    let (outer, braced) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            (vec![&clause[..open], &clause[close + 1..]], Some(&clause[open + 1..close]))
        }
        _ => (vec![clause], None),
    };

    outer
        .into_iter()
        .chain(braced)
        .flat_map(|part| part.split(','))
        .filter_map(|spec| spec.split_whitespace().last())
        .filter(|name| *name != "*" && *name != "type")
        .map(str::to_string)
        .collect()
}
