//! Per-file import alias table.

use super::{preorder, ParsedFile};
use std::collections::HashMap;

/// Maps each usable alias in a file to the import path it refers to.
///
/// The default alias is the last `/`-segment of the import path; an explicit
/// alias overrides it. Blank (`_`) and dot (`.`) imports contribute the
/// default alias, matching how the upstream corpus treats them.
#[derive(Debug, Default, Clone)]
pub struct ImportTable {
    aliases: HashMap<String, String>,
}

impl ImportTable {
    pub fn from_file(file: &ParsedFile) -> Self {
        let mut aliases = HashMap::new();
        preorder(file.root(), &mut |node| {
            if node.kind() != "import_spec" {
                return;
            }
            let Some(path_node) = node.child_by_field_name("path") else {
                return;
            };
            let path = file
                .text(path_node)
                .trim_matches(|c| c == '"' || c == '`')
                .to_string();
            let alias = match node.child_by_field_name("name") {
                Some(name) if name.kind() == "package_identifier" => {
                    file.text(name).to_string()
                }
                _ => default_alias(&path).to_string(),
            };
            aliases.insert(alias, path);
        });
        Self { aliases }
    }

    /// The import path an alias refers to, if the file imports it.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Alias resolution with the best-effort fallback used throughout the
    /// analyzer: an unresolved alias is taken as the import path itself,
    /// which covers single-segment standard-library references.
    pub fn resolve_or_alias<'a>(&'a self, alias: &'a str) -> &'a str {
        self.resolve(alias).unwrap_or(alias)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.aliases.values().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

fn default_alias(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}
