//! Per-file resolution context: namespace, import table, and the names a
//! file declares at its top level.

use ahash::{AHashMap, AHashSet};

use super::ast::{Item, Name, Program};

/// Built once per parsed file and read-only afterwards; every name resolved
/// inside that file goes through the same instance.
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    namespace: Option<Name>,
    /// Keyed by both the alias and the trailing path segment; the first use
    /// statement to claim a key wins, matching source order.
    imports: AHashMap<String, Name>,
    /// `const` names declared at file scope. Case-sensitive, like PHP.
    constants: AHashSet<String>,
    /// Function names declared at file scope, lowercased: PHP function names
    /// compare case-insensitively.
    functions: AHashSet<String>,
}

impl FileContext {
    pub fn build(program: &Program) -> Self {
        let mut ctx = Self::default();
        for item in &program.items {
            match item {
                Item::Namespace(ns) => {
                    if ctx.namespace.is_none() {
                        ctx.namespace = Some(ns.name.clone());
                    }
                }
                Item::Use(decl) => {
                    for entry in &decl.entries {
                        let trailing = entry.path.last().to_string();
                        ctx.imports
                            .entry(trailing)
                            .or_insert_with(|| entry.path.clone());
                        if let Some(alias) = &entry.alias {
                            ctx.imports
                                .entry(alias.clone())
                                .or_insert_with(|| entry.path.clone());
                        }
                    }
                }
                Item::Const(decl) => {
                    ctx.constants.insert(decl.name.clone());
                }
                Item::Function(func) => {
                    ctx.functions.insert(func.name.to_ascii_lowercase());
                }
                Item::Class(_) | Item::Stmt(_) => {}
            }
        }
        ctx
    }

    pub fn namespace(&self) -> Option<&Name> {
        self.namespace.as_ref()
    }

    /// Import entry whose alias or trailing segment equals `segment`.
    pub fn import_for(&self, segment: &str) -> Option<&Name> {
        self.imports.get(segment)
    }

    pub fn declares_constant(&self, name: &str) -> bool {
        self.constants.contains(name)
    }

    pub fn declares_function(&self, name: &str) -> bool {
        self.functions.contains(&name.to_ascii_lowercase())
    }
}
