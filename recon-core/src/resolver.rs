//! Import resolution.
//!
//! Turns a module's import statements into absolute dotted names inside the
//! target package. Relative imports are resolved against the importing
//! module's own name:
//!
//! ```text
//! module zeeguu.api.session
//!   from .user import start    -> zeeguu.api.user
//!   from ..core import helper  -> zeeguu.core
//!   from .. import settings    -> zeeguu
//!   from .... import x         -> (skipped)
//! ```

use std::collections::BTreeSet;

use crate::parser::ImportStatement;

/// Resolve a `from` import to an absolute dotted module name.
///
/// Level 0 returns `module` exactly as written. For level `L` the last `L`
/// segments of `current_module` are dropped; `module`, if present, is then
/// appended. Returns `None` when `L` reaches or exceeds the number of
/// segments, or for `from` with neither a level nor a module.
pub fn resolve_import_from(
    level: usize,
    module: Option<&str>,
    current_module: &str,
) -> Option<String> {
    if level == 0 {
        return module.map(str::to_string);
    }

    let parts: Vec<&str> = current_module.split('.').collect();
    if level >= parts.len() {
        return None;
    }

    let mut resolved = parts[..parts.len() - level].join(".");
    if let Some(module) = module {
        resolved.push('.');
        resolved.push_str(module);
    }
    Some(resolved)
}

/// Resolve one statement to the dotted names it depends on.
fn resolve_statement(statement: &ImportStatement, current_module: &str) -> Vec<String> {
    match statement {
        ImportStatement::Import { names } => names.clone(),
        ImportStatement::From { level, module } => {
            resolve_import_from(*level, module.as_deref(), current_module)
                .into_iter()
                .collect()
        }
    }
}

/// Dependencies of `current_module` that live inside `package`.
///
/// Standard library and third-party imports fall outside the prefix and are
/// dropped. Repeated imports of the same target collapse to one entry.
pub fn extract_package_imports(
    current_module: &str,
    imports: &[ImportStatement],
    package: &str,
) -> BTreeSet<String> {
    imports
        .iter()
        .flat_map(|statement| resolve_statement(statement, current_module))
        .filter(|name| name.starts_with(package))
        .collect()
}
