//! Names that declarations are known by outside of their module

/// Separates the module from the name in a mangled name
pub const MANGLE_SEPARATOR: char = '$';

/// Gets the mangled name of a declaration, `<module>$<name>`, or just the name outside of a module
pub fn mangle(module: Option<&str>, name: &str) -> String {
    match module {
        Some(module) if !module.is_empty() => format!("{module}{MANGLE_SEPARATOR}{name}"),
        _ => name.to_string(),
    }
}

/// Gets the name a declaration is looked up by, `<module>.<name>`, or just the name outside of a
/// module
pub fn lookup_name(module: Option<&str>, name: &str) -> String {
    match module {
        Some(module) if !module.is_empty() => format!("{module}.{name}"),
        _ => name.to_string(),
    }
}

/// Splits a mangled name back into its module and name
pub fn demangle(mangled: &str) -> (Option<&str>, &str) {
    match mangled.split_once(MANGLE_SEPARATOR) {
        Some((module, name)) => (Some(module), name),
        None => (None, mangled),
    }
}
