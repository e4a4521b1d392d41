//! Object key resolution shared by every adapter.

/// Strip surrounding slashes from a configured base path.
pub fn normalize_base(base_path: &str) -> &str {
    base_path.trim_matches('/')
}

/// Strip leading slashes from a caller-supplied key.
pub fn normalize_key(key: &str) -> &str {
    key.trim_start_matches('/')
}

/// Resolve a caller key against the adapter's base path.
///
/// The base loses its surrounding slashes, the key its leading ones, and the
/// two are always joined with exactly one `/`. Keys are relative to the base:
/// a key that happens to start with the base name is still prefixed, so
/// `uploads/a.pdf` and `a.pdf` never name the same object.
///
/// ```text
/// resolve_full_path("tenant-a/", "/docs/a.pdf") == "tenant-a/docs/a.pdf"
/// resolve_full_path("", "/docs/a.pdf")          == "docs/a.pdf"
/// ```
pub fn resolve_full_path(base_path: &str, key: &str) -> String {
    let base = normalize_base(base_path);
    let key = normalize_key(key);

    if base.is_empty() {
        return key.to_string();
    }
    format!("{}/{}", base, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASES: &[&str] = &["", "/", "base", "base/", "base//", "/base", "a/b", "a/b/"];
    const KEYS: &[&str] = &[
        "file.txt",
        "/file.txt",
        "//file.txt",
        "dir/file.txt",
        "/dir/file.txt",
        "",
        "base",
        "baseline/x",
    ];

    #[test]
    fn test_resolve_full_path_joins_with_single_separator() {
        assert_eq!(resolve_full_path("base/", "/file.txt"), "base/file.txt");
        assert_eq!(resolve_full_path("base//", "//file.txt"), "base/file.txt");
        assert_eq!(resolve_full_path("a/b", "c/d.pdf"), "a/b/c/d.pdf");
        assert_eq!(resolve_full_path("", "/file.txt"), "file.txt");
        assert_eq!(resolve_full_path("/", "file.txt"), "file.txt");
    }

    #[test]
    fn test_resolve_full_path_never_doubles_separator_at_join() {
        for base in BASES {
            for key in KEYS {
                let resolved = resolve_full_path(base, key);
                let base_len = normalize_base(base).len();
                if base_len > 0 && resolved.len() > base_len {
                    let tail = &resolved[base_len..];
                    assert!(
                        !tail.starts_with("//"),
                        "doubled separator for base={:?} key={:?}: {}",
                        base,
                        key,
                        resolved
                    );
                }
            }
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for base in BASES {
            assert_eq!(normalize_base(normalize_base(base)), normalize_base(base));
        }
        for key in KEYS {
            assert_eq!(normalize_key(normalize_key(key)), normalize_key(key));
        }
    }

    #[test]
    fn test_differently_spelled_bases_resolve_alike() {
        for key in KEYS {
            let expected = resolve_full_path("base", key);
            for base in ["base/", "base//", "/base", "//base//"] {
                assert_eq!(resolve_full_path(base, key), expected, "key={:?}", key);
            }
        }
    }

    #[test]
    fn test_key_starting_with_base_name_is_still_prefixed() {
        assert_eq!(resolve_full_path("uploads", "uploads/a.pdf"), "uploads/uploads/a.pdf");
        assert_eq!(resolve_full_path("uploads", "a.pdf"), "uploads/a.pdf");
        assert_ne!(
            resolve_full_path("uploads", "uploads/a.pdf"),
            resolve_full_path("uploads", "a.pdf")
        );
        assert_eq!(resolve_full_path("base", "baseline/x"), "base/baseline/x");
        assert_eq!(resolve_full_path("base", "base"), "base/base");
    }
}
