use std::path::{Component, Path, PathBuf};

use crate::files::error::ServeError;

/// Maps request targets to paths beneath a base directory.
#[derive(Debug, Clone)]
pub struct Resolver {
    base: PathBuf,
}

impl Resolver {
    /// Creates a resolver for the given base directory. The base should be absolute.
    pub fn new(base: impl AsRef<Path>) -> Resolver {
        Resolver { base: normalize(base.as_ref()) }
    }

    /// The base directory.
    #[cfg(test)]
    pub(crate) fn base(&self) -> &Path {
        &self.base
    }

    /// Resolves a request target to a path equal to or beneath the base directory.
    ///
    /// The query and fragment are dropped, the path is percent-decoded, and the result is
    /// joined onto the base and normalized without touching the filesystem. Paths that end up
    /// outside the base are Forbidden.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf, ServeError> {
        let raw = request_path(uri);

        if has_malformed_escape(raw) {
            return Err(ServeError::MalformedPath);
        }
        let decoded = urlencoding::decode(raw).map_err(|_| ServeError::MalformedPath)?;
        if decoded.contains('\0') {
            return Err(ServeError::MalformedPath);
        }

        let relative = decoded.strip_prefix('/').unwrap_or(&decoded[..]);
        let path = normalize(&self.base.join(relative));

        if path.starts_with(&self.base) {
            Ok(path)
        } else {
            Err(ServeError::Forbidden)
        }
    }
}

/// Gets the path of a request target. Absolute-form targets lose their scheme and authority, and
/// everything from the first '?' or '#' is dropped.
fn request_path(uri: &str) -> &str {
    let uri = match uri.find("://") {
        Some(scheme_end) if uri[..scheme_end].chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) => {
            let after_scheme = &uri[scheme_end + 3..];
            after_scheme.find('/').map(|start| &after_scheme[start..]).unwrap_or("/")
        }
        _ => uri
    };

    uri.split(|c: char| c == '?' || c == '#').next().unwrap_or_default()
}

/// Checks for a '%' that is not followed by two hex digits.
fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate()
        .filter(|(_, b)| **b == b'%')
        .any(|(i, _)| !matches!(bytes.get(i + 1..i + 3), Some([a, b]) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()))
}

/// Drops "." components and applies ".." components lexically. ".." at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => { normalized.pop(); }
            other => normalized.push(other)
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::files::error::ServeError;
    use crate::files::resolve::Resolver;

    fn resolver() -> Resolver {
        Resolver::new("/srv/files")
    }

    fn assert_resolves(uri: &str, expected: &str) {
        assert_eq!(PathBuf::from(expected), resolver().resolve(uri).unwrap(), "uri {:?}", uri);
    }

    fn assert_forbidden(uri: &str) {
        assert!(matches!(resolver().resolve(uri), Err(ServeError::Forbidden)), "uri {:?}", uri);
    }

    fn assert_malformed(uri: &str) {
        assert!(matches!(resolver().resolve(uri), Err(ServeError::MalformedPath)), "uri {:?}", uri);
    }

    #[test]
    fn root_is_base() {
        assert_resolves("/", "/srv/files");
        assert_resolves("", "/srv/files");
        assert_resolves("/.", "/srv/files");
    }

    #[test]
    fn plain_paths() {
        assert_resolves("/notes.txt", "/srv/files/notes.txt");
        assert_resolves("/a/b/c.txt", "/srv/files/a/b/c.txt");
        assert_resolves("/dir/", "/srv/files/dir");
    }

    #[test]
    fn percent_decoding() {
        assert_resolves("/my%20notes.txt", "/srv/files/my notes.txt");
        assert_resolves("/%E2%9C%93.txt", "/srv/files/✓.txt");
        assert_resolves("/a%2Fb", "/srv/files/a/b");
        assert_resolves("/100%25", "/srv/files/100%");
    }

    #[test]
    fn query_and_fragment_are_dropped() {
        assert_resolves("/notes.txt?download=1", "/srv/files/notes.txt");
        assert_resolves("/notes.txt#top", "/srv/files/notes.txt");
        assert_resolves("/a%3Fb?c", "/srv/files/a?b");
    }

    #[test]
    fn absolute_form() {
        assert_resolves("http://localhost:8000/notes.txt", "/srv/files/notes.txt");
        assert_resolves("http://localhost:8000", "/srv/files");
    }

    #[test]
    fn dot_dot_inside_base() {
        assert_resolves("/a/../b", "/srv/files/b");
        assert_resolves("/a/./b/..", "/srv/files/a");
        assert_resolves("/a/..", "/srv/files");
    }

    #[test]
    fn traversal_is_forbidden() {
        assert_forbidden("/..");
        assert_forbidden("/../etc/passwd");
        assert_forbidden("/a/../../etc/passwd");
        assert_forbidden("/../../../../../../etc/passwd");
    }

    #[test]
    fn encoded_traversal_is_forbidden() {
        assert_forbidden("/%2e%2e/etc/passwd");
        assert_forbidden("/%2E%2E%2Fetc%2Fpasswd");
        assert_forbidden("/a/%2e%2e/%2e%2e/x");
    }

    #[test]
    fn sibling_with_shared_prefix_is_forbidden() {
        assert_forbidden("/../files2/secret");
        assert_forbidden("/../files-old");
    }

    #[test]
    fn absolute_remainder_is_forbidden() {
        assert_forbidden("//etc/passwd");
        assert_forbidden("/%2Fetc/passwd");
    }

    #[test]
    fn malformed_paths() {
        assert_malformed("/%");
        assert_malformed("/%2");
        assert_malformed("/%zz");
        assert_malformed("/%FF");
        assert_malformed("/a%00b");
    }

    #[test]
    fn base_is_normalized() {
        let resolver = Resolver::new("/srv/./files/");
        assert_eq!(PathBuf::from("/srv/files/a"), resolver.resolve("/a").unwrap());
    }
}
