use std::fmt::{Display, Formatter};

/// An HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Method {
    /// GET method.
    GET,
    /// HEAD method.
    HEAD,
    /// POST method.
    POST,
    /// PUT method.
    PUT,
    /// DELETE method.
    DELETE,
    /// MKCOL method, from WebDAV. Creates a collection (directory).
    MKCOL,
    /// OPTIONS method.
    OPTIONS,
    /// TRACE method.
    TRACE,
    /// PATCH method.
    PATCH,
    /// CONNECT method.
    CONNECT,
    /// Any other method token. The server does not know what it means but can still name it.
    Extension(String),
}

macro_rules! known_methods {
    ($(($name:ident, $value:literal);)+) => {
        impl Method {
            /// Gets the method as it appears on the wire.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Method::$name => $value,)+
                    Method::Extension(name) => name.as_str(),
                }
            }

            /// Converts the given string to a method. Methods are case sensitive.
            /// Returns None if the string is not a valid method token.
            pub fn try_from_str(s: &str) -> Option<Method> {
                match s {
                    $($value => Some(Method::$name),)+
                    _ if is_token(s) => Some(Method::Extension(s.to_string())),
                    _ => None
                }
            }
        }
    }
}

known_methods! {
    (GET, "GET");
    (HEAD, "HEAD");
    (POST, "POST");
    (PUT, "PUT");
    (DELETE, "DELETE");
    (MKCOL, "MKCOL");
    (OPTIONS, "OPTIONS");
    (TRACE, "TRACE");
    (PATCH, "PATCH");
    (CONNECT, "CONNECT");
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that the string is a non-empty RFC 7230 token.
fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
