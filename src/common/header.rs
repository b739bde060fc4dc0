use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// A header name. Names are stored lowercase. The "Standard" variant reuses a static string for
/// headers this server reads or writes, while "Custom" owns the name of anything else.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub enum Header {
    Standard(&'static str),
    Custom(String),
}

impl Header {
    pub fn as_str(&self) -> &str {
        match self {
            Header::Standard(name) => name,
            Header::Custom(name) => name.as_str()
        }
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! standard_headers {
    (
        $(
            $(#[$docs:meta])*
            ($name:ident, $value:literal);
        )+
    ) => {
        $(
            $(#[$docs])*
            pub const $name: Header = Header::Standard($value);
        )+

        impl From<String> for Header {
            /// Gets a header from the given header name, ignoring case.
            fn from(mut value: String) -> Header {
                value.make_ascii_lowercase();
                match value.as_str() {
                    $(
                    $value => $name,
                    )+
                    _ => Header::Custom(value)
                }
            }
        }
    }
}

impl From<&str> for Header {
    /// Gets a header from the given header name, ignoring case.
    fn from(value: &str) -> Header {
        Header::from(value.to_string())
    }
}

standard_headers! {
    /// Lists the methods a resource supports. Sent with 405 responses.
    (ALLOW, "allow");
    (CONNECTION, "connection");
    (CONTENT_LENGTH, "content-length");
    (CONTENT_TYPE, "content-type");
    (HOST, "host");
    (TRANSFER_ENCODING, "transfer-encoding");
}

/// Creates a map of headers.
/// ```
/// use filebox::common::header::{CONNECTION, CONTENT_TYPE, CONTENT_LENGTH, Header, HeaderMapOps};
/// use filebox::header_map;
///
/// let headers = header_map![
///    (CONNECTION, "keep-alive"),
///    (CONTENT_LENGTH, "5"),
///    ("x-request-id", "42"),
///    ("coNtEnt-TyPE", "text/plain"),
/// ];
///
/// assert!(headers.contains_header_value(&CONNECTION, "keep-alive"));
/// assert!(headers.contains_header_value(&CONTENT_LENGTH, "5"));
/// assert!(headers.contains_header_value(&CONTENT_TYPE, "text/plain"));
/// assert!(headers.contains_header_value(&Header::Custom("x-request-id".into()), "42"));
/// ```
#[macro_export]
macro_rules! header_map {
    () => { $crate::common::header::HeaderMap::new() };
    ($(($header:expr, $value:expr)),+ $(,)?) => {
        <$crate::common::header::HeaderMap as $crate::common::header::HeaderMapOps>::from_pairs(vec![
            $(($header.into(), $value.into()),)+
        ])
    }
}

/// Operations for a header map.
pub trait HeaderMapOps {
    /// Gets a header map from the given vector of header and value pairs.
    fn from_pairs(header_values: Vec<(Header, String)>) -> Self;
    /// Adds a header value to the map, keeping any existing values.
    fn add_header(&mut self, k: Header, v: String);
    /// Replaces all values of a header with the given value.
    fn set_header(&mut self, k: Header, v: String);
    /// Checks if the map contains the given header and corresponding header value.
    fn contains_header_value(&self, k: &Header, v: &str) -> bool;
    /// Gets the first value for the given header.
    fn get_first_header_value(&self, k: &Header) -> Option<&String>;
}

/// A multimap of headers to values.
pub type HeaderMap = HashMap<Header, Vec<String>>;

impl HeaderMapOps for HeaderMap {
    fn from_pairs(header_values: Vec<(Header, String)>) -> HeaderMap {
        header_values.into_iter().fold(HashMap::new(), |mut m, (header, value)| {
            m.add_header(header, value);
            m
        })
    }

    fn add_header(&mut self, k: Header, v: String) {
        self.entry(k).or_default().push(v)
    }

    fn set_header(&mut self, k: Header, v: String) {
        self.insert(k, vec![v]);
    }

    fn contains_header_value(&self, k: &Header, v: &str) -> bool {
        self.get(k).map(|values| values.iter().any(|value| value == v)).unwrap_or(false)
    }

    fn get_first_header_value(&self, k: &Header) -> Option<&String> {
        self.get(k)?.first()
    }
}
