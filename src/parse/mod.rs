/// Parsing errors.
pub mod error;
/// Parse trait and other basic parsing types.
pub mod parse;
/// Request parsing components.
pub mod request;
/// Parser for message bodies.
pub mod body;

/// Reader adapter that fails once a byte budget is spent.
mod limit;
/// Parser for CRLF lines.
mod line;
/// Parser for headers.
mod headers;

/// Utility for testing parsers.
#[cfg(test)]
mod test_util;
