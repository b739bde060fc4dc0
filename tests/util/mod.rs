/// A raw HTTP client over a TCP stream.
pub mod client;
/// Starting servers over temporary directories.
pub mod test_server;
