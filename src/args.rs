use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Serves a directory over HTTP. Files can be read with GET, written with PUT and removed with
/// DELETE. Directories are listed with GET and created with MKCOL.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// (Optional) Host name or IP address to serve from.
    #[arg(long, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    /// (Optional) Port number to open on host.
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,
    /// (Optional) Directory to serve. Nothing outside of it can be read or written.
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
    /// (Optional) Number of threads handling connections.
    #[arg(long, default_value_t = 4)]
    pub threads: usize,
    /// (Optional) Largest request body accepted, in bytes. Bodies of any size are accepted if not given.
    #[arg(long)]
    pub max_body_size: Option<u64>,
    /// (Optional) One of off, error, warn, info, debug or trace.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Args {
    /// The address the server binds to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
