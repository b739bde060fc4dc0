use std::io::Error;
use std::process;

use clap::Parser;
use log::{error, info};
use simplelog::{ColorChoice, TerminalMode, TermLogger};

use filebox::args::Args;
use filebox::files::file_router;
use filebox::files::resolve::Resolver;
use filebox::server;
use filebox::server::Config;

fn main() -> Result<(), Error> {
    let args = Args::parse();

    if let Err(err) = TermLogger::init(args.log_level, simplelog::Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Failed to set up logging: {}", err);
    }

    let root = match args.root.canonicalize() {
        Ok(root) if root.is_dir() => root,
        Ok(root) => {
            error!("{} is not a directory", root.display());
            process::exit(1);
        }
        Err(err) => {
            error!("Can not serve {}: {}", args.root.display(), err);
            process::exit(1);
        }
    };

    info!("Serving {}", root.display());
    server::listen_http(Config {
        addr: args.addr(),
        connection_handler_threads: args.threads,
        max_body_size: args.max_body_size,
        router: file_router(Resolver::new(root)),
    })
}
