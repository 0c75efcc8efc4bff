use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = amkolog::cli::Args::parse();
    if let Err(err) = amkolog::run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
