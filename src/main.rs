use anyhow::Result;

use maestro::cli::{self, Args};
use maestro::config::MaestroConfig;
use maestro::logging;

fn main() -> Result<()> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let args = Args::parse(std::env::args().skip(1));
    if args.has("help") {
        println!("{}", cli::USAGE);
        return Ok(());
    }
    match args.command(0) {
        None | Some("dashboard") => logging::init_logging_quiet(),
        Some(_) => logging::init_logging(),
    }

    let cfg = MaestroConfig::from_env();
    cli::run(&args, &cfg)
}
