mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, discover, networks};
use sweepr_common::config::Config;
use sweepr_common::error;
use sweepr_common::error::SweepError;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
        disable_input: commands.no_input,
    };

    logging::init_logging(cfg.quiet);
    print::banner(cfg.no_banner, cfg.quiet);

    let result = match commands.command {
        Commands::Networks(args) => {
            print::header("scanning wireless networks", cfg.quiet);
            networks::networks(&args)
        }
        Commands::Discover(args) => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(&args, &cfg).await
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<SweepError>() {
                Some(err) => ExitCode::from(err.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}
