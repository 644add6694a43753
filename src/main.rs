//! # Command Line Interface
//!
//! The subcommands are in the `commands` module, the argument parser is in `cli.rs`,
//! which is also used by the build script to generate shell completions.

use env_logger;
#[cfg(windows)]
use colored;
use log::error;
use fdcserve::commands;
use fdcserve::commands::CommandError;

mod cli;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    if colored::control::set_virtual_terminal(true).is_err() {
        colored::control::set_override(false);
    }

    let main_cmd = cli::build_cli();
    let matches = main_cmd.clone().get_matches();

    match matches.subcommand() {
        Some(("serve",cmd)) => commands::serve::serve(cmd),
        Some(("ports",_)) => commands::ports::ports(),
        Some(("info",cmd)) => commands::info::info(cmd),
        Some(("completions",cmd)) => commands::completions::generate(main_cmd,cmd),
        _ => {
            error!("No subcommand was found, try `fdcserve --help`");
            Err(Box::new(CommandError::InvalidCommand))
        }
    }
}
