// src/main.rs
mod add;
mod answers;
mod callback;
mod cli;
mod completion;
mod config;
mod copier;
mod error;
mod list;
mod login;
mod task;
mod update;
mod utils;

use clap::Parser;
use cli::{AuthCommands, Cli, Commands, ComponentCommands, TaskCommands};
use error::DrError;
use log::LevelFilter;

fn main() -> Result<(), DrError> {
  let cli = Cli::parse();

  // Setup logging based on verbosity
  let log_level = match cli.verbose {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  env_logger::Builder::new().filter_level(log_level).init();

  log::debug!("CLI args: {:?}", cli);

  // Match on the command
  match cli.command {
    Commands::Component(command) => match command {
      ComponentCommands::Add(args) => add::run_add(args)?,
      ComponentCommands::List => list::run_list()?,
      ComponentCommands::Update(args) => update::run_update(args)?,
    },
    Commands::Auth(command) => match command {
      AuthCommands::Login => login::run_login(cli.config.as_deref())?,
    },
    Commands::Task(command) => match command {
      TaskCommands::List => task::run_list()?,
      TaskCommands::Run(args) => task::run_task(&args.name)?,
    },
    Commands::Completion(args) => completion::run_completion(args)?,
  }

  Ok(())
}
