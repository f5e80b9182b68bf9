// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::completion::ShellKind;

#[derive(Parser, Debug)]
#[command(
    name = "dr", // Command name users type
    author,
    version,
    about = "Scaffolds and manages application template projects.",
    long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Increase verbosity level (e.g., -v, -vv)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Path to an explicit settings file
  #[arg(long, global = true)] // Configures the --config command-line flag
  #[clap(env = "DATAROBOT_CONFIG")] // Configures the environment variable fallback
  pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Manage the components applied to this project
  #[command(subcommand)]
  Component(ComponentCommands),
  /// Authenticate against the DataRobot API
  #[command(subcommand)]
  Auth(AuthCommands),
  /// Discover and run tasks declared by this project
  #[command(subcommand)]
  Task(TaskCommands),
  /// Generate shell completion scripts
  Completion(CompletionArgs),
}

#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
  /// Apply a component template to this project
  Add(AddArgs),
  /// List the components recorded in this project
  List,
  /// Re-run the templating engine to update installed components
  Update(UpdateArgs),
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
  /// Sign in through the browser and store the resulting API key
  Login,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
  /// List the tasks declared in this project
  List,
  /// Run a declared task through your shell
  Run(RunArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
  /// Template repository to apply (git URL or local path)
  pub source: Option<String>,

  /// Component name (defaults to the last segment of the source)
  #[arg(long)]
  pub name: Option<String>,

  /// Answer a template question up front (can be repeated: -d key=value)
  #[arg(short = 'd', long = "data", value_name = "KEY=VALUE")]
  pub data: Vec<String>,

  /// Suppress templating engine output
  #[arg(short, long)]
  pub quiet: bool,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
  /// Component to update (prompts when omitted)
  pub name: Option<String>,

  /// Update every installed component
  #[arg(long, conflicts_with = "name")]
  pub all: bool,

  /// Keep previous answers without re-asking
  #[arg(long)]
  pub skip_answered: bool,

  /// Suppress templating engine output
  #[arg(short, long)]
  pub quiet: bool,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
  /// Name of the task to run
  pub name: String,
}

#[derive(Parser, Debug)]
pub struct CompletionArgs {
  /// Shell to generate completions for (detected from $SHELL when omitted)
  pub shell: Option<ShellKind>,

  /// Write the script to the shell's standard completions location
  #[arg(long)]
  pub install: bool,
}
