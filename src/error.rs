// src/error.rs
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrError {
  #[error("IO Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("YAML Parsing Error: {0}")]
  YamlParse(#[from] serde_yaml::Error),

  #[error("Could not read settings file '{path}': {source}")]
  SettingsRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not parse settings file '{path}': {source}")]
  SettingsParse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Failed to write settings file '{path}': {source}")]
  SettingsWrite {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not determine a home directory for this user")]
  NoHomeDir,

  #[error("Not inside an application template project (no '{0}' directory found here or in any parent)")]
  RepoRootNotFound(String),

  #[error("Invalid --data argument '{arg}': {reason}")]
  InvalidDataArg { arg: String, reason: String },

  #[error("Could not derive a component name from '{0}'; pass one with --name")]
  InvalidComponentName(String),

  #[error("The '{0}' templating engine is not installed or not on PATH")]
  EngineNotInstalled(String),

  #[error("Templating engine exited with status {status}")]
  EngineFailed { status: ExitStatus },

  #[error("Failed to launch the templating engine: {source}")]
  EngineSpawn {
    #[source]
    source: std::io::Error,
  },

  #[error("No component named '{0}' is installed (see `dr component list`)")]
  ComponentNotFound(String),

  #[error("No task named '{0}' is declared (see `dr task list`)")]
  TaskNotFound(String),

  #[error("Task '{name}' failed with status {status}")]
  TaskFailed { name: String, status: ExitStatus },

  #[error("Could not listen on localhost:{port} for the sign-in callback: {source}")]
  CallbackBind {
    port: u16,
    #[source]
    source: std::io::Error,
  },

  #[error("The sign-in listener stopped before a key was received")]
  CallbackClosed,

  #[error("Could not detect your shell from $SHELL; name one explicitly (bash, zsh, fish, powershell)")]
  ShellDetection,

  #[error("Failed to install completion script to '{path}': {source}")]
  CompletionInstall {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("User interaction failed: {0}")]
  Dialoguer(#[from] dialoguer::Error),
}
