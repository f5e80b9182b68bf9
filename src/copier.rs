// src/copier.rs
use std::io::ErrorKind;
use std::path::Path;

use duct::cmd;
use log::{debug, info};
use serde_yaml::Value;

use crate::error::DrError;

/// Executable name of the external templating engine.
pub const ENGINE_BIN: &str = "copier";

/// Set on every engine invocation to silence its version-warning banner.
const ENGINE_ENV_SUPPRESS: (&str, &str) = ("COPIER_SKIP_VERSION_CHECK", "1");

/// Everything needed to clone a template into the working directory.
pub struct CopyRequest<'a> {
  pub source: &'a str,
  /// Answer-file path relative to the repo root.
  pub answers_file: &'a Path,
  pub data: &'a [(String, Value)],
  pub quiet: bool,
}

/// Probes whether the engine binary is runnable.
pub fn check_engine_installed() -> Result<bool, DrError> {
  let result = cmd!(ENGINE_BIN, "--version")
    .stdout_null()
    .stderr_null()
    .unchecked()
    .run();
  match result {
    Ok(output) => Ok(output.status.success()),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
    Err(e) => Err(DrError::EngineSpawn { source: e }),
  }
}

/// Runs `copier copy`, streaming engine output to the terminal.
pub fn run_copy(repo_root: &Path, request: &CopyRequest) -> Result<(), DrError> {
  run_engine(repo_root, copy_args(request))
}

/// Runs `copier update` for one answer file.
pub fn run_update(
  repo_root: &Path,
  answers_file: &Path,
  skip_answered: bool,
  quiet: bool,
) -> Result<(), DrError> {
  run_engine(repo_root, update_args(answers_file, skip_answered, quiet))
}

fn copy_args(request: &CopyRequest) -> Vec<String> {
  let mut args: Vec<String> = vec![
    "copy".to_string(),
    request.source.to_string(),
    ".".to_string(),
    "--answers-file".to_string(),
    request.answers_file.to_string_lossy().to_string(),
  ];
  args.extend(data_args(request.data));
  if request.quiet {
    args.push("--quiet".to_string());
  }
  args
}

fn update_args(answers_file: &Path, skip_answered: bool, quiet: bool) -> Vec<String> {
  let mut args: Vec<String> = vec![
    "update".to_string(),
    "--answers-file".to_string(),
    answers_file.to_string_lossy().to_string(),
  ];
  if skip_answered {
    args.push("--skip-answered".to_string());
  }
  if quiet {
    args.push("--quiet".to_string());
  }
  args
}

/// Renders --data arguments for the engine: booleans lowercase, strings verbatim.
fn data_args(data: &[(String, Value)]) -> Vec<String> {
  let mut args = Vec::with_capacity(data.len() * 2);
  for (key, value) in data {
    let rendered = match value {
      Value::Bool(b) => b.to_string(),
      Value::String(s) => s.clone(),
      other => serde_yaml::to_string(other)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_default(),
    };
    args.push("--data".to_string());
    args.push(format!("{}={}", key, rendered));
  }
  args
}

/// Runs the engine with stdio inherited so prompts and progress reach the
/// user directly. Non-zero exits surface as errors carrying the status.
fn run_engine(repo_root: &Path, args: Vec<String>) -> Result<(), DrError> {
  info!(
    "Executing: {} {} in {}",
    ENGINE_BIN,
    args.join(" "),
    repo_root.display()
  );
  let output = cmd(ENGINE_BIN, &args)
    .dir(repo_root)
    .env(ENGINE_ENV_SUPPRESS.0, ENGINE_ENV_SUPPRESS.1)
    .unchecked()
    .run()
    .map_err(|e| {
      if e.kind() == ErrorKind::NotFound {
        DrError::EngineNotInstalled(ENGINE_BIN.to_string())
      } else {
        DrError::EngineSpawn { source: e }
      }
    })?;
  debug!("Engine finished with status {}", output.status);
  if !output.status.success() {
    return Err(DrError::EngineFailed {
      status: output.status,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn copy_args_carry_source_answers_file_and_data() {
    let data = vec![
      ("project_name".to_string(), Value::String("demo app".to_string())),
      ("use_auth".to_string(), Value::Bool(true)),
    ];
    let request = CopyRequest {
      source: "https://github.com/acme/web-frontend.git",
      answers_file: &PathBuf::from(".datarobot/answers/web-frontend.yaml"),
      data: &data,
      quiet: false,
    };

    let args = copy_args(&request);
    assert_eq!(
      args,
      vec![
        "copy",
        "https://github.com/acme/web-frontend.git",
        ".",
        "--answers-file",
        ".datarobot/answers/web-frontend.yaml",
        "--data",
        "project_name=demo app",
        "--data",
        "use_auth=true",
      ]
    );
  }

  #[test]
  fn quiet_flag_is_appended_when_requested() {
    let request = CopyRequest {
      source: "gh:acme/api",
      answers_file: &PathBuf::from(".datarobot/answers/api.yaml"),
      data: &[],
      quiet: true,
    };
    let args = copy_args(&request);
    assert_eq!(args.last().map(String::as_str), Some("--quiet"));
  }

  #[test]
  fn update_args_forward_engine_flags() {
    let args = update_args(
      &PathBuf::from(".datarobot/answers/api.yaml"),
      true,
      true,
    );
    assert_eq!(
      args,
      vec![
        "update",
        "--answers-file",
        ".datarobot/answers/api.yaml",
        "--skip-answered",
        "--quiet",
      ]
    );
  }

  #[test]
  fn update_args_minimal_form() {
    let args = update_args(&PathBuf::from(".datarobot/answers/api.yaml"), false, false);
    assert_eq!(
      args,
      vec!["update", "--answers-file", ".datarobot/answers/api.yaml"]
    );
  }

  #[test]
  fn booleans_render_lowercase_in_data_args() {
    let data = vec![("flag".to_string(), Value::Bool(false))];
    assert_eq!(data_args(&data), vec!["--data", "flag=false"]);
  }
}
