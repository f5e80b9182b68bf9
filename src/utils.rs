use std::env;
use std::path::{Path, PathBuf};

use duct::cmd;
use log::{debug, warn};
use serde_yaml::Value;

use crate::config::PROJECT_DIR_NAME;
use crate::error::DrError;

/// Walks up from `start` looking for a directory containing the project
/// marker folder. Each ancestor is checked in turn, the home directory
/// included; the walk gives up once it has checked home or run out of
/// parents.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
  let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
  walk_up_for_marker(start, home.as_deref())
}

fn walk_up_for_marker(start: &Path, home: Option<&Path>) -> Option<PathBuf> {
  let mut dir = start.to_path_buf();
  loop {
    if dir.join(PROJECT_DIR_NAME).is_dir() {
      return Some(dir);
    }
    if home.map_or(false, |h| dir == h) {
      debug!(
        "Reached home directory without finding {}, stopping.",
        PROJECT_DIR_NAME
      );
      return None;
    }
    if !dir.pop() {
      return None;
    }
  }
}

/// Parses one `key=value` argument into a YAML scalar: `true`/`false`
/// coerce to booleans, everything else passes through as a string.
pub fn parse_key_value(arg: &str) -> Result<(String, Value), DrError> {
  let Some((key, value)) = arg.split_once('=') else {
    return Err(DrError::InvalidDataArg {
      arg: arg.to_string(),
      reason: "expected key=value".to_string(),
    });
  };
  if key.is_empty() {
    return Err(DrError::InvalidDataArg {
      arg: arg.to_string(),
      reason: "key must not be empty".to_string(),
    });
  }
  let value = match value {
    "true" => Value::Bool(true),
    "false" => Value::Bool(false),
    other => Value::String(other.to_string()),
  };
  Ok((key.to_string(), value))
}

pub fn parse_data_args(args: &[String]) -> Result<Vec<(String, Value)>, DrError> {
  args.iter().map(|arg| parse_key_value(arg)).collect()
}

/// Opens `url` in the system browser. Best-effort: callers should print
/// the URL as a fallback when this fails.
pub fn open_browser(url: &str) -> Result<(), DrError> {
  let expr = if cfg!(target_os = "macos") {
    cmd!("open", url)
  } else if cfg!(target_os = "windows") {
    cmd!("cmd", "/C", "start", "", url)
  } else {
    cmd!("xdg-open", url)
  };
  let output = expr.stdout_null().stderr_null().unchecked().run()?;
  if !output.status.success() {
    warn!("Browser opener exited with status {}", output.status);
    return Err(DrError::Io(std::io::Error::other(
      "browser opener returned a non-zero status",
    )));
  }
  Ok(())
}

/// The shell tasks run through ($SHELL, fallback `sh`).
pub fn user_shell() -> String {
  env::var("SHELL")
    .ok()
    .filter(|shell| !shell.is_empty())
    .unwrap_or_else(|| "sh".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn marker_in_start_dir_is_found() {
    let scratch = TempDir::new().unwrap();
    fs::create_dir_all(scratch.path().join(PROJECT_DIR_NAME)).unwrap();

    let root = walk_up_for_marker(scratch.path(), None);
    assert_eq!(root.as_deref(), Some(scratch.path()));
  }

  #[test]
  fn marker_in_ancestor_is_found() {
    let scratch = TempDir::new().unwrap();
    fs::create_dir_all(scratch.path().join(PROJECT_DIR_NAME)).unwrap();
    let nested = scratch.path().join("a/b/c");
    fs::create_dir_all(&nested).unwrap();

    let root = walk_up_for_marker(&nested, None);
    assert_eq!(root.as_deref(), Some(scratch.path()));
  }

  #[test]
  fn walk_stops_at_home_boundary() {
    let scratch = TempDir::new().unwrap();
    // Marker sits above the fake home, so it must never be reached.
    fs::create_dir_all(scratch.path().join(PROJECT_DIR_NAME)).unwrap();
    let home = scratch.path().join("home/user");
    let nested = home.join("projects/app");
    fs::create_dir_all(&nested).unwrap();

    let root = walk_up_for_marker(&nested, Some(&home));
    assert!(root.is_none());
  }

  #[test]
  fn home_itself_is_still_checked() {
    let scratch = TempDir::new().unwrap();
    let home = scratch.path().join("home/user");
    fs::create_dir_all(home.join(PROJECT_DIR_NAME)).unwrap();
    let nested = home.join("projects/app");
    fs::create_dir_all(&nested).unwrap();

    let root = walk_up_for_marker(&nested, Some(&home));
    assert_eq!(root, Some(home));
  }

  #[test]
  fn walk_without_marker_reaches_root_and_gives_up() {
    let scratch = TempDir::new().unwrap();
    let root = walk_up_for_marker(scratch.path(), None);
    assert!(root.is_none());
  }

  #[test]
  fn true_and_false_coerce_to_booleans() {
    assert_eq!(
      parse_key_value("useAuth=true").unwrap(),
      ("useAuth".to_string(), Value::Bool(true))
    );
    assert_eq!(
      parse_key_value("useAuth=false").unwrap(),
      ("useAuth".to_string(), Value::Bool(false))
    );
  }

  #[test]
  fn everything_else_passes_through_as_string() {
    assert_eq!(
      parse_key_value("name=My App").unwrap(),
      ("name".to_string(), Value::String("My App".to_string()))
    );
    // Values containing '=' keep everything after the first one.
    assert_eq!(
      parse_key_value("expr=a=b").unwrap(),
      ("expr".to_string(), Value::String("a=b".to_string()))
    );
    // Not lowercase-true, so no coercion.
    assert_eq!(
      parse_key_value("flag=True").unwrap(),
      ("flag".to_string(), Value::String("True".to_string()))
    );
    // Empty value is a valid (empty) string.
    assert_eq!(
      parse_key_value("note=").unwrap(),
      ("note".to_string(), Value::String(String::new()))
    );
  }

  #[test]
  fn missing_equals_is_rejected() {
    let result = parse_key_value("justakey");
    assert!(matches!(result, Err(DrError::InvalidDataArg { .. })));
  }

  #[test]
  fn empty_key_is_rejected() {
    let result = parse_key_value("=value");
    assert!(matches!(result, Err(DrError::InvalidDataArg { .. })));
  }

  #[test]
  fn parse_data_args_fails_on_first_bad_argument() {
    let args = vec!["good=1".to_string(), "bad".to_string()];
    assert!(parse_data_args(&args).is_err());
  }
}
