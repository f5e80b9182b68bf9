// src/answers.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::config::PROJECT_DIR_NAME;
use crate::error::DrError;

/// Subdirectory of the project dir where the engine records answer files.
pub const ANSWERS_DIR_NAME: &str = "answers";

/// One applied component, reconstructed from its answer file.
#[derive(Debug, Clone)]
pub struct Component {
  pub name: String,
  pub path: PathBuf,
  pub src_path: String,
  pub commit: Option<String>,
}

/// The engine-owned fields of an answer file. Everything else in the file
/// is template answers and is not our business.
#[derive(Debug, Deserialize)]
struct AnswerDoc {
  #[serde(rename = "_src_path")]
  src_path: Option<String>,
  #[serde(rename = "_commit")]
  commit: Option<String>,
}

pub fn answers_dir(repo_root: &Path) -> PathBuf {
  repo_root.join(PROJECT_DIR_NAME).join(ANSWERS_DIR_NAME)
}

/// Absolute path of a component's answer file.
pub fn answer_file_path(repo_root: &Path, name: &str) -> PathBuf {
  answers_dir(repo_root).join(format!("{}.yaml", name))
}

/// Answer-file path relative to the repo root, the form the engine is
/// given on its command line.
pub fn answer_file_rel(name: &str) -> PathBuf {
  PathBuf::from(PROJECT_DIR_NAME)
    .join(ANSWERS_DIR_NAME)
    .join(format!("{}.yaml", name))
}

/// Scans the answers directory for installed components.
/// Best-effort aggregation: unreadable or unparseable files are logged
/// and skipped, and a missing directory yields an empty list.
pub fn scan_components(repo_root: &Path) -> Result<Vec<Component>, DrError> {
  let dir = answers_dir(repo_root);
  let mut components = Vec::new();
  if !dir.is_dir() {
    debug!("Answers directory {} does not exist.", dir.display());
    return Ok(components);
  }

  for entry_result in fs::read_dir(&dir)? {
    let entry = match entry_result {
      Ok(e) => e,
      Err(e) => {
        warn!("Failed to read entry in answers directory: {}", e);
        continue;
      }
    };

    let path = entry.path();
    let is_yaml = path
      .extension()
      .map_or(false, |ext| ext == "yaml" || ext == "yml");
    if !path.is_file() || !is_yaml {
      debug!("Skipping non-answer entry {}", path.display());
      continue;
    }

    match read_answer_file(&path) {
      Ok(Some((src_path, commit))) => {
        let name = path
          .file_stem()
          .map_or_else(|| "?".to_string(), |n| n.to_string_lossy().to_string());
        components.push(Component {
          name,
          path: path.clone(),
          src_path,
          commit,
        });
      }
      Ok(None) => {
        warn!(
          "Skipping '{}': no _src_path field, not an answer file.",
          path.display()
        );
      }
      Err(e) => {
        warn!(
          "Skipping '{}': could not read or parse: {}",
          path.display(),
          e
        );
      }
    }
  }

  components.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(components)
}

fn read_answer_file(path: &Path) -> Result<Option<(String, Option<String>)>, DrError> {
  let content = fs::read_to_string(path)?;
  let doc: AnswerDoc = serde_yaml::from_str(&content)?;
  Ok(doc.src_path.map(|src_path| (src_path, doc.commit)))
}
