// src/task.rs
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use duct::cmd;
use log::{debug, info, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::PROJECT_DIR_NAME;
use crate::error::DrError;
use crate::utils;

/// File name declaring project tasks, discovered anywhere in the repo.
pub const TASK_FILE_NAME: &str = "dr-tasks.yaml";

/// Directories never descended into during discovery.
const SKIPPED_DIRS: [&str; 5] = [".git", "node_modules", ".venv", "venv", "target"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskDoc {
  tasks: BTreeMap<String, TaskDef>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TaskDef {
  #[serde(default)]
  pub description: Option<String>,
  pub command: String,
  /// Working directory, relative to the declaring file's directory.
  #[serde(default)]
  pub cwd: Option<PathBuf>,
  #[serde(default)]
  pub env: HashMap<String, String>,
}

/// A declared task plus where it was declared.
#[derive(Debug, Clone)]
pub struct Task {
  pub name: String,
  pub file: PathBuf,
  pub def: TaskDef,
}

pub fn run_list() -> Result<(), DrError> {
  let repo_root = require_repo_root()?;
  let tasks = discover_tasks(&repo_root)?;
  if tasks.is_empty() {
    println!(
      "No tasks declared. Create a {} file to declare some.",
      TASK_FILE_NAME
    );
    return Ok(());
  }

  println!("Declared tasks:");
  println!("{:<20} | {:<30} | {}", "Name", "Declared in", "Description");
  println!("{:-<20}-+-{:-<30}-+-{:-<40}", "", "", ""); // Separator
  for task in &tasks {
    let declared_in = task.file.strip_prefix(&repo_root).unwrap_or(&task.file);
    println!(
      "{:<20} | {:<30} | {}",
      task.name,
      declared_in.display(),
      task.def.description.as_deref().unwrap_or("")
    );
  }

  Ok(())
}

pub fn run_task(name: &str) -> Result<(), DrError> {
  let repo_root = require_repo_root()?;
  let tasks = discover_tasks(&repo_root)?;
  let task = tasks
    .into_iter()
    .find(|t| t.name == name)
    .ok_or_else(|| DrError::TaskNotFound(name.to_string()))?;
  execute_task(&task)
}

fn require_repo_root() -> Result<PathBuf, DrError> {
  let cwd = std::env::current_dir()?;
  utils::find_repo_root(&cwd).ok_or_else(|| DrError::RepoRootNotFound(PROJECT_DIR_NAME.to_string()))
}

/// Walks the repo for task files and merges their declarations.
/// Best-effort: unreadable or unparseable files are logged and skipped;
/// the first declaration of a duplicated name wins.
pub fn discover_tasks(repo_root: &Path) -> Result<Vec<Task>, DrError> {
  let mut tasks: Vec<Task> = Vec::new();

  let walker = WalkDir::new(repo_root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| {
      entry
        .file_name()
        .to_str()
        .map_or(true, |name| !SKIPPED_DIRS.contains(&name))
    });

  for entry_result in walker {
    let entry = match entry_result {
      Ok(e) => e,
      Err(e) => {
        warn!("Error accessing path during task discovery: {}", e);
        continue;
      }
    };
    if !entry.file_type().is_file() || entry.file_name().to_str() != Some(TASK_FILE_NAME) {
      continue;
    }

    let path = entry.path();
    let doc: TaskDoc = match read_task_file(path) {
      Ok(doc) => doc,
      Err(e) => {
        warn!("Skipping task file '{}': {}", path.display(), e);
        continue;
      }
    };
    debug!("Found {} task(s) in {}", doc.tasks.len(), path.display());

    for (name, def) in doc.tasks {
      if let Some(existing) = tasks.iter().find(|t| t.name == name) {
        warn!(
          "Task '{}' in {} is shadowed by the declaration in {}.",
          name,
          path.display(),
          existing.file.display()
        );
        continue;
      }
      tasks.push(Task {
        name,
        file: path.to_path_buf(),
        def,
      });
    }
  }

  tasks.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(tasks)
}

fn read_task_file(path: &Path) -> Result<TaskDoc, DrError> {
  let content = fs::read_to_string(path)?;
  Ok(serde_yaml::from_str(&content)?)
}

/// Runs one task's command line through the user's shell, streaming output.
pub fn execute_task(task: &Task) -> Result<(), DrError> {
  let base_dir = task
    .file
    .parent()
    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
  let run_dir = match &task.def.cwd {
    Some(rel) => base_dir.join(rel),
    None => base_dir,
  };
  let shell = utils::user_shell();
  info!(
    "Running task '{}' with {} -c `{}` in {}",
    task.name,
    shell,
    task.def.command,
    run_dir.display()
  );

  let mut expr = cmd!(shell, "-c", &task.def.command)
    .dir(&run_dir)
    .unchecked();
  for (key, value) in &task.def.env {
    expr = expr.env(key, value);
  }

  let output = expr.run()?;
  if !output.status.success() {
    return Err(DrError::TaskFailed {
      name: task.name.clone(),
      status: output.status,
    });
  }
  Ok(())
}
