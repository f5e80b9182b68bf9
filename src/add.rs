// src/add.rs
use std::fs;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use heck::ToKebabCase;
use log::{debug, info};

use crate::answers;
use crate::cli::AddArgs;
use crate::config::PROJECT_DIR_NAME;
use crate::copier::{self, CopyRequest};
use crate::error::DrError;
use crate::utils;

pub fn run_add(args: AddArgs) -> Result<(), DrError> {
  info!("Running component add...");
  debug!("Args: {:?}", args);

  // --- 1. Resolve the project root ---
  let cwd = std::env::current_dir()?;
  let repo_root = match utils::find_repo_root(&cwd) {
    Some(root) => root,
    None => {
      // The first add bootstraps the project layout.
      info!(
        "No {} directory found; treating {} as a new project root.",
        PROJECT_DIR_NAME,
        cwd.display()
      );
      cwd.clone()
    }
  };

  // --- 2. Determine the template source ---
  let source = match args.source {
    Some(source) => source,
    None => Input::with_theme(&ColorfulTheme::default())
      .with_prompt("Template repository (git URL or local path)")
      .interact_text()?,
  };

  // --- 3. Derive the component name ---
  let name = match args.name {
    Some(name) => name,
    None => component_name_from_source(&source),
  };
  if name.is_empty() {
    return Err(DrError::InvalidComponentName(source));
  }
  info!("Adding component '{}' from {}", name, source);

  // --- 4. Guard against silently re-applying over an existing component ---
  if answers::answer_file_path(&repo_root, &name).is_file() {
    let reapply = Confirm::with_theme(&ColorfulTheme::default())
      .with_prompt(format!(
        "Component '{}' is already installed. Re-apply the template over it?",
        name
      ))
      .default(false)
      .interact()?;
    if !reapply {
      info!("Aborted by user; component '{}' left untouched.", name);
      return Ok(());
    }
  }

  // --- 5. Parse --data answers ---
  let data = utils::parse_data_args(&args.data)?;
  debug!("Parsed data answers: {:?}", data);

  // --- 6. Run the templating engine ---
  if !copier::check_engine_installed()? {
    return Err(DrError::EngineNotInstalled(copier::ENGINE_BIN.to_string()));
  }
  fs::create_dir_all(answers::answers_dir(&repo_root))?;
  let answers_file = answers::answer_file_rel(&name);
  copier::run_copy(
    &repo_root,
    &CopyRequest {
      source: &source,
      answers_file: &answers_file,
      data: &data,
      quiet: args.quiet,
    },
  )?;

  info!("Component '{}' applied from {}.", name, source);
  println!(
    "Added component '{}' (answers recorded in {}).",
    name,
    answers_file.display()
  );
  Ok(())
}

/// Component name from the last path segment of the source: `.git`
/// suffix stripped, kebab-cased.
pub(crate) fn component_name_from_source(source: &str) -> String {
  let trimmed = source.trim_end_matches('/');
  let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
  let last = last.strip_suffix(".git").unwrap_or(last);
  last.to_kebab_case()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn name_from_https_url() {
    assert_eq!(
      component_name_from_source("https://github.com/acme/web-frontend.git"),
      "web-frontend"
    );
  }

  #[test]
  fn name_from_ssh_url() {
    assert_eq!(
      component_name_from_source("git@github.com:acme/ApiBackend.git"),
      "api-backend"
    );
  }

  #[test]
  fn name_from_local_path_with_trailing_slash() {
    assert_eq!(
      component_name_from_source("../templates/data_pipeline/"),
      "data-pipeline"
    );
  }

  #[test]
  fn name_from_bare_word() {
    assert_eq!(component_name_from_source("Frontend"), "frontend");
  }

  #[test]
  fn unusable_source_yields_empty_name() {
    assert_eq!(component_name_from_source("///"), "");
  }
}
