// src/update.rs
use dialoguer::{theme::ColorfulTheme, Select};
use log::{debug, info};

use crate::answers::{self, Component};
use crate::cli::UpdateArgs;
use crate::config::PROJECT_DIR_NAME;
use crate::copier;
use crate::error::DrError;
use crate::utils;

pub fn run_update(args: UpdateArgs) -> Result<(), DrError> {
  info!("Running component update...");
  debug!("Args: {:?}", args);

  let cwd = std::env::current_dir()?;
  let repo_root = utils::find_repo_root(&cwd)
    .ok_or_else(|| DrError::RepoRootNotFound(PROJECT_DIR_NAME.to_string()))?;

  let components = answers::scan_components(&repo_root)?;
  if components.is_empty() {
    println!("No components installed yet. Add one with `dr component add <source>`.");
    return Ok(());
  }

  // --- Choose what to update ---
  let selected: Vec<Component> = if args.all {
    components
  } else if let Some(name) = &args.name {
    match components.into_iter().find(|c| &c.name == name) {
      Some(component) => vec![component],
      None => return Err(DrError::ComponentNotFound(name.clone())),
    }
  } else {
    let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
      .with_prompt("Select a component to update")
      .items(&names)
      .default(0)
      .interact()?;
    vec![components.into_iter().nth(selection).unwrap()] // Should always succeed
  };

  if !copier::check_engine_installed()? {
    return Err(DrError::EngineNotInstalled(copier::ENGINE_BIN.to_string()));
  }

  let total = selected.len();
  for (i, component) in selected.iter().enumerate() {
    info!(
      "[{}/{}] Updating component '{}' from {}...",
      i + 1,
      total,
      component.name,
      component.src_path
    );
    let answers_file = answers::answer_file_rel(&component.name);
    copier::run_update(&repo_root, &answers_file, args.skip_answered, args.quiet)?;
    println!("Updated component '{}'.", component.name);
  }

  Ok(())
}
