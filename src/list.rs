// src/list.rs
use log::info;

use crate::answers;
use crate::config::PROJECT_DIR_NAME;
use crate::error::DrError;
use crate::utils;

pub fn run_list() -> Result<(), DrError> {
  let cwd = std::env::current_dir()?;
  let repo_root = utils::find_repo_root(&cwd)
    .ok_or_else(|| DrError::RepoRootNotFound(PROJECT_DIR_NAME.to_string()))?;
  info!("Listing components under {}", repo_root.display());

  let components = answers::scan_components(&repo_root)?;
  if components.is_empty() {
    println!("No components installed yet. Add one with `dr component add <source>`.");
    return Ok(());
  }

  println!("Installed components:");
  println!("{:<20} | {:<50} | {}", "Name", "Source", "Revision");
  println!("{:-<20}-+-{:-<50}-+-{:-<12}", "", "", ""); // Separator
  for component in &components {
    println!(
      "{:<20} | {:<50} | {}",
      component.name,
      component.src_path,
      component.commit.as_deref().unwrap_or("-")
    );
  }

  Ok(())
}
