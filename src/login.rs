// src/login.rs
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::callback::CallbackServer;
use crate::config;
use crate::error::DrError;
use crate::utils;

/// Fixed loopback port the identity provider redirects back to.
pub const CALLBACK_PORT: u16 = 51164;

/// Identity-provider page that issues CLI keys.
const DEVELOPER_TOOLS_PATH: &str = "/account/developer-tools?cliRedirect=true";

pub fn run_login(explicit_config: Option<&Path>) -> Result<(), DrError> {
  let cwd = std::env::current_dir()?;
  let mut settings = config::load_settings(explicit_config, &cwd)?;
  let url = format!(
    "{}{}",
    settings.endpoint.trim_end_matches('/'),
    DEVELOPER_TOOLS_PATH
  );

  // Bind before opening the browser so the redirect always has a listener.
  let server = CallbackServer::bind(CALLBACK_PORT)?;

  println!("Opening your browser to complete sign-in:");
  println!("  {}", url);
  if let Err(e) = utils::open_browser(&url) {
    warn!("Could not open a browser automatically: {}", e);
    println!("Open the URL above manually to continue.");
  }

  let spinner = ProgressBar::new_spinner();
  spinner.set_style(
    ProgressStyle::default_spinner()
      .template("{spinner:.green} {msg}")
      .expect("Failed to set spinner style"), // Panic if template is invalid
  );
  spinner.set_message("Waiting for the browser sign-in to finish...");
  spinner.enable_steady_tick(Duration::from_millis(120));

  let key = match server.wait_for_key() {
    Ok(key) => {
      spinner.finish_with_message("Received API key.");
      key
    }
    Err(e) => {
      spinner.finish_and_clear();
      return Err(e);
    }
  };

  settings.token = Some(key);
  let path = config::save_settings(&settings, explicit_config)?;
  info!("Stored API key in {}", path.display());
  println!("Signed in. API key saved to {}.", path.display());
  Ok(())
}
