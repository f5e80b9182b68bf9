// src/completion.rs
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, ValueEnum};
use clap_complete::Shell;
use log::info;

use crate::cli::{Cli, CompletionArgs};
use crate::error::DrError;

/// Binary name completions are generated for.
pub const BIN_NAME: &str = "dr";

/// The four shells completions are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellKind {
  Bash,
  Zsh,
  Fish,
  Powershell,
}

impl fmt::Display for ShellKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShellKind::Bash => write!(f, "bash"),
      ShellKind::Zsh => write!(f, "zsh"),
      ShellKind::Fish => write!(f, "fish"),
      ShellKind::Powershell => write!(f, "powershell"),
    }
  }
}

impl ShellKind {
  fn to_clap_shell(self) -> Shell {
    match self {
      ShellKind::Bash => Shell::Bash,
      ShellKind::Zsh => Shell::Zsh,
      ShellKind::Fish => Shell::Fish,
      ShellKind::Powershell => Shell::PowerShell,
    }
  }

  /// Detects the shell from the basename of $SHELL.
  fn detect() -> Option<Self> {
    let shell = std::env::var("SHELL").ok()?;
    Self::from_shell_var(&shell)
  }

  fn from_shell_var(value: &str) -> Option<Self> {
    let name = Path::new(value).file_name()?.to_str()?;
    match name {
      "bash" => Some(ShellKind::Bash),
      "zsh" => Some(ShellKind::Zsh),
      "fish" => Some(ShellKind::Fish),
      "pwsh" | "powershell" => Some(ShellKind::Powershell),
      _ => None,
    }
  }
}

pub fn run_completion(args: CompletionArgs) -> Result<(), DrError> {
  let kind = match args.shell {
    Some(kind) => kind,
    None => ShellKind::detect().ok_or(DrError::ShellDetection)?,
  };

  if args.install {
    let base_dirs = directories::BaseDirs::new().ok_or(DrError::NoHomeDir)?;
    let xdg_data_home = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from);
    let path = install_path(kind, base_dirs.home_dir(), xdg_data_home.as_deref());
    install_script(kind, &path)?;
    info!("Installed {} completions to {}", kind, path.display());
    println!("Installed {} completions to {}.", kind, path.display());
    print_post_install_hint(kind, &path);
  } else {
    let mut command = Cli::command();
    clap_complete::generate(
      kind.to_clap_shell(),
      &mut command,
      BIN_NAME,
      &mut io::stdout(),
    );
  }

  Ok(())
}

/// Standard per-shell completion script location.
fn install_path(kind: ShellKind, home: &Path, xdg_data_home: Option<&Path>) -> PathBuf {
  match kind {
    ShellKind::Bash => {
      let data_home = xdg_data_home
        .map(Path::to_path_buf)
        .unwrap_or_else(|| home.join(".local/share"));
      data_home.join("bash-completion/completions").join(BIN_NAME)
    }
    ShellKind::Zsh => home.join(".zfunc").join(format!("_{}", BIN_NAME)),
    ShellKind::Fish => home
      .join(".config/fish/completions")
      .join(format!("{}.fish", BIN_NAME)),
    ShellKind::Powershell => home
      .join(".config/powershell/completions")
      .join(format!("{}.ps1", BIN_NAME)),
  }
}

fn install_script(kind: ShellKind, path: &Path) -> Result<(), DrError> {
  let mut buffer: Vec<u8> = Vec::new();
  let mut command = Cli::command();
  clap_complete::generate(kind.to_clap_shell(), &mut command, BIN_NAME, &mut buffer);

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|source| DrError::CompletionInstall {
      path: path.to_path_buf(),
      source,
    })?;
  }
  fs::write(path, &buffer).map_err(|source| DrError::CompletionInstall {
    path: path.to_path_buf(),
    source,
  })
}

fn print_post_install_hint(kind: ShellKind, path: &Path) {
  match kind {
    ShellKind::Zsh => {
      println!("Add the directory to your fpath before compinit in ~/.zshrc:");
      println!(
        "  fpath=({} $fpath)",
        path.parent().map_or_else(|| ".".to_string(), |p| p.display().to_string())
      );
    }
    ShellKind::Powershell => {
      println!("Dot-source the script from your PowerShell profile:");
      println!("  . {}", path.display());
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn install_paths_follow_shell_conventions() {
    let home = Path::new("/home/ada");
    assert_eq!(
      install_path(ShellKind::Bash, home, None),
      PathBuf::from("/home/ada/.local/share/bash-completion/completions/dr")
    );
    assert_eq!(
      install_path(ShellKind::Zsh, home, None),
      PathBuf::from("/home/ada/.zfunc/_dr")
    );
    assert_eq!(
      install_path(ShellKind::Fish, home, None),
      PathBuf::from("/home/ada/.config/fish/completions/dr.fish")
    );
    assert_eq!(
      install_path(ShellKind::Powershell, home, None),
      PathBuf::from("/home/ada/.config/powershell/completions/dr.ps1")
    );
  }

  #[test]
  fn xdg_data_home_overrides_bash_location() {
    let home = Path::new("/home/ada");
    let xdg = Path::new("/custom/data");
    assert_eq!(
      install_path(ShellKind::Bash, home, Some(xdg)),
      PathBuf::from("/custom/data/bash-completion/completions/dr")
    );
  }

  #[test]
  fn shell_detection_from_shell_var() {
    assert_eq!(
      ShellKind::from_shell_var("/usr/bin/zsh"),
      Some(ShellKind::Zsh)
    );
    assert_eq!(ShellKind::from_shell_var("/bin/bash"), Some(ShellKind::Bash));
    assert_eq!(
      ShellKind::from_shell_var("/opt/homebrew/bin/fish"),
      Some(ShellKind::Fish)
    );
    assert_eq!(
      ShellKind::from_shell_var("/usr/local/bin/pwsh"),
      Some(ShellKind::Powershell)
    );
    assert_eq!(ShellKind::from_shell_var("/bin/dash"), None);
  }

  #[test]
  fn generated_script_mentions_the_binary() {
    let mut buffer: Vec<u8> = Vec::new();
    let mut command = Cli::command();
    clap_complete::generate(Shell::Bash, &mut command, BIN_NAME, &mut buffer);
    let script = String::from_utf8(buffer).unwrap();
    assert!(script.contains(BIN_NAME));
  }
}
