use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;

pub fn change_directory(path: &Path) -> Result<()> {
    env::set_current_dir(path)
        .with_context(|| format!("Failed to change directory to {}", path.display()))?;
    Ok(())
}

pub fn get_current_directory() -> Result<std::path::PathBuf> {
    env::current_dir().context("Failed to get current directory")
}

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(())
}

pub fn remove_directory(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}
