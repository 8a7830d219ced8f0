use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use oracle_model::category::ResponseTable;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::Config;

fn config_file_path() -> PathBuf {
    data_dir().join("config.yaml")
}

pub fn data_dir() -> PathBuf {
    let project_dirs = directories::ProjectDirs::from("com", "pixel-oracle", "pixel-oracle")
        .expect("Cannot retrieve project dirs");
    project_dirs.data_dir().to_owned()
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_file_path())
}

fn load_config_from(path: &Path) -> Result<Config> {
    info!("Config file: {}", path.to_string_lossy());
    if !path.exists() {
        info!("Config file does not exist, creating.");
        store_yaml(path, &Config::default())?;
    }
    load_yaml(path)
}

/// Loads the response table, writing out the built-in one first if `path`
/// does not exist yet.
pub fn load_response_table(path: &Path) -> Result<ResponseTable> {
    info!("Responses file: {}", path.to_string_lossy());
    if !path.exists() {
        info!("Responses file does not exist, creating.");
        store_yaml(path, &ResponseTable::default())?;
    }
    let table: ResponseTable = load_yaml(path)?;
    let categories = table
        .categories()
        .map(|c| format!("{} ({})", c.id, c.responses.len()))
        .join(", ");
    info!("Loaded categories: {categories}");
    Ok(table)
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Cannot open {}", path.to_string_lossy()))?;
    serde_yaml::from_reader(file).with_context(|| format!("Cannot parse {}", path.to_string_lossy()))
}

fn store_yaml<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    ensure_dir_created(path)?;
    let file = File::create(path)?;
    Ok(serde_yaml::to_writer(file, data)?)
}

fn ensure_dir_created(path: &Path) -> Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", &dir.to_string_lossy()))?;
    }
    Ok(())
}
