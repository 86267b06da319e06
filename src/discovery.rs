use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::SetupError;

pub fn template_path(dir: &Path, domain: &str) -> Result<PathBuf, SetupError> {
    if !dir.is_dir() {
        return Err(SetupError::NotADirectory(dir.to_path_buf()));
    }
    let path = dir.join(format!("{}.pot", domain));
    if !path.is_file() {
        return Err(SetupError::MissingTemplate(path));
    }
    Ok(path)
}

pub fn po_path(dir: &Path, domain: &str, lang: &str) -> PathBuf {
    dir.join(format!("{}_{}.po", domain, lang))
}

pub fn find_po_files(dir: &Path, domain: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}_", domain);
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read directory: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let matches = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".po"))
            .is_some_and(|lang| !lang.is_empty());
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
