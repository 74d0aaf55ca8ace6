use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a deal file and deserialise it; `.yaml`/`.yml` are read as YAML,
/// everything else as JSON.
pub fn read_structured<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let is_yaml = matches!(
        canonical.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let value: T = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

/// Contents of a file that may not exist yet; `None` when it is absent.
pub fn read_optional(path: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let p = absolute(path)?;
    if !p.exists() {
        return Ok(None);
    }
    if !p.is_file() {
        return Err(format!("Not a file: {}", p.display()).into());
    }
    let contents = fs::read_to_string(&p)
        .map_err(|e| format!("Failed to read '{}': {}", p.display(), e))?;
    Ok(Some(contents))
}

/// Replace a file's contents, creating it if needed.
pub fn write_string(path: &str, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    let p = absolute(path)?;
    fs::write(&p, contents).map_err(|e| format!("Failed to write '{}': {}", p.display(), e))?;
    Ok(())
}

fn absolute(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if p.is_absolute() {
        Ok(p.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(p))
    }
}

/// Resolve and validate the path of an input file that must exist.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let canonical = absolute(path)?;

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
