use std::path::Path;

/// Name of the local config file looked up in the working directory
pub const CONFIG_FILE: &str = ".redux-demo.toml";

/// Load config file content from CWD first, then the global config directory
///
/// Searches for:
/// 1. `.redux-demo.toml` in the current working directory
/// 2. `config.toml` in the application config directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    if let Some(content) = read_if_present(Path::new(CONFIG_FILE)) {
        return Some(content);
    }

    match crate::paths::app_config_path() {
        Ok(global) => read_if_present(&global),
        Err(e) => {
            log::debug!("No global config location: {}", e);
            None
        }
    }
}

fn read_if_present(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(content)
        }
        Err(_) => None,
    }
}
