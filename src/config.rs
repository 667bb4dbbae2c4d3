use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SrConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// [display] section configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_tab_width")]
    pub tab_width: u8,
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    /// Width of each side of the split view, in characters
    #[serde(default = "default_column_width")]
    pub column_width: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_true() -> bool {
    true
}

fn default_tab_width() -> u8 {
    4
}

fn default_column_width() -> u16 {
    60
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tab_width: default_tab_width(),
            line_numbers: true,
            column_width: default_column_width(),
        }
    }
}

/// Per-repo config file name, looked up in the working directory
pub const LOCAL_CONFIG: &str = ".sr-config.toml";

/// Load config by merging global defaults with per-repo overrides.
/// Priority: per-repo `.sr-config.toml` > global `~/.config/split-review/config.toml` > built-in defaults.
pub fn load_config(repo_root: &Path) -> SrConfig {
    let global_path = dirs::config_dir().map(|d| d.join("split-review/config.toml"));
    load_config_from(global_path.as_deref(), &repo_root.join(LOCAL_CONFIG))
}

/// Merging is deep: individual fields within sections (e.g. `[display]`) override independently.
pub fn load_config_from(global_path: Option<&Path>, local_path: &Path) -> SrConfig {
    let global_table = global_path.and_then(read_table);
    let local_table = read_table(local_path);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return SrConfig::default(),
    };

    match toml::Value::Table(merged).try_into() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Invalid config values, using defaults: {}", e);
            SrConfig::default()
        }
    }
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(table) => {
            log::debug!("loaded config from {}", path.display());
            Some(table)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Where the global config lives, for messages
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("split-review/config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_when_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(None, &dir.path().join(LOCAL_CONFIG));
        assert_eq!(config, SrConfig::default());
        assert_eq!(config.display.tab_width, 4);
        assert!(config.display.line_numbers);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn local_overrides_global_field_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join(LOCAL_CONFIG);
        fs::write(&global, "[display]\ntab_width = 8\nline_numbers = false\n").unwrap();
        fs::write(&local, "[display]\ntab_width = 2\n\n[output]\nformat = \"json\"\n").unwrap();

        let config = load_config_from(Some(&global), &local);
        assert_eq!(config.display.tab_width, 2);
        assert!(!config.display.line_numbers);
        assert_eq!(config.display.column_width, 60);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn unparsable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join(LOCAL_CONFIG);
        fs::write(&global, "[display]\ncolumn_width = 100\n").unwrap();
        fs::write(&local, "this is = = not toml").unwrap();

        let config = load_config_from(Some(&global), &local);
        assert_eq!(config.display.column_width, 100);
    }

    #[test]
    fn wrong_value_types_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join(LOCAL_CONFIG);
        fs::write(&local, "[display]\ntab_width = \"wide\"\n").unwrap();

        assert_eq!(load_config_from(None, &local), SrConfig::default());
    }

    #[test]
    fn load_config_reads_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG), "[display]\ncolumn_width = 33\n").unwrap();
        // Global config may exist on the host; only the local override is asserted
        assert_eq!(load_config(dir.path()).display.column_width, 33);
    }
}
