//! Configuration loading from deadcil.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Main configuration structure for deadcil.toml.
///
/// Every field has a default, so a partial file (or none at all) is
/// valid. The same structure is consumed programmatically through the
/// [`crate::session::Deadcil`] builder methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeadcilConfig {
    /// Type names used as analysis entry points.
    #[serde(default)]
    pub entry_points: Vec<String>,
    /// Embedded UI document names used as analysis entry points.
    /// Matched case-insensitively with normalized path separators.
    #[serde(default)]
    pub entry_point_bamls: Vec<String>,
    /// Type names excluded from the visibility downgrade.
    #[serde(default)]
    pub make_internal_exclusions: Vec<String>,
    /// Resource names never removed by the resource sweep.
    #[serde(default)]
    pub unused_resource_exclusions: Vec<String>,
    /// UI resource part names never removed from the document container.
    #[serde(default)]
    pub unused_baml_exclusions: Vec<String>,
    /// Namespaces whose custom attributes are stripped from every
    /// scanned owner instead of being marked used.
    #[serde(default)]
    pub remove_attribute_namespaces: Vec<String>,
    /// Remove resources whose name matches no known type. Off by
    /// default; unknown resources are kept.
    #[serde(default)]
    pub remove_unknown_resources: bool,
}

/// Loads configuration from deadcil.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadcilConfig>> {
    let path = root.join("deadcil.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid deadcil.toml")?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg: DeadcilConfig = toml::from_str(
            r#"
            entry_points = ["Acme.App", "Acme.UI.MainWindow"]
            entry_point_bamls = ["ui/mainwindow.baml"]
            make_internal_exclusions = ["Acme.PublicApi"]
            unused_resource_exclusions = ["Acme.Branding.Logo.png"]
            unused_baml_exclusions = ["themes/generic.baml"]
            remove_attribute_namespaces = ["Acme.Annotations"]
            remove_unknown_resources = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.entry_points.len(), 2);
        assert_eq!(cfg.entry_point_bamls, vec!["ui/mainwindow.baml"]);
        assert_eq!(cfg.make_internal_exclusions, vec!["Acme.PublicApi"]);
        assert!(cfg.remove_unknown_resources);
    }

    #[test]
    fn test_parse_empty_config() {
        let cfg: DeadcilConfig = toml::from_str("").unwrap();
        assert!(cfg.entry_points.is_empty());
        assert!(!cfg.remove_unknown_resources);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = std::env::temp_dir().join("deadcil_config_missing");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(load_config(&dir).unwrap().is_none());
    }
}
