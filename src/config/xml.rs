//! XML configuration support.
//! - Loads tunables from config.xml (quick_xml + serde).
//!
//! Notes:
//! - Unknown XML fields fail the load so misconfigurations surface early.
//! - Values are whitespace-trimmed; empty elements count as unset.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::{resolve_config_path, ConfigLocation};
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    concurrency: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    follow_symlinks: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    log_level: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    fsync: Option<String>,
}

// Trim surrounding whitespace; an empty element is treated as absent.
fn de_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn parse_bool(field: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => bail!("<{field}> must be true or false, got '{raw}'"),
    }
}

// Map XmlConfig onto an existing Config; fields left out keep their current value.
fn apply_xml(parsed: XmlConfig, cfg: &mut Config) -> Result<()> {
    if let Some(raw) = parsed.concurrency.as_deref() {
        cfg.concurrency = raw
            .parse::<usize>()
            .with_context(|| format!("<concurrency> must be a non-negative integer, got '{raw}'"))?;
    }
    if let Some(raw) = parsed.follow_symlinks.as_deref() {
        cfg.follow_symlinks = parse_bool("follow_symlinks", raw)?;
    }
    if let Some(raw) = parsed.log_level.as_deref() {
        cfg.log_level = raw
            .parse::<LogLevel>()
            .map_err(anyhow::Error::msg)
            .context("<log_level> must be quiet, normal, info or debug")?;
    }
    if let Some(raw) = parsed.log_file.as_deref() {
        cfg.log_file = Some(PathBuf::from(raw));
    }
    if let Some(raw) = parsed.fsync.as_deref() {
        cfg.fsync = parse_bool("fsync", raw)?;
    }
    Ok(())
}

/// Load a Config from a specific XML file path, starting from defaults.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    let mut cfg = Config::default();
    apply_xml(parsed, &mut cfg).with_context(|| format!("invalid value in '{}'", path.display()))?;
    Ok(cfg)
}

/// Resolve the config location and load it.
/// Returns defaults when the default location has no file; explicit locations must exist.
pub fn load_config(flag: Option<&Path>) -> Result<(Config, ConfigLocation)> {
    let location = resolve_config_path(flag);
    let Some(path) = location.path() else {
        debug!("no config directory available; using built-in defaults");
        return Ok((Config::default(), location));
    };
    if !path.exists() {
        if location.is_explicit() {
            bail!("config file not found: {}", path.display());
        }
        debug!(path = %path.display(), "no config file; using built-in defaults");
        return Ok((Config::default(), location));
    }
    let cfg = load_config_from_xml_path(path)?;
    Ok((cfg, location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, body: &str) -> PathBuf {
        let p = dir.join("config.xml");
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn loads_all_fields_with_whitespace() {
        let td = tempdir().unwrap();
        let p = write(
            td.path(),
            "<config>\n  <concurrency> 3 </concurrency>\n  <follow_symlinks>true</follow_symlinks>\n  <log_level> Debug </log_level>\n  <log_file> /tmp/bc.log </log_file>\n  <fsync>yes</fsync>\n</config>\n",
        );
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert_eq!(cfg.concurrency, 3);
        assert!(cfg.follow_symlinks);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/bc.log")));
        assert!(cfg.fsync);
    }

    #[test]
    fn missing_fields_keep_defaults() {
        let td = tempdir().unwrap();
        let p = write(td.path(), "<config><fsync>false</fsync><log_file></log_file></config>");
        let cfg = load_config_from_xml_path(&p).unwrap();
        let defaults = Config::default();
        assert_eq!(cfg, defaults);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let td = tempdir().unwrap();
        let p = write(td.path(), "<config><download_base>/x</download_base></config>");
        assert!(load_config_from_xml_path(&p).is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        let td = tempdir().unwrap();
        let p = write(td.path(), "<config><concurrency>many</concurrency></config>");
        assert!(load_config_from_xml_path(&p).is_err());
        let p = write(td.path(), "<config><log_level>loud</log_level></config>");
        assert!(load_config_from_xml_path(&p).is_err());
        let p = write(td.path(), "<config><fsync>maybe</fsync></config>");
        assert!(load_config_from_xml_path(&p).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let td = tempdir().unwrap();
        let err = load_config(Some(&td.path().join("nope.xml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
