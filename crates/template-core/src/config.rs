use crate::error::TemplateError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location scanned when no `xmlLocations` are configured.
pub const DEFAULT_XML_LOCATION: &str = "conditions";

/// Where condition documents live and how they are resolved.
///
/// Deserializes from camelCase JSON; every key is optional:
///
/// ```json
/// { "debug": false, "xmlLocations": ["conditions"], "handlerLocations": [] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Re-read documents from their source on every lookup instead of
    /// serving the index built at load time.
    #[serde(default)]
    pub debug: bool,

    /// Directories or files scanned for `.xml` condition documents.
    #[serde(default = "default_xml_locations")]
    pub xml_locations: Vec<String>,

    /// Module paths scanned for custom tag handlers. Recorded for callers;
    /// nothing in this crate reads it.
    #[serde(default)]
    pub handler_locations: Vec<String>,
}

fn default_xml_locations() -> Vec<String> {
    vec![DEFAULT_XML_LOCATION.to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            xml_locations: default_xml_locations(),
            handler_locations: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_xml_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.xml_locations = locations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_handler_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handler_locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, TemplateError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TemplateError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TemplateError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.xml_locations.is_empty() {
            return Err(TemplateError::InvalidConfig(
                "xmlLocations must name at least one location".to_string(),
            ));
        }
        if self.xml_locations.iter().any(|l| l.trim().is_empty()) {
            return Err(TemplateError::InvalidConfig(
                "xmlLocations contains a blank entry".to_string(),
            ));
        }
        if self.handler_locations.iter().any(|l| l.trim().is_empty()) {
            return Err(TemplateError::InvalidConfig(
                "handlerLocations contains a blank entry".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.debug);
        assert_eq!(config.xml_locations, vec!["conditions".to_string()]);
    }

    #[test]
    fn camel_case_keys() {
        let config = Config::from_json_str(
            r#"{ "debug": true, "xmlLocations": ["a", "b/c.xml"], "handlerLocations": ["x::y"] }"#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.xml_locations, vec!["a", "b/c.xml"]);
        assert_eq!(config.handler_locations, vec!["x::y"]);
    }

    #[test]
    fn rejects_empty_or_blank_locations() {
        for json in [
            r#"{ "xmlLocations": [] }"#,
            r#"{ "xmlLocations": ["ok", " "] }"#,
            r#"{ "handlerLocations": [""] }"#,
            r#"{ "debug": "yes" }"#,
        ] {
            assert!(
                matches!(Config::from_json_str(json), Err(TemplateError::InvalidConfig(_))),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn builder_methods() {
        let config = Config::new()
            .with_debug(true)
            .with_xml_locations(["one", "two"])
            .with_handler_locations(Vec::<String>::new());
        assert!(config.debug);
        assert_eq!(config.xml_locations.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clause.json");
        std::fs::write(&path, r#"{ "debug": true }"#).unwrap();
        assert!(Config::from_path(&path).unwrap().debug);
        assert!(Config::from_path(dir.path().join("missing.json")).is_err());
    }
}
