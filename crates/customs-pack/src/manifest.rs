//! Definition pack manifest.json parsing.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PackManifest {
    /// Can be an integer (2) or a string ("2").
    pub format_version: serde_json::Value,
    pub header: PackHeader,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackHeader {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub uuid: String,
    /// `[major, minor, patch]`.
    pub version: Vec<u32>,
}

impl PackManifest {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Version as "1.0.0".
    pub fn version_string(&self) -> String {
        self.header
            .version
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest() {
        let json = r#"{
            "format_version": 2,
            "header": {
                "name": "Gems",
                "uuid": "9a1c3c4e-0000-4000-8000-000000000001",
                "version": [1, 2, 0]
            }
        }"#;
        let manifest = PackManifest::parse(json).unwrap();
        assert_eq!(manifest.header.name, "Gems");
        assert_eq!(manifest.version_string(), "1.2.0");
        assert!(manifest.header.description.is_empty());
    }

    #[test]
    fn missing_header_is_an_error() {
        assert!(PackManifest::parse(r#"{"format_version": 2}"#).is_err());
    }
}
