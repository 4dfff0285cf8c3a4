use customs_proto::protocol::{is_supported_version, ACCEPTED_PROTOCOLS};
use customs_registry::type_id::{DEFAULT_FIRST_BLOCK_ID, DEFAULT_FIRST_ITEM_ID};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct CustomsConfig {
    #[serde(default)]
    pub protocols: ProtocolsSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub packs: PacksSection,
    #[serde(default)]
    pub ids: IdsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct ProtocolsSection {
    /// Protocol ids served at once. More than one enables skull aliasing.
    #[serde(default = "default_accepted")]
    pub accepted: Vec<i32>,
}

fn default_accepted() -> Vec<i32> {
    ACCEPTED_PROTOCOLS.to_vec()
}

impl Default for ProtocolsSection {
    fn default() -> Self {
        Self {
            accepted: default_accepted(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogSection {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    "catalog.json".into()
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PacksSection {
    #[serde(default = "default_packs_directory")]
    pub directory: String,
}

fn default_packs_directory() -> String {
    "packs".into()
}

impl Default for PacksSection {
    fn default() -> Self {
        Self {
            directory: default_packs_directory(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdsSection {
    #[serde(default = "default_first_block_id")]
    pub first_block_id: i32,
    #[serde(default = "default_first_item_id")]
    pub first_item_id: i32,
}

fn default_first_block_id() -> i32 {
    DEFAULT_FIRST_BLOCK_ID
}

fn default_first_item_id() -> i32 {
    DEFAULT_FIRST_ITEM_ID
}

impl Default for IdsSection {
    fn default() -> Self {
        Self {
            first_block_id: default_first_block_id(),
            first_item_id: default_first_item_id(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl CustomsConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.protocols.accepted.is_empty() {
            return Err("[protocols] accepted must list at least one protocol".into());
        }
        if let Some(p) = self
            .protocols
            .accepted
            .iter()
            .find(|&&p| !is_supported_version(p))
        {
            return Err(format!("[protocols] accepted lists unknown protocol {p}"));
        }
        Ok(())
    }
}
