//! The host's vanilla type tables, loaded from JSON.
//!
//! ```json
//! {
//!   "800": {
//!     "blocks": [{ "name": "minecraft:stone", "states": {}, "meta": 0 }],
//!     "items": [{ "name": "minecraft:stick", "id": 320 }]
//!   }
//! }
//! ```
//!
//! Block states are listed in palette order. Item `component_nbt` is
//! base64-encoded network NBT.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use customs_nbt::{read_nbt_network, CacheableNbt, NbtCompound, NbtError};
use customs_pack::block::json_to_nbt;
use customs_registry::{
    BlockStateEntry, ItemTypeDictionary, ItemTypeEntry, ProtocolBlockTable, RegistryError,
    TypeDictionaries,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid base catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base catalog has no tables for protocol {0}")]
    MissingProtocol(i32),

    #[error("block {name}: state {state} cannot be expressed as NBT")]
    InvalidState { name: String, state: String },

    #[error("item {name}: component_nbt is not base64")]
    InvalidBase64 {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("item {name}: component_nbt is not network NBT")]
    InvalidNbt {
        name: String,
        #[source]
        source: NbtError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct BaseCatalog {
    pub protocols: BTreeMap<i32, ProtocolCatalog>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProtocolCatalog {
    #[serde(default)]
    pub blocks: Vec<BaseBlockState>,
    #[serde(default)]
    pub items: Vec<BaseItem>,
}

#[derive(Debug, Deserialize)]
pub struct BaseBlockState {
    pub name: String,
    #[serde(default)]
    pub states: BTreeMap<String, Value>,
    #[serde(default)]
    pub meta: i32,
    #[serde(default)]
    pub previous_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BaseItem {
    pub name: String,
    pub id: i16,
    #[serde(default)]
    pub component_based: bool,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub component_nbt: Option<String>,
}

impl BaseCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Highest item id any accepted protocol already uses.
    pub fn max_item_id(&self, accepted: &[i32]) -> Option<i16> {
        accepted
            .iter()
            .filter_map(|p| self.protocols.get(p))
            .flat_map(|p| p.items.iter().map(|item| item.id))
            .max()
    }

    /// Build the live dictionaries for every accepted protocol.
    pub fn into_dictionaries(mut self, accepted: &[i32]) -> Result<TypeDictionaries, CatalogError> {
        let mut dictionaries = TypeDictionaries::new();
        for &protocol in accepted {
            let catalog = self
                .protocols
                .remove(&protocol)
                .ok_or(CatalogError::MissingProtocol(protocol))?;

            let states = catalog
                .blocks
                .into_iter()
                .map(BaseBlockState::into_entry)
                .collect::<Result<Vec<_>, _>>()?;
            let table = ProtocolBlockTable::from_states(states)?;

            let items = catalog
                .items
                .into_iter()
                .map(|item| item.into_entry().map(Arc::new))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(protocol, states = table.len(), items = items.len(), "Loaded base tables");

            dictionaries.insert_protocol(protocol, table, ItemTypeDictionary::new(items));
        }
        info!(protocols = accepted.len(), "Base catalog loaded");
        Ok(dictionaries)
    }
}

impl BaseBlockState {
    fn into_entry(self) -> Result<BlockStateEntry, CatalogError> {
        let mut properties = NbtCompound::new();
        for (state, value) in self.states {
            let tag = json_to_nbt(&value).ok_or_else(|| CatalogError::InvalidState {
                name: self.name.clone(),
                state: state.clone(),
            })?;
            properties.insert(state, tag);
        }
        let entry = BlockStateEntry::new(self.name, properties, self.meta);
        Ok(match self.previous_name {
            Some(previous) => entry.with_previous_name(previous),
            None => entry,
        })
    }
}

impl BaseItem {
    fn into_entry(self) -> Result<ItemTypeEntry, CatalogError> {
        let components = match &self.component_nbt {
            None => CacheableNbt::default(),
            Some(encoded) => {
                let raw = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|source| CatalogError::InvalidBase64 {
                        name: self.name.clone(),
                        source,
                    })?;
                let root = read_nbt_network(&mut raw.as_slice()).map_err(|source| {
                    CatalogError::InvalidNbt {
                        name: self.name.clone(),
                        source,
                    }
                })?;
                CacheableNbt::new(root.compound)
            }
        };
        Ok(ItemTypeEntry::new(
            self.name,
            self.id,
            self.component_based,
            self.version,
            components,
        ))
    }
}
