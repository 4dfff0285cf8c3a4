//! Definition pack loader: scans a directory and loads every pack in it.

use std::path::{Path, PathBuf};

use customs_registry::{BlockDefinition, CatalogBuilder, RegistryError};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::block::BlockFile;
use crate::error::PackError;
use crate::item::{ItemFile, PackItem};
use crate::manifest::PackManifest;

/// A fully loaded definition pack.
#[derive(Debug, Clone)]
pub struct LoadedPack {
    pub manifest: PackManifest,
    pub items: Vec<PackItem>,
    pub blocks: Vec<BlockDefinition>,
}

impl LoadedPack {
    /// Register blocks, then items. Stops at the first rejected definition.
    pub fn register(&self, builder: &mut CatalogBuilder) -> Result<(), RegistryError> {
        for block in &self.blocks {
            builder.register_block(block.clone())?;
        }
        for item in &self.items {
            builder.register_item(&item.identifier, &item.name, &item.descriptor, item.category)?;
        }
        Ok(())
    }
}

/// Load a single pack from a directory.
pub fn load_pack(path: &Path) -> Result<LoadedPack, PackError> {
    let manifest_path = path.join("manifest.json");
    let manifest = PackManifest::parse(&read(&manifest_path)?).map_err(|source| PackError::Json {
        path: manifest_path,
        source,
    })?;

    let items = load_and_parse::<ItemFile>(path, "items")?
        .iter()
        .map(ItemFile::extract)
        .collect::<Result<Vec<_>, _>>()?;
    let blocks = load_and_parse::<BlockFile>(path, "blocks")?
        .iter()
        .map(BlockFile::extract)
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Loaded pack '{}' v{} ({} items, {} blocks)",
        manifest.header.name,
        manifest.version_string(),
        items.len(),
        blocks.len()
    );
    Ok(LoadedPack {
        manifest,
        items,
        blocks,
    })
}

/// Load every pack under `packs_dir`, in lexical order of directory name.
///
/// A missing directory yields no packs. A pack that fails to load is logged
/// and skipped.
pub fn load_packs(packs_dir: &Path) -> Vec<LoadedPack> {
    let dirs = match sorted_entries(packs_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut packs = Vec::new();
    for path in dirs {
        if path.is_dir() && path.join("manifest.json").exists() {
            match load_pack(&path) {
                Ok(pack) => packs.push(pack),
                Err(e) => warn!("Failed to load pack at {}: {e}", path.display()),
            }
        }
    }

    if !packs.is_empty() {
        info!("Loaded {} pack(s) from {}", packs.len(), packs_dir.display());
    }
    packs
}

fn read(path: &Path) -> Result<String, PackError> {
    std::fs::read_to_string(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Parse every `.json` file of a pack subdirectory, in file name order.
fn load_and_parse<T: DeserializeOwned>(pack_root: &Path, subdir: &str) -> Result<Vec<T>, PackError> {
    let Ok(paths) = sorted_entries(&pack_root.join(subdir)) else {
        return Ok(Vec::new());
    };
    paths
        .into_iter()
        .filter(|path| path.extension().is_some_and(|e| e == "json"))
        .map(|path| {
            let content = read(&path)?;
            serde_json::from_str(&content).map_err(|source| PackError::Json { path, source })
        })
        .collect()
}
