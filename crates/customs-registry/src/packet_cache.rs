//! Rewrites the catalog packets of a login sequence.
//!
//! Every connection's outbound batches pass through
//! [`ConnectionPacketCache::on_packets_send`]. The cache injects custom item
//! and block data into the three packets that carry the catalog and builds
//! the expensive parts once per protocol.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use customs_proto::packets::{BlockPaletteEntry, Experiments, ItemRegistry};
use customs_proto::protocol::{needs_item_registry_packet, CURRENT_PROTOCOL};
use customs_proto::GamePacket;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::error::RegistryError;

/// Experiment that lets clients accept data-driven item components.
pub const DATA_DRIVEN_ITEMS: &str = "data_driven_items";

#[derive(Debug)]
pub struct ConnectionPacketCache {
    catalog: Arc<Catalog>,
    /// Newest active protocol, used for sessions that have not negotiated one.
    default_protocol: i32,
    experiments: Experiments,
    item_registry: OnceLock<Arc<ItemRegistry>>,
    block_palettes: RwLock<HashMap<i32, Arc<[BlockPaletteEntry]>>>,
}

impl ConnectionPacketCache {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let default_protocol = catalog
            .protocols()
            .last()
            .copied()
            .unwrap_or(CURRENT_PROTOCOL);
        Self {
            catalog,
            default_protocol,
            experiments: Experiments::new([(DATA_DRIVEN_ITEMS.to_string(), true)], true),
            item_registry: OnceLock::new(),
            block_palettes: RwLock::new(HashMap::new()),
        }
    }

    pub fn experiments(&self) -> &Experiments {
        &self.experiments
    }

    /// Item registry packet for clients that do not get one from the host.
    pub fn item_registry_packet(&self) -> Arc<ItemRegistry> {
        Arc::clone(self.item_registry.get_or_init(|| {
            let entries: Vec<_> = self
                .catalog
                .item_table_entries()
                .iter()
                .map(|entry| entry.to_registry_entry())
                .collect();
            debug!(entries = entries.len(), "Built item registry packet");
            Arc::new(ItemRegistry { entries })
        }))
    }

    /// Custom block definitions of one protocol, built on first request.
    pub fn block_palette(&self, protocol: i32) -> Result<Arc<[BlockPaletteEntry]>, RegistryError> {
        if let Some(cached) = self.block_palettes.read().get(&protocol) {
            return Ok(Arc::clone(cached));
        }
        let built: Arc<[BlockPaletteEntry]> = self.catalog.block_palette_entries(protocol)?.into();
        // A racing builder produced the same entries; keep whichever landed first.
        let mut palettes = self.block_palettes.write();
        let entry = palettes.entry(protocol).or_insert_with(|| {
            debug!(protocol, blocks = built.len(), "Built block palette entries");
            built
        });
        Ok(Arc::clone(entry))
    }

    /// Rewrite one outbound batch.
    ///
    /// `protocol` is `None` for sessions that have not negotiated a
    /// protocol yet; StartGame then uses the newest active protocol and no item
    /// registry packet is injected.
    pub fn on_packets_send(
        &self,
        protocol: Option<i32>,
        packets: Vec<GamePacket>,
    ) -> Result<Vec<GamePacket>, RegistryError> {
        let mut out = Vec::with_capacity(packets.len() + 1);
        for packet in packets {
            match packet {
                GamePacket::BiomeDefinitionList(biomes) => {
                    out.push(GamePacket::BiomeDefinitionList(biomes));
                    if let Some(protocol) = protocol.filter(|&p| needs_item_registry_packet(p)) {
                        trace!(protocol, "Injecting item registry packet");
                        out.push(GamePacket::ItemRegistry(self.item_registry_packet()));
                    }
                }
                GamePacket::StartGame(mut start_game) => {
                    let protocol = protocol.unwrap_or(self.default_protocol);
                    start_game.experiments = self.experiments.clone();
                    start_game.block_palette = self.block_palette(protocol)?.to_vec();
                    trace!(protocol, "Patched StartGame");
                    out.push(GamePacket::StartGame(start_game));
                }
                GamePacket::ResourcePackStack(mut stack) => {
                    stack.experiments = self.experiments.clone();
                    out.push(GamePacket::ResourcePackStack(stack));
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}
