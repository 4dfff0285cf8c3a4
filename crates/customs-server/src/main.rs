mod base_catalog;
mod config;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use base_catalog::BaseCatalog;
use bytes::Bytes;
use config::CustomsConfig;
use customs_pack::load_packs;
use customs_proto::batch::encode_batch;
use customs_proto::packets::{BiomeDefinitionList, ResourcePackStack, StartGame};
use customs_proto::protocol::game_version_for_protocol;
use customs_proto::GamePacket;
use customs_registry::{Catalog, CatalogBuilder, ConnectionPacketCache, TypeIdAllocator};
use tracing::{error, info};

/// Empty network NBT compound, standing in for the host's biome payload.
const EMPTY_BIOMES: &[u8] = &[0x0A, 0x00, 0x00];

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "customs.toml".into());
    let config = match CustomsConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "customs-server v{} serving protocols {:?}",
        env!("CARGO_PKG_VERSION"),
        config.protocols.accepted
    );

    if let Err(e) = run(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &CustomsConfig) -> Result<(), Box<dyn Error>> {
    let base = BaseCatalog::load(Path::new(&config.catalog.path))?;
    let catalog = build_catalog(config, base)?;
    let cache = ConnectionPacketCache::new(Arc::clone(&catalog));

    for protocol in catalog.protocols() {
        let packets = cache.on_packets_send(Some(protocol), handshake_batch(protocol))?;
        let ids: Vec<_> = packets.iter().map(GamePacket::id).collect();
        let batch = encode_batch(&packets);
        info!(
            protocol,
            packets = ?ids,
            bytes = batch.len(),
            "Handshake dry run"
        );
    }
    Ok(())
}

/// Load the base tables, register every pack and freeze the result.
fn build_catalog(config: &CustomsConfig, base: BaseCatalog) -> Result<Arc<Catalog>, Box<dyn Error>> {
    let accepted = &config.protocols.accepted;
    if let Some(max) = base.max_item_id(accepted) {
        if i32::from(max) >= config.ids.first_block_id {
            return Err(format!(
                "base catalog uses item id {max}, custom ids start at {}",
                config.ids.first_block_id
            )
            .into());
        }
    }

    let dictionaries = Arc::new(base.into_dictionaries(accepted)?);
    let allocator = TypeIdAllocator::new(config.ids.first_block_id, config.ids.first_item_id)?;
    let mut builder = CatalogBuilder::new(dictionaries, allocator)?;

    for pack in load_packs(Path::new(&config.packs.directory)) {
        pack.register(&mut builder)?;
    }
    Ok(Arc::new(builder.finish()?))
}

/// The three catalog-carrying packets of a login, as the host would send them.
fn handshake_batch(protocol: i32) -> Vec<GamePacket> {
    let game_version = game_version_for_protocol(protocol)
        .unwrap_or_default()
        .to_string();
    vec![
        GamePacket::ResourcePackStack(ResourcePackStack {
            game_version: game_version.clone(),
            ..Default::default()
        }),
        GamePacket::BiomeDefinitionList(BiomeDefinitionList::from_payload(
            Bytes::from_static(EMPTY_BIOMES),
        )),
        GamePacket::StartGame(Box::new(StartGame {
            game_version,
            ..Default::default()
        })),
    ]
}
