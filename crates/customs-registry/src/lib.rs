//! Runtime registration of custom block and item types.
//!
//! Registration happens once at boot through [`CatalogBuilder`]. The
//! finished [`Catalog`] is immutable and feeds [`ConnectionPacketCache`],
//! which rewrites each connection's login packets.

pub mod block;
pub mod block_state;
pub mod catalog;
pub mod component;
pub mod dictionary;
pub mod error;
pub mod hash;
pub mod item;
pub mod packet_cache;
pub mod palette;
pub mod type_id;

pub use block::{BlockDefinition, BlockProperty, BlockType, BlockTypeRegistry};
pub use block_state::{BlockStateEntry, ProtocolBlockTable, StateLookup};
pub use catalog::{Catalog, CatalogBuilder};
pub use component::{CreativeCategory, ItemComponent, ItemDescriptor};
pub use dictionary::{ItemTypeDictionary, NetworkDictionaryPatcher, TypeDictionaries};
pub use error::RegistryError;
pub use item::{Item, ItemTypeEntry, ItemTypeRegistry};
pub use packet_cache::ConnectionPacketCache;
pub use palette::BlockStatePalette;
pub use type_id::{TypeIdAllocator, TypeNamespace};
