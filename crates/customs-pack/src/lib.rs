//! Custom block and item definitions loaded from behavior-pack style JSON.
//!
//! A pack is a directory holding `manifest.json`, `items/*.json` and
//! `blocks/*.json`. Loading is deterministic: packs and files are visited in
//! lexical order, so registration order (and with it the palette order of
//! blocks whose names hash equal) is stable across restarts.

pub mod block;
pub mod error;
pub mod item;
pub mod loader;
pub mod manifest;

pub use error::PackError;
pub use item::PackItem;
pub use loader::{load_pack, load_packs, LoadedPack};
