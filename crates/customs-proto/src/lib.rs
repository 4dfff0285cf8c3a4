//! Bedrock wire types and the handful of outbound packets the custom type
//! catalog has to produce or rewrite.

pub mod batch;
pub mod codec;
pub mod error;
pub mod packets;
pub mod protocol;
pub mod types;

pub use error::ProtoError;
pub use packets::GamePacket;
