//! Protocol versions this build can serve.
//!
//! Every accepted version has its own block-state ordering and item id
//! dictionary. Clients are pinned to one version at connect time.

/// Minecraft Bedrock 1.21.40.
pub const PROTOCOL_1_21_40: i32 = 748;
/// Minecraft Bedrock 1.21.50.
pub const PROTOCOL_1_21_50: i32 = 766;
/// Minecraft Bedrock 1.21.60. From this version on the vanilla handshake
/// carries the item registry itself.
pub const PROTOCOL_1_21_60: i32 = 776;
/// Minecraft Bedrock 1.21.70.
pub const PROTOCOL_1_21_70: i32 = 786;
/// Minecraft Bedrock 1.21.80.
pub const PROTOCOL_1_21_80: i32 = 800;

/// Newest protocol version. Used when a recipient does not report its own.
pub const CURRENT_PROTOCOL: i32 = PROTOCOL_1_21_80;

/// All protocol versions this build knows how to serve, oldest first.
pub const ACCEPTED_PROTOCOLS: [i32; 5] = [
    PROTOCOL_1_21_40,
    PROTOCOL_1_21_50,
    PROTOCOL_1_21_60,
    PROTOCOL_1_21_70,
    PROTOCOL_1_21_80,
];

/// Check whether a client protocol version is supported.
pub fn is_supported_version(v: i32) -> bool {
    ACCEPTED_PROTOCOLS.contains(&v)
}

/// Whether the custom item registry has to be sent by us after the biome
/// definitions (older clients only).
pub fn needs_item_registry_packet(v: i32) -> bool {
    v < PROTOCOL_1_21_60
}

/// Return the game version string for a protocol version.
pub fn game_version_for_protocol(v: i32) -> Option<&'static str> {
    match v {
        PROTOCOL_1_21_40 => Some("1.21.40"),
        PROTOCOL_1_21_50 => Some("1.21.50"),
        PROTOCOL_1_21_60 => Some("1.21.60"),
        PROTOCOL_1_21_70 => Some("1.21.70"),
        PROTOCOL_1_21_80 => Some("1.21.80"),
        _ => None,
    }
}
