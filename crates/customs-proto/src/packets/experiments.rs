//! Experiment toggles shared by StartGame and ResourcePackStack.
//!
//! Both handshake packets must carry the same set, otherwise the client
//! rejects the handshake.

use bytes::BufMut;

use crate::codec::{self, ProtoEncode};

/// A single experiment toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    pub name: String,
    pub enabled: bool,
}

/// The full experiment set attached to a handshake packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Experiments {
    pub entries: Vec<Experiment>,
    /// Whether any experiment was toggled on this world before.
    pub previously_toggled: bool,
}

impl Experiments {
    pub fn new(entries: impl IntoIterator<Item = (String, bool)>, previously_toggled: bool) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, enabled)| Experiment { name, enabled })
                .collect(),
            previously_toggled,
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name && e.enabled)
    }
}

impl ProtoEncode for Experiments {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        // Count is u32_le, not VarUInt32.
        buf.put_u32_le(self.entries.len() as u32);
        for exp in &self.entries {
            codec::write_string(buf, &exp.name);
            codec::write_bool(buf, exp.enabled);
        }
        codec::write_bool(buf, self.previously_toggled);
    }
}
