//! Wire schema for peer synchronization.
//!
//! One tagged variant per message kind, so "which fields are valid" is a
//! compile-time property instead of a runtime convention. The transport is
//! assumed to deliver whole messages in order and without loss once a
//! connection is established.

use serde::{Deserialize, Serialize};

use crate::board::piece::Color;
use crate::game::state::StateSnapshot;
use crate::move_generation::chess_move::Move;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NetMessage {
    /// Connection greeting; optionally names the device for display.
    #[serde(rename_all = "camelCase")]
    Hello { device_name: Option<String> },
    /// Sent by the lexicographically smaller peer, claiming `color`.
    ProposeRole { color: Color },
    /// Reply to `proposeRole`; carries the color the accepting peer takes.
    AcceptRole { color: Color },
    /// White offers to exchange colors before the first move; `color` is the
    /// color the sender takes after the swap.
    ColorSwap { color: Color },
    /// A move the sender just applied locally.
    Move {
        #[serde(rename = "move")]
        mv: Move,
    },
    /// Forced reset: both sides replace state with a fresh game.
    Reset,
    RequestReset,
    AcceptReset,
    DeclineReset,
    /// Divergence detected; please send a full snapshot.
    SyncRequest,
    /// Full snapshot, captured lists relative to the sender.
    SyncState(StateSnapshot),
}

impl NetMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::NetMessage;
    use crate::board::piece::Color;
    use crate::board::square::Square;
    use crate::game::state::GameState;
    use crate::move_generation::chess_move::Move;

    #[test]
    fn kind_tags_match_the_wire_contract() {
        let json = serde_json::to_string(&NetMessage::ProposeRole {
            color: Color::White,
        })
        .expect("message should serialize");
        assert!(json.contains("\"kind\":\"proposeRole\""));
        assert!(json.contains("\"color\":\"white\""));

        let json = serde_json::to_string(&NetMessage::SyncRequest)
            .expect("message should serialize");
        assert_eq!(json, "{\"kind\":\"syncRequest\"}");

        let hello = serde_json::to_string(&NetMessage::Hello {
            device_name: Some("Kitchen iPad".to_owned()),
        })
        .expect("message should serialize");
        assert!(hello.contains("\"deviceName\""));
    }

    #[test]
    fn move_message_round_trips() {
        let from = Square::from_algebraic("e2").expect("square should parse");
        let to = Square::from_algebraic("e4").expect("square should parse");
        let msg = NetMessage::Move {
            mv: Move::new(from, to),
        };
        let bytes = msg.to_bytes().expect("message should encode");
        assert_eq!(
            NetMessage::from_bytes(&bytes).expect("message should decode"),
            msg
        );
    }

    #[test]
    fn sync_state_round_trips_with_snapshot_payload() {
        let snapshot = GameState::new_game().snapshot(Color::White);
        let msg = NetMessage::SyncState(snapshot.clone());
        let bytes = msg.to_bytes().expect("message should encode");
        let decoded = NetMessage::from_bytes(&bytes).expect("message should decode");
        assert_eq!(decoded, NetMessage::SyncState(snapshot));
    }
}
