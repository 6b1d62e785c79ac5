//! Peer session state machine: pairing, move propagation, reset negotiation,
//! and full-state resynchronization between two engines with no server.
//!
//! The session owns the engine and is the single logical mutator: inbound
//! messages and local move attempts are both serialized through `&mut self`,
//! so a local and a remote move can never be applied against the same
//! pre-move state. Callers that span threads wrap the session in a mutex.
//! Handlers perform no I/O; they return the outbound messages for the
//! transport to deliver. The transport must expose the remote peer's stable
//! identifier (via [`PeerSession::channel_established`]) before it delivers
//! any messages.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::board::piece::Color;
use crate::errors::SyncError;
use crate::game::engine::GameEngine;
use crate::move_generation::chess_move::Move;
use crate::sync::message::NetMessage;

/// Pairing progress. Role negotiation is deterministic and collision-free:
/// the lexicographically smaller peer identifier proposes and claims white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingPhase {
    Disconnected,
    HelloExchanged,
    RoleNegotiating,
    RoleAssigned,
    Playing,
}

#[derive(Debug)]
pub struct PeerSession {
    engine: GameEngine,
    local_id: String,
    device_name: Option<String>,
    remote_id: Option<String>,
    remote_device_name: Option<String>,
    phase: PairingPhase,
    local_color: Option<Color>,
    hello_sent: bool,
    hello_received: bool,
    reset_requested_by_us: bool,
    reset_requested_by_peer: bool,
    awaiting_sync: bool,
}

impl PeerSession {
    pub fn new(local_id: impl Into<String>) -> Self {
        Self {
            engine: GameEngine::new(),
            local_id: local_id.into(),
            device_name: None,
            remote_id: None,
            remote_device_name: None,
            phase: PairingPhase::Disconnected,
            local_color: None,
            hello_sent: false,
            hello_received: false,
            reset_requested_by_us: false,
            reset_requested_by_peer: false,
            awaiting_sync: false,
        }
    }

    /// Random identifier for transports that do not supply one.
    pub fn generate_peer_id() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        format!("peer-{suffix}")
    }

    pub fn set_device_name(&mut self, name: impl Into<String>) {
        self.device_name = Some(name.into());
    }

    #[inline]
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    #[inline]
    pub fn phase(&self) -> PairingPhase {
        self.phase
    }

    #[inline]
    pub fn local_color(&self) -> Option<Color> {
        self.local_color
    }

    #[inline]
    pub fn remote_device_name(&self) -> Option<&str> {
        self.remote_device_name.as_deref()
    }

    /// True once roles are assigned and game traffic may flow.
    #[inline]
    pub fn is_paired(&self) -> bool {
        matches!(
            self.phase,
            PairingPhase::RoleAssigned | PairingPhase::Playing
        )
    }

    /// A reset request from the peer is waiting for a local answer
    /// (see [`PeerSession::respond_to_reset_request`]).
    #[inline]
    pub fn reset_pending_from_peer(&self) -> bool {
        self.reset_requested_by_peer
    }

    /// The transport established an ordered, reliable channel and identified
    /// the remote peer. Starts the hello exchange.
    pub fn channel_established(&mut self, remote_id: impl Into<String>) -> Vec<NetMessage> {
        let remote_id = remote_id.into();
        info!(local = %self.local_id, remote = %remote_id, "channel established");
        self.remote_id = Some(remote_id);

        let mut out = vec![NetMessage::Hello {
            device_name: self.device_name.clone(),
        }];
        self.hello_sent = true;
        if self.hello_received {
            self.advance_past_hello(&mut out);
        }
        out
    }

    /// Connection dropped: pairing restarts from scratch on the next
    /// channel, local game state is preserved and resumable.
    pub fn connection_lost(&mut self) {
        info!(local = %self.local_id, "connection lost; pairing state cleared");
        self.remote_id = None;
        self.remote_device_name = None;
        self.phase = PairingPhase::Disconnected;
        self.local_color = None;
        self.hello_sent = false;
        self.hello_received = false;
        self.reset_requested_by_us = false;
        self.reset_requested_by_peer = false;
        self.awaiting_sync = false;
    }

    /// Attempt a local (UI-originated) move and, on success, produce the
    /// `move` message for the peer.
    pub fn submit_local_move(&mut self, mv: Move) -> Result<Vec<NetMessage>, SyncError> {
        if !self.is_paired() {
            return Err(SyncError::NotPaired);
        }
        if self.local_color != Some(self.engine.side_to_move()) {
            return Err(SyncError::NotYourTurn);
        }
        self.engine.try_make_move(mv)?;
        self.phase = PairingPhase::Playing;
        Ok(vec![NetMessage::Move { mv }])
    }

    /// Ask the peer to restart the game.
    pub fn request_reset(&mut self) -> Result<Vec<NetMessage>, SyncError> {
        if !self.is_paired() {
            return Err(SyncError::NotPaired);
        }
        if self.reset_requested_by_us {
            return Err(SyncError::ResetAlreadyPending);
        }
        self.reset_requested_by_us = true;
        Ok(vec![NetMessage::RequestReset])
    }

    /// Answer a pending reset request from the peer.
    pub fn respond_to_reset_request(
        &mut self,
        accept: bool,
    ) -> Result<Vec<NetMessage>, SyncError> {
        if !self.reset_requested_by_peer {
            return Err(SyncError::NoPendingReset);
        }
        self.reset_requested_by_peer = false;
        if accept {
            self.engine.reset();
            Ok(vec![NetMessage::AcceptReset])
        } else {
            Ok(vec![NetMessage::DeclineReset])
        }
    }

    /// Offer to exchange colors. Only white may do this, and only before
    /// either side has made a move.
    pub fn request_color_swap(&mut self) -> Result<Vec<NetMessage>, SyncError> {
        if !self.is_paired() {
            return Err(SyncError::NotPaired);
        }
        if self.local_color != Some(Color::White) || self.engine.state().moves_made != 0 {
            return Err(SyncError::SwapUnavailable);
        }
        self.local_color = Some(Color::Black);
        Ok(vec![NetMessage::ColorSwap {
            color: Color::Black,
        }])
    }

    /// Explicitly ask the peer for a full snapshot (for example after a
    /// reconnect, to reconcile drift accumulated while apart).
    pub fn request_sync(&mut self) -> Result<Vec<NetMessage>, SyncError> {
        if !self.is_paired() {
            return Err(SyncError::NotPaired);
        }
        self.awaiting_sync = true;
        Ok(vec![NetMessage::SyncRequest])
    }

    /// Process one inbound message and return the replies to send.
    ///
    /// Divergence (a remote move that is illegal locally) is not an error:
    /// it is recovered through the `syncRequest`/`syncState` handshake.
    pub fn handle_message(&mut self, message: NetMessage) -> Result<Vec<NetMessage>, SyncError> {
        match message {
            NetMessage::Hello { device_name } => {
                self.remote_device_name = device_name;
                self.hello_received = true;
                let mut out = Vec::new();
                if self.hello_sent {
                    self.advance_past_hello(&mut out);
                }
                Ok(out)
            }

            NetMessage::ProposeRole { color } => {
                // The proposer claims `color`; we take the other.
                self.local_color = Some(color.opposite());
                self.phase = PairingPhase::RoleAssigned;
                info!(local = %self.local_id, color = ?color.opposite(), "role accepted");
                Ok(vec![NetMessage::AcceptRole {
                    color: color.opposite(),
                }])
            }

            NetMessage::AcceptRole { color } => {
                // Confirms our proposal: the peer took `color`.
                self.local_color = Some(color.opposite());
                self.phase = PairingPhase::RoleAssigned;
                info!(local = %self.local_id, color = ?color.opposite(), "role confirmed");
                Ok(Vec::new())
            }

            NetMessage::ColorSwap { color } => {
                let remote_is_white = self.local_color == Some(Color::Black);
                if remote_is_white && self.engine.state().moves_made == 0 {
                    self.local_color = Some(color.opposite());
                    info!(local = %self.local_id, color = ?color.opposite(), "colors swapped");
                } else {
                    warn!(local = %self.local_id, "ignoring illegal colorSwap");
                }
                Ok(Vec::new())
            }

            NetMessage::Move { mv } => {
                if !self.is_paired() {
                    warn!(local = %self.local_id, %mv, "move received before pairing; ignored");
                    return Ok(Vec::new());
                }
                match self.engine.try_make_move(mv) {
                    Ok(_) => {
                        self.phase = PairingPhase::Playing;
                        debug!(local = %self.local_id, %mv, "remote move applied");
                        Ok(Vec::new())
                    }
                    Err(error) => {
                        // State divergence. Never drop it silently: ask for
                        // the peer's full state instead.
                        warn!(local = %self.local_id, %mv, %error, "divergent remote move; requesting resync");
                        self.awaiting_sync = true;
                        Ok(vec![NetMessage::SyncRequest])
                    }
                }
            }

            NetMessage::Reset => {
                self.engine.reset();
                self.reset_requested_by_us = false;
                self.reset_requested_by_peer = false;
                Ok(Vec::new())
            }

            NetMessage::RequestReset => {
                if self.reset_requested_by_us {
                    // Simultaneous requests: the lower-ordered peer's request
                    // is authoritative, the other side's is suppressed.
                    let remote_wins = match (&self.remote_id, &self.local_id) {
                        (Some(remote), local) => remote < local,
                        (None, _) => false,
                    };
                    if remote_wins {
                        self.reset_requested_by_us = false;
                        self.engine.reset();
                        Ok(vec![NetMessage::AcceptReset])
                    } else {
                        // The peer will answer our outstanding request.
                        Ok(Vec::new())
                    }
                } else {
                    self.reset_requested_by_peer = true;
                    Ok(Vec::new())
                }
            }

            NetMessage::AcceptReset => {
                if self.reset_requested_by_us {
                    self.reset_requested_by_us = false;
                    self.engine.reset();
                } else {
                    warn!(local = %self.local_id, "unsolicited acceptReset ignored");
                }
                Ok(Vec::new())
            }

            NetMessage::DeclineReset => {
                self.reset_requested_by_us = false;
                Ok(Vec::new())
            }

            NetMessage::SyncRequest => {
                let perspective = self.local_color.unwrap_or(Color::White);
                Ok(vec![NetMessage::SyncState(
                    self.engine.snapshot(perspective),
                )])
            }

            NetMessage::SyncState(snapshot) => {
                let sender = self
                    .local_color
                    .map(Color::opposite)
                    .unwrap_or(Color::White);
                self.engine.load_snapshot(&snapshot, sender);
                self.awaiting_sync = false;
                info!(local = %self.local_id, "state resynchronized from peer snapshot");
                Ok(Vec::new())
            }
        }
    }

    /// Both hellos are in: negotiate roles. The lexicographically smaller
    /// identifier proposes, so exactly one side ever claims white.
    fn advance_past_hello(&mut self, out: &mut Vec<NetMessage>) {
        self.phase = PairingPhase::HelloExchanged;
        let proposes = match self.remote_id.as_deref() {
            Some(remote) => self.local_id.as_str() < remote,
            None => return,
        };
        self.phase = PairingPhase::RoleNegotiating;
        if proposes {
            self.local_color = Some(Color::White);
            out.push(NetMessage::ProposeRole {
                color: Color::White,
            });
        }
    }
}
