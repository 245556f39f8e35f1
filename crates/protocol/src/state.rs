//! Session state machine
//!
//! ```text
//! Disconnected → Connecting → Handshaking → InGame
//!      ↑             ↓             ↓           ↓
//!      │             └──────→ Reconnecting ←───┘
//!      │                           ↓
//!      │                       Connecting
//!      └──────────────── (any state: disconnect / socket error)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Connection status of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No socket
    #[default]
    Disconnected,

    /// Socket being opened
    Connecting,

    /// `Hello` sent, waiting for `MapInfo`
    Handshaking,

    /// Character loaded, ticks flowing
    InGame,

    /// Waiting out the reconnect delay before the next attempt
    Reconnecting,
}

impl ConnectionState {
    /// Validates a state transition
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, next) {
            (Disconnected, Connecting) => true,

            (Connecting, Handshaking) => true,
            (Connecting, Reconnecting) => true, // connect failed, retry scheduled

            (Handshaking, InGame) => true,
            (Handshaking, Reconnecting) => true, // stale build or bad key during login

            (InGame, Reconnecting) => true,

            (Reconnecting, Connecting) => true,

            (_, Disconnected) => true,

            (a, b) if *a == b => true,

            _ => false,
        }
    }

    /// Moves to `next`, leaving the state untouched on an invalid transition
    pub fn transition_to(&mut self, next: ConnectionState) -> Result<()> {
        if self.can_transition_to(next) {
            *self = next;
            Ok(())
        } else {
            Err(ProtocolError::InvalidStateTransition {
                from: *self,
                to: next,
            })
        }
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, ConnectionState::Disconnected)
    }

    #[inline]
    pub fn is_in_game(&self) -> bool {
        matches!(self, ConnectionState::InGame)
    }

    #[inline]
    pub fn is_reconnecting(&self) -> bool {
        matches!(self, ConnectionState::Reconnecting)
    }

    /// True while a socket is open or being opened
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Handshaking | ConnectionState::InGame
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Handshaking => write!(f, "Handshaking"),
            ConnectionState::InGame => write!(f, "InGame"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_path() {
        let mut state = ConnectionState::Disconnected;

        assert!(state.transition_to(ConnectionState::Connecting).is_ok());
        assert!(state.transition_to(ConnectionState::Handshaking).is_ok());
        assert!(state.transition_to(ConnectionState::InGame).is_ok());
        assert_eq!(state, ConnectionState::InGame);

        assert!(state.transition_to(ConnectionState::Disconnected).is_ok());
        assert!(state.is_disconnected());
    }

    #[test]
    fn test_reconnect_cycle() {
        let mut state = ConnectionState::InGame;

        assert!(state.transition_to(ConnectionState::Reconnecting).is_ok());
        assert!(state.is_reconnecting());
        assert!(state.transition_to(ConnectionState::Connecting).is_ok());
        assert!(state.transition_to(ConnectionState::Handshaking).is_ok());

        // stale build rejected during login
        assert!(state.transition_to(ConnectionState::Reconnecting).is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut state = ConnectionState::Disconnected;

        assert!(state.transition_to(ConnectionState::InGame).is_err());
        assert_eq!(state, ConnectionState::Disconnected);

        assert!(state.transition_to(ConnectionState::Handshaking).is_err());
        assert!(state.transition_to(ConnectionState::Reconnecting).is_err());

        let mut state = ConnectionState::Reconnecting;
        assert_eq!(
            state.transition_to(ConnectionState::InGame),
            Err(ProtocolError::InvalidStateTransition {
                from: ConnectionState::Reconnecting,
                to: ConnectionState::InGame,
            })
        );
    }

    #[test]
    fn test_any_state_can_disconnect() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Handshaking,
            ConnectionState::InGame,
            ConnectionState::Reconnecting,
        ] {
            assert!(state.can_transition_to(ConnectionState::Disconnected));
        }
    }

    #[test]
    fn test_predicates() {
        assert!(ConnectionState::default().is_disconnected());
        assert!(ConnectionState::InGame.is_in_game());
        assert!(ConnectionState::Handshaking.is_active());
        assert!(!ConnectionState::Reconnecting.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
        assert_eq!(ConnectionState::Handshaking.to_string(), "Handshaking");
        assert_eq!(ConnectionState::InGame.to_string(), "InGame");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "Reconnecting");
    }
}
