//! Failure codes carried by the `Failure` record
//!
//! Most codes are informational. Two of them tell the client that its login
//! material is wrong and the connection has to be rebuilt: a stale build
//! (the message carries the build string the server expects) and a bad key.

use serde::{Deserialize, Serialize};

use crate::messages::incoming::Failure;

/// Known failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCode {
    IncorrectVersion,
    InvalidTeleportTarget,
    EmailVerificationNeeded,
    BadKey,
    InvalidCharacter,
    Other(i32),
}

impl FailureCode {
    pub fn from_id(id: i32) -> Self {
        match id {
            4 => FailureCode::IncorrectVersion,
            5 => FailureCode::InvalidTeleportTarget,
            7 => FailureCode::EmailVerificationNeeded,
            8 => FailureCode::BadKey,
            11 => FailureCode::InvalidCharacter,
            other => FailureCode::Other(other),
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            FailureCode::IncorrectVersion => 4,
            FailureCode::InvalidTeleportTarget => 5,
            FailureCode::EmailVerificationNeeded => 7,
            FailureCode::BadKey => 8,
            FailureCode::InvalidCharacter => 11,
            FailureCode::Other(id) => *id,
        }
    }
}

/// What the session does about a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureAction {
    /// Empty failure the server uses as a keep-alive
    KeepAlive,

    /// Store the new build string, then reconnect to the same endpoint
    UpdateBuild(String),

    /// Drop the cached reconnect key, then reconnect
    ClearKey,

    /// Surface to observers; the connection stays up
    Report,
}

impl FailureAction {
    /// True when the action rebuilds the connection
    pub fn reconnects(&self) -> bool {
        matches!(self, FailureAction::UpdateBuild(_) | FailureAction::ClearKey)
    }
}

impl Failure {
    pub fn code(&self) -> FailureCode {
        FailureCode::from_id(self.error_id)
    }

    /// Maps the failure onto a session action
    pub fn action(&self) -> FailureAction {
        if self.error_id == 0 && self.error_message.is_empty() {
            return FailureAction::KeepAlive;
        }

        match self.code() {
            FailureCode::IncorrectVersion => FailureAction::UpdateBuild(self.error_message.clone()),
            FailureCode::BadKey => FailureAction::ClearKey,
            _ => FailureAction::Report,
        }
    }
}
