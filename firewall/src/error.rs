//! Error taxonomy for firewall commands
//!
//! Every expected failure is a value: the gateway returns [`RpcError`], the
//! rule validator returns [`ValidationError`], and the orchestrator folds
//! both into [`CommandError`] together with timeout and zone failures.

use thiserror::Error;

/// A failed method call on the bus.
///
/// `message` is the remote error text, kept verbatim so the operator sees
/// exactly what firewalld said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RpcError {
    /// D-Bus error name (e.g. `org.fedoraproject.FirewallD1.Exception`), when the
    /// failure came from the remote side.
    pub name: Option<String>,
    pub message: String,
}

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    pub fn remote(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }
}

impl From<zbus::Error> for RpcError {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, description, _) => {
                let name = name.to_string();
                let message = description.unwrap_or_else(|| name.clone());
                Self::remote(name, message)
            }
            other => Self::new(other.to_string()),
        }
    }
}

/// Rejection of a forward-port rule string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid format (Missing ports or ip).")]
    Format { rule: String },

    #[error("Invalid port (Any port must be a number).")]
    Port { rule: String },

    #[error("Invalid protocol (Protocol must be tcp or udp).")]
    Protocol { rule: String },

    #[error("Invalid IP address (IP address must be a valid IPv4 format).")]
    Address { rule: String },
}

impl ValidationError {
    /// The raw rule text that failed.
    pub fn rule(&self) -> &str {
        match self {
            Self::Format { rule }
            | Self::Port { rule }
            | Self::Protocol { rule }
            | Self::Address { rule } => rule,
        }
    }
}

/// Fatal failure of a whole command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("The timeout must be a number in minutes (got {0:?})")]
    TimeoutFormat(String),

    #[error("\"{0}\" index not found.")]
    ZoneNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}
