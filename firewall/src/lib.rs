//! fwbot-firewall — firewalld client for operator commands
//!
//! Turns a parsed [`Invocation`] into firewalld D-Bus calls:
//! zone resolution, forward-port rule validation and application
//! (runtime or permanent), reload and runtime-to-permanent.
//! Every expected failure is returned as a value, never raised.

pub mod applier;
pub mod bus;
pub mod error;
pub mod invocation;
pub mod orchestrator;
pub mod rules;
pub mod zones;

pub use applier::{Direction, Mode, RuleOutcome};
pub use bus::{Arg, Bus, Gateway, InterfaceFamily, RpcCallSpec};
pub use error::{CommandError, RpcError, ValidationError};
pub use invocation::Invocation;
pub use orchestrator::{Orchestrator, Outcome};
pub use rules::{ForwardPortEntry, PortForwardRule, Protocol};
pub use zones::Zone;
