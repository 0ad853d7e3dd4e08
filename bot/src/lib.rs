//! fwbot — chat front end for the firewalld client
//!
//! Messages arrive on a webhook, pass the operator gate, are matched against
//! the command registry and executed by [`fwbot_firewall::Orchestrator`].
//! Results come back as platform-neutral replies.

pub mod app;
pub mod config;
pub mod gate;
pub mod registry;
pub mod report;
pub mod server;

pub use app::App;
pub use config::BotConfig;
pub use gate::IncomingMessage;
pub use registry::Registry;
pub use report::Reply;
