//! Message pipeline: gate, parse, look up, execute, report

use tracing::{debug, info, warn};

use fwbot_firewall::{Bus, Invocation, Orchestrator};

use crate::config::ChatConfig;
use crate::gate::{self, IncomingMessage};
use crate::registry::{CommandKind, Registry};
use crate::report::{self, Reply};

/// Shared bot state. Everything in here is read-only after startup.
pub struct App<B> {
    config: ChatConfig,
    registry: Registry,
    orchestrator: Orchestrator<B>,
}

impl<B: Bus> App<B> {
    pub fn new(config: ChatConfig, registry: Registry, orchestrator: Orchestrator<B>) -> Self {
        Self {
            config,
            registry,
            orchestrator,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &Orchestrator<B> {
        &self.orchestrator
    }

    /// Handle one chat message. `None` means the message is not for us and
    /// nothing should be posted back.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<Reply> {
        let body = gate::accept(&self.config, message)?;
        let invocation = Invocation::parse(body);
        let name = invocation.command()?;

        let Some(command) = self.registry.get(name) else {
            debug!("Ignoring unknown command {name}");
            return None;
        };

        info!(
            "{} ran {} with {:?}",
            message.author_id,
            command.name,
            invocation.arguments()
        );

        match command.kind {
            CommandKind::Firewall => match self.orchestrator.execute(&invocation).await {
                Ok(outcome) => Some(report::outcome(&outcome, &self.config.prefix)),
                Err(e) => {
                    warn!("{} failed: {e}", command.name);
                    Some(report::error(&e))
                }
            },
        }
    }
}
