//! Command orchestration — one pass per invocation
//!
//! Pipeline: help check → timeout → zone → dispatch (list forward ports,
//! list zones, add/remove rules, reload, runtime-to-permanent, help).
//! Exactly one branch runs per invocation.

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::applier::{apply, Direction, Mode, RuleOutcome};
use crate::bus::{Bus, Gateway, InterfaceFamily};
use crate::error::CommandError;
use crate::invocation::Invocation;
use crate::rules::{validate, ForwardPortEntry};
use crate::zones::{self, Zone};

/// Runtime rule lifetime when `--timeout` is not given.
pub const DEFAULT_TIMEOUT_MINUTES: f64 = 5.0;

/// What a command produced, ready for the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Help,
    ForwardPorts {
        zone: Zone,
        entries: Vec<ForwardPortEntry>,
    },
    Zones(Vec<String>),
    Rules {
        zone: Zone,
        added: Vec<RuleOutcome>,
        removed: Vec<RuleOutcome>,
    },
    Reloaded,
    RuntimeToPermanent,
}

/// Drives firewall commands through the gateway. Holds no per-command state.
pub struct Orchestrator<B> {
    gateway: Gateway<B>,
}

impl<B: Bus> Orchestrator<B> {
    pub fn new(gateway: Gateway<B>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway<B> {
        &self.gateway
    }

    pub async fn execute(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        let command_id = Uuid::new_v4();
        self.dispatch(invocation)
            .instrument(info_span!("command", id = %command_id))
            .await
    }

    async fn dispatch(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        if invocation.is_empty() || invocation.flag("help") {
            return Ok(Outcome::Help);
        }

        let timeout_seconds = parse_timeout(invocation.option("timeout"))?;

        let zone = match invocation.option("zone") {
            Some(name) => zones::resolve_by_name(&self.gateway, name).await?,
            None => zones::resolve_default(&self.gateway).await?,
        };

        if invocation.flag("list-forward-ports") {
            info!("Listing forward ports of zone {}", zone.name);
            let entries = zones::list_forward_ports(&self.gateway, &zone).await?;
            return Ok(Outcome::ForwardPorts { zone, entries });
        }

        if invocation.flag("list-zones") {
            info!("Listing zones");
            let names = zones::list_zones(&self.gateway).await?;
            return Ok(Outcome::Zones(names));
        }

        let to_add = invocation.options("add-forward-port");
        let to_remove = invocation.options("remove-forward-port");
        if !to_add.is_empty() || !to_remove.is_empty() {
            let all: Vec<&str> = to_add
                .iter()
                .chain(to_remove)
                .map(String::as_str)
                .collect();
            let rules = validate(&all)?;
            let (add_rules, remove_rules) = rules.split_at(to_add.len());

            let mode = if invocation.flag("permanent") {
                Mode::Permanent
            } else {
                Mode::Runtime { timeout_seconds }
            };
            info!(
                "Applying {} add / {} remove rule(s) to zone {} ({mode:?})",
                add_rules.len(),
                remove_rules.len(),
                zone.name
            );

            let added = apply(&self.gateway, add_rules, Direction::Add, mode, &zone).await;
            let removed = apply(&self.gateway, remove_rules, Direction::Remove, mode, &zone).await;
            return Ok(Outcome::Rules {
                zone,
                added,
                removed,
            });
        }

        if invocation.flag("reload") {
            info!("Reloading firewall");
            self.gateway
                .call::<()>(InterfaceFamily::Core, "reload", vec![])
                .await?;
            return Ok(Outcome::Reloaded);
        }

        if invocation.flag("runtime-to-permanent") {
            info!("Persisting runtime configuration");
            self.gateway
                .call::<()>(InterfaceFamily::Core, "runtimeToPermanent", vec![])
                .await?;
            return Ok(Outcome::RuntimeToPermanent);
        }

        Ok(Outcome::Help)
    }
}

/// Minutes (fractions allowed) to whole seconds. Absent means the default.
///
/// firewalld reads `0` as "never expires", so only an explicit zero maps to
/// it; any positive value lasts at least one second.
pub fn parse_timeout(raw: Option<&str>) -> Result<i32, CommandError> {
    let minutes = match raw {
        None => DEFAULT_TIMEOUT_MINUTES,
        Some(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite() && *m >= 0.0)
            .ok_or_else(|| CommandError::TimeoutFormat(text.to_string()))?,
    };

    let mut seconds = (minutes * 60.0).round();
    if minutes > 0.0 && seconds < 1.0 {
        seconds = 1.0;
    }
    if seconds > f64::from(i32::MAX) {
        return Err(CommandError::TimeoutFormat(raw.unwrap_or_default().to_string()));
    }
    Ok(seconds as i32)
}
