//! Rule application — add/remove forward ports, runtime or permanent
//!
//! Rules are applied one at a time, in input order. A failed call becomes a
//! failed [`RuleOutcome`]; the rest of the batch still runs.

use tracing::{info, warn};

use crate::bus::{Arg, Bus, Gateway, InterfaceFamily};
use crate::rules::PortForwardRule;
use crate::zones::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Remove,
}

impl Direction {
    fn member(&self) -> &'static str {
        match self {
            Self::Add => "addForwardPort",
            Self::Remove => "removeForwardPort",
        }
    }
}

/// Where a change lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Active configuration only; added rules expire after `timeout_seconds`
    /// (0 means no expiry).
    Runtime { timeout_seconds: i32 },
    /// The zone's persisted configuration.
    Permanent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Canonical `port:proto:toport:toaddr`.
    pub rule: String,
    pub ok: bool,
    /// The canonical rule on success, the remote error text on failure.
    pub message: String,
}

/// The family, member and arguments for one rule change.
pub fn call_for(
    rule: &PortForwardRule,
    direction: Direction,
    mode: Mode,
    zone: &Zone,
) -> (InterfaceFamily, &'static str, Vec<Arg>) {
    let rule_args = [
        Arg::from(rule.port.as_str()),
        Arg::from(rule.protocol.as_str()),
        Arg::from(rule.to_port.as_str()),
        Arg::from(rule.to_address.to_string()),
    ];

    match mode {
        Mode::Permanent => (
            InterfaceFamily::PermanentZoneConfig(zone.index),
            direction.member(),
            rule_args.to_vec(),
        ),
        Mode::Runtime { timeout_seconds } => {
            let mut args = Vec::with_capacity(6);
            args.push(Arg::from(zone.name.as_str()));
            args.extend(rule_args);
            if direction == Direction::Add {
                args.push(Arg::Int(timeout_seconds));
            }
            (InterfaceFamily::RuntimeZone, direction.member(), args)
        }
    }
}

/// Apply every rule in order and report one outcome per rule.
pub async fn apply<B: Bus>(
    gateway: &Gateway<B>,
    rules: &[PortForwardRule],
    direction: Direction,
    mode: Mode,
    zone: &Zone,
) -> Vec<RuleOutcome> {
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let canonical = rule.to_string();
        let (family, member, args) = call_for(rule, direction, mode, zone);

        let outcome = match gateway.call::<()>(family, member, args).await {
            Ok(()) => {
                info!("{member} {canonical} on zone {} ({mode:?})", zone.name);
                RuleOutcome {
                    rule: canonical.clone(),
                    ok: true,
                    message: canonical,
                }
            }
            Err(e) => {
                warn!("{member} {canonical} on zone {} failed: {e}", zone.name);
                RuleOutcome {
                    rule: canonical,
                    ok: false,
                    message: e.message,
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}
