//! Reporter — renders command outcomes and errors as chat replies
//!
//! A [`Reply`] is platform neutral: the adapter on the other side of the
//! webhook turns it into an embed (title, colour, markdown description).

use chrono::{DateTime, Utc};
use serde::Serialize;

use fwbot_firewall::{CommandError, Outcome, RuleOutcome};

const FORMAT_HINT: &str = "The correct format is `port:proto:toport:toaddr` e.g: `80:tcp:80:192.168.0.1`. Please review your syntax.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub title: Option<String>,
    pub color: Color,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Reply {
    fn new(title: Option<&str>, color: Color, description: String) -> Self {
        Self {
            title: title.map(str::to_string),
            color,
            description,
            timestamp: Utc::now(),
        }
    }
}

/// Render a successful command.
pub fn outcome(outcome: &Outcome, prefix: &str) -> Reply {
    match outcome {
        Outcome::Help => help(prefix),
        Outcome::ForwardPorts { entries, .. } => {
            let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();
            Reply::new(
                Some("List Forward Ports"),
                Color::Green,
                code_block(&lines.join("\n")),
            )
        }
        Outcome::Zones(names) => Reply::new(
            Some("List All Zones"),
            Color::Green,
            code_block(&names.join(", ")),
        ),
        Outcome::Rules { added, removed, .. } => {
            let mut sections = Vec::new();
            if !added.is_empty() {
                sections.push(format!("## Added Rules\n{}", code_block(&rule_lines(added))));
            }
            if !removed.is_empty() {
                sections.push(format!(
                    "## Removed Rules\n{}",
                    code_block(&rule_lines(removed))
                ));
            }
            Reply::new(Some("Forward Ports"), Color::Green, sections.join("\n"))
        }
        Outcome::Reloaded => Reply::new(
            None,
            Color::Green,
            "✅ **|** Reloaded the firewall. Permanent changes have been applied. Runtime changes have been discarded.".into(),
        ),
        Outcome::RuntimeToPermanent => Reply::new(
            None,
            Color::Green,
            "✅ **|** All runtime changes have been made permanent.".into(),
        ),
    }
}

/// Render a failed command.
pub fn error(err: &CommandError) -> Reply {
    match err {
        CommandError::TimeoutFormat(_) => Reply::new(
            Some("Invalid Timeout"),
            Color::Red,
            "The timeout must be a number in minutes".into(),
        ),
        CommandError::Validation(e) => Reply::new(
            Some("Invalid Port Forwarding Format"),
            Color::Red,
            format!("{FORMAT_HINT}\n{}", code_block(&e.to_string())),
        ),
        CommandError::ZoneNotFound(_) | CommandError::Rpc(_) => Reply::new(
            Some("D-Bus Error"),
            Color::Red,
            code_block(&err.to_string()),
        ),
    }
}

/// Usage text for the firewall command.
pub fn help(prefix: &str) -> Reply {
    let usage = format!("{prefix}firewall [options]");
    let options = "\
--list-forward-ports
List all forward ports

--list-zones
List all zones

--add-forward-port=port:proto:toport:toaddr
Add a new forward port rule. Example: `80:tcp:80:192.168.0.18`

--remove-forward-port=port:proto:toport:toaddr
Remove a forward port rule. Example: `80:tcp:80:192.168.0.18`

--reload
Reload the firewall (permanent changes are applied and runtime changes discarded)

--runtime-to-permanent
Make the runtime (non-permanent) changes permanent

--permanent
Mark your changes as permanent (default: false)

--zone=zoneName
Specify a zone (default: the current default zone)

--timeout=numberInMinutes
Lifetime of runtime (non-permanent) rules; they are discarded when it runs out (default: 5 minutes)

--help
Show this message";

    Reply::new(
        Some("Command Usage"),
        Color::Red,
        format!(
            "## USAGE\n{}\n## OPTIONS\n{}",
            code_block(&usage),
            code_block(options)
        ),
    )
}

fn rule_lines(outcomes: &[RuleOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| {
            if o.ok {
                format!("✅ {}", o.message)
            } else {
                format!("❌ {}", o.message)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_block(content: &str) -> String {
    format!("```\n{content}\n```")
}
