//! Forward-port rules — `port:proto:toport:toaddr`
//!
//! Validation runs over a whole batch and stops at the first bad rule.
//! Field counts are checked for every rule before any field is inspected,
//! so a short rule anywhere in the batch is always reported as a format
//! error.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ValidationError;

/// Transport protocol of a forward-port rule. Lowercase only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated forward-port rule.
///
/// Ports are kept as the digit text the operator typed: firewalld takes them
/// as strings and does its own range checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortForwardRule {
    pub port: String,
    pub protocol: Protocol,
    pub to_port: String,
    pub to_address: Ipv4Addr,
}

impl PortForwardRule {
    /// Parse a single rule. Same checks, same order, as [`validate`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let fields = split_fields(raw)?;
        parse_fields(raw, fields)
    }
}

impl FromStr for PortForwardRule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortForwardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.port, self.protocol, self.to_port, self.to_address
        )
    }
}

/// Validate a batch of raw rules, failing on the first violation.
pub fn validate<S: AsRef<str>>(raw_rules: &[S]) -> Result<Vec<PortForwardRule>, ValidationError> {
    let split = raw_rules
        .iter()
        .map(|raw| split_fields(raw.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    raw_rules
        .iter()
        .zip(split)
        .map(|(raw, fields)| parse_fields(raw.as_ref(), fields))
        .collect()
}

fn split_fields(raw: &str) -> Result<[&str; 4], ValidationError> {
    let fields: Vec<&str> = raw.split(':').collect();
    <[&str; 4]>::try_from(fields).map_err(|_| ValidationError::Format {
        rule: raw.to_string(),
    })
}

fn parse_fields(raw: &str, fields: [&str; 4]) -> Result<PortForwardRule, ValidationError> {
    let [port, proto, to_port, to_addr] = fields;

    if !is_numeric(port) || !is_numeric(to_port) {
        return Err(ValidationError::Port {
            rule: raw.to_string(),
        });
    }

    let protocol = proto.parse::<Protocol>().map_err(|_| ValidationError::Protocol {
        rule: raw.to_string(),
    })?;

    let to_address = to_addr.parse::<Ipv4Addr>().map_err(|_| ValidationError::Address {
        rule: raw.to_string(),
    })?;

    Ok(PortForwardRule {
        port: port.to_string(),
        protocol,
        to_port: to_port.to_string(),
        to_address,
    })
}

fn is_numeric(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

/// One entry of a zone's forward-port listing, as firewalld reports it.
///
/// Fields are passed through untouched; `to_address` is empty for
/// local port redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPortEntry {
    pub port: String,
    pub protocol: String,
    pub to_port: String,
    pub to_address: String,
}

impl ForwardPortEntry {
    /// Build from one `as` row of a `getForwardPorts` reply. Missing
    /// trailing fields are left empty.
    pub fn from_row(row: Vec<String>) -> Self {
        let mut fields = row.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        Self {
            port: next(),
            protocol: next(),
            to_port: next(),
            to_address: next(),
        }
    }
}

impl fmt::Display for ForwardPortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "port={}:proto={}:toport={}:toaddr={}",
            self.port, self.protocol, self.to_port, self.to_address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_rules_round_trip() {
        for raw in [
            "80:tcp:80:192.168.0.1",
            "53:udp:5353:10.0.0.53",
            "0:tcp:65535:0.0.0.0",
            "8080:tcp:80:255.255.255.255",
        ] {
            let rule = PortForwardRule::parse(raw).unwrap();
            assert_eq!(rule.to_string(), raw);
        }
    }

    #[test]
    fn test_parsed_fields() {
        let rule: PortForwardRule = "443:tcp:8443:172.16.0.9".parse().unwrap();
        assert_eq!(rule.port, "443");
        assert_eq!(rule.protocol, Protocol::Tcp);
        assert_eq!(rule.to_port, "8443");
        assert_eq!(rule.to_address, Ipv4Addr::new(172, 16, 0, 9));
    }

    #[test]
    fn test_wrong_field_count_is_format_error() {
        for raw in [
            "",
            "80",
            "80:tcp",
            "80:tcp:80",
            "80:tcp:80:192.168.0.1:extra",
            "x:nope:y",
        ] {
            assert!(
                matches!(PortForwardRule::parse(raw), Err(ValidationError::Format { .. })),
                "expected format error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_non_numeric_port_is_port_error() {
        for raw in [
            "http:tcp:80:192.168.0.1",
            "80:tcp:http:192.168.0.1",
            ":tcp:80:192.168.0.1",
            "-1:tcp:80:192.168.0.1",
            "8 0:tcp:80:192.168.0.1",
        ] {
            assert!(
                matches!(PortForwardRule::parse(raw), Err(ValidationError::Port { .. })),
                "expected port error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_port_is_not_range_checked() {
        assert!(PortForwardRule::parse("99999:tcp:80:10.0.0.1").is_ok());
    }

    #[test]
    fn test_port_checked_before_protocol_and_address() {
        let err = PortForwardRule::parse("x:icmp:80:not-an-ip").unwrap_err();
        assert!(matches!(err, ValidationError::Port { .. }));
    }

    #[test]
    fn test_protocol_is_case_sensitive() {
        for raw in ["80:TCP:80:10.0.0.1", "80:Udp:80:10.0.0.1", "80:sctp:80:10.0.0.1"] {
            assert!(
                matches!(PortForwardRule::parse(raw), Err(ValidationError::Protocol { .. })),
                "expected protocol error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_invalid_ipv4_is_address_error() {
        for raw in [
            "80:tcp:80:256.0.0.1",
            "80:tcp:80:10.0.0",
            "80:tcp:80:example.com",
            "80:tcp:80:",
        ] {
            assert!(
                matches!(PortForwardRule::parse(raw), Err(ValidationError::Address { .. })),
                "expected address error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_ipv6_target_splits_into_too_many_fields() {
        let err = PortForwardRule::parse("80:tcp:80:fe80::1").unwrap_err();
        assert!(matches!(err, ValidationError::Format { .. }));
    }

    #[test]
    fn test_batch_checks_counts_before_fields() {
        // The first rule has a bad port, but the third is short: the format
        // error wins because counts are checked over the whole batch first.
        let err = validate(&["x:tcp:80:10.0.0.1", "80:tcp:80:10.0.0.2", "80:tcp"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Format {
                rule: "80:tcp".into()
            }
        );
    }

    #[test]
    fn test_batch_fails_on_first_bad_rule() {
        let err = validate(&[
            "80:tcp:80:10.0.0.1",
            "80:icmp:80:10.0.0.2",
            "80:tcp:80:999.0.0.1",
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Protocol {
                rule: "80:icmp:80:10.0.0.2".into()
            }
        );
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let rules = validate(&["22:tcp:2222:10.0.0.1", "53:udp:53:10.0.0.2"]).unwrap();
        let rendered: Vec<String> = rules.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["22:tcp:2222:10.0.0.1", "53:udp:53:10.0.0.2"]);
    }

    #[test]
    fn test_empty_batch_is_ok() {
        let none: [&str; 0] = [];
        assert!(validate(&none).unwrap().is_empty());
    }

    #[test]
    fn test_forward_port_entry_listing_format() {
        let entry = ForwardPortEntry::from_row(vec![
            "80".into(),
            "tcp".into(),
            "8080".into(),
            "192.168.0.5".into(),
        ]);
        assert_eq!(
            entry.to_string(),
            "port=80:proto=tcp:toport=8080:toaddr=192.168.0.5"
        );
    }

    #[test]
    fn test_forward_port_entry_short_row() {
        let entry = ForwardPortEntry::from_row(vec!["22".into(), "tcp".into(), "2222".into()]);
        assert_eq!(entry.to_address, "");
    }
}
