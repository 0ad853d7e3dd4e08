//! RPC gateway — method calls against the firewalld D-Bus surface
//!
//! firewalld exposes three interfaces under one bus name:
//! - `org.fedoraproject.FirewallD1` (core: default zone, reload, runtime-to-permanent)
//! - `org.fedoraproject.FirewallD1.zone` (runtime zone state)
//! - `org.fedoraproject.FirewallD1.config.zone` (permanent zone config, one object per zone)
//!
//! Each call builds a fresh [`RpcCallSpec`] and performs exactly one
//! request/response round trip. Failures come back as [`RpcError`] values.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use zbus::zvariant::{Structure, StructureBuilder, Type};

use crate::error::RpcError;

pub const DESTINATION: &str = "org.fedoraproject.FirewallD1";
pub const ROOT_PATH: &str = "/org/fedoraproject/FirewallD1";

const CORE_INTERFACE: &str = "org.fedoraproject.FirewallD1";
const ZONE_INTERFACE: &str = "org.fedoraproject.FirewallD1.zone";
const CONFIG_ZONE_INTERFACE: &str = "org.fedoraproject.FirewallD1.config.zone";

/// Which firewalld interface a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceFamily {
    Core,
    RuntimeZone,
    /// Permanent config of the zone at this position in the zone listing.
    PermanentZoneConfig(usize),
}

impl InterfaceFamily {
    pub fn object_path(&self) -> String {
        match self {
            Self::Core | Self::RuntimeZone => ROOT_PATH.to_string(),
            Self::PermanentZoneConfig(index) => format!("{ROOT_PATH}/config/zone/{index}"),
        }
    }

    pub fn interface_name(&self) -> &'static str {
        match self {
            Self::Core => CORE_INTERFACE,
            Self::RuntimeZone => ZONE_INTERFACE,
            Self::PermanentZoneConfig(_) => CONFIG_ZONE_INTERFACE,
        }
    }
}

/// A positional method argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Str(String),
    Int(i32),
}

impl Arg {
    fn signature_char(&self) -> char {
        match self {
            Self::Str(_) => 's',
            Self::Int(_) => 'i',
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

/// Everything needed to put one method call on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCallSpec {
    pub destination: String,
    pub object_path: String,
    pub interface_name: String,
    pub method_name: String,
    pub arguments: Vec<Arg>,
    pub signature: String,
}

impl RpcCallSpec {
    pub fn new(family: InterfaceFamily, member: &str, arguments: Vec<Arg>) -> Self {
        let signature = arguments.iter().map(Arg::signature_char).collect();
        Self {
            destination: DESTINATION.to_string(),
            object_path: family.object_path(),
            interface_name: family.interface_name().to_string(),
            method_name: member.to_string(),
            arguments,
            signature,
        }
    }
}

/// A connected message bus.
///
/// Implementations perform one round trip per call and decode the reply
/// body into `R`. `()` decodes an empty reply.
#[async_trait]
pub trait Bus: Send + Sync {
    async fn call<R>(&self, spec: RpcCallSpec) -> Result<R, RpcError>
    where
        R: DeserializeOwned + Type + Send + 'static;
}

#[async_trait]
impl Bus for zbus::Connection {
    async fn call<R>(&self, spec: RpcCallSpec) -> Result<R, RpcError>
    where
        R: DeserializeOwned + Type + Send + 'static,
    {
        let reply = match body(&spec) {
            None => {
                self.call_method(
                    Some(spec.destination.as_str()),
                    spec.object_path.as_str(),
                    Some(spec.interface_name.as_str()),
                    spec.method_name.as_str(),
                    &(),
                )
                .await?
            }
            Some(body) => {
                self.call_method(
                    Some(spec.destination.as_str()),
                    spec.object_path.as_str(),
                    Some(spec.interface_name.as_str()),
                    spec.method_name.as_str(),
                    &body,
                )
                .await?
            }
        };

        reply.body().deserialize::<R>().map_err(RpcError::from)
    }
}

/// Message body for a call, one field per argument. `None` when the method
/// takes no arguments.
fn body(spec: &RpcCallSpec) -> Option<Structure<'static>> {
    if spec.arguments.is_empty() {
        return None;
    }
    let body = spec
        .arguments
        .iter()
        .fold(StructureBuilder::new(), |builder, arg| match arg {
            Arg::Str(s) => builder.add_field(s.clone()),
            Arg::Int(n) => builder.add_field(*n),
        })
        .build();
    Some(body)
}

/// Builds call specs for a family and hands them to the bus.
pub struct Gateway<B> {
    bus: B,
}

impl<B: Bus> Gateway<B> {
    /// Wrap an already-connected bus. No connection setup happens here.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub async fn call<R>(
        &self,
        family: InterfaceFamily,
        member: &str,
        arguments: Vec<Arg>,
    ) -> Result<R, RpcError>
    where
        R: DeserializeOwned + Type + Send + 'static,
    {
        let spec = RpcCallSpec::new(family, member, arguments);
        debug!(
            "D-Bus call: {}.{} on {} ({})",
            spec.interface_name, spec.method_name, spec.object_path, spec.signature
        );

        let result = self.bus.call(spec).await;
        if let Err(ref e) = result {
            debug!(
                "D-Bus call {member} failed ({}): {e}",
                e.name.as_deref().unwrap_or("local")
            );
        }
        result
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBus;
    use super::*;
    use crate::applier::{call_for, Direction, Mode};
    use crate::rules::PortForwardRule;
    use crate::zones::Zone;

    #[test]
    fn test_core_family_targets_root_object() {
        let spec = RpcCallSpec::new(InterfaceFamily::Core, "reload", vec![]);
        assert_eq!(spec.destination, "org.fedoraproject.FirewallD1");
        assert_eq!(spec.object_path, "/org/fedoraproject/FirewallD1");
        assert_eq!(spec.interface_name, "org.fedoraproject.FirewallD1");
        assert_eq!(spec.signature, "");
    }

    #[test]
    fn test_runtime_zone_family_shares_root_object() {
        let spec = RpcCallSpec::new(InterfaceFamily::RuntimeZone, "getZones", vec![]);
        assert_eq!(spec.object_path, ROOT_PATH);
        assert_eq!(spec.interface_name, "org.fedoraproject.FirewallD1.zone");
    }

    #[test]
    fn test_permanent_family_path_carries_zone_index() {
        let spec = RpcCallSpec::new(
            InterfaceFamily::PermanentZoneConfig(7),
            "addForwardPort",
            vec!["80".into(), "tcp".into(), "80".into(), "10.0.0.2".into()],
        );
        assert_eq!(spec.object_path, "/org/fedoraproject/FirewallD1/config/zone/7");
        assert_eq!(spec.interface_name, "org.fedoraproject.FirewallD1.config.zone");
        assert_eq!(spec.signature, "ssss");
    }

    #[test]
    fn test_signature_follows_argument_types() {
        let spec = RpcCallSpec::new(
            InterfaceFamily::RuntimeZone,
            "addForwardPort",
            vec![
                "public".into(),
                "80".into(),
                "tcp".into(),
                "80".into(),
                "10.0.0.2".into(),
                Arg::Int(300),
            ],
        );
        assert_eq!(spec.signature, "sssssi");
    }

    #[tokio::test]
    async fn test_gateway_decodes_reply() {
        let gateway = Gateway::new(ScriptedBus::with_zones());
        let zones: Vec<String> = gateway
            .call(InterfaceFamily::RuntimeZone, "getZones", vec![])
            .await
            .unwrap();
        assert_eq!(zones, vec!["block", "dmz", "public"]);
        assert_eq!(gateway.bus().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_gateway_returns_remote_error_verbatim() {
        let gateway = Gateway::new(ScriptedBus::new().fail("reload", "ACCESS_DENIED: reload"));
        let err = gateway
            .call::<()>(InterfaceFamily::Core, "reload", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.message, "ACCESS_DENIED: reload");
        assert_eq!(
            err.name.as_deref(),
            Some("org.fedoraproject.FirewallD1.Exception")
        );
    }

    #[tokio::test]
    async fn test_each_call_builds_a_fresh_spec() {
        let gateway = Gateway::new(ScriptedBus::new());
        gateway
            .call::<()>(InterfaceFamily::Core, "reload", vec![])
            .await
            .unwrap();
        gateway
            .call::<()>(InterfaceFamily::Core, "runtimeToPermanent", vec![])
            .await
            .unwrap();

        let calls = gateway.bus().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method_name, "reload");
        assert_eq!(calls[1].method_name, "runtimeToPermanent");
    }

    fn wire_signature(spec: &RpcCallSpec) -> Option<String> {
        let builder = zbus::Message::method(spec.object_path.as_str(), spec.method_name.as_str())
            .unwrap()
            .destination(spec.destination.as_str())
            .unwrap()
            .interface(spec.interface_name.as_str())
            .unwrap();
        let msg = match body(spec) {
            Some(body) => builder.build(&body).unwrap(),
            None => builder.build(&()).unwrap(),
        };
        msg.body().signature().map(|s| s.to_string())
    }

    fn sample_call(direction: Direction, mode: Mode) -> RpcCallSpec {
        let rule = PortForwardRule::parse("80:tcp:8080:10.0.0.5").unwrap();
        let zone = Zone {
            index: 2,
            name: "public".into(),
        };
        let (family, member, args) = call_for(&rule, direction, mode, &zone);
        RpcCallSpec::new(family, member, args)
    }

    #[test]
    fn test_wire_body_matches_runtime_add_signature() {
        let spec = sample_call(Direction::Add, Mode::Runtime { timeout_seconds: 300 });
        assert_eq!(spec.signature, "sssssi");
        assert_eq!(wire_signature(&spec).as_deref(), Some("sssssi"));
    }

    #[test]
    fn test_wire_body_matches_runtime_remove_signature() {
        let spec = sample_call(Direction::Remove, Mode::Runtime { timeout_seconds: 300 });
        assert_eq!(spec.signature, "sssss");
        assert_eq!(wire_signature(&spec).as_deref(), Some("sssss"));
    }

    #[test]
    fn test_wire_body_matches_permanent_signature() {
        for direction in [Direction::Add, Direction::Remove] {
            let spec = sample_call(direction, Mode::Permanent);
            assert_eq!(spec.signature, "ssss");
            assert_eq!(wire_signature(&spec).as_deref(), Some("ssss"));
        }
    }

    #[test]
    fn test_wire_body_single_string_argument() {
        let spec = RpcCallSpec::new(
            InterfaceFamily::RuntimeZone,
            "getForwardPorts",
            vec![Arg::from("public")],
        );
        assert_eq!(wire_signature(&spec).as_deref(), Some("s"));
    }

    #[test]
    fn test_no_arguments_sends_empty_body() {
        let spec = RpcCallSpec::new(InterfaceFamily::Core, "reload", vec![]);
        assert!(body(&spec).is_none());
        assert_eq!(wire_signature(&spec), None);
    }
}
