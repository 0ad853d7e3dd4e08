//! Zone resolution
//!
//! A zone's index is its position in the `getZones` listing. firewalld only
//! hands out names, so every resolution re-lists and scans; the index is
//! never cached between commands.

use tracing::debug;

use crate::bus::{Arg, Bus, Gateway, InterfaceFamily};
use crate::error::{CommandError, RpcError};
use crate::rules::ForwardPortEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub index: usize,
    pub name: String,
}

/// All zone names, in the order firewalld reports them.
pub async fn list_zones<B: Bus>(gateway: &Gateway<B>) -> Result<Vec<String>, RpcError> {
    gateway
        .call(InterfaceFamily::RuntimeZone, "getZones", vec![])
        .await
}

/// Resolve `name` against a fresh listing.
pub async fn resolve_by_name<B: Bus>(gateway: &Gateway<B>, name: &str) -> Result<Zone, CommandError> {
    let zones = list_zones(gateway).await?;

    let index = zones
        .iter()
        .position(|z| z == name)
        .ok_or_else(|| CommandError::ZoneNotFound(name.to_string()))?;

    debug!("Resolved zone {name} to index {index}");
    Ok(Zone {
        index,
        name: name.to_string(),
    })
}

/// Resolve the service's current default zone.
pub async fn resolve_default<B: Bus>(gateway: &Gateway<B>) -> Result<Zone, CommandError> {
    let name: String = gateway
        .call(InterfaceFamily::Core, "getDefaultZone", vec![])
        .await?;

    resolve_by_name(gateway, &name).await
}

/// Runtime forward-port rules of a zone.
pub async fn list_forward_ports<B: Bus>(
    gateway: &Gateway<B>,
    zone: &Zone,
) -> Result<Vec<ForwardPortEntry>, RpcError> {
    let rows: Vec<Vec<String>> = gateway
        .call(
            InterfaceFamily::RuntimeZone,
            "getForwardPorts",
            vec![Arg::from(zone.name.as_str())],
        )
        .await?;

    Ok(rows.into_iter().map(ForwardPortEntry::from_row).collect())
}
