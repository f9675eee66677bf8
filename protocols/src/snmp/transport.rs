//! UDP transport for the management seam, backed by the `csnmp` v2c client.
//!
//! The client library owns encoding and the per-request timeout; resends and
//! the mapping into [`SnmpError`] happen here. `csnmp` collapses agent
//! error-status responses into client errors, so everything it reports
//! surfaces as [`SnmpError::Transport`].

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use csnmp::{ObjectIdentifier, ObjectValue, Snmp2cClient};

use super::{ManagementClient, Oid, SnmpError, SnmpValue};

/// One SNMP v2c session against a single agent.
pub struct Snmp2cTransport {
    client: Snmp2cClient,
    retries: usize,
}

impl Snmp2cTransport {
    /// Opens a session. `retries` is the number of resends after a failed
    /// request; the pipeline uses 0 or 1.
    pub async fn connect(
        addr: Ipv4Addr,
        port: u16,
        community: &str,
        timeout: Duration,
        retries: usize,
    ) -> Result<Self, SnmpError> {
        let target = SocketAddr::from((addr, port));
        let bind_addr = SocketAddr::from(([0, 0, 0, 0], 0));

        let client = Snmp2cClient::new(
            target,
            community.as_bytes().to_vec(),
            Some(bind_addr),
            Some(timeout),
        )
        .await
        .map_err(|e| SnmpError::Transport(e.to_string()))?;

        Ok(Self { client, retries })
    }
}

#[async_trait]
impl ManagementClient for Snmp2cTransport {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, SnmpError> {
        let wire = to_wire_oid(oid)?;
        let mut last_err: Option<SnmpError> = None;

        for _ in 0..=self.retries {
            match self.client.get(wire).await {
                Ok(value) => return Ok(from_wire_value(value)),
                Err(e) => last_err = Some(SnmpError::Transport(e.to_string())),
            }
        }

        Err(last_err.unwrap_or_else(|| SnmpError::Transport(String::from("request failed"))))
    }

    async fn get_next(&self, oid: &Oid) -> Result<(Oid, SnmpValue), SnmpError> {
        let wire = to_wire_oid(oid)?;
        let mut last_err: Option<SnmpError> = None;

        for _ in 0..=self.retries {
            match self.client.get_next(wire).await {
                Ok((next, value)) => {
                    return Ok((from_wire_oid(&next)?, from_wire_value(value)));
                }
                Err(e) => last_err = Some(SnmpError::Transport(e.to_string())),
            }
        }

        Err(last_err.unwrap_or_else(|| SnmpError::Transport(String::from("request failed"))))
    }
}

fn to_wire_oid(oid: &Oid) -> Result<ObjectIdentifier, SnmpError> {
    oid.to_string()
        .parse()
        .map_err(|_| SnmpError::Transport(format!("identifier {oid} not representable")))
}

fn from_wire_oid(oid: &ObjectIdentifier) -> Result<Oid, SnmpError> {
    oid.to_string()
        .parse()
        .map_err(|_| SnmpError::Agent(format!("agent returned unparseable identifier {oid}")))
}

fn from_wire_value(value: ObjectValue) -> SnmpValue {
    match value {
        ObjectValue::Integer(v) => SnmpValue::Integer(i64::from(v)),
        ObjectValue::Counter32(v) => SnmpValue::Counter(u64::from(v)),
        ObjectValue::Counter64(v) => SnmpValue::Counter(v),
        ObjectValue::Unsigned32(v) => SnmpValue::Counter(u64::from(v)),
        ObjectValue::TimeTicks(v) => SnmpValue::Counter(u64::from(v)),
        ObjectValue::String(bytes) => {
            SnmpValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        ObjectValue::ObjectId(wire_oid) => match wire_oid.to_string().parse() {
            Ok(parsed) => SnmpValue::ObjectId(parsed),
            Err(_) => SnmpValue::Other,
        },
        _ => SnmpValue::Other,
    }
}
