//! Inbound packet events and their normalized form.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, de::Error as _};
use serde_json::{Map, Value};

/// Loosely structured packet attributes indexed by dotted key
/// (e.g. `ip.src`, `tcp.dstport`).
///
/// A key may be present with an empty sequence; consumers treat that the
/// same as an absent key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    fields: HashMap<String, Vec<String>>,
}

impl RawEvent {
    /// Create an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values for a key, replacing any previous ones.
    pub fn insert<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// All values recorded under `key`.
    #[must_use]
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// First value under `key`, if any.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode an event from JSON text.
    ///
    /// # Errors
    /// Returns error if the text is not JSON or not an object of fields.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decode an event from a JSON value.
    ///
    /// Accepts either a flat object (`{"ip.src": ["10.0.0.1"]}`) or the
    /// capture export envelope (`{"_source": {"layers": {...}}}`).
    ///
    /// # Errors
    /// Returns error if the value does not contain a field object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut object) = value else {
            return Err(serde_json::Error::custom("event must be a JSON object"));
        };

        let layers = match object.remove("_source") {
            Some(source) => extract_layers(source)?,
            None => object,
        };

        let fields = layers
            .into_iter()
            .map(|(key, value)| (key, field_values(value)))
            .collect();

        Ok(Self { fields })
    }
}

fn extract_layers(source: Value) -> Result<Map<String, Value>, serde_json::Error> {
    match source {
        Value::Object(mut source) => match source.remove("layers") {
            Some(Value::Object(layers)) => Ok(layers),
            _ => Err(serde_json::Error::custom("_source.layers must be a JSON object")),
        },
        _ => Err(serde_json::Error::custom("_source must be a JSON object")),
    }
}

/// Flatten one JSON field into its string values.
///
/// The sequence is read up to its first non-string element, so a null or
/// number in position 0 leaves the field empty rather than promoting a
/// later value. A bare string counts as a one-element sequence.
fn field_values(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().map_while(string).collect(),
        other => string(other).into_iter().collect(),
    }
}

fn string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for RawEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Target fields of a normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Timestamp,
    Src,
    Dst,
    Protocol,
    Info,
    GeoLocation,
    IpProtocol,
    TcpSrcport,
    TcpDstport,
    HttpHost,
    HttpUserAgent,
    DnsQryName,
    DnsA,
    WsExpertMessage,
}

/// Fixed-shape packet summary sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub timestamp: String,
    pub src: String,
    pub dst: String,
    pub protocol: String,
    pub info: String,
    pub geo_location: String,
    pub ip_protocol: String,
    pub tcp_srcport: String,
    pub tcp_dstport: String,
    pub http_host: String,
    pub http_user_agent: String,
    pub dns_qry_name: String,
    pub dns_a: String,
    pub ws_expert_message: String,
}

impl NormalizedRecord {
    /// A record with every field set to `value`.
    #[must_use]
    pub fn filled(value: &str) -> Self {
        Self {
            timestamp: value.to_owned(),
            src: value.to_owned(),
            dst: value.to_owned(),
            protocol: value.to_owned(),
            info: value.to_owned(),
            geo_location: value.to_owned(),
            ip_protocol: value.to_owned(),
            tcp_srcport: value.to_owned(),
            tcp_dstport: value.to_owned(),
            http_host: value.to_owned(),
            http_user_agent: value.to_owned(),
            dns_qry_name: value.to_owned(),
            dns_a: value.to_owned(),
            ws_expert_message: value.to_owned(),
        }
    }

    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Timestamp => &self.timestamp,
            Field::Src => &self.src,
            Field::Dst => &self.dst,
            Field::Protocol => &self.protocol,
            Field::Info => &self.info,
            Field::GeoLocation => &self.geo_location,
            Field::IpProtocol => &self.ip_protocol,
            Field::TcpSrcport => &self.tcp_srcport,
            Field::TcpDstport => &self.tcp_dstport,
            Field::HttpHost => &self.http_host,
            Field::HttpUserAgent => &self.http_user_agent,
            Field::DnsQryName => &self.dns_qry_name,
            Field::DnsA => &self.dns_a,
            Field::WsExpertMessage => &self.ws_expert_message,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Timestamp => &mut self.timestamp,
            Field::Src => &mut self.src,
            Field::Dst => &mut self.dst,
            Field::Protocol => &mut self.protocol,
            Field::Info => &mut self.info,
            Field::GeoLocation => &mut self.geo_location,
            Field::IpProtocol => &mut self.ip_protocol,
            Field::TcpSrcport => &mut self.tcp_srcport,
            Field::TcpDstport => &mut self.tcp_dstport,
            Field::HttpHost => &mut self.http_host,
            Field::HttpUserAgent => &mut self.http_user_agent,
            Field::DnsQryName => &mut self.dns_qry_name,
            Field::DnsA => &mut self.dns_a,
            Field::WsExpertMessage => &mut self.ws_expert_message,
        }
    }
}
