//! Raw event to normalized record mapping.

use crate::event::{Field, NormalizedRecord, RawEvent};

/// Value used for any field the raw event does not carry.
pub const PLACEHOLDER: &str = "N/A";

/// Source key for each normalized field.
pub const FIELD_TABLE: [(&str, Field); 14] = [
    ("frame.time", Field::Timestamp),
    ("ip.src", Field::Src),
    ("ip.dst", Field::Dst),
    ("_ws.col.Protocol", Field::Protocol),
    ("_ws.col.Info", Field::Info),
    ("ip.geoip.dst_summary", Field::GeoLocation),
    ("ip.proto", Field::IpProtocol),
    ("tcp.srcport", Field::TcpSrcport),
    ("tcp.dstport", Field::TcpDstport),
    ("http.host", Field::HttpHost),
    ("http.user_agent", Field::HttpUserAgent),
    ("dns.qry.name", Field::DnsQryName),
    ("dns.a", Field::DnsA),
    ("_ws.expert.message", Field::WsExpertMessage),
];

/// Map a raw event onto the fixed record shape.
///
/// Only the first value of a multi-valued field is kept. Missing keys and
/// empty sequences both yield [`PLACEHOLDER`].
#[must_use]
pub fn normalize(raw: &RawEvent) -> NormalizedRecord {
    let mut record = NormalizedRecord::filled(PLACEHOLDER);
    for (key, field) in FIELD_TABLE {
        if let Some(value) = raw.first(key) {
            value.clone_into(record.slot_mut(field));
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_empty_event_is_all_placeholders() {
        let record = normalize(&RawEvent::new());
        for (_, field) in FIELD_TABLE {
            assert_eq!(record.get(field), PLACEHOLDER);
        }
    }

    #[test]
    fn test_empty_sequences_are_placeholders() {
        let mut raw = RawEvent::new();
        for (key, _) in FIELD_TABLE {
            raw.insert(key, Vec::<String>::new());
        }
        assert_eq!(normalize(&raw), NormalizedRecord::filled(PLACEHOLDER));
    }

    #[test]
    fn test_multi_valued_field_keeps_first() {
        let mut raw = RawEvent::new();
        raw.insert("dns.a", ["A", "B"]);
        let record = normalize(&raw);
        assert_eq!(record.dns_a, "A");
    }

    #[test]
    fn test_every_field_is_mapped() {
        let mut raw = RawEvent::new();
        for (key, _) in FIELD_TABLE {
            raw.insert(key, [format!("value of {key}")]);
        }
        let record = normalize(&raw);
        for (key, field) in FIELD_TABLE {
            assert_eq!(record.get(field), format!("value of {key}"));
        }

        let targets: HashSet<Field> = FIELD_TABLE.iter().map(|(_, f)| *f).collect();
        assert_eq!(targets.len(), FIELD_TABLE.len());
    }

    #[test]
    fn test_numeric_values_stay_strings() {
        let raw = RawEvent::from_json(r#"{"ip.proto": ["17"], "tcp.dstport": ["53"]}"#).unwrap();
        let record = normalize(&raw);
        assert_eq!(record.ip_protocol, "17");
        assert_eq!(record.tcp_dstport, "53");
        assert_eq!(record.src, PLACEHOLDER);
    }

    #[test]
    fn test_non_string_first_element_is_placeholder() {
        let raw = RawEvent::from_json(
            r#"{"ip.proto": [6], "dns.a": [null, "1.2.3.4"], "tcp.srcport": true}"#,
        )
        .unwrap();
        let record = normalize(&raw);
        assert_eq!(record.ip_protocol, PLACEHOLDER);
        assert_eq!(record.dns_a, PLACEHOLDER);
        assert_eq!(record.tcp_srcport, PLACEHOLDER);
    }
}
