//! Best-effort ONVIF camera discovery
//!
//! One WS-Discovery Probe multicast onto the LAN, then collect whatever
//! ProbeMatch datagrams arrive before the deadline. No retry, no backoff, no
//! protocol validation: an empty result is a perfectly normal outcome and
//! malformed responders are skipped. Results carry the conventional RTSP
//! path guess so a discovered device can be offered as an add-camera
//! prefill.

use crate::error::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// WS-Discovery multicast group
const WS_DISCOVERY_ADDR: &str = "239.255.255.250:3702";
const MULTICAST_TTL: u32 = 128;
const RECV_BUFFER_SIZE: usize = 8192;

/// A device that answered the probe
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredCamera {
    pub ip: IpAddr,
    /// Service addresses from the ProbeMatch, verbatim
    pub xaddrs: String,
    pub name: String,
    /// Conventional RTSP guess; most ONVIF cameras stream on 554
    pub rtsp_url: String,
}

/// Build the WS-Discovery Probe envelope
fn probe_envelope(message_id: &Uuid) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<e:Envelope xmlns:e="http://www.w3.org/2003/05/soap-envelope""#,
            r#" xmlns:w="http://schemas.xmlsoap.org/ws/2004/08/addressing""#,
            r#" xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery""#,
            r#" xmlns:dn="http://www.onvif.org/ver10/network/wsdl">"#,
            r#"<e:Header><w:MessageID>uuid:{}</w:MessageID>"#,
            r#"<w:To>urn:schemas-xmlsoap-org:ws:2005:04:discovery</w:To>"#,
            r#"<w:Action>http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe</w:Action>"#,
            r#"</e:Header><e:Body><d:Probe>"#,
            r#"<d:Types>dn:NetworkVideoTransmitter</d:Types>"#,
            r#"</d:Probe></e:Body></e:Envelope>"#
        ),
        message_id
    )
}

/// Extract an XML element value with namespace-agnostic matching.
/// WS-Discovery responders disagree on prefixes, so match both `<Tag>` and
/// `<ns:Tag>` and take the text up to the next tag.
fn extract_xml_value(xml: &str, tag: &str) -> Option<String> {
    let patterns = [format!("<{}>", tag), format!(":{}>", tag)];
    for pattern in &patterns {
        if let Some(start) = xml.find(pattern.as_str()) {
            let after = &xml[start + pattern.len()..];
            if let Some(end) = after.find('<') {
                let value = after[..end].trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Build a result record from one ProbeMatch datagram
fn parse_probe_match(xml: &str, ip: IpAddr) -> DiscoveredCamera {
    let xaddrs = extract_xml_value(xml, "XAddrs").unwrap_or_default();
    DiscoveredCamera {
        ip,
        xaddrs,
        name: ip.to_string(),
        rtsp_url: format!("rtsp://{}:554/Streaming/Channels/101", ip),
    }
}

/// Probe the local network for ONVIF cameras.
///
/// Sends a single multicast Probe and listens until `window` elapses.
/// Responders are deduplicated by source address.
pub async fn probe(window: Duration) -> Result<Vec<DiscoveredCamera>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_multicast_ttl_v4(MULTICAST_TTL)?;

    let payload = probe_envelope(&Uuid::new_v4());
    socket
        .send_to(payload.as_bytes(), WS_DISCOVERY_ADDR)
        .await?;
    debug!(window_ms = window.as_millis() as u64, "ONVIF probe sent");

    let deadline = Instant::now() + window;
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut seen: HashSet<IpAddr> = HashSet::new();
    let mut found = Vec::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        match timeout(remaining, socket.recv_from(&mut buf)).await {
            // window elapsed
            Err(_) => break,
            Ok(Err(e)) => {
                warn!(error = %e, "ONVIF probe receive failed");
                break;
            }
            Ok(Ok((len, from))) => {
                let ip = from.ip();
                if !seen.insert(ip) {
                    continue;
                }
                let xml = String::from_utf8_lossy(&buf[..len]);
                let camera = parse_probe_match(&xml, ip);
                debug!(ip = %ip, xaddrs = %camera.xaddrs, "ONVIF responder");
                found.push(camera);
            }
        }
    }

    debug!(count = found.len(), "ONVIF probe finished");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PROBE_MATCH: &str = concat!(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope""#,
        r#" xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery">"#,
        r#"<SOAP-ENV:Body><d:ProbeMatches><d:ProbeMatch>"#,
        r#"<d:Types>dn:NetworkVideoTransmitter</d:Types>"#,
        r#"<d:XAddrs>http://192.168.1.64/onvif/device_service</d:XAddrs>"#,
        r#"</d:ProbeMatch></d:ProbeMatches></SOAP-ENV:Body></SOAP-ENV:Envelope>"#
    );

    #[test]
    fn test_probe_envelope_shape() {
        let id = Uuid::new_v4();
        let envelope = probe_envelope(&id);
        assert!(envelope.contains(&format!("uuid:{}", id)));
        assert!(envelope.contains("dn:NetworkVideoTransmitter"));
        assert!(envelope.contains("discovery/Probe"));
    }

    #[test]
    fn test_extract_xml_value_namespaced() {
        assert_eq!(
            extract_xml_value(SAMPLE_PROBE_MATCH, "XAddrs").as_deref(),
            Some("http://192.168.1.64/onvif/device_service")
        );
    }

    #[test]
    fn test_extract_xml_value_unprefixed() {
        let xml = "<XAddrs> http://10.0.0.4/onvif </XAddrs>";
        assert_eq!(
            extract_xml_value(xml, "XAddrs").as_deref(),
            Some("http://10.0.0.4/onvif")
        );
    }

    #[test]
    fn test_extract_xml_value_missing() {
        assert!(extract_xml_value("<Other>value</Other>", "XAddrs").is_none());
    }

    #[test]
    fn test_parse_probe_match_builds_rtsp_guess() {
        let ip: IpAddr = "192.168.1.64".parse().unwrap();
        let camera = parse_probe_match(SAMPLE_PROBE_MATCH, ip);
        assert_eq!(camera.name, "192.168.1.64");
        assert_eq!(camera.xaddrs, "http://192.168.1.64/onvif/device_service");
        assert_eq!(camera.rtsp_url, "rtsp://192.168.1.64:554/Streaming/Channels/101");
    }

    #[test]
    fn test_parse_probe_match_tolerates_garbage() {
        let ip: IpAddr = "10.0.0.9".parse().unwrap();
        let camera = parse_probe_match("not xml at all", ip);
        assert!(camera.xaddrs.is_empty());
        assert_eq!(camera.rtsp_url, "rtsp://10.0.0.9:554/Streaming/Channels/101");
    }
}
