//! Parsing helpers shared by the transport and discovery code.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

// ─────────────────────────────────────────────────────────────────────────────
// XML
// ─────────────────────────────────────────────────────────────────────────────

/// Escapes all XML special characters (`& < > " '`).
pub fn escape_xml(value: &str) -> String {
    html_escape::encode_quoted_attribute(value).into_owned()
}

/// Extracts text content from the first occurrence of an XML element.
///
/// Matches on the local name, so namespace prefixes are ignored. Returns
/// `None` if the element is missing or the document is not XML.
pub fn extract_xml_text(xml: &str, element_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let target = element_name.as_bytes();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == target => {
                if let Ok(text) = reader.read_text(e.name()) {
                    let text = text.to_string();
                    return Some(html_escape::decode_html_entities(&text).into_owned());
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    None
}

/// Extracts a human-readable error from a SOAP/UPnP fault body.
///
/// Prefers the UPnP `errorDescription`, then the SOAP `faultstring`.
pub fn extract_fault_message(xml: &str) -> Option<String> {
    extract_xml_text(xml, "errorDescription")
        .or_else(|| extract_xml_text(xml, "faultstring"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// SSDP Headers
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts the host IPv4 address from a location URL.
///
/// `"http://192.168.1.114:52323/dmr.xml"` yields `"192.168.1.114"`.
pub fn extract_ip_from_location(location: &str) -> Option<String> {
    let rest = location
        .strip_prefix("http://")
        .or_else(|| location.strip_prefix("https://"))?;
    let authority = rest.split('/').next()?;
    let host = authority.split(':').next()?;

    let is_ipv4 = host.split('.').count() == 4
        && host
            .split('.')
            .all(|octet| !octet.is_empty() && octet.bytes().all(|b| b.is_ascii_digit()));

    is_ipv4.then(|| host.to_string())
}

/// Extracts the device UUID from a USN header value.
///
/// `"uuid:1234-abcd::urn:schemas-sony-com:service:ScalarWebAPI:1"` yields
/// `"1234-abcd"`.
pub fn extract_uuid_from_usn(usn: &str) -> Option<String> {
    let idx = find_ignore_ascii_case(usn, "uuid:")?;
    let uuid = usn[idx + 5..].split("::").next()?.trim();
    (!uuid.is_empty()).then(|| uuid.to_string())
}

/// Extracts the `mn="..."` model name from an `X-AV-Server-Info` value.
///
/// `av=5.0; cn="Sony Corporation"; mn="BRAVIA KDL-50W800B"; mv="2.0";`
/// yields `"BRAVIA KDL-50W800B"`.
pub fn extract_model_from_server_info(info: &str) -> Option<String> {
    info.split(';')
        .map(str::trim)
        .find_map(|field| field.strip_prefix("mn="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|model| !model.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// ASCII Case-Insensitive Helpers
// ─────────────────────────────────────────────────────────────────────────────
//
// HTTP headers are ASCII, so byte-level comparison avoids to_lowercase()
// allocations while parsing a burst of SSDP responses.

/// Checks if `haystack` contains `needle` (ASCII case-insensitive).
#[inline]
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    find_ignore_ascii_case(haystack, needle).is_some()
}

/// Checks if `s` starts with `prefix` (ASCII case-insensitive).
#[inline]
pub fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Finds the byte index of `needle` in `haystack` (ASCII case-insensitive).
#[inline]
pub fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_xml_escapes_special_characters() {
        assert_eq!(escape_xml("AAAAAQAAAAEAAAASAw=="), "AAAAAQAAAAEAAAASAw==");
        let escaped = escape_xml(r#"<a href="x">&'"#);
        assert!(escaped.starts_with("&lt;a href=&quot;x&quot;&gt;&amp;"));
        assert!(!escaped.contains(['<', '>', '"', '\'']));
    }

    #[test]
    fn extract_xml_text_ignores_namespace_prefix() {
        let xml = r#"<s:Envelope><s:Body><u:Code>42</u:Code></s:Body></s:Envelope>"#;
        assert_eq!(extract_xml_text(xml, "Code"), Some("42".to_string()));
        assert_eq!(extract_xml_text(xml, "Missing"), None);
        assert_eq!(extract_xml_text("not xml at all", "Code"), None);
    }

    #[test]
    fn extract_fault_message_prefers_upnp_description() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>800</errorCode>
          <errorDescription>Invalid IRCC code</errorDescription>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;
        assert_eq!(
            extract_fault_message(xml),
            Some("Invalid IRCC code".to_string())
        );

        let plain = r#"<s:Fault><faultstring>Action failed</faultstring></s:Fault>"#;
        assert_eq!(extract_fault_message(plain), Some("Action failed".to_string()));
    }

    #[test]
    fn extract_ip_from_location_handles_ports_and_paths() {
        assert_eq!(
            extract_ip_from_location("http://192.168.1.114:52323/dmr.xml"),
            Some("192.168.1.114".to_string())
        );
        assert_eq!(
            extract_ip_from_location("http://10.0.0.5/sony/webapi/ssdp/dd.xml"),
            Some("10.0.0.5".to_string())
        );
        assert_eq!(extract_ip_from_location("http://tv.local:80/dd.xml"), None);
        assert_eq!(extract_ip_from_location("ftp://10.0.0.5/"), None);
    }

    #[test]
    fn extract_uuid_from_usn_strips_urn_suffix() {
        assert_eq!(
            extract_uuid_from_usn(
                "uuid:00000000-0000-1010-8000-ac9b0a19cede::urn:schemas-sony-com:service:ScalarWebAPI:1"
            ),
            Some("00000000-0000-1010-8000-ac9b0a19cede".to_string())
        );
        assert_eq!(
            extract_uuid_from_usn("UUID:abc"),
            Some("abc".to_string())
        );
        assert_eq!(extract_uuid_from_usn("urn:only"), None);
        assert_eq!(extract_uuid_from_usn("uuid:"), None);
    }

    #[test]
    fn extract_model_from_server_info_reads_mn_field() {
        assert_eq!(
            extract_model_from_server_info(
                r#"av=5.0; cn="Sony Corporation"; mn="BRAVIA KDL-50W800B"; mv="2.0";"#
            ),
            Some("BRAVIA KDL-50W800B".to_string())
        );
        assert_eq!(extract_model_from_server_info(r#"av=5.0; cn="Sony""#), None);
    }

    #[test]
    fn test_ascii_case_helpers() {
        assert!(contains_ignore_ascii_case("Hello World", "world"));
        assert!(!contains_ignore_ascii_case("ab", "abc"));
        assert!(starts_with_ignore_ascii_case("location: http://", "LOCATION:"));
        assert!(!starts_with_ignore_ascii_case("X-Custom: value", "usn:"));
        assert_eq!(find_ignore_ascii_case("USN: UUID:abc", "uuid:"), Some(5));
        assert_eq!(find_ignore_ascii_case("test", ""), Some(0));
    }
}
