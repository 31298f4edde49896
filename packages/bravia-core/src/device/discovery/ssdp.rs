//! SSDP multicast discovery of BRAVIA televisions.
//!
//! One socket per usable IPv4 interface is used for both sending the M-SEARCH
//! and receiving replies, since devices answer unicast to the sending port.
//! Sockets live only for the listening window and are dropped on every exit
//! path.

use local_ip_address::list_afinet_netifas;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};

use super::types::{is_virtual_interface, DeviceSet, DiscoveredDevice, DiscoveryError};
use crate::device::utils::{
    contains_ignore_ascii_case, extract_ip_from_location, extract_model_from_server_info,
    extract_uuid_from_usn, starts_with_ignore_ascii_case,
};
use crate::protocol_constants::{
    AV_SERVER_INFO_HEADER, DEFAULT_DISCOVERY_TIMEOUT_MS, SCALAR_WEB_API_SEARCH_TARGET,
};

/// Standard SSDP multicast group and port.
pub const MULTICAST_ADDR: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);

/// Builds the M-SEARCH message for the Scalar Web API service.
pub fn build_msearch_message(mx: u64) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: 239.255.255.250:1900\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\r\n",
        mx, SCALAR_WEB_API_SEARCH_TARGET
    )
}

/// Configuration for SSDP discovery.
#[derive(Debug, Clone)]
pub struct SsdpConfig {
    /// Number of M-SEARCH packets to send per interface.
    pub send_count: u64,
    /// Delay between M-SEARCH repeats.
    pub retry_delay: Duration,
    /// Total listening window.
    pub discovery_timeout: Duration,
    /// MX value (max response delay in seconds).
    pub mx_value: u64,
}

impl Default for SsdpConfig {
    fn default() -> Self {
        Self {
            send_count: 2,
            retry_delay: Duration::from_millis(500),
            discovery_timeout: Duration::from_millis(DEFAULT_DISCOVERY_TIMEOUT_MS),
            mx_value: 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interfaces & Sockets
// ─────────────────────────────────────────────────────────────────────────────

/// Network interface used for discovery.
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Interface name (e.g., "en0", "eth0").
    pub name: String,
    /// IPv4 address bound to this interface.
    pub ip: Ipv4Addr,
}

/// Gets all usable network interfaces for discovery.
///
/// Filters out virtual/container interfaces and loopback.
pub fn get_interfaces() -> Vec<InterfaceInfo> {
    list_afinet_netifas()
        .unwrap_or_else(|e| {
            log::warn!("[SSDP] Failed to list network interfaces: {}", e);
            Vec::new()
        })
        .into_iter()
        .filter_map(|(name, addr)| {
            if is_virtual_interface(&name) {
                log::debug!("[SSDP] Skipping virtual interface: {}", name);
                return None;
            }
            match addr {
                IpAddr::V4(ip) if !ip.is_loopback() => {
                    log::debug!("[SSDP] Using interface {} ({})", name, ip);
                    Some(InterfaceInfo { name, ip })
                }
                _ => None,
            }
        })
        .collect()
}

/// Creates a non-blocking UDP socket bound to `iface_ip` on an ephemeral port.
pub fn create_socket(iface_ip: Ipv4Addr) -> Result<UdpSocket, DiscoveryError> {
    let bind_addr = SocketAddr::new(IpAddr::V4(iface_ip), 0);

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(DiscoveryError::SocketBind)?;

    if let Err(e) = socket.set_reuse_address(true) {
        log::warn!("[SSDP] Failed to set SO_REUSEADDR on {}: {}", iface_ip, e);
    }

    // UPnP 1.0 recommends a TTL of 4 for SSDP multicast
    if let Err(e) = socket.set_multicast_ttl_v4(4) {
        log::warn!("[SSDP] Failed to set multicast TTL on {}: {}", iface_ip, e);
    }

    if !iface_ip.is_loopback() {
        if let Err(e) = socket.set_multicast_if_v4(&iface_ip) {
            log::warn!("[SSDP] Failed to set multicast interface {}: {}", iface_ip, e);
        }
    }

    socket
        .set_nonblocking(true)
        .map_err(DiscoveryError::SocketBind)?;
    socket
        .bind(&bind_addr.into())
        .map_err(DiscoveryError::SocketBind)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).map_err(DiscoveryError::SocketBind)
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the trimmed value of header `name` (ASCII case-insensitive).
fn header_value<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    response.lines().find_map(|line| {
        let colon = line.find(':')?;
        let (key, value) = line.split_at(colon);
        (key.trim().len() == name.len() && starts_with_ignore_ascii_case(key.trim(), name))
            .then(|| value[1..].trim())
    })
}

/// Parses an SSDP response into a device.
///
/// Returns None if the response does not advertise the Scalar Web API.
pub fn parse_ssdp_response(response: &str) -> Option<DiscoveredDevice> {
    if !contains_ignore_ascii_case(response, SCALAR_WEB_API_SEARCH_TARGET) {
        return None;
    }

    Some(DiscoveredDevice {
        ip: header_value(response, "location").and_then(extract_ip_from_location),
        uuid: header_value(response, "usn").and_then(extract_uuid_from_usn),
        model: header_value(response, AV_SERVER_INFO_HEADER)
            .and_then(extract_model_from_server_info),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Sends up to `config.send_count` searches to `target`, spaced by the retry
/// delay. Repeats that would fall on or after `deadline` are skipped.
///
/// Succeeds if at least one send went out.
async fn send_searches(
    socket: &UdpSocket,
    label: &str,
    target: SocketAddr,
    message: &[u8],
    config: &SsdpConfig,
    deadline: Instant,
) -> std::io::Result<()> {
    let mut last_error = None;
    let mut sent_any = false;

    for i in 0..config.send_count {
        if i > 0 {
            let next = Instant::now() + config.retry_delay;
            if next >= deadline {
                log::trace!(
                    "[SSDP] Skipping {} remaining M-SEARCH(es) on {}: window closes first",
                    config.send_count - i,
                    label
                );
                break;
            }
            tokio::time::sleep_until(next).await;
        }
        match socket.send_to(message, target).await {
            Ok(_) => {
                sent_any = true;
                log::trace!("[SSDP] Sent M-SEARCH from {} to {}", label, target);
            }
            Err(e) => {
                log::warn!(
                    "[SSDP] Failed to send M-SEARCH on {} to {} (attempt {}): {}",
                    label,
                    target,
                    i + 1,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    match (sent_any, last_error) {
        (false, Some(e)) => Err(e),
        _ => Ok(()),
    }
}

/// Collects responses on `socket` until `deadline`.
async fn receive_responses(
    socket: &UdpSocket,
    label: &str,
    deadline: Instant,
    devices: &Mutex<DeviceSet>,
) {
    let mut buf = [0u8; 2048];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, socket.recv_from(&mut buf)).await {
            Ok(Ok((amt, src))) => {
                let response = String::from_utf8_lossy(&buf[..amt]);
                log::trace!("[SSDP] {} bytes from {} on {}", amt, src, label);
                if let Some(device) = parse_ssdp_response(&response) {
                    let mut devices = devices.lock().await;
                    if devices.insert(device.clone()) {
                        log::debug!("[SSDP] Discovered {:?} via {}", device, label);
                    }
                }
            }
            Ok(Err(e)) => {
                log::warn!("[SSDP] Socket recv error on {}: {}", label, e);
            }
            Err(_) => break,
        }
    }
}

/// Runs one search over already-bound sockets and returns the unique devices
/// in first-seen order.
///
/// All sockets send to `target` and listen for the whole window concurrently.
/// An empty result is [`DiscoveryError::NoneFound`].
pub async fn search(
    sockets: Vec<(InterfaceInfo, UdpSocket)>,
    target: SocketAddr,
    config: &SsdpConfig,
) -> Result<Vec<DiscoveredDevice>, DiscoveryError> {
    let message = build_msearch_message(config.mx_value);
    let devices = Mutex::new(DeviceSet::new());
    let deadline = Instant::now() + config.discovery_timeout;

    let sockets: Vec<(String, UdpSocket)> = sockets
        .into_iter()
        .map(|(iface, socket)| (format!("{} ({})", iface.name, iface.ip), socket))
        .collect();

    log::debug!(
        "[SSDP] Starting discovery on {} interface(s) ({} sends with {}ms spacing, {}ms window)",
        sockets.len(),
        config.send_count,
        config.retry_delay.as_millis(),
        config.discovery_timeout.as_millis()
    );

    let send_futures = sockets.iter().map(|(label, socket)| {
        send_searches(socket, label, target, message.as_bytes(), config, deadline)
    });
    let recv_futures = sockets
        .iter()
        .map(|(label, socket)| receive_responses(socket, label, deadline, &devices));

    let (send_results, _) = tokio::join!(
        futures::future::join_all(send_futures),
        futures::future::join_all(recv_futures)
    );
    drop(sockets);

    let devices = devices.into_inner();
    if devices.is_empty() {
        if let Some(Err(e)) = send_results
            .into_iter()
            .reduce(|acc, r| if acc.is_ok() { acc } else { r })
        {
            return Err(DiscoveryError::SendSearch(e));
        }
        log::info!("[SSDP] Discovery complete: no devices answered");
        return Err(DiscoveryError::NoneFound);
    }

    log::info!("[SSDP] Discovery complete: {} device(s) found", devices.len());
    Ok(devices.into_vec())
}

/// Discovers televisions on every usable interface.
///
/// # Errors
///
/// - [`DiscoveryError::NoInterfaces`] if no socket could be bound
/// - [`DiscoveryError::SendSearch`] if every send failed
/// - [`DiscoveryError::NoneFound`] if nothing answered
pub async fn discover_multicast(
    config: &SsdpConfig,
) -> Result<Vec<DiscoveredDevice>, DiscoveryError> {
    let interfaces = get_interfaces();
    if interfaces.is_empty() {
        return Err(DiscoveryError::NoInterfaces);
    }

    let mut sockets = Vec::with_capacity(interfaces.len());
    for iface in interfaces {
        match create_socket(iface.ip) {
            Ok(socket) => sockets.push((iface, socket)),
            Err(e) => {
                log::warn!(
                    "[SSDP] Failed to create socket for {} ({}): {}",
                    iface.name,
                    iface.ip,
                    e
                );
            }
        }
    }

    if sockets.is_empty() {
        return Err(DiscoveryError::NoInterfaces);
    }

    search(sockets, SocketAddr::V4(MULTICAST_ADDR), config).await
}
