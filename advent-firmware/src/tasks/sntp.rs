// SNTP Task - Synchronisiert die Wanduhr über UDP
use advent_core::SntpError;
use advent_core::sntp::{SNTP_PORT, build_request, parse_response};
use defmt::{Debug2Format, error, info, warn};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, Ipv4Address, Stack, dns::DnsQueryType};
use embassy_time::{Duration, Timer, with_timeout};

use crate::clock;
use crate::config::*;

/// SNTP Task - läuft parallel zum Adventskranz
///
/// - Wartet auf Netzwerk-Verbindung
/// - Fragt den NTP-Server ab und setzt die Wanduhr
/// - Wiederholt die Synchronisation stündlich, nach Fehlern schneller
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
#[embassy_executor::task]
pub async fn sntp_task(stack: &'static Stack<'static>) {
    info!("SNTP: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("SNTP: Network ready");

    loop {
        match sync_time(stack).await {
            Ok(unix_secs) => {
                let first = !clock::is_synced();
                clock::set_unix_time(unix_secs);
                if first {
                    info!("SNTP: Clock synced, unix time {}", unix_secs);
                } else {
                    info!("SNTP: Clock resynced, unix time {}", unix_secs);
                }
                Timer::after(Duration::from_secs(SNTP_RESYNC_SECS)).await;
            }
            Err(e) => {
                error!("SNTP: Sync failed: {}", e);
                info!("SNTP: Retrying in {}s...", SNTP_RETRY_DELAY_SECS);
                Timer::after(Duration::from_secs(SNTP_RETRY_DELAY_SECS)).await;
            }
        }
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Eine SNTP-Abfrage: DNS, Request senden, Antwort prüfen
///
/// Gibt die Server-Zeit als Unix-Sekunden zurück.
async fn sync_time(stack: &'static Stack<'static>) -> Result<u64, SntpTaskError> {
    info!("SNTP: Resolving '{}'...", NTP_SERVER);
    let server_ip = resolve_hostname(stack, NTP_SERVER).await?;
    info!("SNTP: Resolved to {}", Debug2Format(&server_ip));

    let mut rx_meta = [PacketMetadata::EMPTY; SNTP_UDP_METADATA_SLOTS];
    let mut tx_meta = [PacketMetadata::EMPTY; SNTP_UDP_METADATA_SLOTS];
    let mut rx_buffer = [0u8; SNTP_UDP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; SNTP_UDP_BUFFER_SIZE];
    let mut socket = UdpSocket::new(
        *stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket
        .bind(SNTP_LOCAL_PORT)
        .map_err(|_| SntpTaskError::SocketFailed)?;

    let request = build_request();
    socket
        .send_to(&request, (IpAddress::Ipv4(server_ip), SNTP_PORT))
        .await
        .map_err(|_| SntpTaskError::SendFailed)?;

    let mut response = [0u8; SNTP_UDP_BUFFER_SIZE];
    loop {
        let received = with_timeout(
            Duration::from_secs(SNTP_TIMEOUT_SECS),
            socket.recv_from(&mut response),
        )
        .await;

        let (len, meta) = match received {
            Ok(Ok(packet)) => packet,
            Ok(Err(_)) => return Err(SntpTaskError::ReceiveFailed),
            Err(_) => return Err(SntpTaskError::Timeout),
        };

        // Nur Antworten vom angefragten Server
        if meta.endpoint.addr != IpAddress::Ipv4(server_ip) || meta.endpoint.port != SNTP_PORT {
            warn!("SNTP: Ignoring packet from {}", Debug2Format(&meta.endpoint));
            continue;
        }

        return parse_response(&response[..len]).map_err(SntpTaskError::Packet);
    }
}

/// DNS-Auflösung mit Timeout
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<Ipv4Address, SntpTaskError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .ok_or(SntpTaskError::DnsResolutionFailed),
        Ok(Err(_)) => Err(SntpTaskError::DnsResolutionFailed),
        Err(_) => Err(SntpTaskError::DnsTimeout),
    }
}

/// SNTP Fehler-Typen
#[derive(Debug)]
enum SntpTaskError {
    DnsResolutionFailed,
    DnsTimeout,
    SocketFailed,
    SendFailed,
    ReceiveFailed,
    Timeout,
    Packet(SntpError),
}

impl defmt::Format for SntpTaskError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SntpTaskError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            SntpTaskError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            SntpTaskError::SocketFailed => defmt::write!(fmt, "Socket bind failed"),
            SntpTaskError::SendFailed => defmt::write!(fmt, "Send failed"),
            SntpTaskError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            SntpTaskError::Timeout => defmt::write!(fmt, "No response"),
            SntpTaskError::Packet(e) => defmt::write!(fmt, "Invalid response: {}", e),
        }
    }
}
