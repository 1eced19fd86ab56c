use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use twirl_domain::DomainError;

/// Binds a non-blocking UDP socket and registers it with the tokio reactor.
///
/// The port is held exclusively: no `SO_REUSEADDR`, so a second listener on
/// the same address fails with [`DomainError::Bind`]. IPv6 addresses are
/// bound dual-stack.
pub fn bind_udp_socket(addr: SocketAddr) -> Result<UdpSocket, DomainError> {
    let bind_err = |e: std::io::Error| DomainError::Bind {
        addr: addr.to_string(),
        reason: e.to_string(),
    };

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).map_err(bind_err)?;
    if addr.is_ipv6() {
        socket.set_only_v6(false).map_err(bind_err)?;
    }
    socket.bind(&addr.into()).map_err(bind_err)?;
    socket.set_nonblocking(true).map_err(bind_err)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).map_err(bind_err)
}
