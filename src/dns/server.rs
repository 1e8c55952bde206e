use crate::dns::handlers::Handler;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use trust_dns_server::ServerFuture;

/// Bind a UDP socket for the DNS server.
pub(crate) async fn bind(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    UdpSocket::bind(addr).await
}

/// A DNS server answering on `socket` with `handler`.
pub(crate) fn new(handler: Handler, socket: UdpSocket) -> ServerFuture<Handler> {
    let mut dns_server = ServerFuture::new(handler);
    dns_server.register_socket(socket);
    dns_server
}
