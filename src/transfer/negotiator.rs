//! Data mode negotiation
//!
//! Arms passive or active mode from PASV replies and PORT arguments, and
//! hands out one connected data stream per transfer.

use log::{debug, info, warn};
use std::net::{SocketAddr, SocketAddrV4};
use tokio::net::{TcpSocket, TcpStream};

use crate::error::TransferError;
use crate::protocol::responses::ENTERING_PASSIVE;
use crate::protocol::{Reply, find_host_port_tuple, parse_host_port};
use crate::transfer::DataMode;

/// One pending inbound data connection at a time.
const ACTIVE_BACKLOG: u32 = 1;

#[derive(Debug, Default)]
pub struct DataNegotiator {
    mode: DataMode,
}

impl DataNegotiator {
    pub fn mode(&self) -> &DataMode {
        &self.mode
    }

    pub fn is_armed(&self) -> bool {
        self.mode.is_armed()
    }

    /// Arms passive mode from the host-port tuple in a PASV reply.
    ///
    /// The last tuple in the reply wins. Without one the current mode is
    /// kept and the next transfer fails on its own.
    pub fn on_passive_reply(&mut self, reply: &Reply) -> Option<SocketAddrV4> {
        let Some(target) = find_host_port_tuple(&reply.text()) else {
            warn!("No host-port tuple in PASV reply, data mode unchanged ({})", self.mode);
            return None;
        };

        if reply.code() != Some(ENTERING_PASSIVE) {
            warn!("PASV answered with {:?}, using its tuple anyway", reply.code());
        }
        if self.mode.is_active() {
            debug!("Closing active listener in favour of passive mode");
        }
        self.mode = DataMode::Passive(target);
        info!("Passive mode armed: data connections go to {}", target);
        Some(target)
    }

    /// Binds a listener on the `h1,h2,h3,h4,p1,p2` endpoint of a PORT argument.
    ///
    /// Any previous mode is dropped first, so on failure the mode stays `None`.
    pub fn on_active_request(&mut self, args: &str) -> Result<SocketAddr, TransferError> {
        self.reset();

        let address = parse_host_port(args)?;
        let listener = bind_listener(address)?;
        let local = listener
            .local_addr()
            .map_err(|e| TransferError::BindFailed(address, e))?;

        self.mode = DataMode::Active(listener);
        info!("Active mode armed: listening on {}", local);
        Ok(local)
    }

    /// Connects out (passive) or accepts one connection (active).
    pub async fn acquire_data_connection(&mut self) -> Result<TcpStream, TransferError> {
        match &self.mode {
            DataMode::None => Err(TransferError::NoDataMode),
            DataMode::Passive(target) => {
                debug!("Connecting to passive endpoint {}", target);
                let stream = TcpStream::connect(*target)
                    .await
                    .map_err(|e| TransferError::ConnectFailed(*target, e))?;
                info!("Data connection opened to {}", target);
                Ok(stream)
            }
            DataMode::Active(listener) => {
                debug!("Waiting for the server to open the data connection");
                let (stream, peer) = listener
                    .accept()
                    .await
                    .map_err(TransferError::AcceptFailed)?;
                info!("Data connection accepted from {}", peer);
                Ok(stream)
            }
        }
    }

    /// Drops the armed mode, closing an active listener.
    pub fn reset(&mut self) {
        if self.mode.is_armed() {
            debug!("Tearing down data mode ({})", self.mode);
        }
        self.mode = DataMode::None;
    }
}

fn bind_listener(address: SocketAddrV4) -> Result<tokio::net::TcpListener, TransferError> {
    let bind_err = |e: std::io::Error| TransferError::BindFailed(address, e);

    let socket = TcpSocket::new_v4().map_err(bind_err)?;
    socket.set_reuseaddr(true).map_err(bind_err)?;
    socket.bind(SocketAddr::V4(address)).map_err(bind_err)?;
    socket.listen(ACTIVE_BACKLOG).map_err(bind_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passive_reply(text: &str) -> Reply {
        Reply::new(Some(ENTERING_PASSIVE), false, vec![text.to_string()])
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    fn port_args(port: u16) -> String {
        format!("127,0,0,1,{},{}", port / 256, port % 256)
    }

    #[test]
    fn test_passive_reply_arms_endpoint() {
        let mut negotiator = DataNegotiator::default();
        let target =
            negotiator.on_passive_reply(&passive_reply("227 Entering Passive Mode (10,0,0,1,117,231)"));

        assert_eq!(target, Some("10.0.0.1:30183".parse::<SocketAddrV4>().unwrap()));
        assert!(matches!(negotiator.mode(), DataMode::Passive(addr) if addr.port() == 30183));
    }

    #[test]
    fn test_passive_reply_without_tuple_keeps_mode() {
        let mut negotiator = DataNegotiator::default();
        assert!(negotiator.on_passive_reply(&passive_reply("502 Not implemented")).is_none());
        assert!(!negotiator.is_armed());

        negotiator.on_passive_reply(&passive_reply("227 (127,0,0,1,19,136)"));
        negotiator.on_passive_reply(&passive_reply("425 try later"));
        assert!(matches!(negotiator.mode(), DataMode::Passive(addr) if addr.port() == 5000));
    }

    #[test]
    fn test_second_passive_reply_replaces_first() {
        let mut negotiator = DataNegotiator::default();
        negotiator.on_passive_reply(&passive_reply("227 (127,0,0,1,19,136)"));
        negotiator.on_passive_reply(&passive_reply("227 (127,0,0,2,19,137)"));

        assert!(matches!(
            negotiator.mode(),
            DataMode::Passive(addr) if *addr == "127.0.0.2:5001".parse::<SocketAddrV4>().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_active_request_binds_requested_endpoint() {
        let port = free_port();
        let mut negotiator = DataNegotiator::default();

        let local = negotiator.on_active_request(&port_args(port)).unwrap();
        assert_eq!(local, SocketAddr::from(([127, 0, 0, 1], port)));
        assert!(negotiator.mode().is_active());
    }

    #[tokio::test]
    async fn test_active_request_can_rebind_same_port() {
        let port = free_port();
        let mut negotiator = DataNegotiator::default();

        negotiator.on_active_request(&port_args(port)).unwrap();
        negotiator.on_active_request(&port_args(port)).unwrap();
        assert!(negotiator.mode().is_active());
    }

    #[tokio::test]
    async fn test_invalid_active_request_leaves_no_mode() {
        let mut negotiator = DataNegotiator::default();
        negotiator.on_passive_reply(&passive_reply("227 (127,0,0,1,19,136)"));

        let err = negotiator.on_active_request("127,0,0,1").unwrap_err();
        assert!(matches!(err, TransferError::InvalidHostPort(_)));
        assert!(!negotiator.is_armed());
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_no_mode() {
        let mut negotiator = DataNegotiator::default();

        // 192.0.2.0/24 is reserved for documentation and never local.
        let err = negotiator.on_active_request("192,0,2,1,8,72").unwrap_err();
        assert!(matches!(err, TransferError::BindFailed(..)));
        assert!(!negotiator.is_armed());
    }

    #[tokio::test]
    async fn test_switching_to_passive_closes_listener() {
        let port = free_port();
        let mut negotiator = DataNegotiator::default();
        let local = negotiator.on_active_request(&port_args(port)).unwrap();

        negotiator.on_passive_reply(&passive_reply("227 (127,0,0,1,19,136)"));
        assert!(matches!(negotiator.mode(), DataMode::Passive(_)));
        assert!(TcpStream::connect(local).await.is_err());
    }

    #[tokio::test]
    async fn test_switching_to_active_drops_passive_target() {
        let port = free_port();
        let mut negotiator = DataNegotiator::default();
        negotiator.on_passive_reply(&passive_reply("227 (127,0,0,1,19,136)"));

        negotiator.on_active_request(&port_args(port)).unwrap();
        assert!(negotiator.mode().is_active());
    }

    #[tokio::test]
    async fn test_acquire_without_mode() {
        let mut negotiator = DataNegotiator::default();
        let err = negotiator.acquire_data_connection().await.unwrap_err();
        assert!(matches!(err, TransferError::NoDataMode));
    }

    #[tokio::test]
    async fn test_acquire_passive_connects_to_target() {
        let server = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();
        let mut negotiator = DataNegotiator::default();
        negotiator.on_passive_reply(&passive_reply(&format!("227 ({})", port_args(port))));

        let stream = negotiator.acquire_data_connection().await.unwrap();
        let (_accepted, peer) = server.accept().await.unwrap();
        assert_eq!(peer, stream.local_addr().unwrap());
        assert!(negotiator.is_armed());
    }

    #[tokio::test]
    async fn test_acquire_active_accepts_one_connection() {
        let port = free_port();
        let mut negotiator = DataNegotiator::default();
        let local = negotiator.on_active_request(&port_args(port)).unwrap();

        let dialer = tokio::spawn(async move { TcpStream::connect(local).await.unwrap() });
        let accepted = negotiator.acquire_data_connection().await.unwrap();
        let dialed = dialer.await.unwrap();

        assert_eq!(accepted.peer_addr().unwrap(), dialed.local_addr().unwrap());
        assert!(negotiator.mode().is_active());
    }

    #[tokio::test]
    async fn test_reset_closes_listener() {
        let port = free_port();
        let mut negotiator = DataNegotiator::default();
        let local = negotiator.on_active_request(&port_args(port)).unwrap();

        negotiator.reset();
        assert!(!negotiator.is_armed());
        assert!(TcpStream::connect(local).await.is_err());
    }
}
