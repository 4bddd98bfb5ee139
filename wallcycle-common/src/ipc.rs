use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;
use rustix::event::{PollFd, PollFlags};
use crate::command::NOOP;
use crate::error::{IpcError, WallcycleError};
use crate::Result;

pub const DEFAULT_PORT: u16 = 30301;

/// Upper bound for a blocked accept or read on the listener.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Each read is one command; longer messages are cut here.
pub const RECEIVE_BUFFER: usize = 1024;

pub fn default_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}

/// Fire-and-forget sender for the daemon's command listener.
pub struct IpcClient {
    addr: SocketAddr,
    stream: TcpStream,
}

impl IpcClient {
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| WallcycleError::Ipc(IpcError::Connection {
                addr: addr.to_string(),
                source: e,
            }))?;
        log::debug!("Connected to {}", addr);
        Ok(Self { addr, stream })
    }

    pub fn send(&mut self, command: &str) -> Result<()> {
        self.stream.write_all(command.as_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(|e| WallcycleError::Ipc(IpcError::Send { source: e }))?;
        log::debug!("Sent {:?} to {}", command, self.addr);
        Ok(())
    }
}

/// Single-client TCP listener. Only one connection is served at a time;
/// further clients wait in the backlog until the current one goes away.
pub struct IpcServer {
    listener: TcpListener,
    client: Option<TcpStream>,
    timeout: Duration,
}

impl IpcServer {
    /// Binds the listener. std enables `SO_REUSEADDR` on Unix, so a restart
    /// does not trip over sockets lingering in `TIME_WAIT`.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| WallcycleError::Ipc(IpcError::Bind {
                addr: addr.to_string(),
                source: e,
            }))?;

        log::info!("Listening for commands on {}", addr);
        Ok(Self { listener, client: None, timeout: RECEIVE_TIMEOUT })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    #[cfg(test)]
    pub(crate) fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Waits up to the timeout for a client and then for its next message.
    /// Returns the message text, or the `noop` sentinel when nothing arrived.
    pub fn receive(&mut self) -> String {
        self.accept();
        self.read()
    }

    fn accept(&mut self) {
        if self.client.is_some() {
            return;
        }

        let timeout_ms = i32::try_from(self.timeout.as_millis()).unwrap_or(i32::MAX);
        let mut fds = [PollFd::new(&self.listener, PollFlags::IN)];
        match rustix::event::poll(&mut fds, timeout_ms) {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                log::debug!("Polling the listener failed: {}", e);
                return;
            }
        }

        match self.listener.accept() {
            Ok((stream, peer)) => {
                log::info!("Accepted command client {}", peer);
                self.client = Some(stream);
            }
            Err(e) => log::debug!("Accept failed: {}", e),
        }
    }

    fn read(&mut self) -> String {
        let Some(stream) = self.client.as_mut() else {
            return NOOP.to_string();
        };

        let mut buffer = [0u8; RECEIVE_BUFFER];
        let received = stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|_| stream.read(&mut buffer));

        match received {
            Ok(0) => {
                log::info!("Command client disconnected");
                self.client = None;
                NOOP.to_string()
            }
            Ok(n) => String::from_utf8_lossy(&buffer[..n]).into_owned(),
            Err(e) => {
                log::debug!("Dropping command client: {}", e);
                self.client = None;
                NOOP.to_string()
            }
        }
    }
}
