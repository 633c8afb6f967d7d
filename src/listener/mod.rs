// ────────────────────────────────
// src/listener/mod.rs
// Binds a listening socket from an endpoint string and duplicates its
// descriptor so a caller can hand it across a process restart.
// ────────────────────────────────
use std::io;
use std::net::{TcpListener, ToSocketAddrs};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
#[cfg(unix)]
use std::os::unix::net::UnixListener;

use socket2::{Domain, SockAddr, Socket, Type};
use tracing::debug;

use crate::endpoint::{parse_endpoint_with_fallback, EndpointError, Protocol};

const LISTEN_BACKLOG: i32 = 1024;

/// A bound, listening socket of either supported family.
#[derive(Debug)]
pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Listener {
    /// Bound address in display form, for diagnostics.
    pub fn local_addr_string(&self) -> io::Result<String> {
        match self {
            Listener::Tcp(listener) => Ok(listener.local_addr()?.to_string()),
            #[cfg(unix)]
            Listener::Unix(listener) => {
                let addr = listener.local_addr()?;
                Ok(addr
                    .as_pathname()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "<unnamed>".to_string()))
            }
        }
    }
}

impl AsFd for Listener {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            Listener::Tcp(listener) => listener.as_fd(),
            #[cfg(unix)]
            Listener::Unix(listener) => listener.as_fd(),
        }
    }
}

// Custom error type for listener construction
#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error(transparent)]
    Resolution(#[from] EndpointError),

    #[error("failed to bind {addr:?}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("only support unix socket or tcp endpoint")]
    UnsupportedProtocol,

    #[error("failed to retrieve fd for {addr:?}: {source}")]
    DescriptorExport { addr: String, source: io::Error },
}

/// Bind a listening socket for `endpoint` and export its file descriptor.
///
/// Schemeless endpoints fall back to `tcp://` with a deprecation warning.
/// The returned descriptor is a duplicate of the listener's, suitable for
/// inheritance by a replacement process; both are owned by the caller.
pub fn create_listener_file(endpoint: &str) -> Result<(Listener, OwnedFd), ListenError> {
    let (protocol, addr) = parse_endpoint_with_fallback(endpoint, Protocol::Tcp)?;

    let listener = match protocol {
        Protocol::Tcp => Listener::Tcp(bind_tcp(&addr)?),
        #[cfg(unix)]
        Protocol::Unix => Listener::Unix(bind_unix(&addr)?),
        #[cfg(not(unix))]
        Protocol::Unix => return Err(ListenError::UnsupportedProtocol),
    };

    // The listener is dropped, and with it the socket closed, if the
    // descriptor cannot be duplicated.
    let file = listener
        .as_fd()
        .try_clone_to_owned()
        .map_err(|source| ListenError::DescriptorExport {
            addr: addr.clone(),
            source,
        })?;

    debug!(endpoint, addr = %addr, protocol = %protocol, "listener bound, descriptor exported");
    Ok((listener, file))
}

fn bind_tcp(addr: &str) -> Result<TcpListener, ListenError> {
    // Hostname resolution picks the first candidate address.
    let resolved = addr
        .to_socket_addrs()
        .map_err(|source| bind_error(addr, source))?
        .next()
        .ok_or_else(|| {
            bind_error(
                addr,
                io::Error::new(io::ErrorKind::AddrNotAvailable, "resolved to no addresses"),
            )
        })?;

    let socket = Socket::new(Domain::for_address(resolved), Type::STREAM, None)
        .map_err(|source| bind_error(addr, source))?;
    // Allow rebinding while connections from a previous run sit in TIME_WAIT.
    socket
        .set_reuse_address(true)
        .map_err(|source| bind_error(addr, source))?;
    socket
        .bind(&SockAddr::from(resolved))
        .map_err(|source| bind_error(addr, source))?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| bind_error(addr, source))?;

    Ok(socket.into())
}

#[cfg(unix)]
fn bind_unix(path: &str) -> Result<UnixListener, ListenError> {
    // A pre-existing socket file is never removed; binding over one surfaces
    // the OS address-in-use error as-is.
    let sockaddr = SockAddr::unix(path).map_err(|source| bind_error(path, source))?;

    let socket =
        Socket::new(Domain::UNIX, Type::STREAM, None).map_err(|source| bind_error(path, source))?;
    socket
        .bind(&sockaddr)
        .map_err(|source| bind_error(path, source))?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| bind_error(path, source))?;

    Ok(UnixListener::from(OwnedFd::from(socket)))
}

fn bind_error(addr: &str, source: io::Error) -> ListenError {
    ListenError::Bind {
        addr: addr.to_string(),
        source,
    }
}
