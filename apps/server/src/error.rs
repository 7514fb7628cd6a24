use std::io;
use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bind host {host:?} is not an IP address")]
    BindHost {
        host: String,
        #[source]
        source: AddrParseError,
    },
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server stopped with an I/O error")]
    Run(#[source] io::Error),
}
