//! Relay client used by the HTTP front end.
//!
//! Each `send` opens a fresh connection to the ingestion server, writes one
//! encoded message and closes the socket. There is no acknowledgement: a
//! successful return only means the bytes were handed to the kernel.

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use postbox_types::models::FormSubmission;

use crate::ingest::READ_CHUNK_SIZE;
use crate::protocol;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("cannot connect to ingest server at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to send message to {addr}: {source}")]
    Write {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encoded message is {len} bytes, the ingest server reads at most {max}")]
    TooLarge { len: usize, max: usize },
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    addr: String,
}

impl RelayClient {
    /// `addr` is a `host:port` pair; host names are resolved on every send.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub async fn send(&self, form: &FormSubmission) -> Result<(), RelayError> {
        let payload = protocol::encode(form.iter());
        // The ingest server decodes each read as a whole message.
        if payload.len() > READ_CHUNK_SIZE {
            return Err(RelayError::TooLarge {
                len: payload.len(),
                max: READ_CHUNK_SIZE,
            });
        }

        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| RelayError::Connect {
                addr: self.addr.clone(),
                source,
            })?;

        let write_err = |source| RelayError::Write {
            addr: self.addr.clone(),
            source,
        };
        stream.write_all(&payload).await.map_err(write_err)?;
        stream.shutdown().await.map_err(write_err)?;

        debug!("Relay: sent {} bytes to {}", payload.len(), self.addr);
        Ok(())
    }
}
