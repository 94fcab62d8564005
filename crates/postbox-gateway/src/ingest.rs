//! Ingestion server.
//!
//! A plain TCP listener that serves one client at a time: a connection is
//! read until the peer closes it, and only then is the next one accepted.
//! Clients that connect in the meantime wait in the listen backlog.
//!
//! Every chunk read from the socket is treated as one wire message.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use postbox_types::models::StoredRecord;
use postbox_types::sink::RecordSink;

use crate::protocol::{self, MalformedMessage};

/// Size of each socket read.
pub const READ_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Error)]
#[error("failed to bind {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    #[source]
    pub source: std::io::Error,
}

pub struct IngestServer {
    listener: TcpListener,
    sink: Arc<dyn RecordSink>,
}

impl IngestServer {
    pub async fn bind(addr: SocketAddr, sink: Arc<dyn RecordSink>) -> Result<Self, BindError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BindError { addr, source })?;
        Ok(Self { listener, sink })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections sequentially. Runs until the task is cancelled.
    pub async fn run(self) {
        if let Ok(addr) = self.local_addr() {
            info!("Ingest server listening on {}", addr);
        }

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    info!("Ingest: connected by {}", peer);
                    self.handle_connection(stream, peer).await;
                    info!("Ingest: {} disconnected", peer);
                }
                Err(e) => {
                    error!("Ingest accept error: {}", e);
                }
            }
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        let mut buf = [0u8; READ_CHUNK_SIZE];

        loop {
            let n = match stream.read(&mut buf).await {
                Ok(0) => return,
                Ok(n) => n,
                Err(e) => {
                    warn!("Ingest: read error from {}: {}", peer, e);
                    return;
                }
            };

            match parse_message(&buf[..n]) {
                Ok(record) => self.persist(record).await,
                Err(e) => warn!("Ingest: skipping malformed message from {}: {}", peer, e),
            }
        }
    }

    async fn persist(&self, record: StoredRecord) {
        debug!(
            "Ingest: storing message from '{}' at {}",
            record.username, record.date
        );

        let sink = self.sink.clone();
        let result = tokio::task::spawn_blocking(move || {
            let outcome = sink.insert(&record);
            (record, outcome)
        })
        .await;

        match result {
            Ok((record, Ok(()))) => debug!("Ingest: record handed to sink: {:?}", record),
            Ok((record, Err(e))) => error!("Ingest: dropping record from '{}': {}", record.username, e),
            Err(e) => error!("spawn_blocking join error: {}", e),
        }
    }
}

/// Decode one wire message and stamp it with the current local time.
pub fn parse_message(bytes: &[u8]) -> Result<StoredRecord, MalformedMessage> {
    let fields = protocol::decode(bytes)?;
    protocol::extract_record(&fields, Local::now())
}
