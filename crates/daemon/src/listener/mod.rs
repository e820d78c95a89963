// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and serving
//! each one on its own task. A connection carries one request and one
//! response, except `Subscribe`, which keeps the connection open and
//! streams manager events until the client goes away.

mod requests;

use std::sync::Arc;
use std::time::Instant;

use berth_adapters::{PartitionStore, ViewAdapter};
use berth_core::{Clock, IdGen};
use berth_engine::WorkspaceManager;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, Notify};
use tracing::{debug, error, info, warn};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT};

pub(crate) use requests::handle_request;

/// Shared context for every connection
pub struct ListenCtx<V, P, C, G> {
    pub manager: Arc<WorkspaceManager<V, P, C, G>>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub struct Listener<V, P, C, G> {
    socket: UnixListener,
    ctx: Arc<ListenCtx<V, P, C, G>>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl<V, P, C, G> Listener<V, P, C, G>
where
    V: ViewAdapter,
    P: PartitionStore,
    C: Clock,
    G: IdGen,
{
    pub fn new(socket: UnixListener, ctx: ListenCtx<V, P, C, G>) -> Self {
        Self {
            socket,
            ctx: Arc::new(ctx),
        }
    }

    /// Run the listener loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection<V, P, C, G>(
    stream: UnixStream,
    ctx: &ListenCtx<V, P, C, G>,
) -> Result<(), ConnectionError>
where
    V: ViewAdapter,
    P: PartitionStore,
    C: Clock,
    G: IdGen,
{
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    // Reads are polled often; log them at debug level
    if is_query(&request) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    if matches!(request, Request::Subscribe) {
        let events = ctx.manager.subscribe();
        protocol::write_response(&mut writer, &Response::Subscribed, DEFAULT_TIMEOUT).await?;
        return stream_events(events, &mut reader, &mut writer).await;
    }

    let response = handle_request(request, ctx).await;
    debug!("Sending response: {:?}", response);
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;

    Ok(())
}

/// Forward manager events to a subscriber until either side goes away.
async fn stream_events<R, W>(
    mut events: broadcast::Receiver<berth_core::ManagerEvent>,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), ConnectionError>
where
    R: AsyncReadExt + Unpin,
    W: tokio::io::AsyncWriteExt + Unpin,
{
    let mut probe = [0u8; 1];
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    let frame = Response::Event { event };
                    protocol::write_response(writer, &frame, DEFAULT_TIMEOUT).await?;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
            // Subscribers send nothing after the request; any read result
            // means the client hung up.
            _ = reader.read(&mut probe) => {
                debug!("subscriber disconnected");
                return Ok(());
            }
        }
    }
}

fn is_query(request: &Request) -> bool {
    matches!(
        request,
        Request::Ping
            | Request::Status
            | Request::ListWorkspaces
            | Request::GetWorkspace { .. }
            | Request::GetActiveWorkspace
            | Request::ListViews
            | Request::ListPartitions { .. }
            | Request::GetWindows { .. }
            | Request::GetSettings
    )
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
