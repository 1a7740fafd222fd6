// agent-core/src/ports/connector.rs

// This file defines what the core needs from the broker link, without
// knowing how it's done. Analogy: it's the electrical outlet in the wall —
// it defines the shape and the voltage, but not whether the electricity
// comes from a WebSocket, a Unix socket, or an in-memory test channel.

use crate::domain::DebugChunk;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Default Connector-send timeout.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// The five message kinds the core emits through the Connector.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "message_type")]
pub enum ResponseMessage {
    #[serde(rename = "provisional")]
    Provisional {
        transaction_id: String,
        debug: Vec<DebugChunk>,
    },
    #[serde(rename = "blocking_response")]
    Blocking {
        transaction_id: String,
        results: serde_json::Value,
        debug: Vec<DebugChunk>,
    },
    #[serde(rename = "non_blocking_response")]
    NonBlocking {
        transaction_id: String,
        job_id: String,
        results: serde_json::Value,
    },
    /// Application-level error: the request reached a module but failed.
    #[serde(rename = "pxp_error")]
    PxpError {
        transaction_id: String,
        id: String,
        description: String,
    },
    /// Transport-level error: the envelope itself couldn't be understood.
    #[serde(rename = "pcp_error")]
    PcpError { id: String, description: String },
}

/// Whatever the transport implementation wants to report back. The core
/// only ever logs it and moves on; it never retries a failed send.
#[derive(Error, Debug)]
#[error("connector send failed: {0}")]
pub struct ConnectorError(pub String);

#[async_trait]
pub trait Connector: Send + Sync {
    async fn send(&self, message: ResponseMessage) -> Result<(), ConnectorError>;

    /// Send timeout for this connector; defaults to 2 seconds.
    fn send_timeout(&self) -> Duration {
        DEFAULT_SEND_TIMEOUT
    }
}
