// agent/src/connector.rs

use agent_core::ports::connector::{Connector, ConnectorError, ResponseMessage};
use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// A line-delimited-JSON stand-in for the broker's WebSocket/TLS link
/// (out of scope per the core's design — see `ports::connector`). Every
/// `ResponseMessage` is serialized and written as one line to stdout; this
/// is enough to drive the agent end-to-end locally (tests, manual probing)
/// without pretending to implement the real transport.
pub struct StdioConnector {
    out: Mutex<Stdout>,
}

impl StdioConnector {
    pub fn new() -> Self {
        Self { out: Mutex::new(tokio::io::stdout()) }
    }
}

impl Default for StdioConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for StdioConnector {
    async fn send(&self, message: ResponseMessage) -> Result<(), ConnectorError> {
        let mut line = serde_json::to_vec(&message)
            .map_err(|e| ConnectorError(format!("failed to encode response: {e}")))?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line)
            .await
            .map_err(|e| ConnectorError(format!("failed to write response: {e}")))?;
        out.flush().await.map_err(|e| ConnectorError(format!("failed to flush response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sends_without_error() {
        let connector = StdioConnector::new();
        let result = connector
            .send(ResponseMessage::PcpError { id: "r1".to_string(), description: "x".to_string() })
            .await;
        assert!(result.is_ok());
    }
}
