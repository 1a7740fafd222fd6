// agent-core/src/application/processor.rs

use crate::application::registry::ModuleRegistry;
use crate::domain::request::{ActionRequest, DebugChunk, ParsedEnvelope, RequestKind};
use crate::domain::DomainError;
use crate::ports::connector::{Connector, ResponseMessage};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, warn};

/// The minimal shape every inbound envelope must satisfy before it can even
/// be rejected meaningfully — the request id has to be extractable
/// regardless of whether the rest of the envelope is well-formed.
#[derive(Debug, Deserialize)]
struct EnvelopeFields {
    id: String,
    transaction_id: Option<String>,
    sender: Option<String>,
    module: Option<String>,
    action: Option<String>,
    #[serde(rename = "type")]
    kind: Option<RequestKind>,
    #[serde(default)]
    params: serde_json::Value,
    results_dir: Option<PathBuf>,
    #[serde(default)]
    debug: Vec<DebugChunk>,
    #[serde(default)]
    num_invalid_debug: usize,
}

/// Resolve an envelope's requested results directory against the agent's
/// configured results root: a relative path is joined onto the root, an
/// absolute one is taken as given, and either way the result must stay
/// inside the root once `.`/`..` components are resolved lexically — a
/// request cannot point the agent at an arbitrary filesystem location.
fn resolve_results_dir(root: &std::path::Path, requested: Option<PathBuf>) -> Result<Option<PathBuf>, String> {
    let Some(requested) = requested else {
        return Ok(None);
    };

    let joined = if requested.is_absolute() {
        requested
    } else {
        root.join(requested)
    };

    let normalized = normalize_lexically(&joined);
    if !normalized.starts_with(normalize_lexically(root)) {
        return Err(format!(
            "results directory '{}' is outside the configured results root '{}'",
            normalized.display(),
            root.display()
        ));
    }

    Ok(Some(normalized))
}

fn normalize_lexically(path: &std::path::Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Routes inbound envelopes to modules, enforces validity, and emits
/// responses. Holds the registry and a connector shared read-only across
/// all worker tasks; no per-request mutable state.
pub struct RequestProcessor {
    registry: Arc<ModuleRegistry>,
    connector: Arc<dyn Connector>,
    worker_permits: Arc<Semaphore>,
    results_root: PathBuf,
}

impl RequestProcessor {
    pub fn new(
        registry: Arc<ModuleRegistry>,
        connector: Arc<dyn Connector>,
        worker_pool_size: usize,
        results_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            connector,
            worker_permits: Arc::new(Semaphore::new(worker_pool_size.max(1))),
            results_root: results_root.into(),
        }
    }

    /// Handle one raw envelope end to end. Never panics and never returns an
    /// error to the caller — every failure kind is turned into a response
    /// message or a log line instead.
    #[instrument(skip(self, raw), fields(envelope.id = tracing::field::Empty))]
    pub async fn handle_envelope(&self, raw: serde_json::Value) {
        let id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        tracing::Span::current().record("envelope.id", &id.as_str());

        let fields: EnvelopeFields = match serde_json::from_value(raw) {
            Ok(fields) => fields,
            Err(e) => {
                self.send_pcp_error(&id, &format!("envelope could not be parsed: {e}")).await;
                return;
            }
        };

        let request = match self.build_request(fields) {
            Ok(request) => request,
            Err((transaction_id, description)) => {
                self.send_pxp_error(&transaction_id, &id, &description).await;
                return;
            }
        };

        if request.parsed.num_invalid_debug > 0 {
            warn!(
                request_id = %request.id,
                invalid_debug_count = request.parsed.num_invalid_debug,
                "request envelope carried invalid debug chunks"
            );
        }

        let module = match self.registry.resolve(&request.module, &request.action) {
            Some(m) => m,
            None => {
                self.send_pxp_error(
                    &request.transaction_id,
                    &request.id,
                    &format!("module '{}' has no action '{}'", request.module, request.action),
                )
                .await;
                return;
            }
        };

        if let Err(e) = module.validate_input(&request.action, &request.params) {
            self.send_pxp_error(&request.transaction_id, &request.id, &e.to_string()).await;
            return;
        }

        if request.kind == RequestKind::NonBlocking {
            self.send(ResponseMessage::Provisional {
                transaction_id: request.transaction_id.clone(),
                debug: request.parsed.debug_chunks.clone(),
            })
            .await;
        }

        let _permit = self.worker_permits.acquire().await;

        let outcome = match module.call(&request.action, &request).await {
            Ok(outcome) => outcome,
            Err(DomainError::ProcessingError(description)) => {
                self.send_pxp_error(&request.transaction_id, &request.id, &description).await;
                return;
            }
            Err(other) => {
                self.send_pxp_error(&request.transaction_id, &request.id, &other.to_string()).await;
                return;
            }
        };

        if let Err(e) = module.validate_result(&request.action, &outcome.results) {
            self.send_pxp_error(&request.transaction_id, &request.id, &e.to_string()).await;
            return;
        }

        let response = match request.kind {
            RequestKind::Blocking => ResponseMessage::Blocking {
                transaction_id: request.transaction_id.clone(),
                results: outcome.results,
                debug: request.parsed.debug_chunks.clone(),
            },
            RequestKind::NonBlocking => ResponseMessage::NonBlocking {
                transaction_id: request.transaction_id.clone(),
                job_id: request.id.clone(),
                results: outcome.results,
            },
        };
        self.send(response).await;
    }

    fn build_request(&self, fields: EnvelopeFields) -> Result<ActionRequest, (String, String)> {
        let transaction_id = fields.transaction_id.unwrap_or_default();
        let sender = fields.sender.ok_or_else(|| {
            (transaction_id.clone(), "envelope is missing 'sender'".to_string())
        })?;
        let module = fields.module.ok_or_else(|| {
            (transaction_id.clone(), "envelope is missing 'module'".to_string())
        })?;
        let action = fields.action.ok_or_else(|| {
            (transaction_id.clone(), "envelope is missing 'action'".to_string())
        })?;
        let kind = fields
            .kind
            .ok_or_else(|| (transaction_id.clone(), "envelope is missing 'type'".to_string()))?;

        let results_dir = resolve_results_dir(&self.results_root, fields.results_dir)
            .map_err(|e| (transaction_id.clone(), e))?;

        let parsed = ParsedEnvelope {
            debug_chunks: fields.debug,
            num_invalid_debug: fields.num_invalid_debug,
        };

        ActionRequest::new(
            fields.id,
            transaction_id.clone(),
            sender,
            module,
            action,
            kind,
            fields.params,
            parsed,
            results_dir,
        )
        .map_err(|e| (transaction_id, e.to_string()))
    }

    async fn send(&self, message: ResponseMessage) {
        let timeout = self.connector.send_timeout();
        match tokio::time::timeout(timeout, self.connector.send(message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "connector send failed, not retrying"),
            Err(_) => error!("connector send timed out after {timeout:?}, not retrying"),
        }
    }

    async fn send_pxp_error(&self, transaction_id: &str, id: &str, description: &str) {
        debug!(transaction_id, id, description, "emitting PXP error");
        self.send(ResponseMessage::PxpError {
            transaction_id: transaction_id.to_string(),
            id: id.to_string(),
            description: description.to_string(),
        })
        .await;
    }

    async fn send_pcp_error(&self, id: &str, description: &str) {
        debug!(id, description, "emitting PCP error");
        self.send(ResponseMessage::PcpError {
            id: id.to_string(),
            description: description.to_string(),
        })
        .await;
    }
}
