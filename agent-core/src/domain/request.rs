// agent-core/src/domain/request.rs

use crate::domain::error::DomainError;
use std::path::PathBuf;

/// Whether an action's result is awaited in-flight or written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Blocking,
    NonBlocking,
}

/// An auxiliary data blob attached to a request envelope, forwarded to the
/// response as-is.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DebugChunk {
    pub id: String,
    pub payload: serde_json::Value,
}

/// What the Connector handed the request processor before it was turned
/// into an `ActionRequest`: the envelope plus whatever debug chunks were
/// attached and how many of them failed to parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedEnvelope {
    pub debug_chunks: Vec<DebugChunk>,
    pub num_invalid_debug: usize,
}

/// One inbound work item, immutable once constructed.
///
/// Invariant: `results_dir` is `Some` iff `kind == NonBlocking`. This is
/// enforced in `ActionRequest::new` rather than left as a debug-only
/// assertion, so a malformed request is rejected the moment it's built.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub id: String,
    pub transaction_id: String,
    pub sender: String,
    pub module: String,
    pub action: String,
    pub kind: RequestKind,
    pub params: serde_json::Value,
    pub parsed: ParsedEnvelope,
    pub results_dir: Option<PathBuf>,
}

impl ActionRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        transaction_id: impl Into<String>,
        sender: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
        kind: RequestKind,
        params: serde_json::Value,
        parsed: ParsedEnvelope,
        results_dir: Option<PathBuf>,
    ) -> Result<Self, DomainError> {
        match (kind, &results_dir) {
            (RequestKind::NonBlocking, None) => Err(DomainError::InvalidEnvelope(
                "non-blocking request is missing a results directory".to_string(),
            )),
            (RequestKind::Blocking, Some(_)) => Err(DomainError::InvalidEnvelope(
                "blocking request must not carry a results directory".to_string(),
            )),
            _ => Ok(Self {
                id: id.into(),
                transaction_id: transaction_id.into(),
                sender: sender.into(),
                module: module.into(),
                action: action.into(),
                kind,
                params,
                parsed,
                results_dir,
            }),
        }
    }

    /// `"<type> request <id> for <module> <action>"`, used only in logs.
    pub fn pretty_label(&self) -> String {
        let kind = match self.kind {
            RequestKind::Blocking => "blocking",
            RequestKind::NonBlocking => "non-blocking",
        };
        format!(
            "{} request {} for {} {}",
            kind, self.id, self.module, self.action
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn non_blocking_requires_results_dir() {
        let err = ActionRequest::new(
            "r1",
            "t1",
            "sender",
            "echo",
            "reflect",
            RequestKind::NonBlocking,
            serde_json::json!({}),
            ParsedEnvelope::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidEnvelope(_)));
    }

    #[test]
    fn blocking_rejects_results_dir() {
        let err = ActionRequest::new(
            "r1",
            "t1",
            "sender",
            "echo",
            "reflect",
            RequestKind::Blocking,
            serde_json::json!({}),
            ParsedEnvelope::default(),
            Some(PathBuf::from("/tmp/j/t1")),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidEnvelope(_)));
    }

    #[test]
    fn pretty_label_has_expected_format() {
        let req = ActionRequest::new(
            "r1",
            "t1",
            "sender",
            "echo",
            "reflect",
            RequestKind::Blocking,
            serde_json::json!({"x": "hi"}),
            ParsedEnvelope::default(),
            None,
        )
        .unwrap();
        assert_eq!(req.pretty_label(), "blocking request r1 for echo reflect");
    }
}
