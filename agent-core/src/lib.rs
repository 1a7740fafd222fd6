// agent-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Defines the contracts this crate depends on but does not implement
// (Connector, Validator).
pub mod ports;

// 2. Domain (core business rules)
// Module sum type, ActionRequest/ActionOutcome, the four error kinds.
// Depends on nothing else (no infra, no application).
pub mod domain;

// 3. Infrastructure (adapters)
// Technical implementation: child-process spawning, results directory,
// JSON-schema compilation, external-module probing/loading.
// Depends on domain and ports.
pub mod infrastructure;

// 4. Application (use cases)
// Orchestration: module registry, request processor, outcome parsing.
// Depends on domain, infrastructure and ports.
pub mod application;

// --- CONFIGURATION ---
pub mod config;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// Lets callers import the top-level error easily: use agent_core::AgentError;
pub use error::AgentError;
