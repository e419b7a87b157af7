//! # Gridkey - answer keys for grid arithmetic questions
//!
//! Gridkey computes the digit-by-digit answer key of worked-arithmetic grid
//! questions (carries, borrows, partial products, long-division steps) and applies
//! the prefill masks that decide which digits a student sees.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Question    │────▶│   Router     │────▶│   Engines    │────▶│  Answer key  │
//! │  records     │     │ (op, layout) │     │ (+ masks)    │     │  or failure  │
//! └──────────────┘     └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gridkey::{compute_answer, AnswerRequest, Layout, Operation};
//!
//! let request = AnswerRequest::new(Operation::Multiplication, Layout::Grid, "23", "14")
//!     .with_multiply_steps_mask("FB|BFF")
//!     .with_result_mask("FBF");
//! let key = compute_answer(&request)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Operations, operands, question records and answer keys
//! - [`mask`] - Prefill mask parsing and application
//! - [`engine`] - Addition, subtraction, multiplication and division engines
//! - [`batch`] - Batch execution with per-record failures
//! - [`validation`] - Question record schema validation
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Answer keys
pub mod engine;
pub mod mask;

// Batches
pub mod batch;

// Validation
pub mod validation;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AnswerKeyError, BatchError, FailureKind, InputError, MaskError, OperandPair, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AnswerKey, FibAnswer, FibType, Layout, Operand, Operation, QuestionRecord};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use engine::{compute_answer, AnswerRequest};

// =============================================================================
// Re-exports - Batch
// =============================================================================

pub use batch::{execute, execute_values, load_records, BatchReport, FailedRecord, KeyedAnswer};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, is_valid_question_record, validate, validate_question_record};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, AnswerResponse, ValidationResponse};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
