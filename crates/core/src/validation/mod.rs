//! Refund admissibility.
//!
//! This module provides:
//! - The refund request and its field-level guards
//! - The refund error taxonomy and its status mapping
//! - The ordered validation pipeline

pub mod error;
pub mod pipeline;
pub mod request;

pub use error::RefundError;
pub use pipeline::{ApprovedRefund, ValidationPipeline};
pub use request::RefundRequest;
