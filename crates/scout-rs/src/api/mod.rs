//! API support between the [`Harness`](crate::agent::harness::Harness) loop
//! and the chat completions endpoint:
//!
//! - [`retry`]: transient error detection (429, 5xx, network timeouts) with
//!   exponential backoff. Never retries 400/401 errors.
//! - [`pricing`]: run trace ids, per-model pricing and the cumulative
//!   [`CostTracker`].

pub mod pricing;
pub mod retry;

pub use pricing::{CostTracker, ModelPricing, generate_trace_id, pricing_for_model};
pub use retry::RetryConfig;
