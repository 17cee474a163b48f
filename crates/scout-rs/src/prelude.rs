//! Convenience re-exports for common `scout-rs` types.
//!
//! ```ignore
//! use scout_rs::prelude::*;
//! ```

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ChatClient, ChatRequest, Message, MessageRole, ToolDef, json_schema_for};

// ── Agent runtime ───────────────────────────────────────────────────
pub use crate::agent::{
    CompositeEventHandler, EventHandler, EventObserver, Harness, HarnessConfig, HarnessEvent,
    HarnessResult, LoggingHandler, NoopHandler,
};

// ── Pricing ─────────────────────────────────────────────────────────
pub use crate::api::{ModelPricing, pricing_for_model};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::spec::ToolSpec;
pub use crate::tools::{FileToolsConfig, Tool, ToolFuture, ToolSet, parse_tool_args};
