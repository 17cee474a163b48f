//! Agent runtime: the [`Harness`] agentic loop and its supporting modules.
//!
//! - [`harness::Harness`]: the core tool-use loop. Start here.
//! - [`config::HarnessConfig`]: model, round limit, token and retry settings.
//! - [`events`]: [`EventHandler`] trait and [`HarnessEvent`] enum for
//!   observing the loop, plus [`LoggingHandler`], [`CompositeEventHandler`]
//!   and [`EventObserver`].

pub mod config;
pub mod events;
pub mod execution;
pub mod harness;

pub use config::{DEFAULT_MAX_ROUNDS, HarnessConfig};
pub use events::{
    CompositeEventHandler, EventHandler, EventObserver, HarnessEvent, HarnessResult,
    LoggingHandler, NoopHandler,
};
pub use harness::Harness;
