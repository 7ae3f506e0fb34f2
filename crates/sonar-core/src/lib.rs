//! # Sonar Core
//!
//! Pure analytics behind the Sonar crypto chat dashboard.
//!
//! Everything in this crate is synchronous and side-effect free: a query or a
//! wallet snapshot goes in, a plain data structure comes out. The server crate
//! wires these pieces to the upstream data providers and the language model.

pub mod behavior;
pub mod error;
pub mod extract;
pub mod format;
pub mod intent;
pub mod models;
pub mod planner;
pub mod profiler;
pub mod prompt;

pub use behavior::*;
pub use error::*;
pub use intent::detect_intent;
pub use models::*;
pub use planner::{plan_fetches, Endpoint, FetchDescriptor};
pub use profiler::profile_wallet;
