//! Network side of meshperf: the backend client, the SSE push channel of a run and the
//! orchestrator that drives a [`meshperf_core::Session`] through a load test.
pub mod runtime;
pub mod sse;

mod channel;
mod client;
mod error;
mod orchestrator;

pub use crate::channel::{ChannelMessage, ChannelSlot, PushChannel};
pub use crate::client::ApiClient;
pub use crate::error::{ClientError, RuntimeError};
pub use crate::orchestrator::{Orchestrator, RunOutcome};
pub use crate::runtime::{MeshperfCli, MeshperfRuntime};
