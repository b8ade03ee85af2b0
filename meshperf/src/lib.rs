#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

#[macro_use]
#[doc(hidden)]
pub mod macros;

pub mod load_test;

pub use load_test::{ConfigurableLoadTest, LoadTest};
pub use meshperf_core::*;

cfg_rt! {
    pub use meshperf_runtime::runtime::{self, MeshperfCli, MeshperfRuntime};
    pub use meshperf_runtime::sse;
    pub use meshperf_runtime::{
        ApiClient, ChannelMessage, ChannelSlot, ClientError, Orchestrator, PushChannel, RunOutcome,
        RuntimeError,
    };
}

pub mod prelude {
    pub use crate::load_test::{ConfigurableLoadTest, LoadTest};
    pub use meshperf_core::{
        EventType, LoadGenerator, Notification, Notify, Phase, RecordingNotifier, TestResult,
        TracingNotifier,
    };

    cfg_rt! {
        pub use meshperf_runtime::{MeshperfRuntime, Orchestrator, RunOutcome, RuntimeError};
    }
}
