//! Feature-gated `tracing` hooks.
//!
//! With the `tracing` feature enabled these macros forward to the `tracing`
//! crate; without it they expand to nothing, so the hot paths of the trie
//! carry no logging cost.

/// Emits a trace-level event describing a node shape transition.
macro_rules! trace_transition {
    ($($argument:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: "hashtrie::node", $($argument)*);
    }};
}

/// Emits a debug-level event from the key providers.
macro_rules! debug_provider {
    ($($argument:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: "hashtrie::provider", $($argument)*);
    }};
}

pub(crate) use debug_provider;
pub(crate) use trace_transition;
