//! User-facing message output
//!
//! File operations never talk to the user directly. Callers that want to
//! surface an outcome hand it a [`MessageSink`].

/// Destination for informational and warning messages.
pub trait MessageSink {
    fn show_message(&self, text: &str);
    fn show_warning(&self, text: &str);
}

/// Sink that forwards messages to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn show_message(&self, text: &str) {
        tracing::info!("{}", text);
    }

    fn show_warning(&self, text: &str) {
        tracing::warn!("{}", text);
    }
}
