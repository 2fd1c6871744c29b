/// HTTP entry point for event batches
pub mod app;
/// Clients for the template store and the outbound queue
pub mod client;
/// Change detection between availability snapshots
pub mod detect;
/// Concurrent dispatch of outbound messages
pub mod dispatch;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Normalizing inbound envelopes into change records
pub mod extract;
/// The per-invocation notification pipeline
pub mod handler;
/// Building outbound email messages
pub mod message;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
/// Email templates
pub mod template;
/// Field-level validation of change records
pub mod validate;
