//! Heuristics that decide what gets downloaded and how it is named.

pub mod attachment;
pub mod service;
pub mod signals;

pub use attachment::{is_invite, AttachmentClassifier};
pub use service::{resolve_service, service_from_sender, service_from_subject};
pub use signals::{has_billing_signature, MessageSignals, SignalEvaluator};
