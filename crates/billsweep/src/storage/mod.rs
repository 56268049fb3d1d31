pub mod dedup;
pub mod filesystem;

pub use dedup::{content_digest, DedupTable};
pub use filesystem::{prefixed_filename, AttachmentStore, StoreOutcome, MAX_NAMING_ATTEMPTS};
