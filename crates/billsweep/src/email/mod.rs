//! Mailbox access and the scan pipeline.
//!
//! The scanner only talks to a [`MailboxProvider`]; [`ImapClient`] is the
//! implementation used against real servers.

pub mod client;
pub mod decoder;
pub mod error;
pub mod message;
pub mod provider;
pub mod scanner;
pub mod structure;

pub use client::ImapClient;
pub use error::EmailError;
pub use message::{
    Disposition, MailboxFolder, MessageContext, SpecialUse, StructureNode, TransferEncoding,
};
pub use provider::MailboxProvider;
pub use scanner::{select_folders, FolderReport, MailScanner, ScanReport, ScanSettings};
pub use structure::{find_attachments, AttachmentCandidate};
