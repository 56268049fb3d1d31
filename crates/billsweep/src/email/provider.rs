//! The mailbox operations the scanner needs.

use async_trait::async_trait;

use super::error::Result;
use super::message::{MailboxFolder, MessageContext};
use crate::window::DateWindow;

/// Read-only access to a mailbox.
///
/// [`super::ImapClient`] talks to a real server; tests substitute an
/// in-memory mailbox.
#[async_trait]
pub trait MailboxProvider: Send {
    /// Every folder the account can see, with its special-use role if the
    /// server reports one.
    async fn list_folders(&mut self) -> Result<Vec<MailboxFolder>>;

    /// Opens `folder` read-only. Later calls operate on it.
    async fn examine_folder(&mut self, folder: &str) -> Result<()>;

    /// UIDs of messages in the open folder dated inside `window`, ascending.
    async fn search_window(&mut self, window: &DateWindow) -> Result<Vec<u32>>;

    /// Headers, structure and plain body of the given messages.
    async fn fetch_messages(&mut self, uids: &[u32]) -> Result<Vec<MessageContext>>;

    /// Raw, still transfer-encoded bytes of one body part.
    async fn fetch_section(&mut self, uid: u32, path: &[u32]) -> Result<Vec<u8>>;
}
