//! In-memory mailbox and scan harness.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use billsweep::email::error::{EmailError, Result};
use billsweep::email::{
    MailScanner, MailboxFolder, MailboxProvider, MessageContext, ScanReport, ScanSettings,
    SpecialUse,
};
use billsweep::storage::AttachmentStore;
use billsweep::window::DateWindow;

use super::builders::FakeMessage;

/// Long enough to outlast any scan timeout used in tests.
const HANG: Duration = Duration::from_secs(30);

/// One folder on the fake server.
#[derive(Debug, Clone)]
pub struct FakeFolder {
    pub name: String,
    pub special_use: Option<SpecialUse>,
    pub messages: Vec<FakeMessage>,
    pub fail_examine: bool,
    pub fail_search: bool,
    /// A fetch batch containing any of these UIDs fails.
    pub failing_uids: HashSet<u32>,
    /// A fetch batch containing any of these UIDs never answers.
    pub hanging_uids: HashSet<u32>,
    /// Section fetches for these UIDs never answer.
    pub hanging_sections: HashSet<u32>,
}

impl FakeFolder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            special_use: None,
            messages: Vec::new(),
            fail_examine: false,
            fail_search: false,
            failing_uids: HashSet::new(),
            hanging_uids: HashSet::new(),
            hanging_sections: HashSet::new(),
        }
    }

    pub fn with_special_use(mut self, special_use: SpecialUse) -> Self {
        self.special_use = Some(special_use);
        self
    }

    pub fn with_message(mut self, message: FakeMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn failing_examine(mut self) -> Self {
        self.fail_examine = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_fetch_of(mut self, uid: u32) -> Self {
        self.failing_uids.insert(uid);
        self
    }

    pub fn hanging_fetch_of(mut self, uid: u32) -> Self {
        self.hanging_uids.insert(uid);
        self
    }

    pub fn hanging_sections_of(mut self, uid: u32) -> Self {
        self.hanging_sections.insert(uid);
        self
    }
}

/// `MailboxProvider` over in-memory folders, recording what was asked of it.
#[derive(Debug, Default)]
pub struct FakeMailbox {
    pub folders: Vec<FakeFolder>,
    pub fail_listing: bool,
    /// Every fetch reports a lost connection.
    pub connection_lost: bool,
    current: Option<usize>,
    pub examined: Vec<String>,
    pub fetched_batches: Vec<Vec<u32>>,
    pub section_fetches: Vec<(u32, Vec<u32>)>,
}

impl FakeMailbox {
    pub fn new(folders: Vec<FakeFolder>) -> Self {
        Self {
            folders,
            ..Self::default()
        }
    }

    fn folder(&self) -> Result<&FakeFolder> {
        self.current
            .map(|index| &self.folders[index])
            .ok_or_else(|| EmailError::FetchFailed("No folder open".to_string()))
    }
}

#[async_trait]
impl MailboxProvider for FakeMailbox {
    async fn list_folders(&mut self) -> Result<Vec<MailboxFolder>> {
        if self.fail_listing {
            return Err(EmailError::FolderAccess {
                folder: "*".to_string(),
                reason: "LIST not permitted".to_string(),
            });
        }
        Ok(self
            .folders
            .iter()
            .map(|f| MailboxFolder {
                name: f.name.clone(),
                special_use: f.special_use,
                selectable: true,
            })
            .collect())
    }

    async fn examine_folder(&mut self, folder: &str) -> Result<()> {
        self.examined.push(folder.to_string());
        let index = self
            .folders
            .iter()
            .position(|f| f.name == folder)
            .ok_or_else(|| EmailError::FolderAccess {
                folder: folder.to_string(),
                reason: "Mailbox doesn't exist".to_string(),
            })?;

        if self.folders[index].fail_examine {
            self.current = None;
            return Err(EmailError::FolderAccess {
                folder: folder.to_string(),
                reason: "NO EXAMINE failed".to_string(),
            });
        }
        self.current = Some(index);
        Ok(())
    }

    async fn search_window(&mut self, window: &DateWindow) -> Result<Vec<u32>> {
        let folder = self.folder()?;
        if folder.fail_search {
            return Err(EmailError::SearchFailed("NO SEARCH failed".to_string()));
        }

        let mut uids: Vec<u32> = folder
            .messages
            .iter()
            .filter(|m| m.date >= window.since() && m.date < window.before())
            .map(|m| m.context.uid)
            .collect();
        uids.sort_unstable();
        Ok(uids)
    }

    async fn fetch_messages(&mut self, uids: &[u32]) -> Result<Vec<MessageContext>> {
        self.fetched_batches.push(uids.to_vec());
        if self.connection_lost {
            return Err(EmailError::ConnectionFailed("connection reset".to_string()));
        }

        let folder = self.folder()?;
        if uids.iter().any(|uid| folder.failing_uids.contains(uid)) {
            return Err(EmailError::FetchFailed("BAD FETCH".to_string()));
        }
        if uids.iter().any(|uid| folder.hanging_uids.contains(uid)) {
            tokio::time::sleep(HANG).await;
        }

        Ok(folder
            .messages
            .iter()
            .filter(|m| uids.contains(&m.context.uid))
            .map(|m| m.context.clone())
            .collect())
    }

    async fn fetch_section(&mut self, uid: u32, path: &[u32]) -> Result<Vec<u8>> {
        self.section_fetches.push((uid, path.to_vec()));
        let folder = self.folder()?;
        if folder.hanging_sections.contains(&uid) {
            tokio::time::sleep(HANG).await;
        }

        folder
            .messages
            .iter()
            .find(|m| m.context.uid == uid)
            .and_then(|m| m.sections.get(path))
            .cloned()
            .ok_or_else(|| EmailError::FetchFailed(format!("no section {:?} in {}", path, uid)))
    }
}

/// Isolated output directory plus a helper to run a full scan.
pub struct TestHarness {
    temp_dir: TempDir,
    pub output_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_dir = temp_dir.path().join("invoices_2025-09");
        Self {
            temp_dir,
            output_dir,
        }
    }

    pub fn store(&self) -> AttachmentStore {
        AttachmentStore::new(&self.output_dir)
    }

    /// Scans September 2025 and returns the report with the mailbox, so
    /// tests can inspect what was requested.
    pub async fn scan(
        &self,
        mailbox: FakeMailbox,
        settings: ScanSettings,
    ) -> (Result<ScanReport>, FakeMailbox) {
        let window = DateWindow::for_month("2025-09").expect("valid month");
        let mut scanner = MailScanner::new(mailbox, settings);
        let result = scanner.scan(&window, &self.store()).await;
        (result, scanner.into_provider())
    }

    /// Sorted names of the files written so far.
    pub fn written_files(&self) -> Vec<String> {
        if !self.output_dir.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = std::fs::read_dir(&self.output_dir)
            .expect("read output dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn read(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.output_dir.join(name)).expect("read written file")
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
