//! Mailbox scanner that walks folders and saves invoice attachments.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::classify::{is_invite, resolve_service, AttachmentClassifier, SignalEvaluator};
use crate::config::Config;
use crate::sanitize::redact_address;
use crate::storage::{AttachmentStore, DedupTable, StoreOutcome};
use crate::window::DateWindow;

use super::decoder::decode_transfer;
use super::error::{EmailError, Result};
use super::message::{MailboxFolder, MessageContext, SpecialUse};
use super::provider::MailboxProvider;
use super::structure::{find_attachments, AttachmentCandidate};

/// Folder names skipped regardless of provider, compared lowercased.
const EXCLUDED_FOLDERS: &[&str] = &[
    "drafts",
    "draft",
    "sent",
    "sent items",
    "sent mail",
    "sent messages",
    "spam",
    "junk",
    "junk e-mail",
    "junk email",
    "trash",
    "bin",
    "deleted items",
    "deleted messages",
    "starred",
    "important",
];

/// Gmail's system hierarchy. Only its consolidated folder is scanned. Used
/// when the server does not advertise special-use roles.
const GMAIL_PREFIXES: &[&str] = &["[gmail]", "[google mail]"];
const GMAIL_ALL_MAIL: &str = "all mail";

/// Everything the scanner needs from the configuration.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub keywords: Vec<String>,
    pub user_email: String,
    pub inbox: String,
    pub batch_size: usize,
    pub fetch_timeout: Duration,
}

impl ScanSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keywords: config.keywords.clone(),
            user_email: config.email.clone(),
            inbox: config.inbox.clone(),
            batch_size: config.batch_size.max(1),
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

/// Outcome for one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub folder: String,
    /// Messages in the date window.
    pub messages: usize,
    /// Files written from this folder.
    pub written: usize,
    /// Why the folder was skipped, if it was.
    pub error: Option<String>,
}

/// Totals for a whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub folders: Vec<FolderReport>,
    /// Files actually written.
    pub written: usize,
    /// Attachments whose content was already written this scan.
    pub duplicates: usize,
    /// Attachments dropped because every candidate name was taken.
    pub dropped: usize,
    /// Attachments that failed to download or write.
    pub failed: usize,
    /// Message batches that could not be fetched.
    pub failed_batches: usize,
}

impl ScanReport {
    pub fn skipped_folders(&self) -> usize {
        self.folders.iter().filter(|f| f.error.is_some()).count()
    }
}

/// Drives a [`MailboxProvider`] through one date window.
pub struct MailScanner<P: MailboxProvider> {
    provider: P,
    settings: ScanSettings,
    classifier: AttachmentClassifier,
    signals: SignalEvaluator,
}

impl<P: MailboxProvider> MailScanner<P> {
    pub fn new(provider: P, mut settings: ScanSettings) -> Self {
        settings.batch_size = settings.batch_size.max(1);
        let classifier = AttachmentClassifier::new(&settings.keywords);
        let signals = SignalEvaluator::new(&settings.keywords, &settings.user_email);
        Self {
            provider,
            settings,
            classifier,
            signals,
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Hands the provider back, e.g. to disconnect it.
    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Scans every relevant folder, then the inbox, for messages inside
    /// `window` and stores qualifying attachments.
    ///
    /// Only fatal mailbox errors are returned; anything else skips the
    /// affected folder, batch or attachment and shows up in the report.
    pub async fn scan(
        &mut self,
        window: &DateWindow,
        store: &AttachmentStore,
    ) -> Result<ScanReport> {
        let span = info_span!("mail_scan", window = %window);
        self.scan_window(window, store).instrument(span).await
    }

    async fn scan_window(
        &mut self,
        window: &DateWindow,
        store: &AttachmentStore,
    ) -> Result<ScanReport> {
        info!("Scanning mailbox for {}", window);

        let limit = self.settings.fetch_timeout;
        let mut folders = match with_timeout(limit, "folder listing", self.provider.list_folders())
            .await
        {
            Ok(names) => select_folders(&names, &self.settings.inbox),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Could not list folders, scanning inbox only: {}", e);
                Vec::new()
            }
        };
        folders.push(self.settings.inbox.clone());

        let mut dedup = DedupTable::new();
        let mut report = ScanReport::default();

        for folder in folders {
            let span = info_span!("folder", name = %folder);
            let folder_report = self
                .scan_folder(&folder, window, store, &mut dedup, &mut report)
                .instrument(span)
                .await?;
            report.folders.push(folder_report);
        }

        info!(
            "Scan complete: {} written, {} duplicates, {} dropped, {} failed",
            report.written, report.duplicates, report.dropped, report.failed
        );
        Ok(report)
    }

    async fn scan_folder(
        &mut self,
        folder: &str,
        window: &DateWindow,
        store: &AttachmentStore,
        dedup: &mut DedupTable,
        report: &mut ScanReport,
    ) -> Result<FolderReport> {
        let limit = self.settings.fetch_timeout;
        let mut folder_report = FolderReport {
            folder: folder.to_string(),
            messages: 0,
            written: 0,
            error: None,
        };

        let uids = match self.open_and_search(folder, window).await {
            Ok(uids) => uids,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Skipping folder '{}': {}", folder, e);
                folder_report.error = Some(e.to_string());
                return Ok(folder_report);
            }
        };

        folder_report.messages = uids.len();
        if uids.is_empty() {
            debug!("No messages in '{}' for {}", folder, window);
            return Ok(folder_report);
        }
        info!("Found {} messages in '{}'", uids.len(), folder);

        let written_before = report.written;
        for batch in uids.chunks(self.settings.batch_size) {
            let messages =
                match with_timeout(limit, "message fetch", self.provider.fetch_messages(batch))
                    .await
                {
                    Ok(messages) => messages,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(
                            "Skipping batch of {} messages in '{}': {}",
                            batch.len(),
                            folder,
                            e
                        );
                        report.failed_batches += 1;
                        continue;
                    }
                };

            for message in &messages {
                self.process_message(message, store, dedup, report).await?;
            }
        }

        folder_report.written = report.written - written_before;
        Ok(folder_report)
    }

    async fn open_and_search(&mut self, folder: &str, window: &DateWindow) -> Result<Vec<u32>> {
        let limit = self.settings.fetch_timeout;
        with_timeout(limit, "folder open", self.provider.examine_folder(folder)).await?;
        with_timeout(limit, "search", self.provider.search_window(window)).await
    }

    /// Downloads every attachment of `message` that a signal or the
    /// classifier vouches for. Invitations are never downloaded.
    async fn process_message(
        &mut self,
        message: &MessageContext,
        store: &AttachmentStore,
        dedup: &mut DedupTable,
        report: &mut ScanReport,
    ) -> Result<()> {
        let candidates = find_attachments(message.structure.as_ref());
        if candidates.is_empty() {
            return Ok(());
        }

        let signals = self.signals.evaluate(message);
        let service = resolve_service(&message.sender, &message.subject);
        debug!(
            uid = message.uid,
            sender = %redact_address(&message.sender),
            attachments = candidates.len(),
            ?signals,
            service = service.unwrap_or(""),
            "Evaluating message"
        );

        for candidate in &candidates {
            if is_invite(&candidate.filename) {
                debug!("Skipping invitation '{}'", candidate.filename);
                continue;
            }
            if !signals.any() && !self.classifier.is_relevant(&candidate.filename) {
                debug!("Attachment '{}' not relevant", candidate.filename);
                continue;
            }

            match self.download(message.uid, candidate, service, store, dedup).await {
                Ok(StoreOutcome::Written { filename, .. }) => {
                    info!("Saved {}", filename);
                    report.written += 1;
                }
                Ok(StoreOutcome::Duplicate { existing }) => {
                    debug!(
                        "'{}' has the same content as {}",
                        candidate.filename, existing
                    );
                    report.duplicates += 1;
                }
                Ok(StoreOutcome::Exhausted { .. }) => {
                    report.dropped += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        "Failed to save '{}' from message {}: {}",
                        candidate.filename, message.uid, e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(())
    }

    async fn download(
        &mut self,
        uid: u32,
        candidate: &AttachmentCandidate,
        service: Option<&str>,
        store: &AttachmentStore,
        dedup: &mut DedupTable,
    ) -> Result<StoreOutcome> {
        let limit = self.settings.fetch_timeout;
        let raw = with_timeout(
            limit,
            "attachment fetch",
            self.provider.fetch_section(uid, &candidate.path),
        )
        .await?;

        let content = decode_transfer(&raw, candidate.encoding);
        if content.is_empty() {
            return Err(EmailError::EmptyAttachment {
                uid,
                section: candidate.section(),
            });
        }

        Ok(store.store(&content, &candidate.filename, service, dedup)?)
    }
}

/// Picks the folders to scan before the inbox, in server order.
///
/// A special-use role decides on its own: `\All` and `\Archive` are kept,
/// every other role is left out. Folders without a role fall back to name
/// rules, which drop Gmail's system folders other than "All Mail" and common
/// drafts/sent/spam/trash names. The inbox and `\Noselect` containers are
/// never returned.
pub fn select_folders(folders: &[MailboxFolder], inbox: &str) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for folder in folders {
        let trimmed = folder.name.trim();
        if trimmed.is_empty()
            || !folder.selectable
            || trimmed.eq_ignore_ascii_case(inbox)
            || selected.iter().any(|s| s == trimmed)
        {
            continue;
        }

        let keep = match folder.special_use {
            Some(SpecialUse::All | SpecialUse::Archive) => true,
            Some(_) => false,
            None => !is_excluded_folder(trimmed),
        };
        if keep {
            selected.push(trimmed.to_string());
        }
    }
    selected
}

fn is_excluded_folder(name: &str) -> bool {
    let lower = name.to_lowercase();

    for prefix in GMAIL_PREFIXES {
        if lower == *prefix {
            return true;
        }
        if let Some(rest) = lower.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
            return rest != GMAIL_ALL_MAIL;
        }
    }

    EXCLUDED_FOLDERS.contains(&lower.as_str())
}

/// Bounds a mailbox call by `limit`.
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(EmailError::Timeout(format!(
            "{} did not finish within {}s",
            what,
            limit.as_secs()
        ))),
    }
}
