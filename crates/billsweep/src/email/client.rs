//! IMAP client for reading a mailbox without modifying it.

use std::collections::HashMap;

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use futures_util::StreamExt;
use async_imap::types::{Name, NameAttribute};
use imap_proto::types::{
    Address, BodyContentCommon, BodyContentSinglePart, BodyParams, BodyStructure,
    ContentEncoding, SectionPath,
};
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;
use crate::sanitize::redact_address;

use super::decoder::decode_header_words;
use super::error::{EmailError, Result};
use super::message::{
    Disposition, MailboxFolder, MessageContext, SpecialUse, StructureNode, TransferEncoding,
};
use super::provider::MailboxProvider;
use crate::window::DateWindow;

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// Items requested per message. `PEEK` keeps the `\Seen` flag untouched.
const MESSAGE_FETCH_ITEMS: &str = "(UID ENVELOPE BODYSTRUCTURE BODY.PEEK[TEXT])";

/// IMAP client for the scanned account.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
    config: Config,
    current_folder: Option<String>,
}

impl ImapClient {
    /// Creates a new IMAP client with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            session: None,
            config,
            current_folder: None,
        }
    }

    /// Connects to the IMAP server and logs in with the app password.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Already connected to IMAP server");
            return Ok(());
        }

        if !self.config.use_tls {
            return Err(EmailError::ConfigError(
                "TLS is required for secure email connections".to_string(),
            ));
        }

        let password = self.get_password()?;

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Connecting to IMAP server at {}", addr);

        // Establish TCP connection using std::net and wrap with async-io
        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;

        let tls = TlsConnector::new();
        let tls_stream = tls
            .connect(&self.config.host, tcp_stream)
            .await
            .map_err(|e| EmailError::TlsError(e.to_string()))?;

        let client = async_imap::Client::new(tls_stream);

        let session = client
            .login(&self.config.email, password.expose_secret())
            .await
            .map_err(|(e, _)| EmailError::AuthenticationFailed(e.to_string()))?;

        info!(
            "Authenticated to IMAP server as {}",
            redact_address(&self.config.email)
        );
        self.session = Some(session);
        Ok(())
    }

    /// Gets the password from configured sources (direct value, file, or env var).
    fn get_password(&self) -> Result<SecretString> {
        if self.config.auth.password_insecure.is_some() {
            warn!(
                "Using direct password value (passwordInsecure) is not recommended. \
                 Consider using passwordEnvVar or passwordFile instead."
            );
        }
        Ok(crate::secrets::resolve_password(&self.config.auth)?)
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session
            .as_mut()
            .ok_or_else(|| EmailError::ConnectionFailed("Not connected".to_string()))
    }

    /// Name of the folder most recently opened with EXAMINE.
    pub fn current_folder(&self) -> Option<&str> {
        self.current_folder.as_deref()
    }

    /// Disconnects from the IMAP server gracefully.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            info!("Disconnecting from IMAP server");
            session
                .logout()
                .await
                .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        }
        self.current_folder = None;
        Ok(())
    }

    /// Checks if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

#[async_trait]
impl MailboxProvider for ImapClient {
    async fn list_folders(&mut self) -> Result<Vec<MailboxFolder>> {
        let session = self.session_mut()?;

        let names = session
            .list(Some(""), Some("*"))
            .await
            .map_err(|e| EmailError::FolderAccess {
                folder: "*".to_string(),
                reason: e.to_string(),
            })?
            .collect::<Vec<_>>()
            .await;

        let mut folders = Vec::with_capacity(names.len());
        for name in names {
            match name {
                Ok(name) => folders.push(mailbox_folder(&name)),
                Err(e) => warn!("Skipping unreadable folder entry: {}", e),
            }
        }

        debug!("Server reported {} folders", folders.len());
        Ok(folders)
    }

    /// Opens a folder in read-only mode using EXAMINE (not SELECT).
    async fn examine_folder(&mut self, folder: &str) -> Result<()> {
        let session = self.session_mut()?;

        debug!("Examining folder: {}", folder);

        let mailbox = session
            .examine(folder)
            .await
            .map_err(|e| EmailError::FolderAccess {
                folder: folder.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Folder '{}' holds {} messages", folder, mailbox.exists);
        self.current_folder = Some(folder.to_string());
        Ok(())
    }

    async fn search_window(&mut self, window: &DateWindow) -> Result<Vec<u32>> {
        let session = self.session_mut()?;

        let query = window.imap_query();
        debug!("Searching with query: {}", query);

        let uids = session
            .uid_search(&query)
            .await
            .map_err(|e| EmailError::SearchFailed(e.to_string()))?;

        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();
        debug!("Found {} messages matching search", uid_list.len());
        Ok(uid_list)
    }

    async fn fetch_messages(&mut self, uids: &[u32]) -> Result<Vec<MessageContext>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let session = self.session_mut()?;

        let uid_set = uid_set(uids);
        debug!("Fetching {} messages with UIDs: {}", uids.len(), uid_set);

        // Drain the whole response before reporting a failure so the
        // connection is left in a usable state.
        let responses = session
            .uid_fetch(&uid_set, MESSAGE_FETCH_ITEMS)
            .await
            .map_err(|e| EmailError::FetchFailed(e.to_string()))?
            .collect::<Vec<_>>()
            .await;

        let mut messages = Vec::with_capacity(responses.len());
        let mut first_error = None;
        for response in responses {
            match response {
                Ok(fetch) => {
                    let Some(uid) = fetch.uid else {
                        warn!("Fetch response without UID, skipping");
                        continue;
                    };
                    messages.push(message_context(
                        uid,
                        fetch.envelope(),
                        fetch.bodystructure(),
                        fetch.text(),
                    ));
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(EmailError::FetchFailed(e.to_string()));
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        debug!("Fetched {} messages", messages.len());
        Ok(messages)
    }

    async fn fetch_section(&mut self, uid: u32, path: &[u32]) -> Result<Vec<u8>> {
        let session = self.session_mut()?;

        let section = path
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        debug!("Fetching section {} of message {}", section, uid);

        let responses = session
            .uid_fetch(uid.to_string(), format!("BODY.PEEK[{}]", section))
            .await
            .map_err(|e| EmailError::FetchFailed(e.to_string()))?
            .collect::<Vec<_>>()
            .await;

        let wanted = SectionPath::Part(path.to_vec(), None);
        let mut first_error = None;
        let mut content = None;
        for response in responses {
            match response {
                Ok(fetch) if content.is_none() && fetch.uid == Some(uid) => {
                    content = fetch.section(&wanted).map(|bytes| bytes.to_vec());
                }
                Ok(_) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(EmailError::FetchFailed(e.to_string()));
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        content.ok_or_else(|| {
            EmailError::FetchFailed(format!(
                "Server returned no section {} for message {}",
                section, uid
            ))
        })
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("ImapClient dropped without explicit disconnect - session will be closed");
        }
    }
}

fn mailbox_folder(name: &Name) -> MailboxFolder {
    let mut folder = MailboxFolder::new(name.name());
    for attribute in name.attributes() {
        if matches!(attribute, NameAttribute::NoSelect) {
            folder.selectable = false;
        } else if let Some(role) = special_use(attribute) {
            folder.special_use = Some(role);
        }
    }
    folder
}

/// Maps RFC 6154 attributes, plus Gmail's `\Important` extension.
fn special_use(attribute: &NameAttribute<'_>) -> Option<SpecialUse> {
    let role = match attribute {
        NameAttribute::All => SpecialUse::All,
        NameAttribute::Archive => SpecialUse::Archive,
        NameAttribute::Drafts => SpecialUse::Drafts,
        NameAttribute::Flagged => SpecialUse::Flagged,
        NameAttribute::Junk => SpecialUse::Junk,
        NameAttribute::Sent => SpecialUse::Sent,
        NameAttribute::Trash => SpecialUse::Trash,
        NameAttribute::Extension(ext)
            if ext.trim_start_matches('\\').eq_ignore_ascii_case("important") =>
        {
            SpecialUse::Important
        }
        _ => return None,
    };
    Some(role)
}

/// Comma-separated UID set (`1,2,5,10`).
fn uid_set(uids: &[u32]) -> String {
    uids.iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn message_context(
    uid: u32,
    envelope: Option<&imap_proto::types::Envelope<'_>>,
    structure: Option<&BodyStructure<'_>>,
    text: Option<&[u8]>,
) -> MessageContext {
    let mut context = MessageContext {
        uid,
        body_text: text
            .map(|t| String::from_utf8_lossy(t).into_owned())
            .unwrap_or_default(),
        structure: structure.map(convert_structure),
        ..MessageContext::default()
    };

    if let Some(envelope) = envelope {
        context.subject = envelope
            .subject
            .as_deref()
            .map(|s| decode_header_words(&String::from_utf8_lossy(s)))
            .unwrap_or_default();
        context.sender = envelope
            .from
            .as_deref()
            .and_then(|from| from.iter().find_map(bare_address))
            .unwrap_or_default();
        context.recipients = [envelope.to.as_deref(), envelope.cc.as_deref()]
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(bare_address)
            .collect();
    }

    context
}

/// `mailbox@host`, or `None` for group markers and incomplete addresses.
fn bare_address(address: &Address<'_>) -> Option<String> {
    let mailbox = address.mailbox.as_deref()?;
    let host = address.host.as_deref()?;
    let mailbox = String::from_utf8_lossy(mailbox);
    let host = String::from_utf8_lossy(host);
    if mailbox.trim().is_empty() || host.trim().is_empty() {
        return None;
    }
    Some(format!("{}@{}", mailbox.trim(), host.trim()))
}

/// Converts the server's BODYSTRUCTURE into the provider-neutral tree.
///
/// An embedded `message/rfc822` part adopts the parts of the message it
/// wraps, matching IMAP section numbering (`2.1`, `2.2`, ...).
fn convert_structure(body: &BodyStructure<'_>) -> StructureNode {
    match body {
        BodyStructure::Basic { common, other, .. } | BodyStructure::Text { common, other, .. } => {
            single_part(common, other)
        }
        BodyStructure::Message {
            common,
            other,
            body,
            ..
        } => {
            let mut node = single_part(common, other);
            node.children = match body.as_ref() {
                BodyStructure::Multipart { bodies, .. } => {
                    bodies.iter().map(convert_structure).collect()
                }
                nested => vec![convert_structure(nested)],
            };
            node
        }
        BodyStructure::Multipart { common, bodies, .. } => {
            let mut node = common_node(common);
            node.children = bodies.iter().map(convert_structure).collect();
            node
        }
    }
}

fn single_part(common: &BodyContentCommon<'_>, other: &BodyContentSinglePart<'_>) -> StructureNode {
    let mut node = common_node(common);
    node.encoding = match &other.transfer_encoding {
        ContentEncoding::SevenBit => TransferEncoding::SevenBit,
        ContentEncoding::EightBit => TransferEncoding::EightBit,
        ContentEncoding::Binary => TransferEncoding::Binary,
        ContentEncoding::Base64 => TransferEncoding::Base64,
        ContentEncoding::QuotedPrintable => TransferEncoding::QuotedPrintable,
        ContentEncoding::Other(value) => TransferEncoding::parse(value),
    };
    node
}

fn common_node(common: &BodyContentCommon<'_>) -> StructureNode {
    let mut node = StructureNode::new(&common.ty.ty, &common.ty.subtype);
    node.type_params = param_map(&common.ty.params);
    if let Some(disposition) = &common.disposition {
        node.disposition = Disposition::parse(&disposition.ty);
        node.disposition_params = param_map(&disposition.params);
    }
    node
}

/// Parameter list with lowercased keys and RFC 2047 values decoded.
fn param_map(params: &BodyParams<'_>) -> HashMap<String, String> {
    params
        .iter()
        .flatten()
        .map(|(key, value)| (key.to_ascii_lowercase(), decode_header_words(value)))
        .collect()
}
