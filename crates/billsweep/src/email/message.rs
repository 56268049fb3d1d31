//! Provider-neutral message model consumed by the scan pipeline.

use std::collections::HashMap;

/// Declared purpose of a message part (`Content-Disposition`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    None,
    Attachment,
    Inline,
}

impl Disposition {
    /// Parses a disposition type case-insensitively; unknown values map to `None`.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("attachment") {
            Disposition::Attachment
        } else if value.eq_ignore_ascii_case("inline") {
            Disposition::Inline
        } else {
            Disposition::None
        }
    }
}

/// Declared `Content-Transfer-Encoding` of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    #[default]
    Unknown,
}

impl TransferEncoding {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "7bit" => TransferEncoding::SevenBit,
            "8bit" => TransferEncoding::EightBit,
            "binary" => TransferEncoding::Binary,
            "base64" => TransferEncoding::Base64,
            "quoted-printable" => TransferEncoding::QuotedPrintable,
            _ => TransferEncoding::Unknown,
        }
    }
}

/// One node of a message's MIME structure. Children are owned, so the tree is
/// acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructureNode {
    /// Lowercased top-level media type (`application`, `multipart`, ...).
    pub media_type: String,
    /// Lowercased media subtype (`pdf`, `mixed`, ...).
    pub media_subtype: String,
    /// Content-Type parameters, keys lowercased.
    pub type_params: HashMap<String, String>,
    pub disposition: Disposition,
    /// Content-Disposition parameters, keys lowercased.
    pub disposition_params: HashMap<String, String>,
    pub encoding: TransferEncoding,
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    pub fn new(media_type: &str, media_subtype: &str) -> Self {
        Self {
            media_type: media_type.to_ascii_lowercase(),
            media_subtype: media_subtype.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Creates a `multipart/<subtype>` container.
    pub fn multipart(subtype: &str, children: Vec<StructureNode>) -> Self {
        Self {
            children,
            ..Self::new("multipart", subtype)
        }
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_type_param(mut self, key: &str, value: &str) -> Self {
        self.type_params
            .insert(key.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_disposition_param(mut self, key: &str, value: &str) -> Self {
        self.disposition_params
            .insert(key.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn is_multipart(&self) -> bool {
        self.media_type == "multipart"
    }

    /// Non-empty `filename` disposition parameter.
    pub fn disposition_filename(&self) -> Option<&str> {
        non_empty(self.disposition_params.get("filename"))
    }

    /// Non-empty `name` Content-Type parameter.
    pub fn type_name(&self) -> Option<&str> {
        non_empty(self.type_params.get("name"))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

/// Everything the pipeline reads about a single message.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    pub uid: u32,
    pub subject: String,
    /// Bare sender address (`billing@stripe.com`).
    pub sender: String,
    /// Bare `To` and `Cc` addresses.
    pub recipients: Vec<String>,
    /// Body text, used only for signature scanning.
    pub body_text: String,
    pub structure: Option<StructureNode>,
}

/// RFC 6154 role a server advertises for a folder in its LIST response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialUse {
    All,
    Archive,
    Drafts,
    Flagged,
    Important,
    Junk,
    Sent,
    Trash,
}

/// One LIST entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxFolder {
    pub name: String,
    pub special_use: Option<SpecialUse>,
    /// False for `\Noselect` containers such as Gmail's bare `[Gmail]`.
    pub selectable: bool,
}

impl MailboxFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            special_use: None,
            selectable: true,
        }
    }

    pub fn with_special_use(mut self, special_use: SpecialUse) -> Self {
        self.special_use = Some(special_use);
        self
    }

    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }
}
