//! Builders for fake messages.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine;
use chrono::NaiveDate;

use billsweep::config::default_keywords;
use billsweep::email::{Disposition, MessageContext, ScanSettings, StructureNode, TransferEncoding};

/// A message as the fake server stores it.
#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub date: NaiveDate,
    pub context: MessageContext,
    /// Raw section bytes keyed by section path.
    pub sections: HashMap<Vec<u32>, Vec<u8>>,
}

/// Base64 with line breaks every 76 characters, as mail clients send it.
pub fn base64_wrapped(content: &[u8]) -> Vec<u8> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(content);
    encoded
        .as_bytes()
        .chunks(76)
        .collect::<Vec<_>>()
        .join(&b"\r\n"[..])
}

/// `application/pdf` attachment named `filename`, base64 encoded.
pub fn pdf_part(filename: &str) -> StructureNode {
    StructureNode::new("application", "pdf")
        .with_disposition(Disposition::Attachment)
        .with_disposition_param("filename", filename)
        .with_encoding(TransferEncoding::Base64)
}

/// Image part carrying only a Content-Type name.
pub fn image_part(subtype: &str, name: &str) -> StructureNode {
    StructureNode::new("image", subtype)
        .with_disposition(Disposition::Inline)
        .with_type_param("name", name)
        .with_encoding(TransferEncoding::Base64)
}

/// Builds a `multipart/mixed` message: a text body at section 1 followed by
/// the added attachments at sections 2, 3, ...
pub struct MessageBuilder {
    uid: u32,
    date: NaiveDate,
    subject: String,
    sender: String,
    recipients: Vec<String>,
    body_text: String,
    attachments: Vec<(StructureNode, Vec<u8>)>,
}

impl MessageBuilder {
    pub fn new(uid: u32) -> Self {
        Self {
            uid,
            date: september(15),
            subject: String::new(),
            sender: "someone@example.com".to_string(),
            recipients: vec!["me@acme.io".to_string()],
            body_text: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    pub fn recipient(mut self, recipient: &str) -> Self {
        self.recipients.push(recipient.to_string());
        self
    }

    pub fn body(mut self, text: &str) -> Self {
        self.body_text = text.to_string();
        self
    }

    /// Adds a part whose section holds `raw` exactly as the server returns it.
    pub fn attachment(mut self, node: StructureNode, raw: Vec<u8>) -> Self {
        self.attachments.push((node, raw));
        self
    }

    /// Adds a base64 PDF attachment with the given decoded content.
    pub fn pdf(self, filename: &str, content: &[u8]) -> Self {
        self.attachment(pdf_part(filename), base64_wrapped(content))
    }

    pub fn build(self) -> FakeMessage {
        let mut children = vec![StructureNode::new("text", "plain")];
        let mut sections = HashMap::new();
        sections.insert(vec![1], self.body_text.clone().into_bytes());

        for (index, (node, raw)) in self.attachments.into_iter().enumerate() {
            sections.insert(vec![index as u32 + 2], raw);
            children.push(node);
        }

        FakeMessage {
            date: self.date,
            context: MessageContext {
                uid: self.uid,
                subject: self.subject,
                sender: self.sender,
                recipients: self.recipients,
                body_text: self.body_text,
                structure: Some(StructureNode::multipart("mixed", children)),
            },
            sections,
        }
    }
}

pub fn september(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
}

/// Settings matching a default config for `me@acme.io`.
pub fn test_settings() -> ScanSettings {
    ScanSettings {
        keywords: default_keywords(),
        user_email: "me@acme.io".to_string(),
        inbox: "INBOX".to_string(),
        batch_size: 10,
        fetch_timeout: Duration::from_secs(5),
    }
}
