//! Message-level relevance signals.
//!
//! Any one signal makes every attachment of the message eligible for
//! download, except invitations.

use crate::email::message::MessageContext;

/// Vendor phrases that mark a billing subject regardless of keywords.
const SUBJECT_PHRASES: &[&str] = &[
    "digital realty",
    "google workspace",
    "google cloud",
    "pagerduty invoice",
    "new pagerduty invoice",
    "mailgun",
    "mailgun technologies",
    "you have a new",
    "new invoice",
    "statuscake",
    "status cake",
    "trafficcake",
];

/// Local parts of shared mailboxes on the user's own domain.
const GROUP_LOCAL_PARTS: &[&str] = &[
    "admin",
    "bills",
    "billing",
    "dev",
    "finance",
    "accounting",
    "ops",
    "support",
];

/// Body substrings of vendor billing mails that arrive without a useful
/// subject or attachment name.
const BILLING_SIGNATURES: &[&str] = &["pagerduty invoice", "pagerduty billing"];

/// Which message-level signals fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageSignals {
    pub subject: bool,
    pub group_address: bool,
    pub billing_signature: bool,
}

impl MessageSignals {
    pub fn any(&self) -> bool {
        self.subject || self.group_address || self.billing_signature
    }
}

/// Evaluates message-level signals against the configured keywords and the
/// user's own domain.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    keywords: Vec<String>,
    user_domain: Option<String>,
}

impl SignalEvaluator {
    pub fn new(keywords: &[String], user_email: &str) -> Self {
        let user_domain = user_email
            .rfind('@')
            .map(|at| user_email[at + 1..].trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty());

        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            user_domain,
        }
    }

    pub fn evaluate(&self, message: &MessageContext) -> MessageSignals {
        MessageSignals {
            subject: self.subject_matches(&message.subject),
            group_address: message
                .recipients
                .iter()
                .any(|r| self.is_group_address(r)),
            billing_signature: has_billing_signature(&message.body_text),
        }
    }

    /// Keyword or vendor phrase anywhere in the subject, case-insensitive.
    pub fn subject_matches(&self, subject: &str) -> bool {
        if subject.is_empty() {
            return false;
        }
        let lower = subject.to_lowercase();

        self.keywords.iter().any(|k| lower.contains(k.as_str()))
            || SUBJECT_PHRASES.iter().any(|p| lower.contains(p))
    }

    /// `billing@<user domain>` and friends.
    pub fn is_group_address(&self, address: &str) -> bool {
        let Some(user_domain) = self.user_domain.as_deref() else {
            return false;
        };
        let Some(at) = address.rfind('@') else {
            return false;
        };

        let local = address[..at].trim();
        let domain = address[at + 1..].trim();

        domain.eq_ignore_ascii_case(user_domain)
            && GROUP_LOCAL_PARTS
                .iter()
                .any(|p| local.eq_ignore_ascii_case(p))
    }
}

pub fn has_billing_signature(body: &str) -> bool {
    if body.is_empty() {
        return false;
    }
    let lower = body.to_lowercase();
    BILLING_SIGNATURES.iter().any(|s| lower.contains(s))
}
