use regex::Regex;
use std::sync::LazyLock;

/// Invoice-ish word stems, vendor invoice ids, dates and long numeric names.
static DOCUMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)",
        r"(inv(oice)?s?|bill(s|ing)?|receipt|rec|rct|cheque|check|",
        r"pay(ment)?|transaction|statement|factur[ae]|rechnung|nota)\b|",
        r"\b(INV|BILL|REC|PAY)[-_]?\d{3,}|",
        r"\d{4,}-\d{2,}-\d{2,}|",
        r"\b\d{8,}\.(pdf|xlsx?|docx?|zip|png|jpe?g|gif|bmp|tiff?)\b",
    ))
    .unwrap()
});

/// Tokens that mark decorative or webmail-chrome images.
const EXCLUDED_TOKENS: &[&str] = &[
    "logo",
    "icon",
    "avatar",
    "footer",
    "header",
    "banner",
    "px48",
    "image-",
    "attach_",
    "signature",
    "spacer",
    "confluence",
    "atlassian",
    "gmail",
    "google",
    "screenshot",
    "screen shot",
    "screen capture",
];

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff"];

/// Type-derived names that only come from real document parts.
const GENERIC_DOCUMENT_NAMES: &[&str] = &["attachment.pdf", "attachment.xls", "attachment.xlsx"];

/// Calendar invitations are never downloaded, whatever else matches.
pub fn is_invite(filename: &str) -> bool {
    filename.to_lowercase().contains("invite")
}

/// Decides from a filename alone whether an attachment looks like a bill.
///
/// Rules run in order and the first one that applies decides:
/// 1. empty names and invitations are rejected;
/// 2. UI assets (logos, signatures, screenshots) are rejected;
/// 3. images need a keyword or document-pattern match;
/// 4. anything else passes on a document-pattern match, a generic
///    `attachment.pdf`/`.xls`/`.xlsx` name, or a keyword match.
#[derive(Debug, Clone, Default)]
pub struct AttachmentClassifier {
    keywords: Vec<String>,
}

impl AttachmentClassifier {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_relevant(&self, filename: &str) -> bool {
        if filename.is_empty() {
            return false;
        }

        let lower = filename.to_lowercase();
        if lower.contains("invite") {
            return false;
        }
        if EXCLUDED_TOKENS.iter().any(|token| lower.contains(token)) {
            return false;
        }

        if is_image(&lower) {
            return self.matches_keyword(&lower) || DOCUMENT_PATTERN.is_match(&lower);
        }

        DOCUMENT_PATTERN.is_match(&lower)
            || GENERIC_DOCUMENT_NAMES.contains(&lower.as_str())
            || self.matches_keyword(&lower)
    }

    fn matches_keyword(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

fn is_image(lower: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(keywords: &[&str]) -> AttachmentClassifier {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
        AttachmentClassifier::new(&keywords)
    }

    #[test]
    fn test_empty_filename() {
        assert!(!classifier(&["invoice"]).is_relevant(""));
    }

    #[test]
    fn test_invite_always_rejected() {
        let c = classifier(&["invite", "invoice"]);
        assert!(!c.is_relevant("invite.ics"));
        assert!(!c.is_relevant("Invoice-INVITE.pdf"));
        assert!(!c.is_relevant("invoice_invite_2025.pdf"));
        assert!(is_invite("Meeting-Invite.ics"));
    }

    #[test]
    fn test_ui_assets_rejected() {
        let c = classifier(&["invoice"]);
        assert!(!c.is_relevant("company_logo.png"));
        assert!(!c.is_relevant("invoice_header.pdf"));
        assert!(!c.is_relevant("Screen Shot 2025-01-02.png"));
        assert!(!c.is_relevant("google_invoice.pdf"));
    }

    #[test]
    fn test_case_insensitive_and_deterministic() {
        let c = classifier(&["Invoice"]);
        for name in ["invoice.pdf", "INVOICE.PDF", "InVoIcE.Pdf", "photo.JPG", "notes.txt"] {
            assert_eq!(c.is_relevant(name), c.is_relevant(&name.to_lowercase()));
            assert_eq!(c.is_relevant(name), c.is_relevant(&name.to_uppercase()));
        }
    }

    #[test]
    fn test_image_needs_corroboration() {
        let c = classifier(&[]);
        assert!(!c.is_relevant("photo.jpg"));
        assert!(!c.is_relevant("attachment.png"));
        assert!(c.is_relevant("receipt.png"));
        assert!(c.is_relevant("scan-2025-09-14.jpeg"));
        assert!(c.is_relevant("20250914123.png"));
    }

    #[test]
    fn test_image_keyword_match() {
        let c = classifier(&["acme"]);
        assert!(c.is_relevant("acme_scan.png"));
        assert!(!c.is_relevant("holiday.png"));
    }

    #[test]
    fn test_generic_document_names_relevant_without_keywords() {
        let c = classifier(&[]);
        assert!(c.is_relevant("attachment.pdf"));
        assert!(c.is_relevant("attachment.xls"));
        assert!(c.is_relevant("ATTACHMENT.XLSX"));
        assert!(!c.is_relevant("attachment.bin"));
        assert!(!c.is_relevant("attachment.zip"));
    }

    #[test]
    fn test_document_patterns() {
        let c = classifier(&[]);
        assert!(c.is_relevant("invoice.pdf"));
        assert!(c.is_relevant("Invoices.pdf"));
        assert!(c.is_relevant("billing-summary.xlsx"));
        assert!(c.is_relevant("INV-00123.pdf"));
        assert!(c.is_relevant("PAY_4567.pdf"));
        assert!(c.is_relevant("Rechnung.pdf"));
        assert!(c.is_relevant("factura.pdf"));
        assert!(c.is_relevant("2025-09-01.pdf"));
        assert!(c.is_relevant("12345678.pdf"));
        assert!(!c.is_relevant("notes.txt"));
        assert!(!c.is_relevant("contract_v2.docx"));
    }

    #[test]
    fn test_keyword_match_for_documents() {
        let c = classifier(&["subscription"]);
        assert!(c.is_relevant("Subscription_Renewal.docx"));
        assert!(!c.is_relevant("roadmap.docx"));
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let c = classifier(&["", "   "]);
        assert!(!c.is_relevant("roadmap.docx"));
    }
}
