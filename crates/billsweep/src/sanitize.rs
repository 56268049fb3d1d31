//! Helpers for sanitizing message-supplied data before it reaches the
//! filesystem or the logs.

use std::path::Path;

/// Longest filename, in bytes, written to the output directory.
const MAX_FILENAME_BYTES: usize = 200;

/// Makes a message-supplied filename safe to join onto the output directory.
///
/// Path separators, drive colons and control characters become `_`; leading
/// and trailing dots and spaces are dropped so the name can never be `.` or
/// `..`. Names that end up empty become `attachment`.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        return "attachment".to_string();
    }

    if trimmed.len() <= MAX_FILENAME_BYTES {
        return trimmed.to_string();
    }

    // Keep the extension, shorten the stem on a char boundary.
    let ext = match trimmed.rfind('.') {
        Some(pos) if trimmed.len() - pos <= 16 => &trimmed[pos..],
        _ => "",
    };
    let mut cut = MAX_FILENAME_BYTES - ext.len();
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &trimmed[..cut], ext)
}

/// Hides the local part of an address, keeping the domain for correlation.
///
/// `billing@stripe.com` → `***@stripe.com`
pub fn redact_address(address: &str) -> String {
    match address.rfind('@') {
        Some(at) => format!("***{}", &address[at..]),
        None if address.is_empty() => "<none>".to_string(),
        None => "***".to_string(),
    }
}

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_normal_names() {
        assert_eq!(sanitize_filename("invoice 2025-09.pdf"), "invoice 2025-09.pdf");
        assert_eq!(sanitize_filename("Rechnung (1).pdf"), "Rechnung (1).pdf");
    }

    #[test]
    fn test_sanitize_blocks_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("..\\boot.ini"), "_boot.ini");
        assert_eq!(sanitize_filename(".."), "attachment");
    }

    #[test]
    fn test_sanitize_control_characters() {
        assert_eq!(sanitize_filename("bill\r\n.pdf"), "bill__.pdf");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_filename(""), "attachment");
        assert_eq!(sanitize_filename(" . "), "attachment");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = format!("{}.pdf", "ü".repeat(300));
        let result = sanitize_filename(&long);
        assert!(result.len() <= MAX_FILENAME_BYTES);
        assert!(result.ends_with(".pdf"));
    }

    #[test]
    fn test_redact_address() {
        assert_eq!(redact_address("billing@stripe.com"), "***@stripe.com");
        assert_eq!(redact_address("nobody"), "***");
        assert_eq!(redact_address(""), "<none>");
    }

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path(Path::new("/home/user/invoices/stripe_doc.pdf")),
            "stripe_doc.pdf"
        );
        assert_eq!(redact_path(Path::new("/")), "<unknown>");
    }
}
