//! Discovery of attachment-like parts in a message's MIME structure.

use super::message::{Disposition, StructureNode, TransferEncoding};

/// A part that looks like an attachment, addressed by its IMAP section path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentCandidate {
    /// Derived filename; never empty.
    pub filename: String,
    /// 1-based part numbers from the root. A single-part message is `[1]`.
    pub path: Vec<u32>,
    pub encoding: TransferEncoding,
}

impl AttachmentCandidate {
    /// Dotted section specifier (`2.1`) for `BODY[...]` fetches.
    pub fn section(&self) -> String {
        self.path
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Walks the tree in pre-order and returns every attachment-like node.
///
/// A node that matches is still descended into, so a named container and its
/// named children are all reported.
pub fn find_attachments(root: Option<&StructureNode>) -> Vec<AttachmentCandidate> {
    let mut found = Vec::new();
    if let Some(root) = root {
        walk(root, &[], &mut found);
    }
    found
}

fn walk(node: &StructureNode, path: &[u32], found: &mut Vec<AttachmentCandidate>) {
    if is_attachment_like(node) {
        if let Some(filename) = derive_filename(node) {
            let path = if path.is_empty() {
                vec![1]
            } else {
                path.to_vec()
            };
            found.push(AttachmentCandidate {
                filename,
                path,
                encoding: node.encoding,
            });
        }
    }

    for (index, child) in node.children.iter().enumerate() {
        let mut child_path = Vec::with_capacity(path.len() + 1);
        child_path.extend_from_slice(path);
        child_path.push(index as u32 + 1);
        walk(child, &child_path, found);
    }
}

/// Whether a node should be treated as a downloadable part.
pub fn is_attachment_like(node: &StructureNode) -> bool {
    matches!(
        node.disposition,
        Disposition::Attachment | Disposition::Inline
    ) || node.disposition_filename().is_some()
        || node.type_name().is_some()
        || default_filename(&node.media_type, &node.media_subtype).is_some()
}

fn derive_filename(node: &StructureNode) -> Option<String> {
    node.disposition_filename()
        .or_else(|| node.type_name())
        .or_else(|| default_filename(&node.media_type, &node.media_subtype))
        .map(|name| name.to_string())
}

/// Fallback name for allow-listed document and image types.
pub fn default_filename(media_type: &str, media_subtype: &str) -> Option<&'static str> {
    let name = match (media_type, media_subtype) {
        ("application", "pdf") => "attachment.pdf",
        ("application", "octet-stream") => "attachment.bin",
        ("application", "vnd.ms-excel") => "attachment.xls",
        ("application", "vnd.openxmlformats-officedocument.spreadsheetml.sheet") => {
            "attachment.xlsx"
        }
        ("application", "zip") => "attachment.zip",
        ("image", "png") => "attachment.png",
        ("image", "jpeg") | ("image", "jpg") => "attachment.jpg",
        ("image", "gif") => "attachment.gif",
        ("image", "bmp") => "attachment.bmp",
        ("image", "tiff") => "attachment.tiff",
        _ => return None,
    };
    Some(name)
}
