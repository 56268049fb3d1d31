//! Vendor tags used as output filename prefixes.
//!
//! A tag is resolved from the sender's domain first and from the subject
//! second. Both tables are allow-lists; unknown vendors get no prefix.

/// Sender domain → vendor tag. Subdomains of a key resolve to the same tag.
const DOMAIN_TAGS: &[(&str, &str)] = &[
    ("mailgun.com", "mailgun"),
    ("mg.mailgun.com", "mailgun"),
    ("pagerduty.com", "pagerduty"),
    ("statuspage.pagerduty.com", "pagerduty"),
    ("statuscake.com", "statuscake"),
    ("trafficcake.com", "trafficcake"),
    ("github.com", "github"),
    ("noreply.github.com", "github"),
    ("anthropic.com", "anthropic"),
    ("workspace-noreply.google.com", "gworkspace"),
    ("googlecloud.com", "gcloud"),
    ("cloud-noreply.google.com", "gcloud"),
    ("google.com", "google"),
    ("digitalrealty.com", "digitalrealty"),
    ("fastly.com", "fastly"),
    ("amazon.com", "aws"),
    ("amazonaws.com", "aws"),
    ("awscloud.com", "aws"),
    ("stripe.com", "stripe"),
    ("firebase.google.com", "firebase"),
    ("twilio.com", "twilio"),
    ("slack.com", "slack"),
    ("linear.app", "linear"),
    ("zoom.us", "zoom"),
    ("hetzner.com", "hetzner"),
    ("cogentco.com", "cogent"),
    ("zayo.com", "zayo"),
    ("lottielab.com", "lottielab"),
    ("zoominfo.com", "zoominfo"),
];

/// Subject phrase groups → vendor tag, most specific first. A group earlier
/// in the list shadows any later one, so multi-word product names must come
/// before the brand words they contain.
const SUBJECT_TAGS: &[(&[&str], &str)] = &[
    (&["google workspace"], "gworkspace"),
    (&["google cloud platform", "google cloud"], "gcloud"),
    (&["digital realty"], "digitalrealty"),
    (&["trafficcake"], "trafficcake"),
    (&["statuscake"], "statuscake"),
    (&["mailgun technologies", "mailgun"], "mailgun"),
    (&["pagerduty"], "pagerduty"),
    (&["github"], "github"),
    (&["anthropic"], "anthropic"),
    (&["fastly"], "fastly"),
    (&["amazon web services", "aws"], "aws"),
    (&["stripe"], "stripe"),
    (&["firebase"], "firebase"),
    (&["twilio"], "twilio"),
    (&["slack"], "slack"),
    (&["linear orbit", "linear"], "linear"),
    (&["zoominfo"], "zoominfo"),
    (&["zoom"], "zoom"),
    (&["hetzner"], "hetzner"),
    (&["cogent communications"], "cogent"),
    (&["zayo network"], "zayo"),
    (&["lottielab"], "lottielab"),
];

/// Resolves a vendor tag for a message, preferring the sender domain.
pub fn resolve_service(sender: &str, subject: &str) -> Option<&'static str> {
    service_from_sender(sender).or_else(|| service_from_subject(subject))
}

/// Looks up the sender's domain, falling back to the longest table key the
/// domain is a strict subdomain of.
pub fn service_from_sender(sender: &str) -> Option<&'static str> {
    let domain = sender_domain(sender)?;

    if let Some((_, tag)) = DOMAIN_TAGS.iter().find(|(key, _)| *key == domain) {
        return Some(*tag);
    }

    DOMAIN_TAGS
        .iter()
        .filter(|(key, _)| {
            domain.len() > key.len() + 1
                && domain.ends_with(key)
                && domain.as_bytes()[domain.len() - key.len() - 1] == b'.'
        })
        .max_by_key(|(key, _)| key.len())
        .map(|(_, tag)| *tag)
}

/// First phrase group found in the lowercased subject.
pub fn service_from_subject(subject: &str) -> Option<&'static str> {
    if subject.is_empty() {
        return None;
    }
    let lower = subject.to_lowercase();

    SUBJECT_TAGS
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(_, tag)| *tag)
}

/// Lowercased text after the last `@`, without a trailing `>`.
fn sender_domain(sender: &str) -> Option<String> {
    let at = sender.rfind('@')?;
    let domain = sender[at + 1..]
        .trim()
        .trim_end_matches('>')
        .to_ascii_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_domain() {
        assert_eq!(service_from_sender("billing@stripe.com"), Some("stripe"));
        assert_eq!(service_from_sender("Invoices@Hetzner.COM"), Some("hetzner"));
    }

    #[test]
    fn test_subdomain_matches_parent_tag() {
        assert_eq!(
            service_from_sender("receipts@billing.stripe.com"),
            service_from_sender("receipts@stripe.com")
        );
        assert_eq!(service_from_sender("x@billing.stripe.com"), Some("stripe"));
    }

    #[test]
    fn test_subdomain_prefers_most_specific_key() {
        // cloud-noreply.google.com is more specific than google.com
        assert_eq!(
            service_from_sender("a@eu.cloud-noreply.google.com"),
            Some("gcloud")
        );
        assert_eq!(service_from_sender("a@mail.google.com"), Some("google"));
    }

    #[test]
    fn test_suffix_without_dot_is_not_subdomain() {
        assert_eq!(service_from_sender("a@notstripe.com"), None);
    }

    #[test]
    fn test_unknown_or_malformed_sender() {
        assert_eq!(service_from_sender("someone@example.org"), None);
        assert_eq!(service_from_sender("no-at-sign"), None);
        assert_eq!(service_from_sender("trailing@"), None);
        assert_eq!(service_from_sender(""), None);
    }

    #[test]
    fn test_specific_phrase_beats_brand_word() {
        assert_eq!(
            service_from_subject("Your Google Cloud invoice is available"),
            Some("gcloud")
        );
        assert_eq!(
            service_from_subject("Google Workspace: payment received"),
            Some("gworkspace")
        );
        assert_eq!(
            service_from_subject("ZoomInfo renewal notice"),
            Some("zoominfo")
        );
    }

    #[test]
    fn test_subject_no_match() {
        assert_eq!(service_from_subject("Lunch on Friday?"), None);
        assert_eq!(service_from_subject(""), None);
    }

    #[test]
    fn test_sender_wins_over_subject() {
        assert_eq!(
            resolve_service("billing@stripe.com", "Your GitHub receipt"),
            Some("stripe")
        );
        assert_eq!(
            resolve_service("noreply@example.com", "Your GitHub receipt"),
            Some("github")
        );
        assert_eq!(resolve_service("noreply@example.com", "Hello"), None);
    }
}
