//! Email and domain validation.
//!
//! Pure functions: no I/O, deterministic for a given input. Syntax failures are
//! errors; disposable, role-based and overly long domains are warnings only.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ValidationResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Local part charset, then one or more domain labels of 1-63 alphanumeric or
/// hyphen characters that neither start nor end with a hyphen, with at least
/// one dot between labels.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// Domains known to hand out throwaway addresses.
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "10minutemail.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "sharklasers.com",
    "tempmail.com",
    "temp-mail.org",
    "throwawaymail.com",
    "yopmail.com",
    "trashmail.com",
    "getnada.com",
    "maildrop.cc",
    "dispostable.com",
    "fakeinbox.com",
    "mintemail.com",
    "mailnesia.com",
];

/// Tokens that mark an address as belonging to a function rather than a person.
/// Matched as substrings of the lower-cased local part.
pub const ROLE_TOKENS: &[&str] = &[
    "admin",
    "info",
    "support",
    "sales",
    "hello",
    "noreply",
    "no-reply",
    "contact",
    "help",
    "office",
    "marketing",
    "billing",
    "careers",
    "jobs",
    "webmaster",
    "postmaster",
];

/// Top-level domains accepted without further checks by [`has_valid_domain`].
pub const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "int", "io", "co", "ai", "dev", "app", "tech",
    "info", "biz", "me", "us", "uk", "ca", "au", "de", "fr", "es", "it", "nl", "se", "no", "dk",
    "fi", "ch", "at", "be", "ie", "pl", "pt", "br", "mx", "in", "jp", "cn", "kr", "sg", "nz",
    "za", "ng", "ke",
];

pub const MAX_DOMAIN_LENGTH: usize = 50;

pub const ERR_EMPTY: &str = "Email is required";
pub const ERR_FORMAT: &str = "Invalid email format";
pub const WARN_DISPOSABLE: &str = "Disposable email domain detected";
pub const WARN_ROLE_BASED: &str = "Role-based email address (e.g. info@, support@) may reach a shared inbox";
pub const WARN_LONG_DOMAIN: &str = "Unusually long email domain";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Classifies `email` as valid or invalid, attaching non-blocking warnings to
/// syntactically valid addresses.
pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return invalid(ERR_EMPTY);
    }
    if !EMAIL_RE.is_match(trimmed) {
        return invalid(ERR_FORMAT);
    }

    let normalized = trimmed.to_lowercase();
    // The regex guarantees exactly one usable '@' split.
    let (local, domain) = normalized.rsplit_once('@').unwrap_or((normalized.as_str(), ""));

    let mut warnings = Vec::new();
    if is_disposable_domain(domain) {
        warnings.push(WARN_DISPOSABLE.to_string());
    }
    if is_role_based(local) {
        warnings.push(WARN_ROLE_BASED.to_string());
    }
    if domain.len() > MAX_DOMAIN_LENGTH {
        warnings.push(WARN_LONG_DOMAIN.to_string());
    }

    ValidationResult {
        is_valid: true,
        errors: Vec::new(),
        warnings,
    }
}

/// Checks that the domain has at least two labels and a plausible TLD.
///
/// Unknown TLDs of two or more characters are accepted so that new gTLDs pass.
pub fn has_valid_domain(email: &str) -> bool {
    let Some((_, domain)) = email.trim().rsplit_once('@') else {
        return false;
    };
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }
    let tld = labels[labels.len() - 1].to_lowercase();
    KNOWN_TLDS.contains(&tld.as_str()) || tld.chars().count() >= 2
}

fn is_disposable_domain(domain: &str) -> bool {
    DISPOSABLE_DOMAINS.contains(&domain)
}

fn is_role_based(local: &str) -> bool {
    ROLE_TOKENS.iter().any(|token| local.contains(token))
}

fn invalid(message: &str) -> ValidationResult {
    ValidationResult {
        is_valid: false,
        errors: vec![message.to_string()],
        warnings: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
