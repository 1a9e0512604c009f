//! URL normalization and validation rules.
use std::sync::OnceLock;

use regex::Regex;
use url::{Host, Url};

const URL_PATTERN: &str = r#"^(http|https)://[^ "]+$"#;
const SCHEME_PATTERN: &str = r"(?i)^(http|https)://";
const DOTTED_QUAD_PATTERN: &str =
    r"^(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)(\.(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)){3}$";
const DOMAIN_PATTERN: &str = r"^([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z][a-z0-9-]*[a-z0-9]$";

static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();
static DOMAIN_REGEX: OnceLock<Regex> = OnceLock::new();
static DOTTED_QUAD_REGEX: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex pattern"))
}

/// Which optional checks run on top of the scheme pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationRules {
    /// Require the host to be localhost, a dotted-quad IP, or a dotted domain.
    pub check_host_pattern: bool,
    /// Ask the engine whether the URL answers before accepting it.
    pub check_reachability: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingScheme,
    UnrecognizedHost,
    Unreachable(String),
    Timeout,
}

impl ValidationError {
    pub fn message(&self) -> String {
        match self {
            ValidationError::MissingScheme => {
                "Please enter a valid URL starting with http:// or https://".to_string()
            }
            ValidationError::UnrecognizedHost => {
                "Please enter a valid domain, IP address, or localhost".to_string()
            }
            ValidationError::Unreachable(detail) => {
                format!("Could not reach this URL ({detail}). Please check it and try again.")
            }
            ValidationError::Timeout => {
                "The URL did not respond in time. Please check it and try again.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Prepends `https://` unless the input already carries an http(s) scheme,
/// which is matched in any case and lower-cased.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match compiled(&SCHEME_REGEX, SCHEME_PATTERN).find(trimmed) {
        Some(scheme) => format!(
            "{}{}",
            scheme.as_str().to_ascii_lowercase(),
            &trimmed[scheme.end()..]
        ),
        None => format!("https://{trimmed}"),
    }
}

pub fn is_valid_url(candidate: &str) -> bool {
    compiled(&URL_REGEX, URL_PATTERN).is_match(candidate)
}

/// Synchronous validation. Returns `None` for empty input.
///
/// Reachability is not checked here; it needs the network and is requested
/// through an effect.
pub fn validate_url(candidate: &str, rules: ValidationRules) -> Option<ValidationResult> {
    if candidate.is_empty() {
        return None;
    }
    if !is_valid_url(candidate) {
        return Some(ValidationResult::Invalid(ValidationError::MissingScheme));
    }
    if rules.check_host_pattern && !host_matches_known_class(candidate) {
        return Some(ValidationResult::Invalid(ValidationError::UnrecognizedHost));
    }
    Some(ValidationResult::Valid)
}

fn host_matches_known_class(candidate: &str) -> bool {
    let Ok(parsed) = Url::parse(candidate) else {
        return false;
    };
    match parsed.host() {
        // The parser also accepts integer, shorthand and hex forms as IPv4.
        Some(Host::Ipv4(_)) => raw_host(candidate)
            .is_some_and(|host| compiled(&DOTTED_QUAD_REGEX, DOTTED_QUAD_PATTERN).is_match(host)),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || compiled(&DOMAIN_REGEX, DOMAIN_PATTERN).is_match(&domain)
        }
        Some(Host::Ipv6(_)) | None => false,
    }
}

/// Host text as typed: the authority without userinfo or port.
fn raw_host(candidate: &str) -> Option<&str> {
    let (_, rest) = candidate.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    Some(match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    })
}

/// Reads the `url` query parameter of a launch address and normalizes it.
pub fn url_from_location(location: &str) -> Option<String> {
    let parsed = Url::parse(location).ok()?;
    let (_, value) = parsed.query_pairs().find(|(key, _)| key == "url")?;
    let normalized = normalize_url(&value);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
