//! Shared value objects used across the routing and voicemail contexts

use super::error::DomainError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest number E.164 allows, country code included
const MAX_E164_DIGITS: usize = 15;

/// Length of a domestic number that still needs the default country code
const DOMESTIC_DIGITS: usize = 10;

/// Dialable PSTN number in canonical `+<country><subscriber>` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize a raw destination address into a dialable number.
    ///
    /// Accepts bare digits, formatted numbers (`(555) 123-4567`), numbers
    /// already carrying the `+` marker, and endpoint URIs wrapping a number
    /// (`sip:+15551234567@trunk.example.com`, `tel:+1555...`). Ten-digit
    /// numbers get `default_country_code`; longer digit strings are assumed
    /// to carry their own country code and only get the marker.
    pub fn normalize(raw: &str, default_country_code: &str) -> Result<Self> {
        let unwrapped = strip_endpoint_uri(raw.trim());
        let cleaned: String = unwrapped
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        if cleaned.is_empty() {
            return Err(DomainError::ValidationError(
                "destination address is empty".to_string(),
            ));
        }

        let (has_marker, digits) = match cleaned.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::ValidationError(format!(
                "'{}' is not a phone number",
                raw
            )));
        }

        let canonical = match (has_marker, digits.len()) {
            (true, len) if (DOMESTIC_DIGITS - 2..=MAX_E164_DIGITS).contains(&len) => {
                format!("+{}", digits)
            }
            (false, DOMESTIC_DIGITS) => format!("+{}{}", default_country_code, digits),
            (false, len) if (DOMESTIC_DIGITS + 1..=MAX_E164_DIGITS).contains(&len) => {
                format!("+{}", digits)
            }
            _ => {
                return Err(DomainError::ValidationError(format!(
                    "'{}' has an unexpected number of digits ({})",
                    raw,
                    digits.len()
                )))
            }
        };

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drop a `sip:`/`sips:`/`tel:` wrapper, keeping only the user part
fn strip_endpoint_uri(raw: &str) -> &str {
    let lower = raw.to_ascii_lowercase();
    let without_scheme = ["sips:", "sip:", "tel:"]
        .iter()
        .find(|scheme| lower.starts_with(*scheme))
        .map(|scheme| &raw[scheme.len()..])
        .unwrap_or(raw);

    without_scheme
        .split(['@', ';'])
        .next()
        .unwrap_or(without_scheme)
}

/// SIP URI value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SipUri {
    secure: bool,
    user: String,
    host: String,
    port: Option<u16>,
}

impl SipUri {
    pub fn new(user: String, host: String, port: Option<u16>) -> Self {
        Self {
            secure: false,
            user,
            host,
            port,
        }
    }

    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let (secure, rest) = if let Some(rest) = uri.strip_prefix("sips:") {
            (true, rest)
        } else if let Some(rest) = uri.strip_prefix("sip:") {
            (false, rest)
        } else {
            return Err(DomainError::ValidationError(format!(
                "URI must start with 'sip:' or 'sips:': {}",
                uri
            )));
        };

        // URI parameters are not needed for dialing
        let rest = rest.split(';').next().unwrap_or(rest);

        let (user, host_port) = rest.split_once('@').ok_or_else(|| {
            DomainError::ValidationError(format!("Invalid SIP URI format: {}", uri))
        })?;

        if user.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "SIP URI has no user part: {}",
                uri
            )));
        }

        let (host, port) = match host_port.split_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    DomainError::ValidationError(format!("Invalid SIP URI port: {}", uri))
                })?;
                (host, Some(port))
            }
            None => (host_port, None),
        };

        if host.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "SIP URI has no host: {}",
                uri
            )));
        }

        Ok(Self {
            secure,
            user: user.to_string(),
            host: host.to_string(),
            port,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for SipUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.secure { "sips" } else { "sip" };
        if let Some(port) = self.port {
            write!(f, "{}:{}@{}:{}", scheme, self.user, self.host, port)
        } else {
            write!(f, "{}:{}@{}", scheme, self.user, self.host)
        }
    }
}
