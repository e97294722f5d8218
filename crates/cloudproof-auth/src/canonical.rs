//! Canonical request construction for AWS Signature Version 4.
//!
//! The canonical request is the exact byte sequence that gets hashed and
//! signed:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! \n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! A claimant and a verifier that feed the same logical inputs through this
//! module get byte-identical output. Any divergence (an extra signed header, a
//! differently encoded path) invalidates the signature on replay.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::SigningError;

/// Characters left unescaped in a URI path segment: the RFC 3986 unreserved set.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The set of headers covered by a signature, keyed by lower-cased name.
///
/// Values are stored in their canonical form (trimmed, inner whitespace
/// collapsed). Iteration order is the sorted order SigV4 requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalHeaders {
    entries: BTreeMap<String, String>,
}

impl CanonicalHeaders {
    /// Create an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header to the signed set.
    ///
    /// Repeated names are joined with `,` in insertion order, as SigV4
    /// specifies for multi-valued headers.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidHeaderValue`] if the value contains
    /// characters that cannot appear in a canonical header line.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), SigningError> {
        let lower_name = name.to_ascii_lowercase();
        if !is_signable_value(value) {
            return Err(SigningError::InvalidHeaderValue(lower_name));
        }
        let canonical_value = collapse_whitespace(value.trim());
        self.entries
            .entry(lower_name)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&canonical_value);
            })
            .or_insert(canonical_value);
        Ok(())
    }

    /// Look up the canonical value of a signed header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Sorted, lower-cased names of every signed header.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of signed headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no header has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `SignedHeaders` component: sorted names joined with `;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudproof_auth::canonical::CanonicalHeaders;
    ///
    /// let mut headers = CanonicalHeaders::new();
    /// headers.insert("X-Amz-Date", "19700101T000000Z").unwrap();
    /// headers.insert("Host", "sts.amazonaws.com").unwrap();
    /// assert_eq!(headers.signed_headers_string(), "host;x-amz-date");
    /// ```
    #[must_use]
    pub fn signed_headers_string(&self) -> String {
        self.names().collect::<Vec<_>>().join(";")
    }

    /// The `CanonicalHeaders` component: one `name:value\n` line per header.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect()
    }
}

/// Build the full canonical request string from its components.
///
/// # Examples
///
/// ```
/// use cloudproof_auth::canonical::{CanonicalHeaders, build_canonical_request};
///
/// let mut headers = CanonicalHeaders::new();
/// headers.insert("host", "sts.amazonaws.com").unwrap();
///
/// let canonical = build_canonical_request(
///     "post",
///     "/",
///     "",
///     &headers,
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
/// assert!(canonical.starts_with("POST\n/\n\nhost:sts.amazonaws.com\n\nhost\n"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query_string: &str,
    headers: &CanonicalHeaders,
    payload_hash: &str,
) -> String {
    let method = method.to_ascii_uppercase();
    let canonical_uri = build_canonical_uri(path);
    let canonical_query = build_canonical_query_string(query_string);
    let canonical_headers = headers.canonical_string();
    let signed_headers = headers.signed_headers_string();

    format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    )
}

/// Build the canonical URI by percent-encoding each path segment.
///
/// Forward slashes are preserved and an empty path becomes `/`. Segments are
/// decoded before encoding so an already-encoded path is not encoded twice.
///
/// # Examples
///
/// ```
/// use cloudproof_auth::canonical::build_canonical_uri;
///
/// assert_eq!(build_canonical_uri(""), "/");
/// assert_eq!(build_canonical_uri("/a b"), "/a%20b");
/// ```
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, URI_ENCODE_SET).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical query string: parameters sorted by key, then value.
///
/// Values are kept exactly as they appear in the request; the signer must
/// hash the same bytes the provider will see.
#[must_use]
pub fn build_canonical_query_string(query: &str) -> String {
    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();

    params.sort_unstable();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// A header value may be signed only if it is visible ASCII, space or tab.
fn is_signable_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b == b' ' || b == b'\t' || b.is_ascii_graphic())
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}
