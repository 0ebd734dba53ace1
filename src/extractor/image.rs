//! # Container image references.
//!
//! ```text
//! [domain[:port]/]path/components[:tag][@algorithm:hex]
//! quay.io/osd-addons/reference-addon-index:v1.2.0
//! registry.local:5000/addons/index@sha256:0123…
//! ```
//!
//! A reference whose final path component carries neither a tag nor a digest
//! is *tagless*: the addon is still onboarding and has nothing to extract.

use std::fmt;
use std::str::FromStr;

use crate::error::ExtractError;

/// Parsed image reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    /// Registry host, with optional port.
    pub domain: Option<String>,
    /// Repository path (`org/name`).
    pub path: String,
    pub tag: Option<String>,
    /// `algorithm:hex`.
    pub digest: Option<String>,
}

/// Outcome of classifying an index image reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexImage {
    /// No tag and no digest: skip extraction.
    Tagless,
    Tagged(ImageRef),
}

/// Classifies an index image reference.
///
/// - empty → [`ExtractError::EmptyIndexImage`]
/// - final component without `:` or `@` → [`IndexImage::Tagless`]
/// - otherwise it must parse as an [`ImageRef`]
pub fn classify_index_image(image: &str) -> Result<IndexImage, ExtractError> {
    if image.is_empty() {
        return Err(ExtractError::EmptyIndexImage);
    }
    let last = image.rsplit('/').next().unwrap_or(image);
    if !last.contains(':') && !last.contains('@') {
        return Ok(IndexImage::Tagless);
    }
    image.parse().map(IndexImage::Tagged)
}

impl FromStr for ImageRef {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ExtractError::InvalidImage {
            image: s.to_string(),
            reason: reason.to_string(),
        };

        let (name, digest) = match s.split_once('@') {
            Some((name, digest)) => {
                validate_digest(digest).map_err(invalid)?;
                (name, Some(digest.to_string()))
            }
            None => (s, None),
        };

        let (domain, remainder) = split_domain(name);
        if let Some(domain) = domain {
            validate_domain(domain).map_err(invalid)?;
        }

        let (path, tag) = match remainder.rsplit_once(':') {
            Some((path, tag)) => {
                validate_tag(tag).map_err(invalid)?;
                (path, Some(tag.to_string()))
            }
            None => (remainder, None),
        };

        if path.is_empty() {
            return Err(invalid("missing repository path"));
        }
        for component in path.split('/') {
            validate_component(component).map_err(invalid)?;
        }

        Ok(ImageRef {
            domain: domain.map(str::to_string),
            path: path.to_string(),
            tag,
            digest,
        })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(domain) = &self.domain {
            write!(f, "{domain}/")?;
        }
        f.write_str(&self.path)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

/// The first component is a registry host when it looks like one
/// (`.`, `:` or `localhost`) and more components follow.
fn split_domain(name: &str) -> (Option<&str>, &str) {
    match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (Some(first), rest)
        }
        _ => (None, name),
    }
}

fn validate_domain(domain: &str) -> Result<(), &'static str> {
    let (host, port) = match domain.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err("invalid registry host");
    }
    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return Err("invalid registry port");
        }
    }
    Ok(())
}

fn validate_component(component: &str) -> Result<(), &'static str> {
    let bytes = component.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) if alnum(first) && alnum(last) => {}
        _ => return Err("path components must start and end with [a-z0-9]"),
    }
    if bytes
        .iter()
        .all(|b| alnum(b) || matches!(b, b'.' | b'_' | b'-'))
    {
        Ok(())
    } else {
        Err("path components may only contain [a-z0-9._-]")
    }
}

fn validate_tag(tag: &str) -> Result<(), &'static str> {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        _ => return Err("tag must start with [A-Za-z0-9_]"),
    }
    if tag.len() > 128 {
        return Err("tag longer than 128 characters");
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        Ok(())
    } else {
        Err("tag may only contain [A-Za-z0-9_.-]")
    }
}

fn validate_digest(digest: &str) -> Result<(), &'static str> {
    let Some((algorithm, hex)) = digest.split_once(':') else {
        return Err("digest must be algorithm:hex");
    };
    if algorithm.is_empty()
        || !algorithm
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '_' | '-'))
    {
        return Err("invalid digest algorithm");
    }
    if hex.len() < 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("digest must carry at least 32 hex characters");
    }
    Ok(())
}
