//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`RefName`] - Validated Git reference name
//! - [`RefSpec`] - Fetch mapping rule (`+<src>:<dst>`)
//! - [`RefKind`] - What a human-supplied identifier turned out to be
//! - [`Reference`] - A resolved identifier (name, commit, kind)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use refscope::core::types::{Oid, RefName, RefSpec};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let branch = RefName::branch("main").unwrap();
//! assert_eq!(branch.as_str(), "refs/heads/main");
//!
//! let spec = RefSpec::narrow(&branch);
//! assert_eq!(spec.to_string(), "+refs/heads/main:refs/heads/main");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(RefName::branch("invalid..name").is_err());
//! # let _ = oid;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid refspec: {0}")]
    InvalidRefSpec(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use refscope::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Length of a full SHA-1 hex object id.
    pub const SHA1_HEX_LEN: usize = 40;

    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Whether `candidate` has the shape of a full SHA-1 commit hash.
    ///
    /// Only the length and alphabet are checked; the object may not exist.
    pub fn looks_like_sha1(candidate: &str) -> bool {
        candidate.len() == Self::SHA1_HEX_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Git reference name.
///
/// Reference names must conform to Git's refname rules (see
/// `git check-ref-format`). Short names supplied by users are turned into
/// full names through the namespace constructors.
///
/// # Example
///
/// ```
/// use refscope::core::types::RefName;
///
/// assert_eq!(RefName::branch("feature/foo").unwrap().as_str(), "refs/heads/feature/foo");
/// assert_eq!(RefName::tag("v2.3.0").unwrap().as_str(), "refs/tags/v2.3.0");
/// assert_eq!(RefName::pull_request_head(42).as_str(), "refs/pull/42/head");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Namespace for local branches.
    pub const HEADS: &'static str = "refs/heads/";
    /// Namespace for tags.
    pub const TAGS: &'static str = "refs/tags/";
    /// Namespace for branches mirrored from `origin`.
    pub const ORIGIN_REMOTE: &'static str = "refs/remotes/origin/";

    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Ref name for a local branch (`refs/heads/<short>`).
    pub fn branch(short: &str) -> Result<Self, TypeError> {
        Self::new(format!("{}{}", Self::HEADS, short))
    }

    /// Ref name for a tag (`refs/tags/<short>`).
    pub fn tag(short: &str) -> Result<Self, TypeError> {
        Self::new(format!("{}{}", Self::TAGS, short))
    }

    /// Ref name for a remote-tracking branch (`refs/remotes/origin/<short>`).
    pub fn remote_tracking(short: &str) -> Result<Self, TypeError> {
        Self::new(format!("{}{}", Self::ORIGIN_REMOTE, short))
    }

    /// Ref name of a pull request head (`refs/pull/<n>/head`).
    pub fn pull_request_head(number: u64) -> Self {
        // Always valid: fixed prefix plus decimal digits
        Self(format!("refs/pull/{}/head", number))
    }

    /// Strip a prefix from the ref name and return the remainder.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Short name of a branch or tag ref (`refs/heads/main` -> `main`).
    ///
    /// Other refs are returned unchanged.
    pub fn short_name(&self) -> &str {
        self.strip_prefix(Self::HEADS)
            .or_else(|| self.strip_prefix(Self::TAGS))
            .unwrap_or(&self.0)
    }

    /// Check if this ref is a branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with(Self::HEADS)
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name.starts_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '/'".into(),
            ));
        }

        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        if name.contains("..") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '//'".into(),
            ));
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fetch refspec: which remote refs to fetch into which local refs.
///
/// Rendered in the standard `+<src>:<dst>` form. Sources and destinations
/// may contain a single `*` glob.
///
/// # Example
///
/// ```
/// use refscope::core::types::RefSpec;
///
/// let spec: RefSpec = "+refs/pull/7/head:refs/pull/7/head".parse().unwrap();
/// assert!(spec.is_forced());
/// assert_eq!(spec.source(), "refs/pull/7/head");
///
/// assert_eq!(
///     RefSpec::all_branches().to_string(),
///     "+refs/heads/*:refs/remotes/origin/*"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefSpec {
    force: bool,
    src: String,
    dst: String,
}

impl RefSpec {
    /// Every branch on `origin`, mirrored under `refs/remotes/origin/`.
    pub fn all_branches() -> Self {
        Self {
            force: true,
            src: "refs/heads/*".into(),
            dst: "refs/remotes/origin/*".into(),
        }
    }

    /// Every tag on `origin`, stored under the same local name.
    pub fn all_tags() -> Self {
        Self {
            force: true,
            src: "refs/tags/*".into(),
            dst: "refs/tags/*".into(),
        }
    }

    /// The bulk refspecs used when no explicit refspec is given.
    pub fn defaults() -> Vec<Self> {
        vec![Self::all_branches(), Self::all_tags()]
    }

    /// A forced one-to-one refspec (`+<path>:<path>`).
    pub fn narrow(remote_ref: &RefName) -> Self {
        Self {
            force: true,
            src: remote_ref.as_str().to_string(),
            dst: remote_ref.as_str().to_string(),
        }
    }

    /// Whether non-fast-forward updates are allowed (`+` prefix).
    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// The remote side of the mapping.
    pub fn source(&self) -> &str {
        &self.src
    }

    /// The local side of the mapping.
    pub fn destination(&self) -> &str {
        &self.dst
    }
}

impl FromStr for RefSpec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (force, body) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (src, dst) = body
            .split_once(':')
            .ok_or_else(|| TypeError::InvalidRefSpec(format!("missing ':' in '{}'", s)))?;
        if src.is_empty() || dst.is_empty() {
            return Err(TypeError::InvalidRefSpec(format!(
                "empty side in '{}'",
                s
            )));
        }
        if dst.contains(':') {
            return Err(TypeError::InvalidRefSpec(format!(
                "more than one ':' in '{}'",
                s
            )));
        }
        if src.matches('*').count() != dst.matches('*').count() {
            return Err(TypeError::InvalidRefSpec(format!(
                "unbalanced '*' in '{}'",
                s
            )));
        }

        Ok(Self {
            force,
            src: src.to_string(),
            dst: dst.to_string(),
        })
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.force {
            write!(f, "+{}:{}", self.src, self.dst)
        } else {
            write!(f, "{}:{}", self.src, self.dst)
        }
    }
}

/// What a human-supplied identifier turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
    Commit,
    Unknown,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Branch => write!(f, "branch"),
            RefKind::Tag => write!(f, "tag"),
            RefKind::Commit => write!(f, "commit"),
            RefKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A resolved identifier.
///
/// Only valid for the operation that produced it: the underlying ref may
/// move at any time, so references are recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The string the caller asked for
    pub name: String,
    /// The commit it resolved to
    pub oid: Oid,
    /// How it was interpreted
    pub kind: RefKind,
}
