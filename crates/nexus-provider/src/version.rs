//! Server version parsed from the `Server` response header.
//!
//! Header format: `Nexus/3.84.0-01 (OSS)` or `Nexus/3.84.0-01 (PRO)`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SERVER_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^NEXUS/(\d+)\.(\d+)\.(\d+)-(\d+)\s+\((\w+)\)$")
        .expect("server header regex is valid")
});

/// Parsed Nexus server version. The zero value means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: i8,
    pub minor: i8,
    pub patch: i8,
    pub build: i8,
    pub pro: bool,
}

impl ServerVersion {
    pub const fn new(major: i8, minor: i8, patch: i8, build: i8, pro: bool) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
            pro,
        }
    }

    /// Parse a server header. Malformed input yields the zero version.
    pub fn parse(header: &str) -> Self {
        Self::try_parse(header).unwrap_or_default()
    }

    fn try_parse(header: &str) -> Option<Self> {
        let caps = SERVER_HEADER.captures(header.trim())?;
        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i8>().ok());
        Some(Self {
            major: field(1)?,
            minor: field(2)?,
            patch: field(3)?,
            build: field(4)?,
            pro: caps
                .get(5)
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case("PRO")),
        })
    }

    pub fn is_unknown(&self) -> bool {
        self.tuple() == (0, 0, 0, 0)
    }

    fn tuple(&self) -> (i8, i8, i8, i8) {
        (self.major, self.minor, self.patch, self.build)
    }

    /// Strictly newer than `major.minor.patch-build`.
    pub fn newer_than(&self, major: i8, minor: i8, patch: i8, build: i8) -> bool {
        self.tuple() > (major, minor, patch, build)
    }

    /// Strictly older than `major.minor.patch-build`.
    pub fn older_than(&self, major: i8, minor: i8, patch: i8, build: i8) -> bool {
        self.tuple() < (major, minor, patch, build)
    }

    fn at_least(&self, major: i8, minor: i8, patch: i8, build: i8) -> bool {
        !self.older_than(major, minor, patch, build)
    }

    /// Capabilities REST API exists from 3.84.0.
    pub fn supports_capabilities(&self) -> bool {
        self.at_least(3, 84, 0, 0)
    }

    /// Docker repository names must be lowercase from 3.89.0.
    pub fn requires_lowercase_docker_repo_names(&self) -> bool {
        self.at_least(3, 89, 0, 0)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{:02} ({})",
            self.major,
            self.minor,
            self.patch,
            self.build,
            if self.pro { "PRO" } else { "OSS" }
        )
    }
}
