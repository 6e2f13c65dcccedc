//! Pure helpers: endpoint building, version hints (no HTTP, no status logic).

use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::version::ServerVersion;

/// REST API prefix below the server base URL.
pub(crate) const API_PREFIX: [&str; 2] = ["service", "rest"];

/// Build `<base>/service/rest/<segments...>`, percent-encoding each segment.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> ProviderResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::Config {
            message: format!("base url cannot be a base: {base}"),
        })?
        .pop_if_empty()
        .extend(API_PREFIX)
        .extend(segments);
    Ok(url)
}

/// Accept either a full server header or a bare `3.84.0-01` version string.
pub(crate) fn parse_version_hint(hint: &str) -> ServerVersion {
    let hint = hint.trim();
    if hint
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("nexus/"))
    {
        return ServerVersion::parse(hint);
    }
    if hint.contains('(') {
        ServerVersion::parse(&format!("Nexus/{hint}"))
    } else {
        ServerVersion::parse(&format!("Nexus/{hint} (OSS)"))
    }
}
