//! Client-wide constants

/// Public endpoint used when no `api_url` is configured.
pub const DEFAULT_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Edit summary used when none is configured.
pub const DEFAULT_SUMMARY: &str = "Modified using wikibase-rs";

/// The server's auto-generated comment plus the caller summary may not exceed this.
pub const MAX_SUMMARY_LENGTH: usize = 260;

/// Separator for multi-value parameters.
pub const MULTI_VALUE_SEPARATOR: char = '|';

/// Alternative separator used when any value contains `|`. The joined value
/// must then start with this character.
pub const MULTI_VALUE_ALT_SEPARATOR: char = '\u{1f}';

/// Anonymous CSRF token handed out to sessions that are not logged in.
pub const ANONYMOUS_TOKEN: &str = "+\\";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("wikibase-rs/", env!("CARGO_PKG_VERSION"));
