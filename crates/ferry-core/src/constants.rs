//! Shared constants

/// Lifetime of an upload or download token when the issuer does not pass `expire`.
pub const DEFAULT_TOKEN_EXPIRE_SECS: i64 = 86_400;

/// How long a download token stays usable after its first authorized download.
pub const DOWNLOAD_TOKEN_GRACE_SECS: i64 = 86_400;

/// Upper bound for either side of a requested resize.
pub const MAX_RESIZE_DIMENSION: u32 = 4096;

/// Characters that may never appear in a delegated filename.
pub const FORBIDDEN_FILENAME_CHARS: &[char] = &['<', '>', '|', '*', '?', '/', '\\'];

/// Route prefix of the delegated ("alien") API.
pub const ALIEN_API_PREFIX: &str = "/api/alien";
