//! Constants shared between the API, pipeline and tests.

/// Prefix for every versioned API route.
pub const API_V1_STR: &str = "/api/v1";

/// Mount point for the static HLS tree.
pub const STREAM_PREFIX: &str = "/stream";

/// Master playlist file name produced by the HLS ladder.
pub const MASTER_PLAYLIST: &str = "master.m3u8";

/// Token type carried in the `type` claim and returned by login.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

pub const MIN_PASSWORD_LENGTH: usize = 8;
