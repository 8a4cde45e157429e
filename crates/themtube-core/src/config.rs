//! Configuration module
//!
//! Settings are read once at startup from the environment (and `.env` when present).
//! Unparseable values fall back to their defaults; `validate` rejects settings the
//! service cannot run with.

use std::env;

const SERVER_PORT: u16 = 8000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const ACCESS_TOKEN_EXPIRE_DAYS: i64 = 7;
const MAX_VIDEO_SIZE_MB: usize = 500;
const MAX_CONCURRENT_TRANSCODES: usize = 2;
const VIDEO_JOB_QUEUE_SIZE: usize = 1000;
const MAX_VIDEO_SIZE_MB_LIMIT: usize = 100 * 1024;
const TRANSCODE_MAX_ATTEMPTS: u32 = 1;
const TRANSCODE_RETRY_BASE_DELAY_MS: u64 = 2000;
const HLS_SEGMENT_DURATION: u64 = 10;

/// Settings for the HTTP server and its identity
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub version: String,
    pub release_id: String,
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub public_base_url: String,
}

/// Token signing settings
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret_key: String,
    pub jwt_algorithm: String,
    pub access_token_expire_days: i64,
}

/// Video storage and transcoding settings
#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub video_directory: String,
    pub max_video_size_bytes: usize,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub hls_segment_duration: u64,
    pub max_concurrent_transcodes: usize,
    pub job_queue_size: usize,
    pub transcode_max_attempts: u32,
    /// Delay before the second transcode attempt; doubles on each further retry
    pub transcode_retry_base_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub video: VideoConfig,
    pub database: DatabaseSettings,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn megabytes(mb: usize) -> usize {
    mb.saturating_mul(1024 * 1024)
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                version: env_string("VERSION", "1.0"),
                release_id: env_string("RELEASE_ID", "0.1"),
                server_port: env_or("PORT", SERVER_PORT),
                environment: env_string("ENVIRONMENT", "development"),
                cors_origins: parse_list(&env_string("ALLOWED_ORIGINS", "*")),
                public_base_url: env_string("PUBLIC_BASE_URL", "http://localhost:8000")
                    .trim_end_matches('/')
                    .to_string(),
            },
            auth: AuthConfig {
                secret_key: env::var("SECRET_KEY").unwrap_or_default(),
                jwt_algorithm: env_string("JWT_ALGORITHM", "HS256"),
                access_token_expire_days: env_or(
                    "ACCESS_TOKEN_EXPIRE_DAYS",
                    ACCESS_TOKEN_EXPIRE_DAYS,
                ),
            },
            video: VideoConfig {
                video_directory: env_string("VIDEO_DIRECTORY", "videos"),
                max_video_size_bytes: megabytes(env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)),
                ffmpeg_path: env_string("FFMPEG_PATH", "ffmpeg"),
                ffprobe_path: env_string("FFPROBE_PATH", "ffprobe"),
                hls_segment_duration: env_or("HLS_SEGMENT_DURATION", HLS_SEGMENT_DURATION),
                max_concurrent_transcodes: env_or(
                    "MAX_CONCURRENT_TRANSCODES",
                    MAX_CONCURRENT_TRANSCODES,
                ),
                job_queue_size: env_or("VIDEO_JOB_QUEUE_SIZE", VIDEO_JOB_QUEUE_SIZE),
                transcode_max_attempts: env_or("TRANSCODE_MAX_ATTEMPTS", TRANSCODE_MAX_ATTEMPTS),
                transcode_retry_base_delay_ms: env_or(
                    "TRANSCODE_RETRY_BASE_DELAY_MS",
                    TRANSCODE_RETRY_BASE_DELAY_MS,
                ),
            },
            database: DatabaseSettings {
                database_url: env::var("DATABASE_URL").unwrap_or_default(),
                db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
                db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth.secret_key.len() < 32 {
            return Err(anyhow::anyhow!(
                "SECRET_KEY must be at least 32 characters long"
            ));
        }

        if !self.database.database_url.starts_with("postgres://")
            && !self.database.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.auth.access_token_expire_days <= 0 {
            return Err(anyhow::anyhow!(
                "ACCESS_TOKEN_EXPIRE_DAYS must be a positive number of days"
            ));
        }

        if self.video.max_video_size_bytes == 0
            || self.video.max_video_size_bytes > megabytes(MAX_VIDEO_SIZE_MB_LIMIT)
        {
            return Err(anyhow::anyhow!(
                "MAX_VIDEO_SIZE_MB must be between 1 and {}",
                MAX_VIDEO_SIZE_MB_LIMIT
            ));
        }

        if self.video.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be at least 1"
            ));
        }

        if self.video.transcode_max_attempts == 0 {
            return Err(anyhow::anyhow!("TRANSCODE_MAX_ATTEMPTS must be at least 1"));
        }

        if self.video.hls_segment_duration == 0 {
            return Err(anyhow::anyhow!("HLS_SEGMENT_DURATION must be at least 1"));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.server.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.database.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.database.db_timeout_seconds
    }

    pub fn video_directory(&self) -> &str {
        &self.video.video_directory
    }

    pub fn transcode_retry_base_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.video.transcode_retry_base_delay_ms)
    }
}
