pub const LOG_FILE_NAME: &str = "attend.log";
pub const ERR_LOG_FILE_NAME: &str = "attend_err.log";
pub const LOG_FILE_MAX_SIZE: u64 = 50_000_000;
pub const LOG_FILE_MAX_ROLLS: u32 = 5;

pub const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f%:z)} [{l:5.5}] {t} {m}{n}";
pub const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f%:z)} [{h({l:5.5})}] {t} {m}{n}";

/// Targets logged at the requested app level (workspace crates and the `http` request log); everything else is off unless named explicitly.
pub const WHITELISTED_CRATES: &[&str] = &["attend_core", "attend_service", "attend_mint_service", "http"];
