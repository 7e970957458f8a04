use log::{info, warn, LevelFilter};
use std::path::Path;

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Environment variable overriding the file log level
pub const LOG_ENV_VAR: &str = "ALBUM_TAGGER_LOG";

/// Default directory for log files, under the user's local data directory
pub fn default_log_dir() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("album-tagger").join("logs"))
}

/// Initialize the logger with timestamp, log level, and module path.
/// Logs are written to a rotating file only.
pub fn init_logger(log_dir: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("album-tagger.log");
    let archived_logs_pattern = format!("{}/album-tagger.{{}}.log", log_dir.display());

    // Rotate at 10MB, keep 5 archives
    let file_trigger = SizeTrigger::new(10 * 1024 * 1024);
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern, 5)
        .map_err(|e| format!("Failed to create log roller: {}", e))?;
    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| format!("Failed to create log appender: {}", e))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(LevelFilter::Trace))
        .map_err(|e| format!("Failed to build log config: {}", e))?;

    log4rs::init_config(config).map_err(|e| format!("Failed to initialize log4rs: {}", e))?;

    let level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(level);
    log::set_max_level(level);

    info!("Logging to file: {}", log_file_path.display());
    Ok(())
}

/// Log an entry skipped during a scan
pub fn log_scan_issue(path: Option<&Path>, message: &str) {
    match path {
        Some(path) => warn!("Skipped during scan - Path: {}, Error: {}", path.display(), message),
        None => warn!("Skipped during scan - Error: {}", message),
    }
}

/// Log a sidecar write
pub fn log_sidecar_write(path: &Path, entries: usize) {
    info!(
        "FS CHANGE - Operation: write sidecar, Path: {}, Details: {} entries",
        path.display(),
        entries
    );
}
