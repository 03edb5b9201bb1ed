use super::dirs::get_log_dir;
use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, default_format,
    detailed_format,
};

pub struct LogConfig {
    pub service_name: String,
    pub file_name: Option<String>,
    pub level: String,
    pub console: bool,
}

impl LogConfig {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            file_name: None,
            level: "info".to_string(),
            console: false,
        }
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }
}

// The returned handle must be kept alive until exit, dropping it flushes and closes the log file
pub fn init_log(config: LogConfig) -> Result<LoggerHandle, String> {
    // RUST_LOG takes precedence over the configured level
    let logger = Logger::try_with_env_or_str(&config.level).map_err(|e| {
        let msg = format!("Invalid log level {}: {}", config.level, e);
        println!("{}", msg);
        msg
    })?;

    let log_dir = get_log_dir(&config.service_name);
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        let msg = format!("Failed to create log directory {}: {}", log_dir.display(), e);
        println!("{}", msg);
        msg
    })?;

    let file_name = config.file_name.unwrap_or(config.service_name);
    let logger = logger
        .format(detailed_format)
        .log_to_file(FileSpec::default().directory(log_dir).basename(file_name))
        .rotate(
            Criterion::Size(100_000_000), // Rotate when file size reaches 100 MB
            Naming::Timestamps,
            Cleanup::KeepLogFiles(20),
        );

    let logger = if config.console {
        logger
            .duplicate_to_stderr(Duplicate::All)
            .format_for_stderr(default_format)
    } else {
        logger
    };

    logger.start().map_err(|e| {
        let msg = format!("Failed to initialize flexi_logger: {}", e);
        println!("{}", msg);
        msg
    })
}
