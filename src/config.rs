use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "STIPEND_ROSTER_DATA_DIR";
pub const LOG_FILTER_ENV: &str = "STIPEND_ROSTER_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    settings_from(|key| std::env::var(key).ok())
}

fn settings_from(lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(v) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        settings.data_dir = Some(PathBuf::from(v.trim()));
    }
    if let Some(v) = lookup(LOG_FILTER_ENV).filter(|v| !v.trim().is_empty()) {
        settings.log_filter = v.trim().to_string();
    }

    settings
}
