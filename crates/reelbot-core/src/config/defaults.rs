//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Reelbot".to_string()
}

pub fn default_data_dir() -> String {
    "~/.reelbot".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_max_duration() -> u64 {
    600
}

pub fn default_standard_height() -> u32 {
    360
}

pub fn default_high_height() -> u32 {
    720
}

pub fn default_ytdlp_bin() -> String {
    "yt-dlp".to_string()
}

pub fn default_fetch_timeout() -> u64 {
    600
}

pub fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_api_port() -> u16 {
    3000
}
