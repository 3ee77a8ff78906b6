use super::*;

#[test]
fn test_download_config_defaults() {
    let dl = DownloadConfig::default();
    assert_eq!(dl.max_duration_secs, 600);
    assert_eq!(dl.standard_height, 360);
    assert_eq!(dl.high_height, 720);
    assert_eq!(dl.ytdlp_bin, "yt-dlp");
    assert_eq!(dl.timeout_secs, 600);
}

#[test]
fn test_download_config_from_toml() {
    let toml_str = r#"
        max_duration_secs = 1200
        high_height = 1080
    "#;
    let dl: DownloadConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(dl.max_duration_secs, 1200);
    assert_eq!(dl.high_height, 1080);
    // Unset fields keep their defaults.
    assert_eq!(dl.standard_height, 360);
    assert_eq!(dl.ytdlp_bin, "yt-dlp");
}

#[test]
fn test_full_config_from_toml() {
    let toml_str = r#"
        [bot]
        name = "testbot"

        [channel.telegram]
        enabled = true
        bot_token = "123:abc"
        allowed_users = [42]

        [download]
        max_duration_secs = 300

        [api]
        enabled = true
        port = 8080
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.bot.name, "testbot");
    assert_eq!(cfg.bot.log_level, "info");
    let tg = cfg.channel.telegram.expect("telegram section present");
    assert!(tg.enabled);
    assert_eq!(tg.bot_token, "123:abc");
    assert_eq!(tg.allowed_users, vec![42]);
    assert_eq!(cfg.download.max_duration_secs, 300);
    assert!(cfg.api.enabled);
    assert_eq!(cfg.api.port, 8080);
    assert_eq!(cfg.api.host, "127.0.0.1");
}

#[test]
fn test_empty_config_uses_defaults() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.bot.name, "Reelbot");
    assert_eq!(cfg.bot.data_dir, "~/.reelbot");
    assert!(cfg.channel.telegram.is_none());
    assert!(!cfg.api.enabled);
}

#[test]
fn test_shellexpand_home() {
    // Assert against the ambient HOME rather than mutating the process
    // environment, which races with other tests.
    if let Some(home) = std::env::var_os("HOME") {
        let home = home.to_string_lossy();
        assert_eq!(shellexpand("~/downloads"), format!("{home}/downloads"));
    }
    assert_eq!(shellexpand("/absolute/path"), "/absolute/path");
    assert_eq!(shellexpand("relative"), "relative");
}

#[test]
fn test_load_missing_file_falls_back_to_defaults() {
    let cfg = load("/nonexistent/reelbot-config.toml").unwrap();
    assert_eq!(cfg.download.max_duration_secs, 600);
}
