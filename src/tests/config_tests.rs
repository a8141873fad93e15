use crate::config::ScraperConfig;
use std::time::Duration;

// The only test that touches SCRAPER_* variables, so it cannot race others
#[test]
fn test_from_env_overrides_defaults() {
    std::env::set_var("SCRAPER_API_BASE", "http://localhost:9000/api/");
    std::env::set_var("SCRAPER_CDN_BASE", "https://media.example.net/");
    std::env::set_var("SCRAPER_ASSET_SIZE", "512");
    std::env::set_var("SCRAPER_RETRY_FACTOR", "-1");
    std::env::set_var("SCRAPER_REQUEST_TIMEOUT_SECS", "not-a-number");

    let config = ScraperConfig::from_env();

    assert_eq!(config.api_base, "http://localhost:9000/api");
    assert_eq!(config.cdn_base, "https://media.example.net");
    assert_eq!(config.asset_size, 512);
    // Rejected values keep their defaults
    assert_eq!(config.retry_factor, 2.0);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(
        config.profile_url("42"),
        "http://localhost:9000/api/users/42/profile"
    );

    std::env::set_var("SCRAPER_RETRY_FACTOR", "3.5");
    std::env::set_var("SCRAPER_REQUEST_TIMEOUT_SECS", "5");

    let config = ScraperConfig::from_env();

    assert_eq!(config.retry_factor, 3.5);
    assert_eq!(config.request_timeout, Duration::from_secs(5));

    for key in [
        "SCRAPER_API_BASE",
        "SCRAPER_CDN_BASE",
        "SCRAPER_ASSET_SIZE",
        "SCRAPER_RETRY_FACTOR",
        "SCRAPER_REQUEST_TIMEOUT_SECS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_default_endpoints() {
    let config = ScraperConfig::default();

    assert_eq!(
        config.channels_url(),
        "https://discord.com/api/v9/users/@me/channels"
    );
    assert_eq!(
        config.profile_url("42"),
        "https://discord.com/api/v9/users/42/profile"
    );
    assert_eq!(config.asset_size, 2048);
    assert_eq!(config.retry_factor, 2.0);
}
