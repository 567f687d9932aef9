use std::time::Duration;

use pretty_assertions::assert_eq;
use testgen_core::config::Config;
use testgen_core::config::ConfigOverrides;
use testgen_core::config::ConfigToml;

/// Kept alone in its own test binary: it sets process environment.
#[test]
fn file_timeouts_leave_invalid_env_flags_unread() {
    // SAFETY: no other thread in this binary touches the environment.
    unsafe {
        std::env::set_var("TESTGEN_REQUEST_TIMEOUT_MS", "abc");
        std::env::set_var("TESTGEN_PULL_TIMEOUT_MS", "abc");
    }

    let cfg = ConfigToml {
        request_timeout_ms: Some(1_000),
        pull_timeout_ms: Some(2_000),
        ..Default::default()
    };
    let config = Config::load_from_base_config_with_overrides(cfg, ConfigOverrides::default());
    assert_eq!(config.request_timeout, Duration::from_millis(1_000));
    assert_eq!(config.pull_timeout, Duration::from_millis(2_000));
}
