// Startup path: config file and whitelist feeding a freeze engine

use chrono::{DateTime, Utc};
use snoozr_core::{Error, FreezeEngine, ProcessControl, Result, SafetyFilter};
use snoozr_daemon::{whitelist, Config};
use std::fs;

struct StaticPlatform;

impl ProcessControl for StaticPlatform {
    fn active_pid(&self) -> Option<u32> {
        None
    }

    fn process_name(&self, pid: u32) -> String {
        format!("app{}", pid)
    }

    fn suspend(&self, _pid: u32) -> Result<()> {
        Ok(())
    }

    fn resume(&self, _pid: u32) -> Result<()> {
        Ok(())
    }

    fn resident_memory_bytes(&self, pid: u32) -> Result<u64> {
        Err(Error::Platform(format!("Process {} not found", pid)))
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[test]
fn test_files_on_disk_configure_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("snoozr.toml");
    let whitelist_path = dir.path().join("vip.txt");

    fs::write(
        &config_path,
        r#"
            [engine]
            idle_timeout_secs = 30
            min_memory_mb = 200
            history_capacity = 3
        "#,
    )
    .unwrap();
    fs::write(&whitelist_path, "# music\nSpotify\nObsidian\n").unwrap();

    let config = Config::load(&config_path).unwrap();
    config.validate().unwrap();
    let vip = whitelist::load_or_create(&whitelist_path);

    let mut engine = FreezeEngine::new(
        StaticPlatform,
        SafetyFilter::new(vip),
        config.engine_settings(false),
        config.sentinel.clone(),
    );

    assert_eq!(engine.settings().idle_timeout_secs, 30);
    assert_eq!(engine.history().capacity(), 3);

    assert!(engine.observe_app(10, "Obsidian", at(0)).is_none());
    engine.observe_app(11, "firefox", at(0));

    assert!(engine.history().get(10).is_none());
    assert!(engine.history().get(11).is_some());
}

#[test]
fn test_fresh_directory_gets_default_whitelist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whitelist.txt");

    let vip = whitelist::load_or_create(&path);
    let filter = SafetyFilter::new(vip);

    assert!(path.exists());
    assert!(filter.is_critical("Spotify Premium"));
    assert!(filter.is_critical("Discord"));
    assert!(!filter.is_critical("firefox"));
}
