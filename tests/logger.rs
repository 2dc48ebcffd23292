use log::LevelFilter;
use zest::config::LoggingConfig;
use zest::logger;

#[test]
fn test_disabled_logging_installs_nothing() {
    let config = LoggingConfig::default();
    assert_eq!(logger::init(&config).unwrap(), None);
}

#[test]
fn test_build_dispatch_creates_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("zest.log");

    let dispatch = logger::build_dispatch(LevelFilter::Debug, &path);
    assert!(dispatch.is_ok());
    assert!(path.exists());
}

#[test]
fn test_log_file_lives_in_data_dir() {
    if let Ok(path) = logger::get_log_file_path() {
        assert!(path.ends_with("zest/zest.log"));
    }
}
