use atelier_logger::{LevelFilter, Logger};
use std::fs;

#[test]
fn file_layer_writes_to_rolling_log() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let log_dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file")
        .console(false)
        .path(&log_dir)
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert!(logger.guard().is_some(), "file logger must hold a worker guard");

    tracing::info!("file logging smoke entry");
    drop(logger); // flush the non-blocking worker

    let mut entries = fs::read_dir(&log_dir).expect("log dir exists");
    let file = entries.next().expect("one log file").expect("readable entry");
    let contents = fs::read_to_string(file.path()).expect("log file readable");
    assert!(contents.contains("file logging smoke entry"));
}
