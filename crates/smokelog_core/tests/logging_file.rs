use log::info;
use smokelog_core::{flush_logging, init_logging};
use std::fs;
use std::path::Path;

fn log_contents(dir: &Path) -> String {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .map(|path| fs::read_to_string(path).unwrap())
        .collect()
}

#[test]
fn flushed_events_reach_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    init_logging("info", dir.path()).unwrap();

    info!("event=record_add module=service status=ok id=flush-check");
    flush_logging();

    let contents = log_contents(dir.path());
    assert!(contents.contains("event=core_init"));
    assert!(contents.contains("event=record_add"));
    assert!(contents.contains("id=flush-check"));
}
