// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kyu_core::FakeFs;
use tempfile::TempDir;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn temp_log_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.log");
    (dir, path)
}

#[tokio::test]
async fn persists_and_reloads_records() {
    let (_dir, path) = temp_log_path();

    {
        let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
        log.append(lines(&["test0", "test1", "test2"])).await.unwrap();
        log.append(lines(&["test3", "test4", "test5"])).await.unwrap();
        log.append(lines(&["test6", "test7", "test8"])).await.unwrap();
        assert_eq!(log.size(), 9);
    }

    let file = std::fs::read_to_string(&path).unwrap();
    let disk_lines: Vec<&str> = file.lines().collect();
    assert_eq!(disk_lines.len(), 9);
    assert_eq!(disk_lines[0], "0 test0");
    assert_eq!(disk_lines[8], "8 test8");

    // second instance reads the buffer back from the file
    let log = FsLog::open(&path, LogOptions::default()).unwrap();
    assert_eq!(log.size(), 9);

    while let Some(record) = log.next() {
        record.commit();
    }
    assert_eq!(log.size(), 0);
    assert!(log.next().is_none());
}

#[tokio::test]
async fn sequence_continues_across_restart() {
    let (_dir, path) = temp_log_path();

    {
        let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
        log.append(lines(&["a", "b"])).await.unwrap();
        assert_eq!(log.last_sequence(), Some(1));
    }

    let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
    assert_eq!(log.last_sequence(), Some(1));
    log.append(lines(&["c"])).await.unwrap();

    let sequences: Vec<u64> = log.read().iter().map(|r| r.sequence()).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[tokio::test]
async fn resumes_from_offset() {
    let (_dir, path) = temp_log_path();

    {
        let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
        for batch in 0..6 {
            let base = batch * 3;
            let batch_lines: Vec<String> =
                (base..base + 3).map(|i| format!("test{i}")).collect();
            log.append(batch_lines).await.unwrap();
        }
        assert_eq!(log.size(), 18);
    }

    let log = FsLog::open_from(&path, LogOptions::default(), 15).unwrap();
    assert_eq!(log.size(), 3);

    let next = log.next().unwrap();
    assert_eq!(next.record().to_line(), "15 test15");
    next.commit();
    assert_eq!(log.next().unwrap().record().to_line(), "16 test16");
}

#[tokio::test]
async fn missing_resume_offset_fails_construction() {
    let (_dir, path) = temp_log_path();
    std::fs::write(&path, "5 test5\n6 test6\n").unwrap();

    assert!(matches!(
        FsLog::open_from(&path, LogOptions::default(), 2),
        Err(LogError::OffsetNotFound { offset: 2 })
    ));
}

#[tokio::test]
async fn flushes_arrive_in_append_order() {
    let (_dir, path) = temp_log_path();
    let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
    let mut rx = log.subscribe();

    log.append(lines(&["a0", "a1", "a2"])).await.unwrap();
    log.append(lines(&["b0", "b1", "b2", "b3"])).await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), LogEvent::Flushed { last_seq: 2 });
    assert_eq!(rx.recv().await.unwrap(), LogEvent::Flushed { last_seq: 6 });

    let payloads: Vec<String> = log
        .read()
        .iter()
        .map(|r| r.payload().to_string())
        .collect();
    assert_eq!(payloads, vec!["a0", "a1", "a2", "b0", "b1", "b2", "b3"]);
}

#[tokio::test]
async fn soft_cap_rejects_whole_batch() {
    let (_dir, path) = temp_log_path();
    let options = LogOptions {
        capacity: 4,
        ..LogOptions::default()
    };
    let mut log = FsLog::open(&path, options).unwrap();

    assert!(log.append(lines(&["a", "b", "c"])).await.unwrap());
    assert!(log.append(lines(&["d", "e"])).await.unwrap()); // overshoots the cap
    assert!(!log.append(lines(&["f"])).await.unwrap());

    // the rejected batch left no trace on disk
    let file = std::fs::read_to_string(&path).unwrap();
    assert_eq!(file.lines().count(), 5);
}

#[tokio::test]
async fn failed_write_leaves_no_state() {
    let fs = FakeFs::new();
    let path = Path::new("/q/test.log");
    let mut log = FsLog::open_with(fs.clone(), path, LogOptions::default(), 0).unwrap();
    let mut rx = log.subscribe();

    fs.fail_appends(true);
    assert!(matches!(
        log.append(lines(&["a", "b"])).await,
        Err(LogError::Io(_))
    ));

    // no buffer mutation, no flush, no sequence consumed
    assert_eq!(log.size(), 0);
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));

    fs.fail_appends(false);
    assert!(log.append(lines(&["a", "b"])).await.unwrap());
    let sequences: Vec<u64> = log.read().iter().map(|r| r.sequence()).collect();
    assert_eq!(sequences, vec![0, 1]);
}

#[tokio::test]
async fn commit_emits_event_and_shrinks_buffer() {
    let (_dir, path) = temp_log_path();
    let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
    log.append(lines(&["a", "b"])).await.unwrap();

    let mut rx = log.subscribe();
    let record = log.next().unwrap();
    assert_eq!(record.commit(), 0);

    assert_eq!(rx.recv().await.unwrap(), LogEvent::Committed { seq: 0 });
    assert_eq!(log.size(), 1);

    // the durable file is untouched by commits
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
}

#[tokio::test]
async fn close_releases_output_stream() {
    let (_dir, path) = temp_log_path();
    let mut log = FsLog::open(&path, LogOptions::default()).unwrap();
    log.append(lines(&["a"])).await.unwrap();
    log.close().await.unwrap();

    assert!(matches!(
        log.append(lines(&["b"])).await,
        Err(LogError::Closed)
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "0 a\n");
}

#[tokio::test]
async fn creates_file_and_parents_on_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/queues/test.log");

    let log = FsLog::open(&path, LogOptions::default()).unwrap();
    assert!(path.exists());
    assert_eq!(log.size(), 0);
}
