// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn appends_accumulate() {
    let fs = FakeFs::new();
    let path = Path::new("/q/test.log");

    let mut file = fs.open_append(path).unwrap();
    file.append(b"0 a\n").await.unwrap();
    file.append(b"1 b\n").await.unwrap();

    assert_eq!(fs.contents(path).unwrap(), b"0 a\n1 b\n");
    assert_eq!(fs.size(path).unwrap(), 8);
}

#[tokio::test]
async fn injected_failure_rejects_appends() {
    let fs = FakeFs::new();
    let path = Path::new("/q/test.log");
    let mut file = fs.open_append(path).unwrap();

    fs.fail_appends(true);
    assert!(file.append(b"0 a\n").await.is_err());
    assert_eq!(fs.contents(path).unwrap(), b"");

    fs.fail_appends(false);
    file.append(b"0 a\n").await.unwrap();
    assert_eq!(fs.contents(path).unwrap(), b"0 a\n");
}

#[test]
fn read_at_clamps_to_file_size() {
    let fs = FakeFs::new();
    let path = Path::new("/q/test.log");
    fs.write(path, b"0123456789");

    assert_eq!(fs.read_at(path, 4, 3).unwrap(), b"456");
    assert_eq!(fs.read_at(path, 8, 100).unwrap(), b"89");
    assert_eq!(fs.read_at(path, 20, 4).unwrap(), b"");
}

#[test]
fn missing_file_errors() {
    let fs = FakeFs::new();
    assert!(fs.size(Path::new("/absent")).is_err());
    assert!(fs.read_at(Path::new("/absent"), 0, 1).is_err());
}

#[test]
fn ensure_file_creates_empty() {
    let fs = FakeFs::new();
    let path = Path::new("/q/new.log");
    fs.ensure_file(path).unwrap();
    assert_eq!(fs.size(path).unwrap(), 0);
}
