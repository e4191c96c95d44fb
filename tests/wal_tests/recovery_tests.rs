use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use kvsecrets::config::WalSyncStrategy;
use kvsecrets::wal::{WalEntry, WalRecovery, WalWriter};

use super::{put, setup_temp_wal};

/// Write entries using WalWriter (produces a well-formed WAL)
fn write_entries_via_writer(path: &Path, count: usize) {
    let mut writer = WalWriter::open(path, WalSyncStrategy::EveryWrite).unwrap();
    for i in 0..count {
        writer.append(put("ns", &format!("c{}", i), "k", "v")).unwrap();
    }
}

/// Write raw serialized entries directly to a file (for crafting corruption)
fn write_raw(path: &Path, frames: &[Vec<u8>]) {
    let mut file = File::create(path).unwrap();
    for frame in frames {
        file.write_all(frame).unwrap();
    }
    file.sync_all().unwrap();
}

#[test]
fn test_recover_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_clean_wal() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 5);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 5);
    assert_eq!(result.entries_recovered, 5);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 5);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_truncates_partial_write() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 3);
    let good_len = fs::metadata(&wal_path).unwrap().len();

    let partial = WalEntry::new(4, put("ns", "torn", "k", "v")).serialize().unwrap();
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&partial[..partial.len() / 2]).unwrap();
    }

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 3);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), good_len);
}

#[test]
fn test_recover_skips_corrupt_entry() {
    let (_temp, wal_path) = setup_temp_wal();
    let first = WalEntry::new(1, put("ns", "a", "k", "v")).serialize().unwrap();
    let mut second = WalEntry::new(2, put("ns", "b", "k", "v")).serialize().unwrap();
    let third = WalEntry::new(3, put("ns", "c", "k", "v")).serialize().unwrap();
    let last = second.len() - 1;
    second[last] ^= 0xff;
    write_raw(&wal_path, &[first, second, third]);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 3]);
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(result.last_lsn, 3);
}

#[test]
fn test_verify_does_not_modify() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 2);
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
    }
    let len_before = fs::metadata(&wal_path).unwrap().len();

    let result = WalRecovery::verify(&wal_path).unwrap();

    assert_eq!(result.entries_recovered, 2);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), len_before);
}
