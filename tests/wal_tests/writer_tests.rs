use std::fs;

use kvsecrets::config::WalSyncStrategy;
use kvsecrets::wal::{WalReader, WalWriter};

use super::{delete, put, setup_temp_wal};

#[test]
fn test_write_single_entry() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let lsn = writer.append(put("default", "db", "user", "admin")).unwrap();

    assert_eq!(lsn, 1);
    assert_eq!(writer.current_lsn(), 2);
}

#[test]
fn test_lsn_sequential() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let lsns: Vec<u64> = (0..50)
        .map(|i| writer.append(put("ns", &format!("c{}", i), "k", "v")).unwrap())
        .collect();

    for (i, lsn) in lsns.iter().enumerate() {
        assert_eq!(*lsn, (i + 1) as u64);
    }
}

#[test]
fn test_reopen_continues_lsn() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(put("ns", "a", "k", "v")).unwrap();
        writer.append(delete("ns", "a")).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.current_lsn(), 3);
    assert_eq!(writer.append(put("ns", "b", "k", "v")).unwrap(), 3);
}

#[test]
fn test_every_n_entries_still_readable() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 10 }).unwrap();
    for i in 0..25 {
        writer.append(put("ns", &format!("c{}", i), "k", "v")).unwrap();
    }

    let entries: Vec<_> = WalReader::open(&wal_path)
        .unwrap()
        .entries()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 25);
}

#[test]
fn test_truncate_empties_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    writer.append(put("ns", "a", "k", "v")).unwrap();
    writer.append(put("ns", "b", "k", "v")).unwrap();
    writer.truncate().unwrap();

    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);

    // appends after truncation land at the start of the file
    let lsn = writer.append(put("ns", "c", "k", "v")).unwrap();
    assert_eq!(lsn, 3);

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert_eq!(reader.next_entry().unwrap().unwrap().lsn, 3);
    assert!(reader.next_entry().unwrap().is_none());
}
