//! Tests for the Store
//!
//! These tests verify:
//! - Bucket creation, put/get/delete inside transactions
//! - Commit persistence and rollback on error
//! - Lock timeouts between writers and readers
//! - Concurrent readers
//! - Store open failures

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gzkv::config::StoreOptions;
use gzkv::store::Store;
use gzkv::GzkvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("test.db"), &StoreOptions::default()).unwrap();
    (temp_dir, store)
}

fn put(store: &Store, bucket: &str, key: &str, value: &str) {
    store
        .update(|tx| tx.create_bucket_if_not_exists(bucket)?.put(key, value))
        .unwrap();
}

fn get(store: &Store, bucket: &str, key: &str) -> Option<Vec<u8>> {
    store
        .view(|tx| Ok(tx.bucket(bucket).and_then(|b| b.get(key)).map(<[u8]>::to_vec)))
        .unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("fresh.db");

    let store = Store::open(&path, &StoreOptions::default()).unwrap();

    assert!(path.exists());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    assert!(store.view(|tx| Ok(tx.is_empty())).unwrap());
}

#[test]
fn test_put_get() {
    let (_temp, store) = setup_temp_store();

    put(&store, "galeata", "data", "smth");

    assert_eq!(get(&store, "galeata", "data"), Some(b"smth".to_vec()));
    assert_eq!(get(&store, "galeata", "missing"), None);
    assert_eq!(get(&store, "other", "data"), None);
}

#[test]
fn test_overwrite_and_delete() {
    let (_temp, store) = setup_temp_store();

    put(&store, "b", "k", "v1");
    put(&store, "b", "k", "v2");
    assert_eq!(get(&store, "b", "k"), Some(b"v2".to_vec()));

    store
        .update(|tx| tx.bucket_mut("b").unwrap().delete("k"))
        .unwrap();
    assert_eq!(get(&store, "b", "k"), None);
}

#[test]
fn test_for_each_visits_keys_in_order() {
    let (_temp, store) = setup_temp_store();
    store
        .update(|tx| {
            let mut b = tx.create_bucket("letters")?;
            for key in ["c", "a", "b"] {
                b.put(key, key.to_uppercase())?;
            }
            Ok(())
        })
        .unwrap();

    let seen = store
        .view(|tx| {
            let mut seen = Vec::new();
            tx.bucket("letters").unwrap().for_each(|k, v| {
                seen.push((k.to_vec(), v.to_vec()));
                Ok(())
            })?;
            Ok(seen)
        })
        .unwrap();

    assert_eq!(
        seen,
        vec![
            (b"a".to_vec(), b"A".to_vec()),
            (b"b".to_vec(), b"B".to_vec()),
            (b"c".to_vec(), b"C".to_vec()),
        ]
    );
}

#[test]
fn test_create_bucket_twice_fails() {
    let (_temp, store) = setup_temp_store();
    store.update(|tx| tx.create_bucket("b").map(|_| ())).unwrap();

    let err = store.update(|tx| tx.create_bucket("b").map(|_| ())).unwrap_err();

    assert!(matches!(err, GzkvError::BucketExists(ref name) if name == "b"));
}

#[test]
fn test_delete_missing_bucket_fails() {
    let (_temp, store) = setup_temp_store();

    let err = store.update(|tx| tx.delete_bucket("nope")).unwrap_err();

    assert!(matches!(err, GzkvError::NoSuchPartition(_)));
}

#[test]
fn test_empty_key_is_rejected() {
    let (_temp, store) = setup_temp_store();

    let err = store
        .update(|tx| tx.create_bucket_if_not_exists("b")?.put("", "v"))
        .unwrap_err();
    assert!(matches!(err, GzkvError::InvalidKey(_)));

    let err = store
        .update(|tx| tx.create_bucket_if_not_exists("").map(|_| ()))
        .unwrap_err();
    assert!(matches!(err, GzkvError::InvalidKey(_)));
}

#[test]
fn test_bucket_names_sorted() {
    let (_temp, store) = setup_temp_store();
    for name in ["zeta", "alpha", "mid"] {
        put(&store, name, "k", "v");
    }

    let names: Vec<Vec<u8>> = store
        .view(|tx| Ok(tx.bucket_names().map(<[u8]>::to_vec).collect()))
        .unwrap();

    assert_eq!(names, vec![b"alpha".to_vec(), b"mid".to_vec(), b"zeta".to_vec()]);
}

// =============================================================================
// Durability / Rollback Tests
// =============================================================================

#[test]
fn test_commit_is_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("persist.db");

    {
        let store = Store::open(&path, &StoreOptions::default()).unwrap();
        put(&store, "b", "key", "value");
        store.close().unwrap();
    }

    let reopened = Store::open(&path, &StoreOptions::default()).unwrap();
    assert_eq!(get(&reopened, "b", "key"), Some(b"value".to_vec()));
}

#[test]
fn test_failed_update_rolls_back() {
    let (_temp, store) = setup_temp_store();
    put(&store, "b", "keep", "1");

    let err = store
        .update(|tx| {
            let mut b = tx.create_bucket_if_not_exists("b")?;
            b.put("keep", "changed")?;
            b.put("new", "2")?;
            tx.create_bucket("other")?;
            Err::<(), _>(GzkvError::Storage("abort".to_string()))
        })
        .unwrap_err();

    assert!(matches!(err, GzkvError::Storage(_)));
    assert_eq!(get(&store, "b", "keep"), Some(b"1".to_vec()));
    assert_eq!(get(&store, "b", "new"), None);
    assert!(store.view(|tx| Ok(tx.bucket("other").is_none())).unwrap());

    // Nothing reached the file either
    let reopened = Store::open(store.path(), &StoreOptions::default()).unwrap();
    assert_eq!(get(&reopened, "b", "keep"), Some(b"1".to_vec()));
}

#[test]
fn test_write_to_reproduces_file() {
    let (_temp, store) = setup_temp_store();
    put(&store, "b", "k", "v");

    let mut image = Vec::new();
    let written = store.view(|tx| tx.write_to(&mut image)).unwrap();

    assert_eq!(written, image.len() as u64);
    assert_eq!(std::fs::read(store.path()).unwrap(), image);
}

#[test]
fn test_write_to_empty_store_writes_nothing() {
    let (_temp, store) = setup_temp_store();

    let mut image = Vec::new();
    let written = store.view(|tx| tx.write_to(&mut image)).unwrap();

    assert_eq!(written, 0);
    assert!(image.is_empty());
}

// =============================================================================
// Open Failure Tests
// =============================================================================

#[test]
fn test_open_garbage_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("garbage.db");
    std::fs::write(&path, b"not a store image, just some bytes").unwrap();

    let err = Store::open(&path, &StoreOptions::default()).unwrap_err();

    assert!(matches!(err, GzkvError::StoreOpenFailed { .. }), "got {:?}", err);
}

#[test]
fn test_open_directory_fails() {
    let temp_dir = TempDir::new().unwrap();

    let err = Store::open(temp_dir.path(), &StoreOptions::default()).unwrap_err();

    assert!(matches!(err, GzkvError::StoreOpenFailed { .. }), "got {:?}", err);
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_second_writer_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let options = StoreOptions::builder()
        .lock_timeout(Duration::from_millis(50))
        .build();
    let store = Arc::new(Store::open(temp_dir.path().join("lock.db"), &options).unwrap());

    let (started_tx, started_rx) = mpsc::channel();
    let holder = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store
                .update(|tx| {
                    tx.create_bucket_if_not_exists("b")?.put("k", "v")?;
                    started_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(500));
                    Ok(())
                })
                .unwrap();
        })
    };
    started_rx.recv().unwrap();

    let write_err = store.update(|_| Ok(())).unwrap_err();
    assert!(matches!(write_err, GzkvError::LockTimeout(_)), "got {:?}", write_err);

    let read_err = store.view(|_| Ok(())).unwrap_err();
    assert!(matches!(read_err, GzkvError::LockTimeout(_)), "got {:?}", read_err);

    holder.join().unwrap();
    assert_eq!(get(&store, "b", "k"), Some(b"v".to_vec()));
}

#[test]
fn test_concurrent_reads() {
    let (_temp, store) = setup_temp_store();
    store
        .update(|tx| {
            let mut b = tx.create_bucket("b")?;
            for i in 0..100 {
                b.put(format!("key{}", i), format!("value{}", i))?;
            }
            Ok(())
        })
        .unwrap();
    let store = Arc::new(store);

    let mut handles = vec![];
    for _ in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let expected = format!("value{}", i);
                let got = get(&store, "b", &format!("key{}", i));
                assert_eq!(got, Some(expected.into_bytes()));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_writers_serialize() {
    let temp_dir = TempDir::new().unwrap();
    let options = StoreOptions::builder()
        .lock_timeout(Duration::from_secs(30))
        .build();
    let store = Arc::new(Store::open(temp_dir.path().join("writers.db"), &options).unwrap());

    let mut handles = vec![];
    for t in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                put(&store, "shared", &format!("t{}_k{}", t, i), "v");
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let count = store
        .view(|tx| Ok(tx.bucket("shared").map_or(0, |b| b.len())))
        .unwrap();
    assert_eq!(count, 40);
}
