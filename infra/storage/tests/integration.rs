use atelier_storage::{Compression, Storage, StorageError};
use tempfile::TempDir;

#[tokio::test]
async fn path_traversal_blocked() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    assert!(storage.resolve("../etc/passwd").is_err());
    assert!(storage.resolve("foo/../../bar").is_err());
    assert!(storage.resolve("/etc/passwd").is_err());
}

#[tokio::test]
async fn write_read_roundtrip() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    let payload = b"hello world";
    storage.write("foo/bar.bin", payload).await.unwrap();
    assert!(storage.exists("foo/bar.bin").unwrap());

    let data = storage.read("foo/bar.bin").await.unwrap();
    assert_eq!(data, payload);

    let meta = storage.metadata("foo/bar.bin").await.unwrap();
    assert!(meta.len() > 0);
}

#[tokio::test]
async fn compressed_roundtrip() {
    let temp = TempDir::new().unwrap();
    let storage =
        Storage::builder().root(temp.path()).compression(Compression::Lz4).connect().await.unwrap();

    let payload = vec![7u8; 4096];
    storage.write("bin/data.dat", &payload).await.unwrap();

    assert_eq!(storage.read("bin/data.dat").await.unwrap(), payload);
}

#[tokio::test]
async fn namespace_isolation_and_sharding() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    let ns_a = storage.namespace("user_a").unwrap();
    let ns_b = storage.namespace("user_b").unwrap();

    ns_a.write("Jx2fQ81pKwWn", b"a").await.unwrap();
    ns_b.write("Jx2fQ81pKwWn", b"b").await.unwrap();

    let a_path = ns_a.resolve("Jx2fQ81pKwWn").unwrap();
    let b_path = ns_b.resolve("Jx2fQ81pKwWn").unwrap();
    assert_ne!(a_path, b_path, "namespaces must not collide");
    assert!(a_path.to_string_lossy().contains("/Jx/"), "expected a shard directory");

    assert_eq!(ns_a.read("Jx2fQ81pKwWn").await.unwrap(), b"a");
    assert_eq!(ns_b.read("Jx2fQ81pKwWn").await.unwrap(), b"b");
}

#[tokio::test]
async fn overwrite_is_atomic_replace() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    storage.write("conf.bin", b"first").await.unwrap();
    storage.write("conf.bin", b"second").await.unwrap();
    assert_eq!(storage.read("conf.bin").await.unwrap(), b"second");
}

#[tokio::test]
async fn delete_and_missing_read() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    storage.write("tmp/file.txt", b"x").await.unwrap();
    storage.delete("tmp/file.txt").await.unwrap();
    assert!(!storage.exists("tmp/file.txt").unwrap());

    let err = storage.read("tmp/file.txt").await.expect_err("expected error");
    assert!(matches!(err, StorageError::FileNotFound { .. }));
}

#[tokio::test]
async fn illegal_namespace_rejected() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    assert!(storage.namespace("..").is_err());
    assert!(storage.namespace("a/b").is_err());
}
