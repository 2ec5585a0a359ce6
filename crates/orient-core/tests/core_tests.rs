use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use orient_core::cache::{ChunkStore, CorpusCache};
use orient_core::chunker::{Chunker, ChunkingConfig};
use orient_core::corpus::{FileCorpusSource, InMemoryCorpusSource};
use orient_core::error::{Error, Result};
use orient_core::traits::CorpusSource;

/// Wraps a source and counts how often it is read.
struct CountingSource {
    inner: InMemoryCorpusSource,
    loads: AtomicUsize,
}

impl CountingSource {
    fn new(inner: InMemoryCorpusSource) -> Self { Self { inner, loads: AtomicUsize::new(0) } }
    fn loads(&self) -> usize { self.loads.load(Ordering::SeqCst) }
}

impl CorpusSource for CountingSource {
    fn load(&self, corpus_id: &str) -> Result<String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(corpus_id)
    }
}

#[test]
fn file_source_reads_single_json_blob() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("jobs.json");
    fs::write(&path, r#"[{"title":"Nurse","city":"Brussels"}]"#).unwrap();

    let source = FileCorpusSource::new().with_corpus("jobs", &path);
    let chunks = Chunker::default().load(&source, "jobs").expect("load");
    assert_eq!(chunks.len(), 1, "short single-line JSON is one chunk");
    assert_eq!(chunks[0].corpus_id, "jobs");
    assert!(chunks[0].text.contains("Nurse"));
}

#[test]
fn file_source_concatenates_directory_in_path_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.txt"), "bravo").unwrap();
    fs::write(dir.join("a.json"), "alpha").unwrap();
    fs::write(dir.join("ignored.md"), "nope").unwrap();

    let source = FileCorpusSource::new().with_corpus("dir", dir);
    assert_eq!(source.load("dir").expect("load"), "alpha\nbravo");
}

#[cfg(unix)]
#[test]
fn directory_walk_follows_links_and_skips_broken_entries() {
    use std::os::unix::fs::symlink;

    let tmp = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    fs::write(elsewhere.path().join("shared.txt"), "charlie").unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha").unwrap();
    symlink(elsewhere.path().join("shared.txt"), dir.join("c.txt")).unwrap();
    symlink(dir.join("missing.txt"), dir.join("b.txt")).unwrap();

    let source = FileCorpusSource::new().with_corpus("dir", dir);
    assert_eq!(source.load("dir").expect("load"), "alpha\ncharlie");
}

#[test]
fn missing_file_and_unknown_id_are_unavailable() {
    let tmp = TempDir::new().unwrap();
    let source = FileCorpusSource::new().with_corpus("gone", tmp.path().join("missing.json"));
    assert!(matches!(source.load("gone"), Err(Error::CorpusUnavailable { .. })));
    assert!(matches!(source.load("never-configured"), Err(Error::CorpusUnavailable { .. })));
}

#[test]
fn invalid_utf8_is_unavailable() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.txt");
    fs::write(&path, [0x66u8, 0xff, 0xfe, 0x6f]).unwrap();
    let source = FileCorpusSource::new().with_corpus("bad", &path);
    assert!(matches!(source.load("bad"), Err(Error::CorpusUnavailable { .. })));
}

#[test]
fn store_absorbs_unavailable_corpus_as_no_chunks() {
    let store = ChunkStore::new(Arc::new(InMemoryCorpusSource::new()), Chunker::default());
    assert!(store.chunks("absent").is_empty());
    assert!(matches!(store.try_chunks("absent"), Err(Error::CorpusUnavailable { .. })));
}

#[test]
fn cache_reads_source_once_until_invalidated() {
    let source = Arc::new(CountingSource::new(InMemoryCorpusSource::new().with_corpus("jobs", "Nurse job listing.")));
    let cache = Arc::new(CorpusCache::new());
    let store = ChunkStore::new(source.clone(), Chunker::default()).with_cache(cache.clone());

    let first = store.chunks("jobs");
    let second = store.chunks("jobs");
    assert_eq!(source.loads(), 1);
    assert!(Arc::ptr_eq(&first, &second), "cache hands out the same snapshot");

    assert_eq!(cache.invalidate("jobs"), 1);
    let third = store.chunks("jobs");
    assert_eq!(source.loads(), 2);
    assert_eq!(*first, *third);
}

#[test]
fn cache_is_keyed_by_chunking_parameters() {
    let source = Arc::new(CountingSource::new(InMemoryCorpusSource::new().with_corpus("c", "abcdefghij")));
    let cache = Arc::new(CorpusCache::new());
    let small = Chunker::new(ChunkingConfig { max_size: 4, overlap: 1 }).unwrap();
    let wide = Chunker::new(ChunkingConfig { max_size: 8, overlap: 2 }).unwrap();

    let a = ChunkStore::new(source.clone(), small).with_cache(cache.clone()).chunks("c");
    let b = ChunkStore::new(source.clone(), wide).with_cache(cache.clone()).chunks("c");
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(source.loads(), 2);
}

#[test]
fn cache_never_stores_failures() {
    let source = Arc::new(CountingSource::new(InMemoryCorpusSource::new()));
    let cache = Arc::new(CorpusCache::new());
    let store = ChunkStore::new(source.clone(), Chunker::default()).with_cache(cache.clone());

    assert!(store.chunks("absent").is_empty());
    assert!(store.chunks("absent").is_empty());
    assert_eq!(source.loads(), 2);
    assert!(cache.is_empty());
}
