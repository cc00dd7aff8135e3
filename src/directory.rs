//! Concurrent map from type identity to built member caches.
//!
//! # Mental model
//!
//! * The directory publishes an immutable bucket array through `ArcSwap`.
//!   Readers load it and walk its chains without locking.
//! * Writers hold one directory-wide mutex, build the cache, then publish a
//!   fresh array whose target bucket gets a new chain head. Existing chain
//!   links are shared, never mutated.
//! * When occupancy reaches the bucket count the array doubles. Entries are
//!   re-threaded by `Arc`, so caches are never copied and any reader still
//!   holding the old array keeps a consistent view.
//!
//! A reader on a stale array may miss an entry inserted a moment ago; it
//! falls through to the locked path, which re-checks before building, so a
//! key is built at most once per successful build.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::cache::MemberCache;
use crate::error::EnumCacheError;
use crate::hash::{bucket_count_for, bucket_index, hash_key};
use crate::kind::{Underlying, UnderlyingKind};

/// Bucket count of a directory created with [`CacheDirectory::new`].
pub const DEFAULT_CAPACITY: usize = 16;

struct DirectoryEntry<K> {
    key: K,
    hash: u64,
    kind: UnderlyingKind,
    cache: Arc<dyn Any + Send + Sync>,
}

struct ChainLink<K> {
    entry: Arc<DirectoryEntry<K>>,
    next: Option<Arc<ChainLink<K>>>,
}

struct BucketArray<K> {
    heads: Box<[Option<Arc<ChainLink<K>>>]>,
    len: usize,
}

impl<K: Eq> BucketArray<K> {
    fn empty(capacity: usize) -> Self {
        Self {
            heads: vec![None; bucket_count_for(capacity)].into_boxed_slice(),
            len: 0,
        }
    }

    fn find(&self, key: &K, hash: u64) -> Option<&Arc<DirectoryEntry<K>>> {
        let mut link = self.heads[bucket_index(hash, self.heads.len())].as_ref();
        while let Some(current) = link {
            if current.entry.hash == hash && current.entry.key == *key {
                return Some(&current.entry);
            }
            link = current.next.as_ref();
        }
        None
    }

    fn entries(&self) -> impl Iterator<Item = &Arc<DirectoryEntry<K>>> {
        self.heads.iter().flat_map(|head| {
            std::iter::successors(head.as_ref(), |link| link.next.as_ref()).map(|link| &link.entry)
        })
    }

    /// Copy of this array with `entry` prepended to its bucket.
    ///
    /// Doubles the bucket count first when full.
    fn with_entry(&self, entry: Arc<DirectoryEntry<K>>) -> Self {
        let mut heads = if self.len >= self.heads.len() {
            let mut grown = vec![None; self.heads.len() * 2].into_boxed_slice();
            for existing in self.entries() {
                prepend(&mut grown, Arc::clone(existing));
            }
            grown
        } else {
            self.heads.clone()
        };
        prepend(&mut heads, entry);
        Self { heads, len: self.len + 1 }
    }
}

fn prepend<K>(heads: &mut [Option<Arc<ChainLink<K>>>], entry: Arc<DirectoryEntry<K>>) {
    let slot = &mut heads[bucket_index(entry.hash, heads.len())];
    let next = slot.take();
    *slot = Some(Arc::new(ChainLink { entry, next }));
}

fn downcast<U: Underlying>(entry: &DirectoryEntry<impl Sized>) -> Result<Arc<MemberCache<U>>, EnumCacheError> {
    Arc::clone(&entry.cache)
        .downcast::<MemberCache<U>>()
        .map_err(|_| EnumCacheError::KindMismatch {
            expected: U::KIND,
            found: entry.kind,
        })
}

/// Lazily built, concurrently readable store of member caches.
///
/// ```
/// use enum_cache::{CacheDirectory, MemberCache, MemberRecord};
///
/// let directory: CacheDirectory<&str> = CacheDirectory::new();
/// let cache = directory
///     .get_or_build("color", || Ok(MemberCache::build([MemberRecord::new("Red", 1u8)], false, None)))
///     .unwrap();
/// assert!(cache.is_defined(1));
/// assert!(directory.contains(&"color"));
/// ```
pub struct CacheDirectory<K = TypeId> {
    published: ArcSwap<BucketArray<K>>,
    write: Mutex<()>,
}

impl<K> CacheDirectory<K>
where
    K: Eq + Hash + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Directory starting with at least `capacity` buckets (rounded up to a
    /// power of two).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            published: ArcSwap::from_pointee(BucketArray::empty(capacity)),
            write: Mutex::new(()),
        }
    }

    /// The cache stored under `key`, if it was built already.
    pub fn get<U: Underlying>(&self, key: &K) -> Result<Option<Arc<MemberCache<U>>>, EnumCacheError> {
        let hash = hash_key(key);
        let snapshot = self.published.load();
        snapshot.find(key, hash).map(|entry| downcast(entry)).transpose()
    }

    /// The cache under `key`, building and publishing it on first request.
    ///
    /// `build` runs at most once per key while it keeps succeeding, and
    /// never concurrently with another build on this directory. Its error is
    /// returned unchanged and nothing is stored.
    ///
    /// `build` runs under the directory's write lock and must not call back
    /// into this directory; gather any inputs that do before calling.
    pub fn get_or_build<U, F>(&self, key: K, build: F) -> Result<Arc<MemberCache<U>>, EnumCacheError>
    where
        U: Underlying,
        F: FnOnce() -> Result<MemberCache<U>, EnumCacheError>,
    {
        let hash = hash_key(&key);
        if let Some(entry) = self.published.load().find(&key, hash) {
            return downcast(entry);
        }

        let _guard = self.write.lock();
        let current = self.published.load_full();
        if let Some(entry) = current.find(&key, hash) {
            return downcast(entry);
        }

        let cache = Arc::new(build()?);
        let entry = Arc::new(DirectoryEntry {
            key,
            hash,
            kind: U::KIND,
            cache: Arc::clone(&cache) as Arc<dyn Any + Send + Sync>,
        });
        let next = current.with_entry(entry);
        if next.heads.len() != current.heads.len() {
            tracing::debug!(
                from = current.heads.len(),
                to = next.heads.len(),
                "cache directory grown"
            );
        }
        let kind = U::KIND;
        tracing::debug!(%kind, entries = next.len, "cache directory insert");
        self.published.store(Arc::new(next));
        Ok(cache)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.published.load().find(key, hash_key(key)).is_some()
    }

    /// Number of stored caches.
    pub fn len(&self) -> usize {
        self.published.load().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.published.load().heads.len()
    }
}

impl<K> Default for CacheDirectory<K>
where
    K: Eq + Hash + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for CacheDirectory<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.published.load();
        f.debug_struct("CacheDirectory")
            .field("len", &snapshot.len)
            .field("capacity", &snapshot.heads.len())
            .finish()
    }
}

static GLOBAL: LazyLock<CacheDirectory> = LazyLock::new(CacheDirectory::new);

/// Process-wide directory keyed by enum type.
pub fn global_directory() -> &'static CacheDirectory {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberRecord;

    fn small_cache(n: u8) -> MemberCache<u8> {
        MemberCache::build((0..n).map(|v| MemberRecord::new(format!("V{v}"), v)), false, None)
    }

    #[test]
    fn builds_once_per_key() {
        let directory: CacheDirectory<u32> = CacheDirectory::new();
        let mut builds = 0;
        let first = directory
            .get_or_build(1, || {
                builds += 1;
                Ok(small_cache(3))
            })
            .unwrap();
        let second = directory
            .get_or_build(1, || {
                builds += 1;
                Ok(small_cache(5))
            })
            .unwrap();
        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn failed_build_is_not_cached() {
        let directory: CacheDirectory<u32> = CacheDirectory::new();
        let err = directory
            .get_or_build::<u8, _>(7, || Err(EnumCacheError::UnsupportedKind { name: "f32".into() }))
            .unwrap_err();
        assert!(matches!(err, EnumCacheError::UnsupportedKind { .. }));
        assert!(!directory.contains(&7));
        assert!(directory.is_empty());

        let cache = directory.get_or_build(7, || Ok(small_cache(2))).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let directory: CacheDirectory<&'static str> = CacheDirectory::new();
        directory.get_or_build("k", || Ok(small_cache(1))).unwrap();

        let err = directory.get::<i32>(&"k").unwrap_err();
        assert_eq!(
            err,
            EnumCacheError::KindMismatch {
                expected: UnderlyingKind::I32,
                found: UnderlyingKind::U8,
            }
        );
        assert!(directory.get::<u8>(&"k").unwrap().is_some());
        assert!(directory.get::<u8>(&"missing").unwrap().is_none());
    }

    #[test]
    fn grows_and_keeps_entries() {
        let directory: CacheDirectory<u32> = CacheDirectory::with_capacity(1);
        assert_eq!(directory.capacity(), 1);

        let caches: Vec<_> = (0..40u32)
            .map(|key| directory.get_or_build(key, || Ok(small_cache((key % 7) as u8 + 1))).unwrap())
            .collect();

        assert_eq!(directory.len(), 40);
        assert!(directory.capacity() >= 40);
        assert!(directory.capacity().is_power_of_two());
        for (key, cache) in (0..40u32).zip(&caches) {
            let stored = directory.get::<u8>(&key).unwrap().unwrap();
            assert!(Arc::ptr_eq(&stored, cache));
        }
    }

    #[test]
    fn pinned_snapshot_survives_growth() {
        let directory: CacheDirectory<u32> = CacheDirectory::with_capacity(2);
        directory.get_or_build(0, || Ok(small_cache(1))).unwrap();

        let pinned = directory.published.load_full();
        for key in 1..10 {
            directory.get_or_build(key, || Ok(small_cache(1))).unwrap();
        }
        assert_eq!(pinned.len, 1);
        assert_eq!(pinned.heads.len(), 2);
        assert!(pinned.find(&0, hash_key(&0u32)).is_some());
        assert!(pinned.find(&5, hash_key(&5u32)).is_none());
    }

    #[test]
    fn global_directory_is_shared() {
        struct Marker;
        let a = global_directory()
            .get_or_build(TypeId::of::<Marker>(), || Ok(small_cache(2)))
            .unwrap();
        let b = global_directory().get::<u8>(&TypeId::of::<Marker>()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
