//! String interning tables.
//!
//! Both tables chain entries in hash buckets and hand out `Arc<str>`, so equal
//! content interned through one table shares a single allocation. The hash is
//! the order-sensitive sum `Σ (i + code_i)`.

use std::sync::Arc;

use argo_buffers::TextEncoding;
use once_cell::unsync::OnceCell;

/// Bucket count of a freshly created table.
pub const DEFAULT_BUCKETS: usize = 17;

/// Average chain length that triggers a rehash.
const MAX_LOAD: usize = 4;

/// Hash of decoded text, summed over characters.
pub fn string_hash(text: &str) -> u32 {
    text.chars().enumerate().fold(0u32, |hash, (i, ch)| {
        hash.wrapping_add(i as u32).wrapping_add(ch as u32)
    })
}

/// Hash of raw encoded bytes, summed over bytes.
pub fn byte_hash(bytes: &[u8]) -> u32 {
    bytes.iter().enumerate().fold(0u32, |hash, (i, byte)| {
        hash.wrapping_add(i as u32).wrapping_add(u32::from(*byte))
    })
}

struct Entry {
    hash: u32,
    text: Arc<str>,
}

/// Interns already-decoded text.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use argo_util::StringTable;
///
/// let mut table = StringTable::new();
/// let a = table.intern("name");
/// let b = table.intern(&String::from("name"));
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(table.len(), 1);
/// ```
pub struct StringTable {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets: (0..buckets.max(1)).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Looks up `text` without inserting it.
    pub fn get(&self, text: &str) -> Option<Arc<str>> {
        let hash = string_hash(text);
        self.buckets[bucket_of(hash, self.buckets.len())]
            .iter()
            .find(|entry| entry.hash == hash && entry.text.len() == text.len() && *entry.text == *text)
            .map(|entry| Arc::clone(&entry.text))
    }

    /// Returns the canonical instance for `text`, inserting it on first sight.
    pub fn intern(&mut self, text: &str) -> Arc<str> {
        if let Some(found) = self.get(text) {
            return found;
        }
        if self.len >= self.buckets.len() * MAX_LOAD {
            self.grow();
        }
        let hash = string_hash(text);
        let text: Arc<str> = Arc::from(text);
        let index = bucket_of(hash, self.buckets.len());
        self.buckets[index].push(Entry {
            hash,
            text: Arc::clone(&text),
        });
        self.len += 1;
        text
    }

    fn grow(&mut self) {
        let size = self.buckets.len() * 2 + 1;
        let mut buckets: Vec<Vec<Entry>> = (0..size).map(|_| Vec::new()).collect();
        for entry in self.buckets.drain(..).flatten() {
            buckets[bucket_of(entry.hash, size)].push(entry);
        }
        self.buckets = buckets;
    }
}

/// Handle to an entry of an [`EncodedStringTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedId(usize);

struct EncodedEntry {
    hash: u32,
    bytes: Box<[u8]>,
    text: OnceCell<Arc<str>>,
}

/// Interns raw encoded byte spans.
///
/// Entries are keyed by their bytes; the decoded text is only produced the
/// first time [`EncodedStringTable::text`] asks for it and is cached on the
/// entry afterwards.
pub struct EncodedStringTable {
    encoding: TextEncoding,
    entries: Vec<EncodedEntry>,
    buckets: Vec<Vec<usize>>,
}

impl EncodedStringTable {
    pub fn new(encoding: TextEncoding) -> Self {
        Self::with_buckets(encoding, DEFAULT_BUCKETS)
    }

    pub fn with_buckets(encoding: TextEncoding, buckets: usize) -> Self {
        Self {
            encoding,
            entries: Vec::new(),
            buckets: (0..buckets.max(1)).map(|_| Vec::new()).collect(),
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers `bytes` and returns its handle without decoding it.
    pub fn intern(&mut self, bytes: &[u8]) -> EncodedId {
        let hash = byte_hash(bytes);
        let found = self.buckets[bucket_of(hash, self.buckets.len())]
            .iter()
            .copied()
            .find(|&i| {
                let entry = &self.entries[i];
                entry.hash == hash && entry.bytes.len() == bytes.len() && *entry.bytes == *bytes
            });
        if let Some(index) = found {
            return EncodedId(index);
        }
        if self.entries.len() >= self.buckets.len() * MAX_LOAD {
            self.grow();
        }
        let index = self.entries.len();
        self.entries.push(EncodedEntry {
            hash,
            bytes: bytes.into(),
            text: OnceCell::new(),
        });
        let bucket = bucket_of(hash, self.buckets.len());
        self.buckets[bucket].push(index);
        EncodedId(index)
    }

    /// Decoded text of an entry, materialized on first request.
    pub fn text(&self, id: EncodedId) -> Arc<str> {
        let entry = &self.entries[id.0];
        Arc::clone(
            entry
                .text
                .get_or_init(|| Arc::from(self.encoding.decode_lossy(&entry.bytes))),
        )
    }

    /// Interns `bytes` and returns the canonical decoded text.
    pub fn intern_text(&mut self, bytes: &[u8]) -> Arc<str> {
        let id = self.intern(bytes);
        self.text(id)
    }

    fn grow(&mut self) {
        let size = self.buckets.len() * 2 + 1;
        let mut buckets: Vec<Vec<usize>> = (0..size).map(|_| Vec::new()).collect();
        for (index, entry) in self.entries.iter().enumerate() {
            buckets[bucket_of(entry.hash, size)].push(index);
        }
        self.buckets = buckets;
    }
}

fn bucket_of(hash: u32, buckets: usize) -> usize {
    hash as usize % buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_order_sensitive_sum() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 + 1 + 98);
        assert_ne!(string_hash("ab"), string_hash("ba"));
        assert_eq!(byte_hash(b"ab"), string_hash("ab"));
    }

    #[test]
    fn colliding_hashes_stay_distinct() {
        // "ac" and "bb" share a hash: 97 + 1 + 99 == 98 + 1 + 98.
        assert_eq!(string_hash("ac"), string_hash("bb"));
        let mut table = StringTable::new();
        let ac = table.intern("ac");
        let bb = table.intern("bb");
        assert_eq!(&*ac, "ac");
        assert_eq!(&*bb, "bb");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn table_grows_and_keeps_entries() {
        let mut table = StringTable::with_buckets(1);
        let keys: Vec<String> = (0..100).map(|i| format!("key{i}")).collect();
        let first: Vec<Arc<str>> = keys.iter().map(|k| table.intern(k)).collect();
        assert!(table.bucket_count() > 1);
        for (key, arc) in keys.iter().zip(&first) {
            assert!(Arc::ptr_eq(arc, &table.intern(key)));
        }
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn encoded_table_defers_decoding() {
        let encoding = TextEncoding::Utf16Le;
        let mut table = EncodedStringTable::new(encoding);
        let bytes = encoding.encode("héllo");
        let id = table.intern(&bytes);
        assert_eq!(table.intern(&bytes), id);
        assert!(table.entries[id.0].text.get().is_none());
        let a = table.text(id);
        let b = table.intern_text(&bytes);
        assert_eq!(&*a, "héllo");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn encoded_ids_survive_growth() {
        let mut table = EncodedStringTable::with_buckets(TextEncoding::Utf8, 1);
        let ids: Vec<EncodedId> = (0..50).map(|i| table.intern(format!("k{i}").as_bytes())).collect();
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(&*table.text(*id), format!("k{i}"));
        }
        assert_eq!(table.len(), 50);
    }
}
