//! Identifier generation for editor elements
//!
//! Ids look like `<prefix>_<9 base-36 chars>` and are unique within one
//! registry. Each editing session owns its own registry.

use indexmap::IndexSet;
use rand::Rng;

/// Prefix used when none is given
pub const DEFAULT_PREFIX: &str = "id";

const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The set of ids handed out, or loaded, during one editing session
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    in_use: IndexSet<String>,
}

impl IdRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh id using the thread-local RNG
    pub fn generate_id(&mut self, prefix: Option<&str>) -> String {
        self.generate_id_with(prefix, &mut rand::thread_rng())
    }

    /// Generate a fresh id from the given RNG.
    ///
    /// Suffixes that collide with an id already in the registry are drawn
    /// again. An empty prefix is treated as absent.
    pub fn generate_id_with<R: Rng + ?Sized>(&mut self, prefix: Option<&str>, rng: &mut R) -> String {
        let prefix = prefix.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_PREFIX);
        loop {
            let suffix: String = (0..SUFFIX_LEN)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect();
            let id = format!("{}_{}", prefix, suffix);
            if self.in_use.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Mark an existing id as taken. Returns false if it already was.
    pub fn reserve(&mut self, id: impl Into<String>) -> bool {
        self.in_use.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.in_use.contains(id)
    }

    pub fn len(&self) -> usize {
        self.in_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_use.is_empty()
    }

    /// Ids in the order they were taken
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.in_use.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.in_use.clear();
    }
}

impl<S: Into<String>> Extend<S> for IdRegistry {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.in_use.extend(iter.into_iter().map(Into::into));
    }
}
