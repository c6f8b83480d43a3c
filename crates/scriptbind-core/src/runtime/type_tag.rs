//! Type tags: the runtime-side descriptor of a native class.
//!
//! A type tag is a string-keyed dispatch table. Scripts see a registered class
//! through its tag: `Class.new(...)` is a direct entry lookup, while member
//! access on an instance goes through the tag's `__index` entry, which points
//! back at the tag itself.

use std::any::TypeId;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::TagError;

use super::NativeFn;

/// Key of the entry the runtime calls to construct a new instance.
pub const CONSTRUCTOR_KEY: &str = "new";

/// Key of the entry instances resolve members through.
pub const INDEX_KEY: &str = "__index";

/// Identifies a type tag within one [`TypeTagTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u32);

impl TagId {
    /// Create a tag id from its raw index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index of the tag in its table.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value stored under a key of a type tag.
#[derive(Clone, Debug)]
pub enum TagEntry {
    /// A callable bound by the embedding layer
    Function(NativeFn),
    /// A reference to the tag that holds the entry
    SelfRef,
}

impl TagEntry {
    /// The callable, if this entry holds one.
    pub fn as_function(&self) -> Option<&NativeFn> {
        match self {
            TagEntry::Function(f) => Some(f),
            TagEntry::SelfRef => None,
        }
    }
}

/// Dispatch table for one native class.
#[derive(Debug)]
pub struct TypeTag {
    name: String,
    native_type: TypeId,
    entries: FxHashMap<String, TagEntry>,
}

impl TypeTag {
    /// Name the tag is currently exposed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type the tag describes.
    pub fn native_type(&self) -> TypeId {
        self.native_type
    }

    /// Raw entry lookup.
    pub fn entry(&self, key: &str) -> Option<&TagEntry> {
        self.entries.get(key)
    }

    /// Whether an entry exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tag has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All type tags of one runtime.
///
/// Tags are created per native type: asking twice for the same Rust type
/// returns the same tag. Names resolve to the most recently created or
/// renamed tag, so two native types exposed under one name keep separate
/// dispatch tables and the name follows the later one.
#[derive(Debug)]
pub struct TypeTagTable {
    tags: Vec<TypeTag>,
    by_name: FxHashMap<String, TagId>,
    by_native: FxHashMap<TypeId, TagId>,
    limit: u32,
}

impl TypeTagTable {
    /// Create an empty table without a practical tag limit.
    pub fn new() -> Self {
        Self::with_limit(u32::MAX)
    }

    /// Create an empty table that refuses to hold more than `limit` tags.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            tags: Vec::new(),
            by_name: FxHashMap::default(),
            by_native: FxHashMap::default(),
            limit,
        }
    }

    /// Create or fetch the tag for a native type and expose it under `name`.
    pub fn tag_for(&mut self, name: &str, native_type: TypeId) -> Result<TagId, TagError> {
        if let Some(&id) = self.by_native.get(&native_type) {
            let tag = &mut self.tags[id.0 as usize];
            if tag.name != name {
                if self.by_name.get(&tag.name) == Some(&id) {
                    self.by_name.remove(&tag.name);
                }
                tag.name = name.to_string();
            }
            self.by_name.insert(name.to_string(), id);
            return Ok(id);
        }

        if self.tags.len() as u64 >= self.limit as u64 {
            return Err(TagError::Exhausted { limit: self.limit });
        }

        let id = TagId(self.tags.len() as u32);
        self.tags.push(TypeTag {
            name: name.to_string(),
            native_type,
            entries: FxHashMap::default(),
        });
        self.by_name.insert(name.to_string(), id);
        self.by_native.insert(native_type, id);
        log::trace!("created type tag {id} for '{name}'");
        Ok(id)
    }

    /// Set an entry without any lookup indirection.
    ///
    /// An existing entry under the same key is replaced and returned.
    pub fn raw_set(
        &mut self,
        tag: TagId,
        key: impl Into<String>,
        entry: TagEntry,
    ) -> Result<Option<TagEntry>, TagError> {
        let tag_data = self
            .tags
            .get_mut(tag.0 as usize)
            .ok_or(TagError::UnknownTag { tag })?;
        Ok(tag_data.entries.insert(key.into(), entry))
    }

    /// Get a tag by id.
    pub fn get(&self, tag: TagId) -> Option<&TypeTag> {
        self.tags.get(tag.0 as usize)
    }

    /// Raw entry of a tag.
    pub fn entry(&self, tag: TagId, key: &str) -> Option<&TagEntry> {
        self.get(tag)?.entry(key)
    }

    /// Resolve a member of an instance tagged with `tag`.
    ///
    /// Lookup goes through the tag's `__index` entry; a tag without one
    /// exposes nothing to instances.
    pub fn lookup(&self, tag: TagId, key: &str) -> Option<&NativeFn> {
        let type_tag = self.get(tag)?;
        match type_tag.entry(INDEX_KEY)? {
            TagEntry::SelfRef => type_tag.entry(key)?.as_function(),
            TagEntry::Function(_) => None,
        }
    }

    /// Tag currently exposed under `name`.
    pub fn by_name(&self, name: &str) -> Option<TagId> {
        self.by_name.get(name).copied()
    }

    /// Tag created for the Rust type `T`.
    pub fn tag_of<T: 'static>(&self) -> Option<TagId> {
        self.by_native.get(&TypeId::of::<T>()).copied()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the table has no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TypeTagTable {
    fn default() -> Self {
        Self::new()
    }
}
