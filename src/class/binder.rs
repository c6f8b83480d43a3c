//! Member binder: installs member descriptors into a type tag.
//!
//! | Member | Entries |
//! |---|---|
//! | mutating method | `name` |
//! | read-only method | `name` |
//! | mutable field | `name` (getter), `set_<name>` (setter) |
//! | immutable field | `name` (getter) |
//!
//! Every installed callable is also pushed into the class's
//! [`CallableStore`]. Installing under an existing key replaces the entry.

use scriptbind_core::{NativeFn, TagEntry, TagError, TagId, TypeTagTable};
use scriptbind_registry::CallableStore;

use super::member::{Member, MemberBinding};

/// Prefix of the entry a mutable field's setter is installed under.
pub const SETTER_PREFIX: &str = "set_";

/// Key of the setter for `field`.
pub fn setter_name(field: &str) -> String {
    format!("{SETTER_PREFIX}{field}")
}

/// Install one member into `tag`.
pub fn bind_member<T: 'static>(
    tags: &mut TypeTagTable,
    tag: TagId,
    store: &CallableStore,
    member: Member<T>,
) -> Result<(), TagError> {
    let (name, binding) = member.into_parts();
    match binding {
        MemberBinding::MutatingMethod(function) | MemberBinding::ReadOnlyMethod(function) => {
            install(tags, tag, store, name, function)
        }
        MemberBinding::MutableField { getter, setter } => {
            let setter_key = setter_name(&name);
            install(tags, tag, store, name, getter)?;
            install(tags, tag, store, setter_key, setter)
        }
        MemberBinding::ImmutableField { getter } => install(tags, tag, store, name, getter),
    }
}

/// Install a callable under `key`, keeping a shared copy in `store`.
pub fn install(
    tags: &mut TypeTagTable,
    tag: TagId,
    store: &CallableStore,
    key: String,
    function: NativeFn,
) -> Result<(), TagError> {
    log::trace!("binding '{key}' on type tag {tag}");
    let shared = function.clone();
    if tags.raw_set(tag, key, TagEntry::Function(function))?.is_some() {
        log::trace!("replaced an existing entry on type tag {tag}");
    }
    store.push(shared);
    Ok(())
}
