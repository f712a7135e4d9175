//! Identity and content comparison for list items

/// Decides how items from the old and new list relate to each other.
///
/// `are_items_the_same` pairs items that represent the same logical entity
/// (for example two snapshots of a row with the same key). Among paired items,
/// `are_contents_the_same` decides whether the item changed.
///
/// Both predicates must be pure functions of their arguments, and
/// `are_contents_the_same` is only meaningful for pairs that are already the
/// same item. A callback that breaks these rules gets an unspecified (but
/// never panicking) classification.
pub trait ItemCallback<T> {
    /// Opaque value attached to change records
    type Payload;

    /// Whether both items represent the same entity
    fn are_items_the_same(&self, old_item: &T, new_item: &T) -> bool;

    /// Whether two items of the same entity look identical.
    /// Only called for pairs where `are_items_the_same` holds.
    fn are_contents_the_same(&self, old_item: &T, new_item: &T) -> bool;

    /// Describe what changed between two items with the same identity
    fn change_payload(&self, _old_item: &T, _new_item: &T) -> Option<Self::Payload> {
        None
    }
}

impl<T, C: ItemCallback<T> + ?Sized> ItemCallback<T> for &C {
    type Payload = C::Payload;

    fn are_items_the_same(&self, old_item: &T, new_item: &T) -> bool {
        (**self).are_items_the_same(old_item, new_item)
    }

    fn are_contents_the_same(&self, old_item: &T, new_item: &T) -> bool {
        (**self).are_contents_the_same(old_item, new_item)
    }

    fn change_payload(&self, old_item: &T, new_item: &T) -> Option<Self::Payload> {
        (**self).change_payload(old_item, new_item)
    }
}

/// Callback that identifies items by a key and compares contents with `PartialEq`
#[derive(Debug, Clone, Copy)]
pub struct KeyedCallback<F> {
    key: F,
}

impl<F> KeyedCallback<F> {
    pub fn new(key: F) -> Self {
        Self { key }
    }
}

impl<T, K, F> ItemCallback<T> for KeyedCallback<F>
where
    T: PartialEq,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    type Payload = ();

    fn are_items_the_same(&self, old_item: &T, new_item: &T) -> bool {
        (self.key)(old_item) == (self.key)(new_item)
    }

    fn are_contents_the_same(&self, old_item: &T, new_item: &T) -> bool {
        old_item == new_item
    }
}

/// Shorthand for [`KeyedCallback::new`]
pub fn by_key<T, K, F>(key: F) -> KeyedCallback<F>
where
    F: Fn(&T) -> K,
{
    KeyedCallback::new(key)
}
