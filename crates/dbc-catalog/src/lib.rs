//! Saved-item catalog: the folder tree and references into it.

mod collection;
mod resource_ref;

pub use collection::{CollectionItem, Found, ItemKind};
pub use resource_ref::{IdRef, PathRef, ResourceRef};
