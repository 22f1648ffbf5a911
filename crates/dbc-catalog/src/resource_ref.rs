use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::CollectionItem;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathRef {
    /// Folder names from the catalog root down to the item's parent.
    pub path: Vec<String>,
    pub name: String,
}

/// Reference to a catalog item, either by id or by its location.
///
/// Wire form is `{"id": ..}` or `{"path": [..], "name": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Id(IdRef),
    Path(PathRef),
}

impl ResourceRef {
    pub fn by_id(id: impl Into<String>) -> Self {
        ResourceRef::Id(IdRef { id: id.into() })
    }

    pub fn by_path<I, S>(path: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResourceRef::Path(PathRef {
            path: path.into_iter().map(Into::into).collect(),
            name: name.into(),
        })
    }

    pub fn is_id(&self) -> bool {
        matches!(self, ResourceRef::Id(_))
    }

    /// # Panics
    ///
    /// Panics if this is a path reference.
    pub fn id(&self) -> &str {
        match self {
            ResourceRef::Id(reference) => &reference.id,
            ResourceRef::Path(_) => panic!("id() called on a path reference: {self}"),
        }
    }

    /// # Panics
    ///
    /// Panics if this is an id reference.
    pub fn path(&self) -> &[String] {
        match self {
            ResourceRef::Path(reference) => &reference.path,
            ResourceRef::Id(_) => panic!("path() called on an id reference: {self}"),
        }
    }

    /// # Panics
    ///
    /// Panics if this is an id reference.
    pub fn name(&self) -> &str {
        match self {
            ResourceRef::Path(reference) => &reference.name,
            ResourceRef::Id(_) => panic!("name() called on an id reference: {self}"),
        }
    }

    pub fn try_id(&self) -> Option<&str> {
        match self {
            ResourceRef::Id(reference) => Some(&reference.id),
            ResourceRef::Path(_) => None,
        }
    }

    pub fn try_path(&self) -> Option<&[String]> {
        match self {
            ResourceRef::Path(reference) => Some(&reference.path),
            ResourceRef::Id(_) => None,
        }
    }

    pub fn try_name(&self) -> Option<&str> {
        match self {
            ResourceRef::Path(reference) => Some(&reference.name),
            ResourceRef::Id(_) => None,
        }
    }

    /// Looks the referenced item up in `forest`. A path reference walks
    /// folders by name and picks the first match at each level.
    pub fn resolve<'a>(&self, forest: &'a [CollectionItem]) -> Option<&'a CollectionItem> {
        trace!(reference = %self, "resolving resource reference");
        match self {
            ResourceRef::Id(reference) => {
                CollectionItem::find(forest, &reference.id).map(|found| found.item)
            }
            ResourceRef::Path(reference) => {
                let mut level = forest;
                for segment in &reference.path {
                    let folder = level
                        .iter()
                        .find(|item| item.is_folder() && item.name == *segment)?;
                    level = folder.children();
                }
                level.iter().find(|item| item.name == reference.name)
            }
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Id(reference) => write!(f, "id:{}", reference.id),
            ResourceRef::Path(reference) => {
                for segment in &reference.path {
                    write!(f, "{segment}/")?;
                }
                f.write_str(&reference.name)
            }
        }
    }
}

impl From<IdRef> for ResourceRef {
    fn from(reference: IdRef) -> Self {
        ResourceRef::Id(reference)
    }
}

impl From<PathRef> for ResourceRef {
    fn from(reference: PathRef) -> Self {
        ResourceRef::Path(reference)
    }
}
