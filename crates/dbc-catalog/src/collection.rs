use std::fmt;

use dbc_schema::{Format, Model, SchemaBuilder, codec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Folder,
    #[default]
    Workspace,
    Query,
    Connection,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Folder,
        ItemKind::Workspace,
        ItemKind::Query,
        ItemKind::Connection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Folder => "folder",
            ItemKind::Workspace => "workspace",
            ItemKind::Query => "query",
            ItemKind::Connection => "connection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node of the catalog tree. Only folders hold children; on the wire
/// `children` is absent for every other kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub children: Option<Vec<CollectionItem>>,
}

/// Result of [`CollectionItem::find`].
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'a> {
    /// Names of the enclosing folders, outermost first.
    pub path: Vec<String>,
    pub item: &'a CollectionItem,
}

impl Model for CollectionItem {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("id", codec::string(), |c| &c.id, |c| &mut c.id)
            .required();
        schema
            .field("name", codec::string(), |c| &c.name, |c| &mut c.name)
            .required();
        let kind = codec::string()
            .format(Format::one_of(ItemKind::ALL.map(|kind| kind.as_str())))
            .convert(
                |value| ItemKind::parse(&value).ok_or(value),
                |kind| kind.as_str().to_string(),
            );
        schema
            .field("type", kind, |c| &c.kind, |c| &mut c.kind)
            .required();
        schema
            .field_with(
                "children",
                codec::optional(codec::array(codec::object::<CollectionItem>())),
                |c| &c.children,
                |c, children| {
                    if children.is_some() && !c.is_folder() {
                        return Err(format!("a {} cannot hold children", c.kind));
                    }
                    c.children = children;
                    Ok(())
                },
            )
            .depends_on(["type"]);
    }
}

impl CollectionItem {
    pub fn folder(
        id: impl Into<String>,
        name: impl Into<String>,
        children: Vec<CollectionItem>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Folder,
            children: Some(children),
        }
    }

    pub fn leaf(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            children: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn children(&self) -> &[CollectionItem] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Depth-first search of `forest` for the item with `id`.
    pub fn find<'a>(forest: &'a [CollectionItem], id: &str) -> Option<Found<'a>> {
        let mut ancestors = Vec::new();
        find_in(forest, id, &mut ancestors).map(|item| Found {
            path: ancestors.into_iter().map(str::to_string).collect(),
            item,
        })
    }

    pub fn contains(forest: &[CollectionItem], id: &str) -> bool {
        Self::find(forest, id).is_some()
    }
}

fn find_in<'a>(
    items: &'a [CollectionItem],
    id: &str,
    ancestors: &mut Vec<&'a str>,
) -> Option<&'a CollectionItem> {
    for item in items {
        if item.id == id {
            return Some(item);
        }
        if !item.is_folder() {
            continue;
        }
        ancestors.push(&item.name);
        if let Some(found) = find_in(item.children(), id, ancestors) {
            return Some(found);
        }
        ancestors.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use dbc_schema::{DeserializeError, deserialize, serialize};
    use serde_json::json;

    use super::*;

    fn workspace(id: &str) -> CollectionItem {
        CollectionItem::leaf(id, format!("workspace {id} name"), ItemKind::Workspace)
    }

    fn folder(id: &str, children: Vec<CollectionItem>) -> CollectionItem {
        CollectionItem::folder(id, format!("folder {id} name"), children)
    }

    fn forest() -> Vec<CollectionItem> {
        vec![
            workspace("1"),
            folder(
                "2",
                vec![
                    workspace("4"),
                    folder("5", vec![workspace("6"), folder("7", vec![])]),
                ],
            ),
            workspace("3"),
        ]
    }

    #[test]
    fn find_reports_ancestor_folder_names() {
        let forest = forest();
        let found = CollectionItem::find(&forest, "6").expect("item 6");
        assert_eq!(found.path, vec!["folder 2 name", "folder 5 name"]);
        assert_eq!(found.item.id, "6");

        let found = CollectionItem::find(&forest, "7").expect("item 7");
        assert_eq!(found.path, vec!["folder 2 name", "folder 5 name"]);
        assert!(found.item.is_folder());

        let found = CollectionItem::find(&forest, "3").expect("root item");
        assert!(found.path.is_empty());
    }

    #[test]
    fn find_misses_unknown_ids() {
        let forest = forest();
        assert!(CollectionItem::find(&forest, "42").is_none());
        assert!(!CollectionItem::contains(&forest, "42"));
        assert!(CollectionItem::contains(&forest, "4"));
        assert!(CollectionItem::find(&[], "1").is_none());
    }

    #[test]
    fn catalog_decodes_from_wire() {
        let raw = json!([
            { "id": "1", "name": "workspace 1 name", "type": "workspace" },
            {
                "id": "2",
                "name": "folder 2 name",
                "type": "folder",
                "children": [
                    { "id": "4", "name": "workspace 4 name", "type": "workspace" },
                    {
                        "id": "5",
                        "name": "folder 5 name",
                        "type": "folder",
                        "children": [
                            { "id": "6", "name": "workspace 6 name", "type": "workspace" },
                            { "id": "7", "name": "folder 7 name", "type": "folder", "children": [] }
                        ]
                    }
                ]
            },
            { "id": "3", "name": "workspace 3 name", "type": "workspace" }
        ]);
        let items = raw.as_array().expect("array");
        let decoded: Vec<CollectionItem> = items
            .iter()
            .map(|item| deserialize(item).expect("decode item"))
            .collect();
        assert_eq!(decoded, forest());

        let encoded: Vec<_> = decoded
            .iter()
            .map(|item| serialize(item).expect("encode item"))
            .collect();
        assert_eq!(serde_json::Value::Array(encoded), raw);
    }

    #[test]
    fn only_folders_hold_children() {
        let err = deserialize::<CollectionItem>(&json!({
            "id": "9",
            "name": "query",
            "type": "query",
            "children": []
        }))
        .expect_err("query with children");
        assert_eq!(
            err,
            DeserializeError::Rejected {
                path: "children".into(),
                message: "a query cannot hold children".into(),
            }
        );
    }

    #[test]
    fn unknown_kind_is_invalid() {
        let err = deserialize::<CollectionItem>(&json!({
            "id": "9",
            "name": "dashboard",
            "type": "dashboard"
        }))
        .expect_err("unknown kind");
        assert_eq!(
            err.to_string(),
            "'dashboard' is not valid for the property 'type'"
        );
    }

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemKind::parse("Folder"), None);
    }
}
