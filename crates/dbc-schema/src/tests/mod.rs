use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{Format, Model, SchemaBuilder, Skip, codec};

pub mod inherit;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub name: String,
    pub value: NoteValue,
}

impl Model for Note {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("name", codec::string(), |n| &n.name, |n| &mut n.name)
            .required();
        schema.field("value", codec::object::<NoteValue>(), |n| &n.value, |n| &mut n.value);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteValue {
    pub text: String,
}

impl Model for NoteValue {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.field("text", codec::string(), |v| &v.text, |v| &mut v.text);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub driver: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_name: String,
    pub ssl: bool,
    pub label: Option<String>,
    pub options: IndexMap<String, String>,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub password: Option<String>,
    pub revision: i64,
}

impl Model for Connection {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.snake_case();
        schema
            .field("id", codec::string(), |c| &c.id, |c| &mut c.id)
            .required()
            .format(Format::Uuid);
        schema
            .field("name", codec::string(), |c| &c.name, |c| &mut c.name)
            .required()
            .trim();
        schema
            .field("driver", codec::string(), |c| &c.driver, |c| &mut c.driver)
            .required()
            .format(Format::one_of(["postgres", "mysql", "sqlite"]));
        schema.field(
            "host",
            codec::optional(codec::string().trim()),
            |c| &c.host,
            |c| &mut c.host,
        );
        schema
            .field(
                "port",
                codec::optional(codec::integer::<u16>()),
                |c| &c.port,
                |c| &mut c.port,
            )
            .min(1.0);
        schema.field(
            "databaseName",
            codec::string(),
            |c| &c.database_name,
            |c| &mut c.database_name,
        );
        schema.field("ssl", codec::boolean(), |c| &c.ssl, |c| &mut c.ssl);
        schema
            .field(
                "label",
                codec::optional(codec::string()),
                |c| &c.label,
                |c| &mut c.label,
            )
            .rename("displayName");
        schema.field(
            "options",
            codec::record(codec::string()),
            |c| &c.options,
            |c| &mut c.options,
        );
        schema.field(
            "tags",
            codec::array(codec::string().format(Format::Identifier)),
            |c| &c.tags,
            |c| &mut c.tags,
        );
        schema.field(
            "createdAt",
            codec::optional(codec::datetime()),
            |c| &c.created_at,
            |c| &mut c.created_at,
        );
        schema
            .field(
                "password",
                codec::optional(codec::string()),
                |c| &c.password,
                |c| &mut c.password,
            )
            .skip(Skip::Serialize);
        schema
            .field(
                "revision",
                codec::integer::<i64>(),
                |c| &c.revision,
                |c| &mut c.revision,
            )
            .skip(Skip::Deserialize);
    }
}

/// `amount` is converted with `unit`, so `unit` must be applied first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeout {
    pub amount: i64,
    pub unit: String,
    pub millis: i64,
}

impl Model for Timeout {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field_with(
                "amount",
                codec::integer::<i64>(),
                |t| &t.amount,
                |t, amount| {
                    let factor = match t.unit.as_str() {
                        "ms" => 1,
                        "s" => 1_000,
                        "m" => 60_000,
                        other => return Err(format!("unknown unit '{other}'")),
                    };
                    t.amount = amount;
                    t.millis = amount * factor;
                    Ok(())
                },
            )
            .required()
            .depends_on(["unit"]);
        schema
            .field("unit", codec::string(), |t| &t.unit, |t| &mut t.unit)
            .required()
            .format(Format::one_of(["ms", "s", "m"]));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl Model for TreeNode {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("label", codec::string(), |n| &n.label, |n| &mut n.label)
            .required();
        schema.field(
            "children",
            codec::array(codec::object::<TreeNode>()),
            |n| &n.children,
            |n| &mut n.children,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub page_size: i64,
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            page_size: 50,
            theme: "light".into(),
        }
    }
}

impl Model for Preferences {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.snake_case();
        schema
            .field(
                "pageSize",
                codec::integer::<i64>(),
                |p| &p.page_size,
                |p| &mut p.page_size,
            )
            .min(1.0)
            .max(1000.0);
        schema
            .field("theme", codec::string(), |p| &p.theme, |p| &mut p.theme)
            .format(Format::one_of(["light", "dark"]));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotated {
    pub value: NoteValue,
}

impl Model for Annotated {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.field(
            "value",
            codec::object_with::<NoteValue>(|| NoteValue {
                text: "preset".into(),
            }),
            |a| &a.value,
            |a| &mut a.value,
        );
    }
}

#[derive(Debug, Default)]
pub struct Bare;

impl Model for Bare {
    fn declare(_schema: &mut SchemaBuilder<Self>) {}
}

/// Fields shared by every saved resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub id: String,
    pub created_by: String,
    pub revision: i64,
}

impl Model for Resource {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.snake_case();
        schema
            .field("id", codec::string(), |r| &r.id, |r| &mut r.id)
            .required()
            .format(Format::Uuid);
        schema.field(
            "createdBy",
            codec::string(),
            |r| &r.created_by,
            |r| &mut r.created_by,
        );
        schema
            .field(
                "revision",
                codec::integer::<i64>(),
                |r| &r.revision,
                |r| &mut r.revision,
            )
            .skip(Skip::Deserialize);
    }
}

/// A [`Resource`] with its own camelCase fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedQuery {
    pub resource: Resource,
    pub sql: String,
    pub row_limit: Option<u32>,
}

impl Model for SavedQuery {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.inherit(|q| &q.resource, |q| &mut q.resource);
        schema
            .field("sql", codec::string(), |q| &q.sql, |q| &mut q.sql)
            .required()
            .trim();
        schema.field(
            "rowLimit",
            codec::optional(codec::integer::<u32>()),
            |q| &q.row_limit,
            |q| &mut q.row_limit,
        );
    }
}
