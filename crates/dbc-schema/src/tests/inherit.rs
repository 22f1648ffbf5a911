use serde_json::json;

use super::{Resource, SavedQuery};
use crate::{
    DeserializeError, Model, SchemaBuilder, SchemaError, codec, deserialize, schema_of, serialize,
};

const QUERY_ID: &str = "6b69d188-ea12-4877-ab16-567ce8e35a1e";

#[test]
fn inherited_properties_keep_base_wire_names() {
    let schema = schema_of::<SavedQuery>().expect("schema");
    let names: Vec<&str> = schema.properties().map(|p| p.wire_name()).collect();
    assert_eq!(names, vec!["id", "created_by", "revision", "sql", "rowLimit"]);
    assert!(schema.get("id").expect("id").decl().required);
}

#[test]
fn derived_models_decode_base_and_own_fields() {
    let query: SavedQuery = deserialize(&json!({
        "id": QUERY_ID,
        "created_by": "ana",
        "revision": 9,
        "sql": "  select 1  ",
        "rowLimit": 100
    }))
    .expect("decode query");
    assert_eq!(
        query,
        SavedQuery {
            resource: Resource {
                id: QUERY_ID.into(),
                created_by: "ana".into(),
                revision: 0,
            },
            sql: "select 1".into(),
            row_limit: Some(100),
        }
    );
}

#[test]
fn derived_models_serialize_base_fields_first() {
    let query = SavedQuery {
        resource: Resource {
            id: QUERY_ID.into(),
            created_by: "ana".into(),
            revision: 3,
        },
        sql: "select 1".into(),
        row_limit: None,
    };
    let wire = serialize(&query).expect("serialize");
    assert_eq!(
        wire,
        json!({ "id": QUERY_ID, "created_by": "ana", "revision": 3, "sql": "select 1" })
    );
    let decoded: SavedQuery = deserialize(&wire).expect("round trip");
    assert_eq!(decoded.resource.id, query.resource.id);
    assert_eq!(decoded.sql, query.sql);
}

#[test]
fn derived_models_check_keys_across_the_chain() {
    let err = deserialize::<SavedQuery>(&json!({ "sql": "select 1" })).expect_err("missing id");
    assert_eq!(
        err,
        DeserializeError::MissingRequiredProperties {
            names: vec!["id".into()],
        }
    );

    let err = deserialize::<SavedQuery>(&json!({
        "id": QUERY_ID,
        "sql": "select 1",
        "createdBy": "ana"
    }))
    .expect_err("base wire name is snake_case");
    assert_eq!(
        err,
        DeserializeError::UnexpectedProperty {
            property: "createdBy".into()
        }
    );

    let err = deserialize::<SavedQuery>(&json!({ "id": "nope", "sql": "select 1" }))
        .expect_err("base format still applies");
    assert_eq!(err.path(), Some("id"));
}

#[derive(Debug, Default)]
struct Shadowing {
    resource: Resource,
    id: String,
}

impl Model for Shadowing {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.inherit(|s| &s.resource, |s| &mut s.resource);
        schema.field("id", codec::string(), |s| &s.id, |s| &mut s.id);
    }
}

#[derive(Debug, Default)]
struct BrokenBase {
    a: String,
}

impl Model for BrokenBase {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("a", codec::string(), |b| &b.a, |b| &mut b.a)
            .depends_on(["missing"]);
    }
}

#[derive(Debug, Default)]
struct OnBrokenBase {
    base: BrokenBase,
}

impl Model for OnBrokenBase {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.inherit(|d| &d.base, |d| &mut d.base);
    }
}

#[test]
fn inheritance_defects_are_schema_errors() {
    assert!(matches!(
        schema_of::<Shadowing>().err(),
        Some(SchemaError::DuplicateWireName { ref wire_name, .. }) if wire_name == "id"
    ));
    assert!(matches!(
        schema_of::<OnBrokenBase>().err(),
        Some(SchemaError::UnknownDependency { .. })
    ));
}
