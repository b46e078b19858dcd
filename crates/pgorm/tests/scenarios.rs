//! End-to-end builder/derive scenarios.
//!
//! These exercise the `#[derive(Record)]`/builder graph/interpolator stack the way a
//! caller would assemble them, without a live Postgres connection — in the same vein as
//! the teacher's own `tests/` directory, which verifies generated code against its own
//! expectations rather than against a database.

use pgorm::builder::insert::InsertBuilder;
use pgorm::builder::shared::SqlBuilder;
use pgorm::builder::upsert::UpsertBuilder;
use pgorm::interpolate::interpolate;
use pgorm::{Record, SqlValue};

#[derive(Record)]
struct Realm {
    #[orm(column = "realm_uuid")]
    realm_uuid: String,
}

#[derive(Record)]
struct Group {
    #[orm(column = "group_uuid")]
    group_uuid: String,
    #[orm(embed)]
    realm: Option<Realm>,
}

#[test]
fn embedded_record_flattens_into_insert_columns() {
    let group = Group {
        group_uuid: "22".to_string(),
        realm: Some(Realm { realm_uuid: "11".to_string() }),
    };
    let (sql, args) = InsertBuilder::new("groups")
        .columns(&["group_uuid", "realm_uuid"])
        .record(&group)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"groups\" (\"group_uuid\", \"realm_uuid\") VALUES ($1, $2)"
    );
    assert_eq!(args, vec![SqlValue::Text("22".into()), SqlValue::Text("11".into())]);
}

#[test]
fn nil_embedded_record_columns_are_unavailable_not_null() {
    let group = Group { group_uuid: "22".to_string(), realm: None };

    // `all_columns()` flattens the embedded type's columns unconditionally, so a bare
    // wildcard projection still reaches for "realm_uuid" and finds it unavailable.
    let wildcard = InsertBuilder::new("groups").record(&group);
    assert!(wildcard.is_err());

    // Blacklisting the unavailable embedded column steers the wildcard projection clear
    // of it.
    let (sql, args) = InsertBuilder::new("groups")
        .blacklist(&["realm_uuid"])
        .record(&group)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO \"groups\" (\"group_uuid\") VALUES ($1)");
    assert_eq!(args, vec![SqlValue::Text("22".into())]);

    // Referencing the unavailable column through an explicit column list is likewise a
    // hard error, not a silent NULL.
    let explicit = InsertBuilder::new("groups")
        .columns(&["group_uuid", "realm_uuid"])
        .record(&group);
    assert!(explicit.is_err());
}

#[derive(Record)]
struct Person {
    #[orm(column = "name")]
    name: String,
    #[orm(column = "nickname")]
    nickname: Option<String>,
    #[orm(column = "deleted_at")]
    deleted_at: Option<String>,
}

#[test]
fn nil_pointer_fields_serialize_as_sql_null() {
    let person = Person {
        name: "mario".to_string(),
        nickname: None,
        deleted_at: None,
    };
    let (sql, args) = InsertBuilder::new("people")
        .columns(&["name", "nickname", "deleted_at"])
        .record(&person)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"people\" (\"name\", \"nickname\", \"deleted_at\") VALUES ($1, $2, $3)"
    );
    assert_eq!(
        args,
        vec![SqlValue::Text("mario".into()), SqlValue::Null, SqlValue::Null]
    );
}

#[test]
fn multi_row_record_insert_keeps_placeholders_contiguous() {
    let rows = vec![
        Person { name: "a".into(), nickname: None, deleted_at: None },
        Person { name: "b".into(), nickname: Some("bee".into()), deleted_at: None },
    ];
    let mut builder = InsertBuilder::new("people").columns(&["name", "nickname", "deleted_at"]);
    for row in &rows {
        builder = builder.record(row).unwrap();
    }
    let (sql, args) = builder.to_sql().unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"people\" (\"name\", \"nickname\", \"deleted_at\") VALUES ($1, $2, $3), ($4, $5, $6)"
    );
    assert_eq!(args.len(), 6);
}

#[test]
fn interpolation_rotates_dollar_tag_when_payload_contains_the_active_tag() {
    let tag_before = pgorm::dialect::dollar_tag();
    // A single quote forces dollar-quoting; embedding the *current* fence inside the
    // payload forces a collision that must be resolved before rendering.
    let payload = format!("it's a trap ${}$ nested", tag_before);
    let out = interpolate("SELECT $1", &[SqlValue::Text(payload.clone())]).unwrap();

    let tag_after = pgorm::dialect::dollar_tag();
    assert_ne!(tag_before, tag_after, "a colliding payload must rotate the active tag");
    let new_fence = format!("${}$", tag_after);
    assert!(!payload.contains(&new_fence), "the freshly rotated tag must not collide with the payload");
    assert!(out.starts_with(&format!("SELECT {new_fence}")));
    assert!(out.ends_with(&new_fence));
}

#[derive(Record)]
struct Account {
    #[orm(column = "email")]
    email: String,
    #[orm(column = "display_name")]
    display_name: String,
}

#[test]
fn upsert_by_predicate_is_idempotent_on_repeated_application() {
    let account = Account { email: "a@b.com".to_string(), display_name: "mario".to_string() };
    let build = || {
        UpsertBuilder::new("accounts")
            .columns(&["email", "display_name"])
            .record(&account)
            .unwrap()
            .where_("email", "a@b.com")
            .to_sql()
            .unwrap()
    };
    let (first_sql, first_args) = build();
    let (second_sql, second_args) = build();
    assert_eq!(first_sql, second_sql);
    assert_eq!(first_args, second_args);
    assert_eq!(
        first_sql,
        "INSERT INTO \"accounts\" (\"email\", \"display_name\") VALUES ($1, $2) ON CONFLICT (\"email\") DO UPDATE SET \"display_name\" = EXCLUDED.\"display_name\""
    );
}
