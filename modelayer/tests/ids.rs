use bson::{Bson, doc, oid::ObjectId};
use modelayer::{
    memory::{InMemoryStore, SequenceGenerator},
    prelude::*,
};
use serde::{Deserialize, Serialize};

const OBJECT_ID_LIKE: &str = "7cd2ad46ffc580ba45d3cb1f";

fn registry() -> ModelRegistry {
    ModelRegistry::builder()
        .register_json(
            r#"{
                "name": "customer",
                "properties": {
                    "seq": { "type": "Number", "id": true },
                    "name": "String",
                    "emails": ["String"],
                    "age": "Number"
                },
                "options": { "forceId": false }
            }"#,
        )
        .unwrap()
        .register_json(
            r#"{
                "name": "account",
                "properties": {
                    "seq": { "id": true, "generated": true },
                    "name": "String"
                },
                "options": { "forceId": false }
            }"#,
        )
        .unwrap()
        .register(
            ModelDefinition::new("customer1")
                .property("name", PropertyType::String)
                .property("emails", PropertyType::Array)
                .property("age", PropertyType::Number),
        )
        .unwrap()
        .register(
            ModelDefinition::new("Book")
                .property(
                    "id",
                    PropertyDef::new(PropertyType::String)
                        .id()
                        .store_data_type("ObjectId"),
                )
                .property("authorId", PropertyDef::new(PropertyType::ObjectId))
                .property("title", PropertyType::String),
        )
        .unwrap()
        .register(
            ModelDefinition::new("Ticket")
                .property(
                    "code",
                    PropertyDef::new(PropertyType::String)
                        .id()
                        .generated(true),
                )
                .force_id(true),
        )
        .unwrap()
        .build()
}

fn connector() -> Connector<InMemoryStore> {
    Connector::new(InMemoryStore::new(), registry()).with_id_generator(SequenceGenerator::new())
}

#[tokio::test]
async fn custom_id_name_round_trips() {
    let connector = connector();

    for (seq, name, age) in [(1, "John1", 30), (2, "John2", 40)] {
        let customer = connector
            .create(
                "customer",
                doc! { "seq": seq, "name": name, "emails": ["john@x.com"], "age": age },
            )
            .await
            .unwrap();
        assert_eq!(customer.get("seq"), Some(&Bson::Int32(seq)));
        assert!(!customer.contains_key("_id"));
    }

    let found = connector
        .find_by_id("customer", 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get_str("name").unwrap(), "John1");

    let matched = connector
        .find_where("customer", &doc! { "seq": { "inq": [1] } })
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].get("seq"), Some(&Bson::Int32(1)));

    // Numeric strings are coerced for ids declared as numbers
    assert!(connector.find_by_id("customer", "2").await.unwrap().is_some());
}

#[tokio::test]
async fn user_supplied_ids_collide_in_the_store() {
    let connector = connector();
    connector
        .create("customer", doc! { "seq": 1, "name": "John1" })
        .await
        .unwrap();

    assert!(matches!(
        connector.create("customer", doc! { "seq": 1, "name": "Again" }).await,
        Err(ConnectorError::DocumentAlreadyExists(_, _))
    ));
}

#[tokio::test]
async fn large_numeric_ids_stay_distinct() {
    let connector = connector();
    let boundary = 9_007_199_254_740_992_i64;

    for (seq, name) in [(boundary, "Low"), (boundary + 1, "High")] {
        connector
            .create("customer", doc! { "seq": seq, "name": name })
            .await
            .unwrap();
    }

    let found = connector
        .find_by_id("customer", boundary + 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get_str("name").unwrap(), "High");
    assert_eq!(connector.count("customer", None).await.unwrap(), 2);
}

#[tokio::test]
async fn opaque_generated_ids_come_from_the_sequence() {
    let connector = connector();

    let first = connector
        .create("account", doc! { "name": "John1" })
        .await
        .unwrap();
    let second = connector
        .create("account", doc! { "name": "John2" })
        .await
        .unwrap();
    assert_eq!(first.get("seq"), Some(&Bson::Int64(1)));
    assert_eq!(second.get("seq"), Some(&Bson::Int64(2)));

    let found = connector
        .find_by_id("account", 1_i64)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get("seq"), first.get("seq"));

    let deleted = connector
        .destroy_by_id("account", 1_i64)
        .await
        .unwrap();
    assert_eq!(deleted.count, 1);
    assert!(connector.find_by_id("account", 1_i64).await.unwrap().is_none());
}

#[tokio::test]
async fn opaque_generated_ids_accept_values_unless_forced() {
    let connector = connector();

    let account = connector
        .create("account", doc! { "seq": 42, "name": "Chosen" })
        .await
        .unwrap();
    assert_eq!(account.get("seq"), Some(&Bson::Int32(42)));

    let err = connector
        .create("Ticket", doc! { "code": "T-1" })
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::AutogeneratedIdConflict { .. }));

    let ticket = connector.create("Ticket", doc! {}).await.unwrap();
    let code = ticket.get_str("code").unwrap();
    assert_eq!(code.len(), 36);
}

#[tokio::test]
async fn default_id_is_a_native_hex_string() {
    let connector = connector();

    let customer = connector
        .create("customer1", doc! { "name": "John1", "emails": ["john@x.com"], "age": 30 })
        .await
        .unwrap();
    let id = customer.get_str("id").unwrap().to_string();
    assert!(IdentifierCodec::is_object_id_hex(&id));

    let found = connector
        .find_by_id("customer1", id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, customer);

    // Both forms of the same id match
    let oid = ObjectId::parse_str(&id).unwrap();
    let matched = connector
        .find(
            "customer1",
            &Query::builder()
                .filter(Filter::inq("id", [Bson::String(id.clone()), Bson::ObjectId(oid)]))
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(matched, vec![customer]);
}

#[tokio::test]
async fn native_generated_ids_reject_supplied_values() {
    let connector = connector();

    for supplied in [Bson::Int32(1), Bson::String(OBJECT_ID_LIKE.into())] {
        let err = connector
            .create("customer1", doc! { "id": supplied, "name": "John1" })
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Cannot specify value for autogenerated id"));
    }

    assert_eq!(connector.count("customer1", None).await.unwrap(), 0);
}

#[tokio::test]
async fn null_ids_count_as_absent() {
    let connector = connector();

    let customer = connector
        .create("customer1", doc! { "id": Bson::Null, "name": "John1" })
        .await
        .unwrap();
    assert!(customer.get_str("id").is_ok());
}

#[tokio::test]
async fn user_supplied_native_ids() {
    let connector = connector();

    let book = connector
        .create("Book", doc! { "id": OBJECT_ID_LIKE, "title": "Jungle" })
        .await
        .unwrap();
    assert_eq!(book.get_str("id").unwrap(), OBJECT_ID_LIKE);

    let found = connector
        .find_by_id("Book", OBJECT_ID_LIKE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get_str("id").unwrap(), OBJECT_ID_LIKE);

    let by_object_id = connector
        .find_by_id("Book", ObjectId::parse_str(OBJECT_ID_LIKE).unwrap())
        .await
        .unwrap();
    assert_eq!(by_object_id, Some(found));

    let matched = connector
        .find_where("Book", &doc! { "id": { "inq": [OBJECT_ID_LIKE] } })
        .await
        .unwrap();
    assert_eq!(matched, vec![book.clone()]);

    let deleted = connector
        .destroy_by_id("Book", OBJECT_ID_LIKE)
        .await
        .unwrap();
    assert_eq!(deleted, DeleteResult { count: 1 });

    let deleted = connector
        .destroy_by_id("Book", ObjectId::parse_str(OBJECT_ID_LIKE).unwrap())
        .await
        .unwrap();
    assert_eq!(deleted, DeleteResult { count: 0 });
}

#[tokio::test]
async fn identity_field_filters_use_the_id_codec() {
    let connector = connector();
    let book = connector
        .create("Book", doc! { "id": OBJECT_ID_LIKE, "title": "Jungle" })
        .await
        .unwrap();

    let matched = connector
        .find_where("Book", &doc! { "_id": OBJECT_ID_LIKE })
        .await
        .unwrap();
    assert_eq!(matched, vec![book]);

    assert!(matches!(
        connector.find_where("Book", &doc! { "_id": "bogus" }).await,
        Err(ConnectorError::InvalidObjectIdFormat(_))
    ));
}

#[tokio::test]
async fn user_supplied_native_ids_are_validated() {
    let connector = connector();

    let err = connector
        .create("Book", doc! { "title": "Jungle" })
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("Value is required for non-autogenerated id"));

    for invalid in [Bson::Int32(3), Bson::String(OBJECT_ID_LIKE.to_uppercase()), Bson::String("abc".into())] {
        let err = connector
            .create("Book", doc! { "id": invalid, "title": "Jungle" })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid ObjectId string"));
    }

    assert_eq!(connector.count("Book", None).await.unwrap(), 0);
}

#[tokio::test]
async fn object_id_instances_are_stringified() {
    let connector = connector();
    let oid = ObjectId::parse_str(OBJECT_ID_LIKE).unwrap();

    let book = connector
        .create("Book", doc! { "id": oid, "title": "Jungle" })
        .await
        .unwrap();
    assert_eq!(book.get_str("id").unwrap(), oid.to_hex());

    let found = connector
        .find_by_id("Book", oid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get_str("id").unwrap(), oid.to_hex());
}

#[tokio::test]
async fn native_foreign_keys_are_encoded_and_decoded() {
    let store = InMemoryStore::new();
    let connector = Connector::new(&store, registry());
    let author = ObjectId::new();

    let book = connector
        .create("Book", doc! { "id": OBJECT_ID_LIKE, "authorId": author.to_hex(), "title": "Jungle" })
        .await
        .unwrap();
    assert_eq!(book.get_str("authorId").unwrap(), author.to_hex());

    let stored = store
        .find_documents(&StoreQuery::default(), "Book")
        .await
        .unwrap();
    assert_eq!(
        stored,
        vec![doc! {
            "_id": ObjectId::parse_str(OBJECT_ID_LIKE).unwrap(),
            "authorId": author,
            "title": "Jungle",
        }]
    );

    let matched = connector
        .find_where("Book", &doc! { "authorId": author.to_hex() })
        .await
        .unwrap();
    assert_eq!(matched, vec![book]);

    assert!(matches!(
        connector
            .find_where("Book", &doc! { "authorId": "not-an-object-id" })
            .await,
        Err(ConnectorError::InvalidObjectIdFormat(_))
    ));
}

#[tokio::test]
async fn filters_over_ids_are_translated() {
    let connector = connector();
    for seq in [1, 2, 3] {
        connector
            .create("customer", doc! { "seq": seq, "name": format!("John{seq}") })
            .await
            .unwrap();
    }

    let descending = connector
        .find(
            "customer",
            &Query::builder()
                .filter(Filter::nin("seq", [2]))
                .sort("seq", SortDirection::Desc)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(
        descending
            .iter()
            .map(|c| c.get_str("name").unwrap())
            .collect::<Vec<_>>(),
        vec!["John3", "John1"]
    );

    assert!(
        connector
            .find("customer", &Filter::inq("seq", Vec::<Bson>::new()).into())
            .await
            .unwrap()
            .is_empty()
    );

    let deleted = connector
        .destroy_all("customer", Some(&Filter::gte("seq", 2)))
        .await
        .unwrap();
    assert_eq!(deleted.count, 2);
    assert_eq!(connector.count("customer", None).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_models_are_rejected() {
    let connector = connector();

    assert!(matches!(
        connector.create("Nope", doc! {}).await,
        Err(ConnectorError::ModelNotFound(_))
    ));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Book {
    id: Option<String>,
    title: String,
}

impl Model for Book {
    fn model_name() -> &'static str {
        "Book"
    }
}

#[tokio::test]
async fn typed_models_round_trip() {
    let connector = connector();
    let books = connector.typed::<Book>();

    let created = books
        .create(&Book { id: Some(OBJECT_ID_LIKE.into()), title: "Jungle".into() })
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some(OBJECT_ID_LIKE));

    let found = books.find_by_id(OBJECT_ID_LIKE).await.unwrap();
    assert_eq!(found, Some(created));

    let missing = books
        .create(&Book { id: None, title: "Jungle".into() })
        .await
        .unwrap_err();
    assert!(matches!(missing, ConnectorError::MissingRequiredId { .. }));

    assert_eq!(books.destroy_by_id(OBJECT_ID_LIKE).await.unwrap().count, 1);
}
