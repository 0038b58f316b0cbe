/// Record collection tests
///
/// Bulk operations over collections backed by the in-memory store
/// Run with: cargo test --test record_collection_tests
use memocollection::{
    Attributes, CollectionConfig, Column, DataType, DbError, MemoryRecord, MemoryStore,
    MethodDescriptor, Property, Record, RecordCollection, RelationDef, RelationParams, TableSchema,
    Value,
};

fn setup_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .create_table(
            TableSchema::new(
                "authors",
                vec![
                    Column::new("name", DataType::Text).not_null(),
                    Column::new("status", DataType::Text),
                    Column::new("score", DataType::Integer),
                ],
            )
            .with_relation("posts", RelationDef::has_many("posts", "author_id")),
        )
        .unwrap();
    store
        .create_table(
            TableSchema::new(
                "posts",
                vec![
                    Column::new("title", DataType::Text).not_null(),
                    Column::new("author_id", DataType::Integer),
                ],
            )
            .with_relation("author", RelationDef::belongs_to("authors", "author_id")),
        )
        .unwrap();
    store
}

fn add_author(store: &MemoryStore, name: &str, status: &str) -> MemoryRecord {
    let mut author = store
        .new_record("authors")
        .unwrap()
        .with("name", name)
        .unwrap()
        .with("status", status)
        .unwrap()
        .with("score", 1)
        .unwrap();
    assert!(author.save().unwrap());
    author
}

fn add_post(store: &MemoryStore, title: &str, author_id: i64) {
    let mut post = store
        .new_record("posts")
        .unwrap()
        .with("title", title)
        .unwrap()
        .with("author_id", author_id)
        .unwrap();
    post.save().unwrap();
}

fn conditions(name: &str, value: impl Into<Value>) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(name.to_string(), value.into());
    attrs
}

#[test]
fn test_filter_then_read_attribute() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");
    add_author(&store, "Cid", "a");

    let authors = store.collection("authors").unwrap();
    let filtered = authors.filter(|m| m.get_attribute("status") == Value::from("a"));

    assert_eq!(filtered.len(), 2);
    assert_eq!(
        filtered.iter().map(|m| m.id()).collect::<Vec<_>>(),
        vec![Some(1), Some(3)]
    );
    assert_eq!(
        filtered.get_attribute("status"),
        vec![Value::from("a"), Value::from("a")]
    );
    assert_eq!(filtered.model().type_name(), "authors");
}

#[test]
fn test_bulk_set_and_save_persists_every_member() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");

    let mut authors = store.collection("authors").unwrap();
    authors.set_attribute("status", "archived").unwrap();

    // not persisted yet
    let stored = store.collection("authors").unwrap();
    assert_eq!(stored.get_attribute("status"), vec![Value::from("a"), Value::from("b")]);

    assert!(authors.save());
    let stored = store.collection("authors").unwrap();
    assert_eq!(stored.get_attribute("status"), vec![Value::from("archived"); 2]);
}

#[test]
fn test_set_unknown_attribute_is_noop() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");

    let mut authors = store.collection("authors").unwrap();
    let before = authors.get_attributes();
    authors.set_attribute("missing_attr", 5).unwrap();
    authors.set_property("missing_attr", 5).unwrap();
    assert_eq!(authors.get_attributes(), before);
}

#[test]
fn test_save_swallows_member_failure() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");

    let mut authors = store.collection("authors").unwrap();
    authors.get_mut(0).unwrap().set_attribute("name", Value::Null).unwrap();
    authors.get_mut(1).unwrap().set_attribute("score", Value::Integer(9)).unwrap();

    assert!(authors.save());
    let stored = store.collection("authors").unwrap();
    assert_eq!(stored.get_attribute("name"), vec![Value::from("Ann"), Value::from("Bob")]);
    assert_eq!(stored.get_attribute("score"), vec![Value::Integer(1), Value::Integer(9)]);

    let outcome = authors.save_each();
    assert_eq!(outcome.visited(), 2);
    let failures: Vec<_> = outcome.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 0);
    assert!(matches!(failures[0].result, Err(DbError::ConstraintViolation(_))));
}

#[test]
fn test_save_each_stop_on_first_failure() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");

    let mut authors = store
        .collection_with_config(
            "authors",
            &Attributes::new(),
            CollectionConfig::new().stop_on_first_failure().log_member_failures(false),
        )
        .unwrap();
    authors.set_attribute("name", Value::Null).unwrap();

    let outcome = authors.save_each();
    assert!(outcome.stopped_early());
    assert_eq!(outcome.visited(), 1);
    assert!(outcome.into_result().is_err());
}

#[test]
fn test_delete_and_refresh_fan_out() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");
    add_author(&store, "Cid", "a");

    let mut doomed = store.collection_by("authors", &conditions("status", "a")).unwrap();
    assert_eq!(doomed.len(), 2);
    assert!(doomed.delete());
    assert_eq!(store.row_count("authors").unwrap(), 1);
    assert!(doomed.iter().all(|m| m.is_new_record()));

    // deleting new records fails per member but the collection still reports success
    assert!(doomed.delete());
    assert_eq!(doomed.delete_each().failures().count(), 2);

    let mut remaining = store.collection("authors").unwrap();
    remaining.set_attribute("status", "dirty").unwrap();
    assert!(remaining.refresh());
    assert_eq!(remaining.get_attribute("status"), vec![Value::from("b")]);
    assert!(remaining.refresh_each().all_succeeded());
}

#[test]
fn test_get_related_across_members() {
    let store = setup_store();
    let ann = add_author(&store, "Ann", "a");
    let bob = add_author(&store, "Bob", "b");
    let ann_id = ann.id().unwrap();
    add_post(&store, "first", ann_id);
    add_post(&store, "second", ann_id);
    add_post(&store, "third", bob.id().unwrap());

    let mut authors = store.collection("authors").unwrap();
    let posts = authors.related("posts").unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].len(), 2);
    assert_eq!(posts[1].len(), 1);
    assert_eq!(
        posts[1].attributes()[0]["title"],
        Value::from("third")
    );

    let mut all_posts = store.collection("posts").unwrap();
    let owners = all_posts.related("author").unwrap();
    let owner_names: Vec<Value> = owners
        .iter()
        .map(|r| r.as_one().map(|a| a.get_attribute("name")).unwrap_or(Value::Null))
        .collect();
    assert_eq!(
        owner_names,
        vec![Value::from("Ann"), Value::from("Ann"), Value::from("Bob")]
    );

    assert!(authors.related("comments").unwrap().is_empty());
}

#[test]
fn test_get_related_refresh_reloads_cached_relations() {
    let store = setup_store();
    let ann = add_author(&store, "Ann", "a");
    add_post(&store, "first", ann.id().unwrap());

    let mut authors = store.collection("authors").unwrap();
    assert_eq!(authors.related("posts").unwrap()[0].len(), 1);

    add_post(&store, "second", ann.id().unwrap());
    assert_eq!(authors.related("posts").unwrap()[0].len(), 1);

    let fresh = authors
        .get_related("posts", true, &RelationParams::default())
        .unwrap();
    assert_eq!(fresh[0].len(), 2);
    assert_eq!(authors.related("posts").unwrap()[0].len(), 2);
}

#[test]
fn test_property_access_routes_by_name() {
    let store = setup_store();
    let ann = add_author(&store, "Ann", "a");
    add_post(&store, "first", ann.id().unwrap());

    let mut authors = store.collection("authors").unwrap();
    match authors.get_property("name").unwrap() {
        Property::Attributes(values) => assert_eq!(values, vec![Value::from("Ann")]),
        other => panic!("expected attributes, got {:?}", other),
    }
    match authors.get_property("posts").unwrap() {
        Property::Related(related) => assert_eq!(related[0].len(), 1),
        other => panic!("expected relation, got {:?}", other),
    }
    assert!(authors.get_property("nothing").unwrap().is_empty());
}

#[test]
fn test_forward_to_all_with_registered_method() {
    let store = setup_store();
    add_author(&store, "Ann", "a");
    add_author(&store, "Bob", "b");
    add_author(&store, "Cid", "c");

    store
        .register_method(
            "authors",
            MethodDescriptor::new("bump_score", 1).mutating(),
            |record, args| {
                let delta = args.first().and_then(Value::as_i64).unwrap_or(1);
                let score = record.get_attribute("score").as_i64().unwrap_or_default() + delta;
                record.set_attribute("score", Value::Integer(score))?;
                Ok(Value::Integer(score))
            },
        )
        .unwrap();

    let mut authors = store.collection("authors").unwrap();
    let results = authors.forward_to_all("bump_score", &[Value::Integer(4)]).unwrap();
    assert_eq!(results, vec![Value::Integer(5); 3]);
    assert_eq!(authors.get_attribute("score"), vec![Value::Integer(5); 3]);

    let names = authors
        .forward_to_all("get_attribute", &[Value::from("name")])
        .unwrap();
    assert_eq!(names, vec![Value::from("Ann"), Value::from("Bob"), Value::from("Cid")]);

    let saved = authors.forward_to_all("save", &[]).unwrap();
    assert_eq!(saved, vec![Value::Boolean(true); 3]);

    let err = authors.forward_to_all("explode", &[]).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedOperation(_)));

    let catalog = authors.methods_catalog();
    assert_eq!(catalog.get("bump_score"), Some(&3));
    assert_eq!(catalog.get("save"), Some(&3));
}

#[test]
fn test_apply_runs_once_per_member_in_order() {
    let store = setup_store();
    for name in ["a", "b", "c"] {
        add_author(&store, name, "x");
    }

    let mut authors = store.collection("authors").unwrap();
    let mut seen = Vec::new();
    authors.apply(|m| seen.push(m.id().unwrap_or_default()));
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn test_empty_collection_boundaries() {
    let store = setup_store();
    let mut authors = store.collection("authors").unwrap();

    assert!(authors.is_empty());
    assert!(authors.first().is_none());
    assert!(authors.last().is_none());
    assert!(authors.get_attribute("name").is_empty());
    assert!(authors.save());
    assert!(authors.save_each().all_succeeded());
    assert!(authors.forward_to_all("explode", &[]).unwrap().is_empty());
    assert!(authors.has_attribute("name"));
}

#[test]
fn test_exemplar_is_not_a_member() {
    let store = setup_store();
    let exemplar = store.exemplar("authors").unwrap();
    let member = add_author(&store, "Ann", "a");

    let mut authors = RecordCollection::create(exemplar, vec![member.clone(), member]);
    assert_eq!(authors.len(), 2);
    assert_eq!(authors.get_attribute("name"), vec![Value::from("Ann"); 2]);
    assert!(authors.model().is_new_record());

    authors.set_attribute("score", 3).unwrap();
    assert_eq!(authors.model().get_attribute("score"), Value::Null);
    assert_eq!(authors.first().map(|m| m.id()), authors.last().map(|m| m.id()));
}
