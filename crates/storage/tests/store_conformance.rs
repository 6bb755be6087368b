//! Behavior every SchemaStore backend must share, run against both
//! shipped backends through the trait object.

use formwork_core::schema::{FieldDefinition, FieldType, FormSchema, ValidationRules};
use formwork_storage::{JsonFileStore, MemoryStore, SchemaStore, StorageError};

fn survey_schema(id: &str) -> FormSchema {
    let mut name = FieldDefinition::plain("f1", FieldType::Text, "Name");
    name.validations = ValidationRules {
        required: Some(true),
        min_length: Some(2),
        ..ValidationRules::default()
    };
    let mut color = FieldDefinition::plain("f2", FieldType::Select, "Color");
    color.options = Some(vec!["red".into(), "blue".into()]);
    let shout = FieldDefinition::derived(
        "f3",
        FieldType::Text,
        "Greeting",
        &["Name"],
        "concat('Hello, ', parents['Name'], '!')",
    );
    FormSchema {
        id: id.to_owned(),
        name: "Survey".to_owned(),
        created_at: "2024-06-01T12:00:00Z".to_owned(),
        fields: vec![name, color, shout],
    }
}

fn check_store(store: &dyn SchemaStore) {
    assert!(store.load_all().unwrap().is_empty());

    let first = survey_schema("s1");
    let second = survey_schema("s2");
    store.persist(&first).unwrap();
    store.persist(&second).unwrap();

    // order is stable and round-trips are deep-equal
    let all = store.load_all().unwrap();
    assert_eq!(all, vec![first.clone(), second.clone()]);
    assert_eq!(store.find_by_id("s2").unwrap(), second);

    // persisting the same id replaces in place
    let mut renamed = first.clone();
    renamed.name = "Survey v2".to_owned();
    store.persist(&renamed).unwrap();
    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Survey v2");

    // deletion is by id, and unknown ids are an error
    store.delete_by_id("s1").unwrap();
    assert_eq!(store.load_all().unwrap().len(), 1);
    assert!(matches!(
        store.delete_by_id("s1"),
        Err(StorageError::SchemaNotFound { .. })
    ));
    assert!(matches!(
        store.find_by_id("s1"),
        Err(StorageError::SchemaNotFound { .. })
    ));
}

#[test]
fn memory_store_conforms() {
    let store = MemoryStore::new();
    check_store(&store);
}

#[test]
fn json_file_store_conforms() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("schemas.json"));
    check_store(&store);
}

#[test]
fn json_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schemas.json");
    {
        let store = JsonFileStore::new(&path);
        store.persist(&survey_schema("s1")).unwrap();
    }
    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.load_all().unwrap(), vec![survey_schema("s1")]);
}
