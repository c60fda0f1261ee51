use roster_core::db::open_db_in_memory;
use roster_core::{Class, ClassRepository, EntityKey, RepoError, SqliteClassRepository};

#[test]
fn insert_then_find_roundtrips_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();

    repo.insert_class(&Class::new("math17", "Algebra and Trigonometry"))
        .unwrap();
    let loaded = repo.find_class_by_code("math17").unwrap();
    assert_eq!(loaded.name, "Algebra and Trigonometry");
}

#[test]
fn duplicate_code_is_rejected_and_original_kept() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();

    repo.insert_class(&Class::new("math17", "Algebra and Trigonometry"))
        .unwrap();
    let err = repo
        .insert_class(&Class::new("math17", "Something Else"))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey(EntityKey::Class(code)) if code == "math17"));

    let loaded = repo.find_class_by_code("math17").unwrap();
    assert_eq!(loaded.name, "Algebra and Trigonometry");
}

#[test]
fn code_lookup_is_exact() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();
    repo.insert_class(&Class::new("math17", "Algebra and Trigonometry"))
        .unwrap();

    let err = repo.find_class_by_code("MATH17").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityKey::Class(code)) if code == "MATH17"));
}

#[test]
fn blank_code_is_rejected_by_store_constraint() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();

    let err = repo.insert_class(&Class::new("", "Nameless")).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));
}

#[test]
fn persisted_blank_name_is_invalid_data_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO classes (code, name) VALUES ('math17', '  ');
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();

    let err = repo.find_class_by_code("math17").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("math17")));
}

#[test]
fn list_classes_is_ordered_by_code() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();
    repo.insert_class(&Class::new("math17", "Algebra and Trigonometry"))
        .unwrap();
    repo.insert_class(&Class::new("comm01", "Communication 1"))
        .unwrap();

    let codes: Vec<_> = repo
        .list_classes()
        .unwrap()
        .into_iter()
        .map(|class| class.code)
        .collect();
    assert_eq!(codes, vec!["comm01", "math17"]);
}

#[test]
fn remove_class_then_lookup_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClassRepository::try_new(&conn).unwrap();
    repo.insert_class(&Class::new("comm01", "Communication 1"))
        .unwrap();

    repo.remove_class("comm01").unwrap();
    assert!(matches!(
        repo.find_class_by_code("comm01"),
        Err(RepoError::NotFound(_))
    ));
    assert!(matches!(
        repo.remove_class("comm01"),
        Err(RepoError::NotFound(EntityKey::Class(_)))
    ));
}
