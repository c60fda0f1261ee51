use roster_core::db::migrations::latest_version;
use roster_core::db::open_db_in_memory;
use roster_core::{EntityKey, NewStudent, RepoError, SqliteStudentRepository, StudentRepository};
use rusqlite::Connection;

#[test]
fn insert_then_find_roundtrips_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    for (first, last) in [("Paul", "Panda"), ("Alex", "Lion"), ("Zoë", "O'Neil")] {
        let inserted = repo.insert_student(&NewStudent::new(first, last)).unwrap();
        let loaded = repo.find_student_by_id(inserted.id).unwrap();
        assert_eq!(loaded, inserted);
        assert_eq!(loaded.first_name, first);
        assert_eq!(loaded.last_name, last);
    }
}

#[test]
fn store_assigns_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let first = repo.insert_student(&NewStudent::new("Paul", "Panda")).unwrap();
    let second = repo.insert_student(&NewStudent::new("Alex", "Lion")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn removed_student_id_is_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let removed = repo.insert_student(&NewStudent::new("Paul", "Panda")).unwrap();
    repo.remove_student(removed.id).unwrap();
    let next = repo.insert_student(&NewStudent::new("Alex", "Lion")).unwrap();
    assert!(next.id > removed.id);
}

#[test]
fn find_unknown_student_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.find_student_by_id(4242).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityKey::Student(4242))));
}

#[test]
fn blank_name_is_rejected_by_store_constraint() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.insert_student(&NewStudent::new("  ", "Panda")).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));
    assert!(repo.list_students().unwrap().is_empty());
}

#[test]
fn list_students_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let a = repo.insert_student(&NewStudent::new("Zed", "Last")).unwrap();
    let b = repo.insert_student(&NewStudent::new("Amy", "First")).unwrap();

    let ids: Vec<_> = repo
        .list_students()
        .unwrap()
        .into_iter()
        .map(|student| student.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[test]
fn remove_unknown_student_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.remove_student(7).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityKey::Student(7))));
}

#[test]
fn student_serializes_with_snake_case_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let student = repo.insert_student(&NewStudent::new("Paul", "Panda")).unwrap();

    let json = serde_json::to_value(&student).unwrap();
    assert_eq!(json["first_name"], "Paul");
    assert_eq!(json["last_name"], "Panda");
    assert_eq!(json["id"], student.id);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("students"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "students",
            column: "last_name"
        })
    ));
}
