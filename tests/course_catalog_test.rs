use course_portal::db::repository;
use course_portal::error::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn test_pool() -> SqlitePool {
    // A single connection keeps the in-memory database shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

#[tokio::test]
async fn catalog_is_sorted_by_name() {
    let pool = test_pool().await;

    repository::insert_course(&pool, "Databases", Some("Storage and queries"))
        .await
        .expect("insert");
    repository::insert_course(&pool, "Algorithms", None)
        .await
        .expect("insert");
    repository::insert_course(&pool, "Compilers", Some("Parsing and codegen"))
        .await
        .expect("insert");

    let names: Vec<String> = repository::fetch_courses(&pool)
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Algorithms", "Compilers", "Databases"]);
}

#[tokio::test]
async fn duplicate_course_name_is_rejected() {
    let pool = test_pool().await;

    repository::insert_course(&pool, "CS101", None).await.expect("insert");

    let err = repository::insert_course(&pool, "CS101", Some("again"))
        .await
        .expect_err("duplicate must fail");
    assert!(matches!(err, AppError::Duplicate(_)));

    let courses = repository::fetch_courses(&pool).await.expect("list");
    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn omitted_or_blank_description_gets_placeholder() {
    let pool = test_pool().await;

    repository::insert_course(&pool, "CS101", None).await.expect("insert");
    repository::insert_course(&pool, "CS102", Some("   ")).await.expect("insert");
    repository::insert_course(&pool, "CS103", Some("Real text")).await.expect("insert");

    let courses = repository::fetch_courses(&pool).await.expect("list");
    assert_eq!(courses[0].description, "No description provided");
    assert_eq!(courses[1].description, "No description provided");
    assert_eq!(courses[2].description, "Real text");
}

#[tokio::test]
async fn deleting_missing_course_is_a_silent_no_op() {
    let pool = test_pool().await;

    repository::insert_course(&pool, "CS101", None).await.expect("insert");

    repository::delete_course(&pool, "does-not-exist")
        .await
        .expect("idempotent delete");

    let courses = repository::fetch_courses(&pool).await.expect("list");
    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn delete_is_by_exact_name() {
    let pool = test_pool().await;

    repository::insert_course(&pool, "CS101", None).await.expect("insert");
    repository::insert_course(&pool, "CS101 Lab", None).await.expect("insert");

    repository::delete_course(&pool, "CS101").await.expect("delete");

    let names: Vec<String> = repository::fetch_courses(&pool)
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["CS101 Lab"]);
}
