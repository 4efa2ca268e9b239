//! Integration tests for the Postgres record and user stores.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use insights_common::{Facet, RecordFields, RecordFilter, RecordPatch};
use insights_store::{
    enumerate_facets, migrate, NewUser, PgRecordStore, PgUserStore, RecordStore, UserStore,
};

/// Get a migrated, empty test database, or skip if none is available.
async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    migrate(&pool).await.ok()?;

    // Clean slate for each test
    sqlx::query("TRUNCATE records, users")
        .execute(&pool)
        .await
        .ok()?;

    Some(pool)
}

fn record(title: &str, topic: &str, end_year: &str) -> RecordFields {
    RecordFields::builder()
        .title(title)
        .topic(topic)
        .end_year(end_year)
        .intensity(4.0)
        .build()
}

// These share one database, so they run as a single sequential test.
#[tokio::test]
async fn pg_record_store_behaves_like_a_document_store() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgRecordStore::new(pool.clone());

    // --- insert + find ---
    let first = store.insert(record("a", "oil", "2020")).await.unwrap();
    store
        .insert_many(vec![record("b", "gas", "2021"), record("c", "oil", "")])
        .await
        .unwrap();

    let all = store.find(&RecordFilter::new()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    let oil = store
        .find(&RecordFilter::new().with(Facet::Topic, "oil"))
        .await
        .unwrap();
    assert_eq!(oil.len(), 2);

    let in_2020 = store
        .find(&RecordFilter::new().with(Facet::EndYear, "2020"))
        .await
        .unwrap();
    assert_eq!(in_2020.len(), 1);
    assert_eq!(in_2020[0].id, first.id);

    // --- distinct over legacy numeric values ---
    sqlx::query("INSERT INTO records (id, doc) VALUES ($1, $2)")
        .bind(Uuid::new_v4())
        .bind(json!({"title": "legacy", "topic": "oil", "end_year": 2030}))
        .execute(&pool)
        .await
        .unwrap();
    let lists = enumerate_facets(&store).await.unwrap();
    assert_eq!(lists.end_years, vec!["2020", "2021", "2030"]);
    assert_eq!(lists.topics, vec!["gas", "oil"]);

    // --- update ---
    let patch = RecordPatch::from_json(json!({"region": "Asia"})).unwrap();
    let updated = store.update(first.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.region, "Asia");
    assert_eq!(updated.title, "a");
    assert!(store.update(Uuid::new_v4(), &patch).await.unwrap().is_none());

    // --- delete ---
    assert!(store.delete(first.id).await.unwrap().is_some());
    assert!(store.delete(first.id).await.unwrap().is_none());

    // --- clear ---
    assert_eq!(store.clear().await.unwrap(), 3);
    assert!(store.find(&RecordFilter::new()).await.unwrap().is_empty());

    // --- users ---
    let users = PgUserStore::new(pool);
    let new_user = NewUser {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "salt$hash".to_string(),
    };
    let created = users.create(new_user.clone()).await.unwrap().unwrap();
    assert!(users.create(new_user).await.unwrap().is_none());
    let found = users.find_by_email("ada@example.com").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
}
