//! End-to-end tests for the dedup cache over the in-memory store.
//!
//! Covers:
//! - First extraction stores, second one is served from the store
//! - Failed extractions store nothing
//! - Invalid but well-shaped recipes are still stored
//! - Concurrent first requests for one URL run inference once

use std::sync::Arc;
use std::time::Duration;

use chef_db::{MemoryRecipeStore, RecipeStore};
use chef_inference::fake::{sample_recipe_payload, FakeInference};
use chef_pipeline::{DedupCache, ValidationPolicy, WorkflowEngine};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    store: Arc<MemoryRecipeStore>,
    fake: Arc<FakeInference>,
    cache: Arc<DedupCache>,
}

fn harness(fake: FakeInference) -> Harness {
    harness_with_policy(fake, ValidationPolicy::RecordOnly)
}

fn harness_with_policy(fake: FakeInference, policy: ValidationPolicy) -> Harness {
    let store = Arc::new(MemoryRecipeStore::new());
    let fake = Arc::new(fake);
    let engine = WorkflowEngine::from_client(fake.clone(), Duration::from_secs(5), policy);
    let cache = Arc::new(DedupCache::new(store.clone(), engine));
    Harness { store, fake, cache }
}

const MISSING_OPTIONALS: &str = r#"{
    "recipe_overview": {"title": "Plain Rice", "servings": 2},
    "ingredients": [{"item": "rice", "amount": "1", "unit": "cup"}],
    "instructions": ["Rinse", "Simmer"]
}"#;

const ZERO_SERVINGS: &str = r#"{
    "recipe_overview": {"title": "Mystery Stew", "servings": 0},
    "ingredients": [],
    "instructions": ["Stir"]
}"#;

// ---------------------------------------------------------------------------
// Test: miss then hit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_extraction_stores_and_second_is_cached() {
    let h = harness(FakeInference::with_sample_recipe());
    let url = "https://example.com/a";

    let first = h.cache.extract(url, 2).await.unwrap();
    assert!(first.success);
    assert!(!first.cached);
    assert_eq!(first.steps, 2);
    assert_eq!(first.is_valid, Some(true));
    let id = first.database_id.expect("first extraction stores a row");

    let second = h.cache.extract(url, 2).await.unwrap();
    assert!(second.success);
    assert!(second.cached);
    assert_eq!(second.database_id, Some(id));
    let cached = second.recipe.as_ref().unwrap();
    assert_eq!(cached.id, Some(id));
    assert_eq!(cached.overview.id, Some(id));
    assert_eq!(second.steps, 0);
    assert_eq!(second.is_valid, None);

    assert_eq!(first.recipe, second.recipe);
    assert_eq!(h.fake.calls(), 1);
    assert_eq!(h.store.count_by_source_url(url), 1);
}

#[tokio::test]
async fn returned_recipe_carries_store_id_and_order() {
    let h = harness(FakeInference::with_sample_recipe());
    let outcome = h.cache.extract("https://example.com/a", 2).await.unwrap();
    let recipe = outcome.recipe.unwrap();

    assert_eq!(recipe.id, outcome.database_id);
    assert_eq!(recipe.overview.id, outcome.database_id);
    assert_eq!(
        recipe.instructions,
        vec![
            "Cook the noodles until just tender",
            "Melt butter and fry the garlic until fragrant",
            "Toss noodles with garlic butter and soy sauce",
        ]
    );
    assert_eq!(recipe.ingredients[0].amount, "200.0");
    assert!(recipe.equipment.is_none());
}

#[tokio::test]
async fn distinct_urls_are_distinct_keys() {
    let h = harness(FakeInference::with_sample_recipe());

    let a = h.cache.extract("https://example.com/a", 2).await.unwrap();
    let b = h.cache.extract("https://example.com/a?utm_source=x", 2).await.unwrap();

    assert!(!b.cached);
    assert_ne!(a.database_id, b.database_id);
    assert_eq!(h.fake.calls(), 2);
}

// ---------------------------------------------------------------------------
// Test: failures and validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unparseable_output_stores_nothing() {
    let url = "https://example.com/b";
    let h = harness(FakeInference::new().with_payload(url, "Sure! Here's the recipe:"));

    let outcome = h.cache.extract(url, 2).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
    assert!(outcome.recipe.is_none());
    assert!(outcome.database_id.is_none());
    assert_eq!(outcome.steps, 1);
    assert_eq!(h.store.count_by_source_url(url), 0);
}

#[tokio::test]
async fn failure_is_not_cached() {
    let url = "https://example.com/b";
    let h = harness(FakeInference::new().with_failure(url, "service unavailable"));

    h.cache.extract(url, 2).await.unwrap();
    h.cache.extract(url, 2).await.unwrap();
    assert_eq!(h.fake.calls(), 2);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn missing_optional_fields_still_store_a_valid_recipe() {
    let url = "https://example.com/plain";
    let h = harness(FakeInference::new().with_payload(url, MISSING_OPTIONALS));

    let outcome = h.cache.extract(url, 2).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.is_valid, Some(true));
    assert!(outcome.database_id.is_some());
}

#[tokio::test]
async fn invalid_recipe_is_stored_under_record_only() {
    let url = "https://example.com/stew";
    let h = harness(FakeInference::new().with_payload(url, ZERO_SERVINGS));

    let outcome = h.cache.extract(url, 2).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.is_valid, Some(false));
    assert!(outcome.validation_errors.unwrap()[0].contains("servings"));
    assert_eq!(h.store.count_by_source_url(url), 1);
}

#[tokio::test]
async fn invalid_recipe_is_not_stored_under_reject_invalid() {
    let url = "https://example.com/stew";
    let h = harness_with_policy(
        FakeInference::new().with_payload(url, ZERO_SERVINGS),
        ValidationPolicy::RejectInvalid,
    );

    let outcome = h.cache.extract(url, 2).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.is_valid, Some(false));
    assert_eq!(h.store.count_by_source_url(url), 0);
}

// ---------------------------------------------------------------------------
// Test: delete then lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleted_recipe_is_extracted_again() {
    let h = harness(FakeInference::with_sample_recipe());
    let url = "https://example.com/a";

    let first = h.cache.extract(url, 2).await.unwrap();
    let id = first.database_id.unwrap();
    assert!(h.store.delete(id).await.unwrap());
    assert!(h.store.find_by_id(id).await.unwrap().is_none());

    let again = h.cache.extract(url, 2).await.unwrap();
    assert!(!again.cached);
    assert_ne!(again.database_id, Some(id));
    assert_eq!(h.fake.calls(), 2);
}

// ---------------------------------------------------------------------------
// Test: concurrent first requests
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_extractions_store_one_row() {
    let url = "https://example.com/c";
    let h = harness(
        FakeInference::new()
            .with_payload(url, sample_recipe_payload("Race Noodles"))
            .with_delay(Duration::from_millis(50)),
    );

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let cache = h.cache.clone();
            tokio::spawn(async move { cache.extract(url, 2).await })
        })
        .collect();
    let outcomes: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(h.store.count_by_source_url(url), 1);
    assert_eq!(h.fake.calls(), 1);

    let id = outcomes[0].database_id;
    assert!(outcomes.iter().all(|o| o.success && o.database_id == id));
    assert_eq!(outcomes.iter().filter(|o| !o.cached).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_extractions_of_different_urls_each_store_a_row() {
    let h = harness(FakeInference::with_sample_recipe().with_delay(Duration::from_millis(20)));

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let cache = h.cache.clone();
            let url = format!("https://example.com/{i}");
            tokio::spawn(async move { cache.extract(&url, 2).await })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        assert!(task.unwrap().unwrap().success);
    }

    assert_eq!(h.store.len(), 4);
    assert_eq!(h.fake.calls(), 4);
}
