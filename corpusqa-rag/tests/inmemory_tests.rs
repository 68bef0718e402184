//! Ranking, filtering, and atomicity tests for the in-memory vector store.

use std::sync::Arc;

use corpusqa_rag::{Chunk, InMemoryVectorStore, RagError, VectorStore};
use proptest::prelude::*;

const DIM: usize = 16;

fn chunk(document_id: &str, chunk_index: usize, embedding: Vec<f32>) -> Chunk {
    Chunk {
        document_id: document_id.to_string(),
        chunk_index,
        text: format!("chunk {chunk_index} of {document_id}"),
        embedding,
    }
}

/// A unit vector with 1.0 in the given component.
fn axis(dim: usize, component: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[component] = 1.0;
    v
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// For any set of stored chunks, querying returns at most top_k results,
/// all scoring at least min_score, ordered by descending score.
mod prop_query_ordering {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_bounded_and_filtered(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
            min_score in -1.0f32..1.0f32,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new(DIM);
                for (i, embedding) in embeddings.iter().enumerate() {
                    let document_id = format!("doc_{i}");
                    store
                        .upsert(&document_id, vec![chunk(&document_id, 0, embedding.clone())])
                        .await
                        .unwrap();
                }
                store.query(&query, top_k, min_score).await.unwrap()
            });

            prop_assert!(results.len() <= top_k);
            for result in &results {
                prop_assert!(result.score >= min_score);
            }
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

#[tokio::test]
async fn equal_scores_break_ties_by_document_then_index() {
    let store = InMemoryVectorStore::new(DIM);
    let shared = axis(DIM, 0);

    // Insert out of order so ordering cannot come from insertion order.
    store
        .upsert("doc_b", vec![chunk("doc_b", 0, shared.clone())])
        .await
        .unwrap();
    store
        .upsert(
            "doc_a",
            vec![chunk("doc_a", 0, shared.clone()), chunk("doc_a", 1, shared.clone())],
        )
        .await
        .unwrap();

    let results = store.query(&shared, 10, 0.5).await.unwrap();
    let order: Vec<(String, usize)> = results
        .iter()
        .map(|r| (r.chunk.document_id.clone(), r.chunk.chunk_index))
        .collect();

    assert_eq!(
        order,
        vec![
            ("doc_a".to_string(), 0),
            ("doc_a".to_string(), 1),
            ("doc_b".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn querying_with_a_stored_vector_returns_that_chunk_first() {
    let store = InMemoryVectorStore::new(DIM);
    store.upsert("doc_a", vec![chunk("doc_a", 0, axis(DIM, 0))]).await.unwrap();
    store.upsert("doc_b", vec![chunk("doc_b", 0, axis(DIM, 1))]).await.unwrap();
    store.upsert("doc_c", vec![chunk("doc_c", 0, axis(DIM, 2))]).await.unwrap();

    let results = store.query(&axis(DIM, 1), 3, -1.0).await.unwrap();
    assert_eq!(results[0].chunk.document_id, "doc_b");
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn min_score_filters_results() {
    let store = InMemoryVectorStore::new(DIM);
    store.upsert("doc_a", vec![chunk("doc_a", 0, axis(DIM, 0))]).await.unwrap();
    store.upsert("doc_b", vec![chunk("doc_b", 0, axis(DIM, 1))]).await.unwrap();

    // doc_b is orthogonal to the query, scoring 0.0.
    let results = store.query(&axis(DIM, 0), 10, 0.5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.document_id, "doc_a");
}

#[tokio::test]
async fn empty_store_returns_no_results() {
    let store = InMemoryVectorStore::new(DIM);
    let results = store.query(&axis(DIM, 0), 3, 0.0).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn upsert_replaces_a_document_atomically() {
    let store = InMemoryVectorStore::new(DIM);
    store
        .upsert(
            "doc_a",
            vec![
                chunk("doc_a", 0, axis(DIM, 0)),
                chunk("doc_a", 1, axis(DIM, 1)),
                chunk("doc_a", 2, axis(DIM, 2)),
            ],
        )
        .await
        .unwrap();
    assert_eq!(store.len().await, 3);

    store.upsert("doc_a", vec![chunk("doc_a", 0, axis(DIM, 3))]).await.unwrap();
    assert_eq!(store.len().await, 1);

    let results = store.query(&axis(DIM, 1), 10, -1.0).await.unwrap();
    assert!((results[0].score - 0.0).abs() < 1e-6);
}

#[tokio::test]
async fn delete_removes_all_chunks_of_a_document() {
    let store = InMemoryVectorStore::new(DIM);
    store.upsert("doc_a", vec![chunk("doc_a", 0, axis(DIM, 0))]).await.unwrap();
    store.upsert("doc_b", vec![chunk("doc_b", 0, axis(DIM, 1))]).await.unwrap();

    store.delete("doc_a").await.unwrap();

    let results = store.query(&axis(DIM, 0), 10, -1.0).await.unwrap();
    assert!(results.iter().all(|r| r.chunk.document_id != "doc_a"));
    assert_eq!(store.len().await, 1);

    // Deleting an unknown document is a no-op.
    store.delete("doc_missing").await.unwrap();
}

#[tokio::test]
async fn wrong_dimension_upsert_fails_and_leaves_store_unchanged() {
    let store = InMemoryVectorStore::new(DIM);
    store.upsert("doc_a", vec![chunk("doc_a", 0, axis(DIM, 0))]).await.unwrap();

    let err = store
        .upsert(
            "doc_a",
            vec![
                chunk("doc_a", 0, axis(DIM, 1)),
                chunk("doc_a", 1, vec![0.0; DIM - 1]),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RagError::DimensionMismatch { expected, actual } if expected == DIM && actual == DIM - 1
    ));

    // The original chunk set is still intact.
    let results = store.query(&axis(DIM, 0), 10, 0.5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn wrong_dimension_query_fails() {
    let store = InMemoryVectorStore::new(DIM);
    let err = store.query(&vec![0.0; DIM + 1], 3, 0.0).await.unwrap_err();
    assert!(matches!(
        err,
        RagError::DimensionMismatch { expected, actual } if expected == DIM && actual == DIM + 1
    ));
}

/// A query racing an upsert must observe either the old or the new chunk
/// set for the document, never a mix.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_never_observe_partial_upserts() {
    let store = Arc::new(InMemoryVectorStore::new(DIM));
    let query = axis(DIM, 0);

    let old_set: Vec<Chunk> = (0..4)
        .map(|i| Chunk {
            document_id: "doc_a".to_string(),
            chunk_index: i,
            text: "old".to_string(),
            embedding: axis(DIM, 0),
        })
        .collect();
    let new_set: Vec<Chunk> = (0..2)
        .map(|i| Chunk {
            document_id: "doc_a".to_string(),
            chunk_index: i,
            text: "new".to_string(),
            embedding: axis(DIM, 0),
        })
        .collect();

    store.upsert("doc_a", old_set.clone()).await.unwrap();

    let writer = {
        let store = store.clone();
        let (old_set, new_set) = (old_set.clone(), new_set.clone());
        tokio::spawn(async move {
            for round in 0..200 {
                let chunks =
                    if round % 2 == 0 { new_set.clone() } else { old_set.clone() };
                store.upsert("doc_a", chunks).await.unwrap();
            }
        })
    };

    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let results = store.query(&query, 10, -1.0).await.unwrap();
                let texts: Vec<&str> =
                    results.iter().map(|r| r.chunk.text.as_str()).collect();
                let all_old = texts.iter().all(|t| *t == "old");
                let all_new = texts.iter().all(|t| *t == "new");
                assert!(
                    all_old || all_new,
                    "observed a mixed chunk set: {texts:?}"
                );
                if all_old {
                    assert_eq!(texts.len(), 4);
                } else {
                    assert_eq!(texts.len(), 2);
                }
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}
