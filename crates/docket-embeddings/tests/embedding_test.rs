//! End-to-end behaviour of the shipped providers.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use docket_core::config::EmbeddingConfig;
use docket_core::traits::EmbeddingFunction;
use docket_embeddings::{create_embedder, CachedEmbedder, HashEmbedder};

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn shared_tokens_score_higher_than_disjoint_text() {
    let e = HashEmbedder::new(384);
    let q = e.embed_query("short term rental permit").unwrap();
    let close = e.embed_document("rental permit required for short term stays").unwrap();
    let far = e.embed_document("sales tax rates for groceries").unwrap();
    assert!(dot(&q, &close) > dot(&q, &far));
}

#[test]
fn cached_and_uncached_agree() {
    let plain = HashEmbedder::new(64);
    let cached = CachedEmbedder::new(HashEmbedder::new(64), 16);
    let texts: Vec<String> = ["one", "two two", "three three three"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        plain.embed_documents(&texts).unwrap(),
        cached.embed_documents(&texts).unwrap()
    );
    assert_eq!(
        plain.embed_query("two").unwrap(),
        cached.embed_query("two").unwrap()
    );
}

#[test]
fn factory_embedder_is_shareable_across_threads() {
    let e = create_embedder(&EmbeddingConfig {
        dimensions: 32,
        ..EmbeddingConfig::default()
    })
    .unwrap();
    let expected = e.embed_query("county ordinance").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let e = Arc::clone(&e);
            thread::spawn(move || e.embed_query("county ordinance").unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn uncached_factory_config_still_works() {
    let e = create_embedder(&EmbeddingConfig {
        cache_size: 0,
        ..EmbeddingConfig::default()
    })
    .unwrap();
    assert_eq!(e.embed_document("x").unwrap().len(), 384);
}

proptest! {
    #[test]
    fn vectors_are_unit_or_zero(text in "[a-z ]{0,80}", dims in 1usize..512) {
        let v = HashEmbedder::new(dims).embed_query(&text).unwrap();
        prop_assert_eq!(v.len(), dims);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if text.split_whitespace().next().is_some() {
            prop_assert!((norm - 1.0).abs() < 1e-4);
        } else {
            prop_assert_eq!(norm, 0.0);
        }
    }
}
