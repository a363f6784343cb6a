//! Pipeline tests: real PDF extraction, retrieval and the local embedding model

mod common;

use std::sync::Arc;

use common::*;
use doc_chat::config::DocChatConfig;
use doc_chat::embeddings::{Embedder, OnnxEmbedder};
use doc_chat::ingestion::{PdfTextExtractor, TextExtractor};
use doc_chat::retrieval::FlatIndex;
use doc_chat::{DocChatPipeline, Error};

#[tokio::test]
async fn test_generated_pdf_extracts_text_and_pages() {
    let pdf = build_pdf(&["Paris is the capital of France."]);

    let extracted = PdfTextExtractor::new().extract("geo.pdf", &pdf).await.unwrap();
    assert!(extracted.content.contains("Paris"));
    assert_eq!(extracted.total_pages, Some(1));
}

#[tokio::test]
async fn test_pdf_upload_answers_from_its_text() {
    let llm = Arc::new(RecordingLlm::new("Paris."));
    let pipeline = DocChatPipeline::new(
        DocChatConfig::default(),
        Arc::new(PdfTextExtractor::new()),
        geography_embedder(),
        llm.clone(),
    );

    let pdf = build_pdf(&[
        "Paris is the capital of France.",
        "Tokyo is the capital of Japan.",
    ]);
    let summary = pipeline.ingest("geo.pdf", &pdf).await.unwrap();
    assert_eq!(summary.total_pages, Some(1));
    assert!(summary.total_chunks >= 1);
    assert_eq!(summary.content_hash.len(), 64);

    let outcome = pipeline.ask("What is the capital of France?").await.unwrap();
    assert_eq!(outcome.answer, "Paris.");
    assert!(!outcome.passages.is_empty());
    assert!(outcome.passages.len() <= 3);

    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains("Paris"));
}

#[tokio::test]
async fn test_blank_question_is_invalid() {
    let pipeline = pipeline(
        DocChatConfig::default(),
        geography_embedder(),
        Arc::new(RecordingLlm::new("unused")),
    );
    pipeline.ingest("geo.txt", b"Paris is the capital of France.").await.unwrap();

    let err = pipeline.ask("   ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_snapshot_survives_replacement() {
    let pipeline = pipeline(
        DocChatConfig::default(),
        geography_embedder(),
        Arc::new(RecordingLlm::new("unused")),
    );

    pipeline.ingest("one.txt", b"Paris is the capital of France.").await.unwrap();
    let held = pipeline.session().snapshot().unwrap();

    pipeline.ingest("two.txt", b"Ferris is the Rust mascot.\nTokyo is big.").await.unwrap();

    assert_eq!(held.filename(), "one.txt");
    assert_eq!(held.passages().len(), held.index().len());
    assert_eq!(pipeline.session().snapshot().unwrap().filename(), "two.txt");
}

#[tokio::test]
async fn test_concurrent_uploads_leave_a_consistent_document() {
    let pipeline = Arc::new(pipeline(
        DocChatConfig::default(),
        geography_embedder(),
        Arc::new(RecordingLlm::new("unused")),
    ));

    let uploads = (0..8).map(|i| {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            let text = "Paris is the capital of France.\n".repeat(i * 20 + 1);
            pipeline.ingest(&format!("doc-{}.txt", i), text.as_bytes()).await
        })
    });

    for upload in uploads.collect::<Vec<_>>() {
        upload.await.unwrap().unwrap();
    }

    let document = pipeline.session().snapshot().unwrap();
    assert_eq!(document.passages().len(), document.index().len());
}

#[test]
fn test_index_returns_stored_vector_first() {
    let embedder = geography_embedder();
    let texts = [
        "Paris is the capital of France.",
        "Tokyo is the capital of Japan.",
        "Ferris is the Rust mascot.",
    ];
    let vectors: Vec<Vec<f32>> = texts.iter().map(|t| embedder.vector(t)).collect();
    let index = FlatIndex::build(vectors.clone()).unwrap();

    for (position, vector) in vectors.iter().enumerate() {
        let neighbors = index.search(vector, 1).unwrap();
        assert_eq!(neighbors[0].position, position);
        assert_eq!(neighbors[0].distance, 0.0);
    }
}

#[tokio::test]
#[ignore = "downloads all-MiniLM-L6-v2 from Hugging Face"]
async fn test_minilm_embeddings_are_deterministic() {
    let cache = tempfile::tempdir().unwrap();
    let mut config = DocChatConfig::default().embeddings;
    config.cache_dir = cache.path().to_path_buf();

    let embedder = OnnxEmbedder::new(&config).await.unwrap();
    assert_eq!(embedder.dimensions(), 384);

    let texts = vec![
        "Paris is the capital of France.".to_string(),
        "Tokyo is the capital of Japan.".to_string(),
    ];
    let first = embedder.embed_batch(&texts).await.unwrap();
    let second = embedder.embed_batch(&texts).await.unwrap();
    assert_eq!(first, second);
    assert!(first.iter().all(|v| v.len() == 384));

    let single = embedder.embed(&texts[0]).await.unwrap();
    let drift: f32 = single.iter().zip(&first[0]).map(|(a, b)| (a - b).abs()).sum();
    assert!(drift < 1e-3);

    let query = embedder.embed("What is the capital of France?").await.unwrap();
    let index = FlatIndex::build(first).unwrap();
    assert_eq!(index.search(&query, 1).unwrap()[0].position, 0);
}
