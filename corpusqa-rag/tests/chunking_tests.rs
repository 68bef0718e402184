//! Window arithmetic and determinism tests for the chunking strategies.

use corpusqa_rag::{Chunker, Document, RagError, SentenceChunker, SlidingWindowChunker};

fn ascii_text(len: usize) -> String {
    (0..len).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
}

#[test]
fn thousand_chars_window_400_overlap_50_yields_three_chunks() {
    let text = ascii_text(1000);
    let chunker = SlidingWindowChunker::new(400, 50).unwrap();
    let chunks = chunker.chunk(&Document::new("doc1", text.clone())).unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(
        chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(chunks[0].text.len(), 400);
    assert_eq!(chunks[0].text, text[0..400]);
    assert_eq!(chunks[1].text, text[350..750]);
    assert_eq!(chunks[2].text, text[700..1000]);
}

#[test]
fn chunking_is_deterministic() {
    let document = Document::new("doc1", ascii_text(2357));
    let chunker = SlidingWindowChunker::new(300, 40).unwrap();

    let first = chunker.chunk(&document).unwrap();
    let second = chunker.chunk(&document).unwrap();
    assert_eq!(first, second);
}

#[test]
fn document_shorter_than_window_yields_one_chunk() {
    let chunker = SlidingWindowChunker::new(400, 50).unwrap();
    let chunks = chunker.chunk(&Document::new("doc1", "short text")).unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_index, 0);
    assert_eq!(chunks[0].text, "short text");
}

#[test]
fn consecutive_chunks_overlap_exactly() {
    let chunker = SlidingWindowChunker::new(100, 25).unwrap();
    let chunks = chunker.chunk(&Document::new("doc1", ascii_text(731))).unwrap();
    assert!(chunks.len() > 2);

    for window in chunks.windows(2) {
        let prev: Vec<char> = window[0].text.chars().collect();
        let next: Vec<char> = window[1].text.chars().collect();
        assert_eq!(&prev[prev.len() - 25..], &next[..25]);
    }
}

#[test]
fn every_chunk_respects_the_size_bound() {
    let chunker = SlidingWindowChunker::new(128, 32).unwrap();
    let chunks = chunker.chunk(&Document::new("doc1", ascii_text(5000))).unwrap();

    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 128);
    }
}

#[test]
fn multibyte_text_splits_on_char_boundaries() {
    let text: String = "καλημέρα κόσμε ".repeat(40);
    let chunker = SlidingWindowChunker::new(50, 10).unwrap();
    let chunks = chunker.chunk(&Document::new("doc1", text.clone())).unwrap();

    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 50);
    }

    // Stripping each chunk's leading overlap reconstructs the text.
    let mut rebuilt: String = chunks[0].text.clone();
    for chunk in &chunks[1..] {
        rebuilt.extend(chunk.text.chars().skip(10));
    }
    assert_eq!(rebuilt, text.trim());
}

#[test]
fn whitespace_only_document_is_rejected() {
    let chunker = SlidingWindowChunker::new(400, 50).unwrap();
    let err = chunker.chunk(&Document::new("doc1", "  \n\t  ")).unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument { document_id } if document_id == "doc1"));
}

#[test]
fn overlap_must_be_less_than_chunk_size() {
    assert!(matches!(
        SlidingWindowChunker::new(100, 100).unwrap_err(),
        RagError::ConfigError(_)
    ));
    assert!(matches!(
        SlidingWindowChunker::new(100, 150).unwrap_err(),
        RagError::ConfigError(_)
    ));
    assert!(matches!(SlidingWindowChunker::new(0, 0).unwrap_err(), RagError::ConfigError(_)));
}

#[test]
fn sentence_chunker_keeps_paragraphs_together() {
    let text = "First paragraph about apples.\n\nSecond paragraph about oranges.\n\nThird one.";
    let chunker = SentenceChunker::new(60, 0).unwrap();
    let chunks = chunker.chunk(&Document::new("doc1", text)).unwrap();

    assert!(chunks.len() >= 2);
    assert_eq!(
        chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
        (0..chunks.len()).collect::<Vec<_>>()
    );
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 60);
    }
}

#[test]
fn sentence_chunker_is_deterministic() {
    let document = Document::new(
        "doc1",
        "One sentence here. Another sentence there! A question? ".repeat(30),
    );
    let chunker = SentenceChunker::new(120, 20).unwrap();

    let first = chunker.chunk(&document).unwrap();
    let second = chunker.chunk(&document).unwrap();
    assert_eq!(first, second);
}

#[test]
fn sentence_chunker_rejects_empty_documents() {
    let chunker = SentenceChunker::new(120, 20).unwrap();
    let err = chunker.chunk(&Document::new("doc9", "   ")).unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument { document_id } if document_id == "doc9"));
}
