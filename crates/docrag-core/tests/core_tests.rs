use chrono::Utc;
use figment::providers::{Format, Toml};
use figment::Figment;

use docrag_core::chunker::{chunk, ChunkingConfig};
use docrag_core::config::{resolve_with_base, Config, EmbedPolicy};
use docrag_core::types::{Document, Metadata, Origin, PREVIEW_CHARS};
use docrag_core::ChunkError;

#[test]
fn chunk_example_windows() {
    let chunks = chunk("ABCDEFGHIJ", 4, 2).expect("chunk");
    assert_eq!(chunks, vec!["ABCD", "CDEF", "EFGH", "GHIJ", "IJ"]);
}

#[test]
fn chunk_consecutive_windows_overlap_exactly() {
    let text: String = (0..997).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    for (size, overlap) in [(10, 3), (50, 0), (7, 6), (500, 100)] {
        let chunks = chunk(&text, size, overlap).expect("chunk");
        let step = size - overlap;
        assert_eq!(chunks.len(), text.chars().count().div_ceil(step));
        for pair in chunks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.chars().count() < size {
                // trailing windows clipped at the end of the text
                continue;
            }
            let suffix: String = a.chars().skip(size - overlap).collect();
            let prefix: String = b.chars().take(overlap).collect();
            assert_eq!(suffix, prefix, "size={size} overlap={overlap}");
        }
        assert!(chunks.last().is_some_and(|c| c.chars().count() <= size));
    }
}

#[test]
fn chunk_is_deterministic() {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
    assert_eq!(chunk(&text, 64, 16).expect("first"), chunk(&text, 64, 16).expect("second"));
}

#[test]
fn chunk_edge_cases() {
    assert!(chunk("", 4, 2).expect("empty").is_empty());
    assert_eq!(chunk("abc", 10, 2).expect("short"), vec!["abc"]);
    // multi-byte characters are never split
    assert_eq!(chunk("ñañaña", 4, 2).expect("utf8"), vec!["ñaña", "ñaña", "ña"]);
}

#[test]
fn chunk_rejects_overlap_not_smaller_than_size() {
    assert!(matches!(chunk("abcdef", 4, 4), Err(ChunkError::InvalidConfiguration { chunk_size: 4, overlap: 4 })));
    assert!(matches!(chunk("abcdef", 0, 0), Err(ChunkError::InvalidConfiguration { .. })));
    assert!(ChunkingConfig { chunk_size: 3, chunk_overlap: 5 }.validate().is_err());
    assert!(ChunkingConfig::default().validate().is_ok());
}

#[test]
fn metadata_preview_is_truncated() {
    let doc = Document::new("x".repeat(300), "a.pdf", Origin::Upload);
    let meta = Metadata::for_chunk(&doc, &doc.text, Utc::now());
    assert_eq!(meta.source, "a.pdf");
    assert_eq!(meta.origin, Origin::Upload);
    assert_eq!(meta.text_preview.as_deref().map(|p| p.chars().count()), Some(PREVIEW_CHARS));
}

#[test]
fn config_defaults_and_overrides() {
    let config = Config::from_figment(Figment::from(Toml::string(
        r#"
        [chunking]
        chunk_size = 800
        chunk_overlap = 200

        [embedding]
        policy = "fail_fast"
        "#,
    )))
    .expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.chunking, ChunkingConfig { chunk_size: 800, chunk_overlap: 200 });
    assert_eq!(settings.embedding.policy, EmbedPolicy::FailFast);
    assert_eq!(settings.embedding.model, "text-embedding-3-small");
    assert_eq!(settings.retrieval.top_k, 5);
    assert_eq!(settings.retrieval.upload_top_k, 3);
    let top_k: usize = config.get("retrieval.top_k").expect("get");
    assert_eq!(top_k, 5);
}

#[test]
fn config_rejects_invalid_chunking() {
    let result = Config::from_figment(Figment::from(Toml::string("[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")));
    assert!(result.is_err());
}

#[test]
fn resolve_relative_and_absolute_paths() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = tmp.path();
    assert_eq!(resolve_with_base(base, "data/pdf"), base.join("data/pdf"));
    let abs = base.join("abs");
    assert_eq!(resolve_with_base(base, abs.to_string_lossy()), abs);
}
