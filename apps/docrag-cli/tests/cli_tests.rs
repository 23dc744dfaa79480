use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use docrag_cli::{format_hits, history_table, query_with_uploads, run_command, shorten, Paths, ReplCommand};
use docrag_core::chunker::ChunkingConfig;
use docrag_core::config::{EmbedPolicy, RetrievalConfig, SessionConfig, Settings};
use docrag_core::traits::Embedder;
use docrag_core::types::{Document, Metadata, Origin, SearchHit};
use docrag_core::EmbedError;
use docrag_embed::FakeEmbedder;
use docrag_extract::{DisabledVision, Extractor};
use docrag_sync::{KnowledgeBase, Session, UploadSandbox};

/// Fake embedder that fails every call while `down` is set.
struct Outage {
    inner: FakeEmbedder,
    down: Arc<AtomicBool>,
}

impl Embedder for Outage {
    fn model_id(&self) -> &str { "outage" }
    fn dim(&self) -> Option<usize> { Some(32) }
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(EmbedError::Request("connection refused".to_string()));
        }
        self.inner.embed(text)
    }
}

struct Fixture {
    tmp: TempDir,
    down: Arc<AtomicBool>,
    kb: KnowledgeBase,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("handbook.txt"), "library fact about vacation days").unwrap();
        let down = Arc::new(AtomicBool::new(false));
        let embedder = Outage { inner: FakeEmbedder::new(32), down: down.clone() };
        let mut kb = KnowledgeBase::new(
            Extractor::new(Box::new(DisabledVision)),
            Box::new(embedder),
            ChunkingConfig::default(),
            EmbedPolicy::BestEffort,
            tmp.path().join("manifest.json"),
        );
        kb.sync(&docs, &tmp.path().join("images")).expect("sync");
        Self { tmp, down, kb }
    }

    fn upload_dir(&self) -> PathBuf {
        self.tmp.path().join("uploads")
    }

    fn session(&self) -> Session {
        Session::new(UploadSandbox::new(self.upload_dir()), &RetrievalConfig::default(), &SessionConfig::default())
    }

    fn outside_file(&self, name: &str, text: &str) -> PathBuf {
        let dir = self.tmp.path().join("outside");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }
}

fn hit(source: &str, text: &str, distance: f32) -> SearchHit {
    let doc = Document::new(text, source, Origin::Library);
    let metadata = Metadata::for_chunk(&doc, text, Utc::now());
    SearchHit { text: text.to_string(), metadata, distance }
}

#[test]
fn hits_are_numbered_with_source_and_distance() {
    let out = format_hits(&[hit("a.pdf", "line one\nline two", 0.5), hit("b.png", "caption", 1.25)]);
    assert_eq!(out, " 1. a.pdf (distance 0.5000)\n    line one\n    line two\n 2. b.png (distance 1.2500)\n    caption\n");
    assert!(format_hits(&[]).is_empty());
}

#[test]
fn shorten_marks_truncation() {
    assert_eq!(shorten("short", 60), "short");
    assert_eq!(shorten("ñandú rojo", 5), "ñandú...");
}

#[test]
fn data_paths_resolve_against_base() {
    let tmp = tempfile::TempDir::new().unwrap();
    let paths = Paths::resolve(&Settings::default(), tmp.path());
    assert_eq!(paths.docs_dir, tmp.path().join("data/pdf"));
    assert_eq!(paths.image_dir, tmp.path().join("data/images"));
    assert_eq!(paths.manifest_path, tmp.path().join("data/manifest.json"));
    assert_eq!(paths.upload_dir, tmp.path().join("data/tmp"));
}

#[test]
fn repl_commands_parse_with_shell_quoting() {
    assert_eq!(ReplCommand::parse("   "), ReplCommand::Empty);
    assert_eq!(ReplCommand::parse("exit"), ReplCommand::Exit);
    assert_eq!(ReplCommand::parse("/history"), ReplCommand::History);
    assert_eq!(ReplCommand::parse("/clear"), ReplCommand::Clear);
    assert_eq!(
        ReplCommand::parse(r#"/upload "my report.pdf" notes.txt"#),
        ReplCommand::Upload(vec![PathBuf::from("my report.pdf"), PathBuf::from("notes.txt")])
    );
    assert_eq!(ReplCommand::parse("/upload"), ReplCommand::BadUpload);
    assert_eq!(ReplCommand::parse(r#"/upload "unterminated.pdf"#), ReplCommand::BadUpload);
    assert_eq!(ReplCommand::parse("/uploads pending?"), ReplCommand::Question("/uploads pending?".to_string()));
    assert_eq!(ReplCommand::parse(" how many vacation days? "), ReplCommand::Question("how many vacation days?".to_string()));
}

#[test]
fn repl_survives_embedding_outage() {
    let fx = Fixture::new();
    let mut session = fx.session();
    let memo = fx.outside_file("memo.txt", "uploaded memo about parking");

    fx.down.store(true, Ordering::SeqCst);
    let out = run_command(&fx.kb, &mut session, ReplCommand::Question("vacation".into())).expect("keeps running");
    assert!(out.starts_with("Error:"), "{out}");
    assert_eq!(session.history_len(), 0);

    let out = run_command(&fx.kb, &mut session, ReplCommand::Upload(vec![memo.clone()])).expect("keeps running");
    assert!(out.starts_with("Error:"), "{out}");

    fx.down.store(false, Ordering::SeqCst);
    let out = run_command(&fx.kb, &mut session, ReplCommand::Upload(vec![memo])).expect("keeps running");
    assert!(out.starts_with("Uploaded 1 file(s)"), "{out}");
    let out = run_command(&fx.kb, &mut session, ReplCommand::Question("library fact about vacation days".into()))
        .expect("keeps running");
    assert!(out.contains("handbook.txt"), "{out}");
    assert!(out.contains("memo.txt"), "{out}");
    assert_eq!(session.history_len(), 1);
    assert!(history_table(&session).contains("library fact about vacation days"));

    let out = run_command(&fx.kb, &mut session, ReplCommand::Clear).expect("keeps running");
    assert_eq!(out, "Temporary files cleared.\n");
    assert!(session.upload_index().is_none());
    assert!(run_command(&fx.kb, &mut session, ReplCommand::Exit).is_none());
}

#[test]
fn one_shot_query_always_clears_uploads() {
    let fx = Fixture::new();
    let memo = fx.outside_file("memo.txt", "uploaded memo about parking");

    fx.down.store(true, Ordering::SeqCst);
    let mut session = fx.session();
    assert!(query_with_uploads(&fx.kb, &mut session, "parking", &[memo.clone()]).is_err());
    assert!(!fx.upload_dir().exists());

    fx.down.store(false, Ordering::SeqCst);
    let mut session = fx.session();
    let hits = query_with_uploads(&fx.kb, &mut session, "uploaded memo about parking", &[memo]).expect("query");
    assert!(hits.iter().any(|h| h.metadata.source == "memo.txt" && h.metadata.origin == Origin::Upload));
    assert!(!fx.upload_dir().exists());
    assert!(session.upload_index().is_none());
}
