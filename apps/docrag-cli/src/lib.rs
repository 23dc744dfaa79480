//! Setup and command handling shared by the `docrag` and `docrag-indexer` binaries.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use docrag_core::config::{resolve_with_base, Config, Settings};
use docrag_core::types::SearchHit;
use docrag_embed::get_default_embedder;
use docrag_extract::{get_default_vision, Extractor};
use docrag_sync::{context_text, KnowledgeBase, Session, UploadSandbox};

/// Install a `RUST_LOG`-driven subscriber on stderr, `info` by default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Loaded settings with every data path resolved against `base`.
pub struct Paths {
    pub docs_dir: PathBuf,
    pub image_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub upload_dir: PathBuf,
}

impl Paths {
    pub fn resolve(settings: &Settings, base: &Path) -> Self {
        Self {
            docs_dir: resolve_with_base(base, &settings.data.docs_dir),
            image_dir: resolve_with_base(base, &settings.data.image_dir),
            manifest_path: resolve_with_base(base, &settings.data.manifest_path),
            upload_dir: resolve_with_base(base, &settings.data.upload_dir),
        }
    }
}

pub struct App {
    pub settings: Settings,
    pub paths: Paths,
    pub kb: KnowledgeBase,
}

impl App {
    /// Load configuration and wire up the embedding and vision clients.
    pub fn load() -> anyhow::Result<Self> {
        let config = Config::load().context("loading configuration")?;
        let settings = config.settings()?;
        let base = std::env::current_dir().context("resolving working directory")?;
        let paths = Paths::resolve(&settings, &base);
        let embedder = get_default_embedder(&settings.embedding)?;
        let extractor = Extractor::new(get_default_vision(&settings)?);
        let kb = KnowledgeBase::from_settings(&settings, extractor, embedder, &paths.manifest_path);
        Ok(Self { settings, paths, kb })
    }

    pub fn sync(&mut self) -> anyhow::Result<bool> {
        self.kb.sync(&self.paths.docs_dir, &self.paths.image_dir).context("syncing knowledge base")
    }

    pub fn new_session(&self) -> Session {
        Session::new(UploadSandbox::new(&self.paths.upload_dir), &self.settings.retrieval, &self.settings.session)
    }
}

/// One line per hit: rank, source, distance, then the text indented.
pub fn format_hits(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!("{:>2}. {} (distance {:.4})\n", i + 1, hit.metadata.source, hit.distance));
        for line in hit.text.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// First `max` characters of `s`, with `...` when cut.
pub fn shorten(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Retrieve for `text`, indexing `uploads` for this one query. The sandbox is
/// cleared afterwards whether or not retrieval succeeded.
pub fn query_with_uploads(
    kb: &KnowledgeBase,
    session: &mut Session,
    text: &str,
    uploads: &[PathBuf],
) -> anyhow::Result<Vec<SearchHit>> {
    let result = (|| -> anyhow::Result<Vec<SearchHit>> {
        if !uploads.is_empty() {
            session.upload(uploads, kb).context("indexing uploads")?;
        }
        Ok(session.retrieve(kb, text)?)
    })();
    if !uploads.is_empty() {
        if let Err(e) = session.clear_uploads() {
            if result.is_ok() {
                return Err(e.into());
            }
            warn!(error = %e, "failed to clear uploads");
        }
    }
    result
}

/// One parsed line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Exit,
    History,
    Clear,
    Upload(Vec<PathBuf>),
    /// `/upload` with no paths or unbalanced quotes
    BadUpload,
    Question(String),
}

impl ReplCommand {
    /// Upload arguments follow shell quoting, so `"my file.pdf"` is one path.
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        match input {
            "" => Self::Empty,
            "exit" | "quit" => Self::Exit,
            "/history" => Self::History,
            "/clear" => Self::Clear,
            _ => match input.strip_prefix("/upload") {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    match shlex::split(rest) {
                        Some(args) if !args.is_empty() => Self::Upload(args.into_iter().map(PathBuf::from).collect()),
                        _ => Self::BadUpload,
                    }
                }
                _ => Self::Question(input.to_string()),
            },
        }
    }
}

/// Run one command and return the text to show, or `None` to leave the loop.
///
/// Failures are reported in the returned text; the session stays usable.
pub fn run_command(kb: &KnowledgeBase, session: &mut Session, command: ReplCommand) -> Option<String> {
    let output = match command {
        ReplCommand::Exit => return None,
        ReplCommand::Empty => String::new(),
        ReplCommand::History => history_table(session),
        ReplCommand::BadUpload => "Usage: /upload <path> [path...]\n".to_string(),
        ReplCommand::Clear => match session.clear_uploads() {
            Ok(()) => "Temporary files cleared.\n".to_string(),
            Err(e) => report(&e),
        },
        ReplCommand::Upload(paths) => match session.upload(&paths, kb) {
            Ok(saved) => {
                let chunks = session.upload_index().map_or(0, |i| i.len());
                format!("Uploaded {} file(s); {} temporary chunks indexed.\n", saved.len(), chunks)
            }
            Err(e) => report(&e),
        },
        ReplCommand::Question(question) => match session.retrieve(kb, &question) {
            Ok(hits) => {
                let out = if hits.is_empty() { "No matching passages.\n".to_string() } else { format_hits(&hits) };
                session.record_turn(question, context_text(&hits));
                out
            }
            Err(e) => report(&e),
        },
    };
    Some(output)
}

fn report(e: &docrag_core::Error) -> String {
    warn!(error = %e, "command failed");
    format!("Error: {e}\n")
}

pub fn history_table(session: &Session) -> String {
    if session.history_len() == 0 {
        return "History is empty for this session.\n".to_string();
    }
    let mut out = format!("{:<5} | {:<8} | MESSAGE\n", "INDEX", "SENDER");
    for (i, turn) in session.history().enumerate() {
        out.push_str(&format!("{:<5} | {:<8} | {}\n", i, "User", turn.user));
        out.push_str(&format!("{:<5} | {:<8} | {}\n", "", "Context", shorten(&turn.assistant, 60)));
    }
    out
}
