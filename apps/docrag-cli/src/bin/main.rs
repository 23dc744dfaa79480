use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use docrag_cli::{format_hits, init_tracing, query_with_uploads, run_command, App, ReplCommand};
use docrag_sync::Session;

/// Document retrieval over a local knowledge base.
#[derive(Parser, Debug)]
#[command(name = "docrag", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the index if the knowledge-base files changed
    Sync,

    /// Retrieve passages for a single question
    Query {
        text: String,

        /// Number of knowledge-base passages (default from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Files to index alongside the knowledge base for this query
        #[arg(short, long, num_args = 1..)]
        upload: Vec<PathBuf>,
    },

    /// Interactive session with uploads and history
    Repl,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut app = App::load()?;
    match cli.command {
        Commands::Sync => {
            let rebuilt = app.sync()?;
            if rebuilt {
                println!("Index rebuilt: {} chunks", app.kb.chunk_count());
            } else {
                println!("Data is in sync; no rebuild needed ({} chunks)", app.kb.chunk_count());
            }
        }
        Commands::Query { text, top_k, upload } => {
            if let Some(k) = top_k {
                app.settings.retrieval.top_k = k;
            }
            app.sync()?;
            let mut session = app.new_session();
            let hits = query_with_uploads(&app.kb, &mut session, &text, &upload)?;
            if hits.is_empty() {
                println!("No matching passages.");
            } else {
                print!("{}", format_hits(&hits));
            }
        }
        Commands::Repl => {
            app.sync()?;
            let mut session = app.new_session();
            let result = repl(&app, &mut session);
            if let Err(e) = session.clear_uploads() {
                warn!(error = %e, "failed to clear uploads on exit");
            }
            result?;
        }
    }
    Ok(())
}

fn repl(app: &App, session: &mut Session) -> anyhow::Result<()> {
    println!("Commands: /upload <paths>, /clear, /history, exit");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let Some(output) = run_command(&app.kb, session, ReplCommand::parse(&line?)) else { break };
        print!("{output}");
    }
    Ok(())
}
