use std::collections::BTreeMap;

use anyhow::Context;

use docrag_cli::{init_tracing, App};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut app = App::load()?;
    println!("docrag indexer\n==============");
    println!("Documents: {}", app.paths.docs_dir.display());
    println!("Images:    {}", app.paths.image_dir.display());

    app.kb.rebuild(&app.paths.docs_dir, &app.paths.image_dir).context("rebuilding index")?;

    let Some(index) = app.kb.index() else {
        println!("No indexable content found.");
        return Ok(());
    };
    let mut per_source: BTreeMap<&str, usize> = BTreeMap::new();
    for meta in index.metadatas() {
        *per_source.entry(meta.source.as_str()).or_default() += 1;
    }
    println!("Indexed {} chunks (dim {}) from {} files:", index.len(), index.dim(), per_source.len());
    for (source, count) in per_source {
        println!("  {source}: {count} chunks");
    }
    println!("Manifest written to {}", app.kb.manifest_path().display());
    Ok(())
}
