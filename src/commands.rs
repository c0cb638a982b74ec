//! Operator CLI commands.
//!
//! Each command prints its result to stdout. Failures propagate as
//! `anyhow` errors so the process exits non-zero with the root cause.

use anyhow::{bail, Context};

use pobo_core::embedding::truncate_for_embedding;
use pobo_core::knowledge::{knowledge_fingerprint, knowledge_records};
use pobo_core::models::{Category, MetadataFilter};
use pobo_core::prompt::ContextSource;

use crate::app::App;
use crate::loader::{initialize_knowledge, InitStatus};

/// `pobo init`
pub async fn run_init(app: &App) -> anyhow::Result<()> {
    match initialize_knowledge(app)
        .await
        .context("knowledge initialization failed")?
    {
        InitStatus::Populated(report) => {
            println!(
                "Knowledge base initialized: {} records upserted into '{}'.",
                report.upserted, app.config.vector_store.index_name
            );
            if report.degraded > 0 {
                println!("  {} records used degraded embeddings.", report.degraded);
            }
            println!("  fingerprint: {}", report.fingerprint);
        }
        InitStatus::Skipped => {
            println!("Vector store not configured; answers use the fallback knowledge base.");
        }
    }
    Ok(())
}

/// `pobo status`
pub async fn run_status(app: &App) -> anyhow::Result<()> {
    let config = &app.config;
    let yes_no = |b: bool| if b { "configured" } else { "not configured" };

    println!(
        "Embedding:    {} / {} ({} dims), {}",
        config.embedding.provider,
        config.embedding.model,
        config.embedding.dims,
        yes_no(app.embedder.is_configured())
    );
    println!(
        "Vector store: index '{}', {}",
        config.vector_store.index_name,
        yes_no(app.store.is_configured())
    );
    println!(
        "Chat:         {}, {}",
        app.chat.model_name(),
        yes_no(app.chat.is_configured())
    );
    let records = knowledge_records();
    println!(
        "Knowledge:    {} records, fingerprint {}",
        records.len(),
        knowledge_fingerprint(&records)
    );

    if !app.retrieval_configured() {
        println!("Mode:         fallback (static knowledge block)");
        return Ok(());
    }

    println!("Mode:         retrieval (top_k = {})", config.retrieval.top_k);
    match app.store.describe_stats().await {
        Ok(stats) => println!(
            "Index stats:  {} vectors, dimension {}",
            stats.record_count, stats.dimension
        ),
        Err(e) => println!("Index stats:  unavailable ({})", e),
    }
    Ok(())
}

/// `pobo ask "<message>"`
pub async fn run_ask(app: &App, message: &str) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        bail!("message must not be empty");
    }
    let reply = app.responder().respond(message.trim(), &[]).await;
    println!("{}", reply.text);
    println!();
    match &reply.context_source {
        ContextSource::Retrieved { ids } => println!("[context: retrieved {}]", ids.join(", ")),
        ContextSource::Fallback { reason } => println!("[context: fallback ({:?})]", reason),
    }
    if let Some(failure) = &reply.failure {
        eprintln!("chat model error: {}", failure.error);
    }
    Ok(())
}

/// `pobo query "<text>"`: raw retrieval without the chat model.
pub async fn run_query(
    app: &App,
    text: &str,
    top_k: usize,
    categories: Vec<Category>,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        bail!("query text must not be empty");
    }
    let embedding = app
        .embedder
        .embed(truncate_for_embedding(
            text.trim(),
            app.config.embedding.max_input_chars,
        ))
        .await
        .context("failed to embed query")?;
    if embedding.is_degraded() {
        println!("warning: query embedding is degraded; scores are meaningless");
    }

    let filter = (!categories.is_empty()).then(|| MetadataFilter { categories });
    let matches = app
        .store
        .query(embedding.values(), top_k, filter.as_ref())
        .await
        .context("vector query failed")?;

    if matches.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for (i, m) in matches.iter().enumerate() {
        let excerpt = truncate_for_embedding(&m.metadata.text, 100);
        let ellipsis = if excerpt.len() < m.metadata.text.len() { "..." } else { "" };
        println!(
            "{}. [{:.4}] {} ({})\n   {}{}",
            i + 1,
            m.score,
            m.id,
            m.metadata.category,
            excerpt,
            ellipsis
        );
    }
    Ok(())
}
