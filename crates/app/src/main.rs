use chrono::Utc;
use clap::{Parser, Subcommand};
use doc_chat_core::{
    ingest_file, ingest_folder_best_effort, ChatClient, ChatCoordinator, Embedder,
    HttpEmbedder, HttpGenerativeBackend, RetrievalOptions, SessionState, SourceRef,
};
use std::io::Write as _;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "doc-chat", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Credential for the generation API.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Embedding inference endpoint; omit to run keyword-only retrieval.
    #[arg(long, env = "EMBEDDING_URL")]
    embed_url: Option<String>,

    /// Optional bearer token for the embedding endpoint.
    #[arg(long, env = "EMBEDDING_API_KEY", hide_env_values = true)]
    embed_api_key: Option<String>,

    /// Target chunk size in characters.
    #[arg(long, default_value = "1000")]
    chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[arg(long, default_value = "200")]
    overlap: usize,

    /// Number of chunks forwarded as context per question.
    #[arg(long, default_value = "5")]
    top_k: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest documents, then answer questions from stdin until :quit.
    Chat {
        /// Individual document files to ingest before chatting.
        #[arg(long = "doc")]
        docs: Vec<String>,
        /// Folder to ingest recursively (pdf and txt).
        #[arg(long)]
        docs_dir: Option<String>,
    },
    /// Chunk a folder of documents and report counts without calling any
    /// remote service.
    Ingest {
        /// Folder to ingest recursively (pdf and txt).
        #[arg(long)]
        docs_dir: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let options = RetrievalOptions {
        chunk_size: cli.chunk_size,
        overlap: cli.overlap,
        top_k: cli.top_k,
    };
    options
        .validate()
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    let embedder: Option<HttpEmbedder> = cli
        .embed_url
        .as_ref()
        .map(|url| HttpEmbedder::new(url, cli.embed_api_key.clone()));

    match cli.command {
        Command::Ingest { docs_dir } => {
            let mut session = SessionState::new();
            let report =
                ingest_folder_best_effort(&mut session, None, Path::new(&docs_dir), options)
                    .await
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            for skipped in &report.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
            }

            println!(
                "{} files ingested, {} chunks, {} skipped at {}",
                report.ingested_files,
                report.chunk_count,
                report.skipped_files.len(),
                Utc::now().to_rfc3339()
            );
            for file in session.files() {
                println!("  {} -> {} chunks", file.filename, file.chunk_count);
            }
        }
        Command::Chat { docs, docs_dir } => {
            let api_key = cli
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("api key is missing (set GEMINI_API_KEY)"))?;
            let backend = HttpGenerativeBackend::new(api_key)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let coordinator = ChatCoordinator::new(ChatClient::new(backend), options);

            let mut session = SessionState::new();
            let embedder_ref: Option<&dyn Embedder> =
                embedder.as_ref().map(|inner| inner as &dyn Embedder);

            for doc in &docs {
                match ingest_file(&mut session, embedder_ref, Path::new(doc), options).await {
                    Ok(count) => info!(%doc, chunk_count = count, "document ingested"),
                    Err(error) => warn!(%doc, %error, "document skipped"),
                }
            }

            if let Some(folder) = &docs_dir {
                match ingest_folder_best_effort(
                    &mut session,
                    embedder_ref,
                    Path::new(folder),
                    options,
                )
                .await
                {
                    Ok(report) => {
                        for skipped in &report.skipped_files {
                            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
                        }
                        info!(
                            %folder,
                            files = report.ingested_files,
                            chunks = report.chunk_count,
                            "folder ingested"
                        );
                    }
                    Err(error) => warn!(%folder, %error, "folder ingestion failed"),
                }
            }

            println!(
                "{} chunks loaded from {} file(s). Ask away (:quit to exit, :clear to drop documents, :sources for the last citations).",
                session.chunks().len(),
                session.files().len()
            );

            run_chat_loop(&coordinator, &mut session, embedder_ref).await?;
        }
    }

    Ok(())
}

async fn run_chat_loop(
    coordinator: &ChatCoordinator<HttpGenerativeBackend>,
    session: &mut SessionState,
    embedder: Option<&dyn Embedder>,
) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        match input {
            "" => {}
            ":quit" | ":q" => break,
            ":clear" => {
                session.clear_documents();
                println!("documents cleared");
            }
            ":sources" => print_sources(session.last_sources()),
            question => match coordinator.respond(session, embedder, question).await {
                Ok(reply) => {
                    println!("{}", reply.content);
                    print_sources(&reply.sources);
                }
                Err(error) => println!("error: {error}"),
            },
        }

        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

fn print_sources(sources: &[SourceRef]) {
    if sources.is_empty() {
        return;
    }

    println!("sources:");
    for (position, source) in sources.iter().enumerate() {
        println!(
            "  {}. {} (part {}/{})",
            position + 1,
            source.filename,
            source.chunk_index + 1,
            source.total_chunks
        );
        if !source.preview.is_empty() {
            println!("     {}", source.preview);
        }
    }
}
