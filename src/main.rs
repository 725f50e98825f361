use anyhow::Context;
use ragkit::{
    api::create_router,
    cli::{output::Output, Cli, Commands},
    rag::{
        embeddings::load_embedder,
        index_builder::build_from_processed,
        ingest::ingest_dir,
    },
    utils::toml_config::{ConfigError, RagkitConfig},
    AppError, AppState, QueryOrchestrator,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ragkit={default_level},ragkit_index={default_level},tower_http=info")));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let loaded = RagkitConfig::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.server.log_level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_tracing(&level, cli.json_logs);

    let config = match loaded {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(path)) => {
            warn!(path = ?path, "Configuration file not found, using defaults");
            RagkitConfig::default()
        }
        Err(e) => {
            output.error(&e.to_string());
            return Err(e).context(format!("loading {}", cli.config.display()));
        }
    };

    match cli.command.clone().unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => serve(config, host, port, &output).await,
        Commands::Ingest { raw, out, max_len } => {
            let raw = raw.unwrap_or_else(|| config.paths.raw_dir.clone());
            let out = out.unwrap_or_else(|| config.paths.processed_dir.clone());
            let max_len = max_len.unwrap_or(config.rag.chunk_max_len);

            match ingest_dir(&raw, &out, max_len).await {
                Ok(report) => {
                    for file in &report.files {
                        output.ingested(
                            &file.source.display().to_string(),
                            &file.output.display().to_string(),
                            file.chunks,
                        );
                    }
                    if report.skipped > 0 {
                        output.warning(&format!(
                            "Skipped {} unreadable entries under {}",
                            report.skipped,
                            raw.display()
                        ));
                    }
                    output.success(&format!(
                        "Ingested {} files into {} chunks",
                        report.files.len(),
                        report.total_chunks()
                    ));
                    Ok(())
                }
                Err(AppError::NoInputFiles(dir)) => {
                    output.warning(&format!("No .txt files found under {dir}. Add files and re-run."));
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Build { processed, index } => {
            let mut config = config;
            if let Some(processed) = processed {
                config.paths.processed_dir = processed;
            }
            if let Some(index) = index {
                config.paths.index_dir = index;
            }

            let embedder = load_embedder(config.embedding.clone()).await?;
            match build_from_processed(&config, embedder).await {
                Ok(built) => {
                    output.success(&format!(
                        "Built index with {} chunks at {}",
                        built.len(),
                        config.paths.index_dir.display()
                    ));
                    Ok(())
                }
                Err(e) => {
                    output.error(&e.to_string());
                    if matches!(e, AppError::NoInputChunks(_)) {
                        output.hint("Run ingestion first:");
                        output.command("ragkit ingest");
                    }
                    Err(e.into())
                }
            }
        }
        Commands::Query { question, k } => {
            let orchestrator = QueryOrchestrator::bootstrap(&config).await;
            match orchestrator.query(&question, k).await {
                Ok(answer) => {
                    output.answer(&answer.answer);
                    output.context(&answer.context);
                    Ok(())
                }
                Err(e) => {
                    output.error(&e.to_string());
                    Err(e.into())
                }
            }
        }
        Commands::Config { validate } => show_config(&cli, &config, validate, &output),
    }
}

async fn serve(
    mut config: RagkitConfig,
    host: Option<String>,
    port: Option<u16>,
    output: &Output,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    output.banner();
    let orchestrator = QueryOrchestrator::bootstrap(&config).await;
    if !orchestrator.index_loaded() {
        output.warning("Index not loaded; /query will return 503 until it is built.");
        output.command("ragkit ingest && ragkit build");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(orchestrator);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "Server listening");
    output.success(&format!("Listening on http://{addr}"));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn show_config(cli: &Cli, config: &RagkitConfig, validate: bool, output: &Output) -> anyhow::Result<()> {
    if validate {
        config.validate()?;
        output.success(&format!("{} is valid", cli.config.display()));
        return Ok(());
    }

    output.header("Configuration");
    output.kv("file", &cli.config.display().to_string());
    output.kv("server", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("raw_dir", &config.paths.raw_dir.display().to_string());
    output.kv("processed_dir", &config.paths.processed_dir.display().to_string());
    output.kv("index_dir", &config.paths.index_dir.display().to_string());
    output.kv("chunk_max_len", &config.rag.chunk_max_len.to_string());
    output.kv("default_top_k", &config.rag.default_top_k.to_string());
    output.kv("embedding", &format!("{:?} ({})", config.embedding.backend, config.embedding.model));
    output.kv(
        "generation",
        &format!("{:?} {}", config.generation.provider, config.generation.resolved_model()),
    );
    Ok(())
}
