use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use dotenvy::dotenv;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ragchunk::{
    Chunk, ExtractError, Pipeline, load_config, pipeline::utils::compute_mdhash_id,
};

#[derive(Debug, Serialize)]
struct ExtractionReport<'a> {
    file: &'a str,
    document_id: String,
    extracted_at: String,
    chunks: Vec<Chunk>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Extraction run failed");
            eprintln!("Extraction run failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    dotenv().ok();

    let files: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if files.is_empty() {
        bail!("usage: ragchunk <file>...");
    }

    let config = load_config()
        .await
        .context("Failed to load application configuration")?;
    let pipeline = Pipeline::new(&config)?;

    let mut failed = 0usize;
    for path in &files {
        let file_name = path.display().to_string();
        match extract_file(&pipeline, path, &file_name).await {
            Ok(report) => {
                let line = serde_json::to_string(&report)
                    .with_context(|| format!("Failed to serialize chunks for {file_name}"))?;
                println!("{line}");
            }
            Err(err) => {
                failed += 1;
                error!(file = %file_name, error = %err, "Failed to extract file");
            }
        }
    }

    info!(files = files.len(), failed, "Extraction finished");
    if failed > 0 {
        bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

async fn extract_file<'a>(
    pipeline: &Pipeline,
    path: &Path,
    file_name: &'a str,
) -> Result<ExtractionReport<'a>> {
    let (format, bytes) = pipeline.document_manager().load(path).await?;
    let document_id = compute_mdhash_id(&bytes, "doc-");
    let chunks = match pipeline.extract_blocking(bytes, format).await {
        Err(ExtractError::EmptyExtraction) => bail!("No chunks found"),
        other => other?,
    };
    info!(file = %file_name, %document_id, chunks = chunks.len(), "File extracted");

    Ok(ExtractionReport {
        file: file_name,
        document_id,
        extracted_at: Utc::now().to_rfc3339(),
        chunks,
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
