//! HTTP server implementation using axum
//!
//! One POST endpoint per operation. Every handler stores its uploads in a
//! request-scoped [`ScratchSpace`], validates the form, then runs the PDF work
//! on the blocking pool behind a semaphore so large files cannot starve the
//! async workers.

use crate::artifact::{self, Download, OutputArtifact};
use crate::config::ServerConfig;
use crate::convert::{CommandConverter, DocumentConverter};
use crate::error::{Error, Result};
use crate::pdf::{parse_angle, PdfOperations};
use crate::upload::{ScratchSpace, UploadForm};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    converter: Arc<dyn DocumentConverter>,
    jobs: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: ServerConfig, converter: Arc<dyn DocumentConverter>) -> Self {
        let jobs = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            config: Arc::new(config),
            converter,
            jobs,
        }
    }

    /// State with the command-line converter from `config`
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let converter = CommandConverter::from_command_line(&config.converter_command)?;
        tracing::info!(program = converter.program(), "Using external converter");
        Ok(Self::new(config, Arc::new(converter)))
    }

    fn scratch(&self) -> Result<ScratchSpace> {
        ScratchSpace::create(&self.config.scratch_dir)
    }

    /// Wait for a free job slot
    async fn acquire_slot(&self) -> Result<OwnedSemaphorePermit> {
        self.jobs
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Internal {
                reason: "job queue closed".to_string(),
            })
    }

    fn timeout_error(&self) -> Error {
        Error::Timeout {
            seconds: self.config.job_timeout.as_secs(),
        }
    }

    /// Run CPU-bound work on the blocking pool.
    ///
    /// Waits for a free job slot, then bounds the work by `job_timeout`. The
    /// slot is held until the work itself finishes, even after a timeout.
    async fn run_job<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self.acquire_slot().await?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match tokio::time::timeout(self.config.job_timeout, handle).await {
            Ok(joined) => joined.map_err(|e| Error::Internal {
                reason: format!("Task join error: {}", e),
            })?,
            Err(_) => Err(self.timeout_error()),
        }
    }

    /// Run async work, such as an external process, in a job slot.
    ///
    /// On timeout the future is dropped, which cancels the work and frees
    /// the slot immediately.
    async fn run_async_job<T, F>(&self, job: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self.acquire_slot().await?;

        tokio::time::timeout(self.config.job_timeout, job)
            .await
            .map_err(|_| self.timeout_error())?
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (status, self.client_message()).into_response()
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.data,
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/pdf-to-word
async fn pdf_to_word(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("pdf_file")?;
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_async_job(async {
            let docx = state.converter.convert(&data).await?;
            OutputArtifact::File {
                name: artifact::converted_docx(&stem),
                media_type: artifact::DOCX_MEDIA_TYPE,
                data: docx,
            }
            .finish()
        })
        .await
}

/// POST /api/compress-pdf
async fn compress_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("compress_pdf")?;
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_job(move || PdfOperations::compress(&data, &stem)?.finish())
        .await
}

/// POST /api/merge-pdf
async fn merge_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let files = form.files("merge_pdf");
    if files.is_empty() {
        return Err(Error::missing("merge_pdf"));
    }

    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        inputs.push(file.read().await?);
    }

    state
        .run_job(move || {
            let refs: Vec<&[u8]> = inputs.iter().map(|v| v.as_slice()).collect();
            PdfOperations::merge(&refs)?.finish()
        })
        .await
}

/// POST /api/split-pdf
async fn split_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("split_pdf")?;
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_job(move || PdfOperations::split(&data, &stem)?.finish())
        .await
}

/// POST /api/encrypt-pdf
async fn encrypt_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("pdf_file")?;
    let password = form.require_text("password")?.to_string();
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_job(move || PdfOperations::encrypt(&data, &stem, &password)?.finish())
        .await
}

/// POST /api/decrypt-pdf
async fn decrypt_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("pdf_file")?;
    let password = form.require_text("password")?.to_string();
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_job(move || PdfOperations::decrypt(&data, &stem, &password)?.finish())
        .await
}

/// POST /api/rotate-pdf
async fn rotate_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("pdf_file")?;
    let angle = parse_angle(form.text("angle").unwrap_or_default())?;
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_job(move || PdfOperations::rotate(&data, &stem, angle)?.finish())
        .await
}

/// POST /api/extract-images
async fn extract_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Download> {
    let mut scratch = state.scratch()?;
    let form = UploadForm::collect(&mut multipart, &mut scratch).await?;
    let file = form.require_file("pdf_file")?;
    let (stem, data) = (file.stem(), file.read().await?);

    state
        .run_job(move || PdfOperations::extract_images(&data, &stem)?.finish())
        .await
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/pdf-to-word", post(pdf_to_word))
        .route("/api/compress-pdf", post(compress_pdf))
        .route("/api/merge-pdf", post(merge_pdf))
        .route("/api/split-pdf", post(split_pdf))
        .route("/api/encrypt-pdf", post(encrypt_pdf))
        .route("/api/decrypt-pdf", post(decrypt_pdf))
        .route("/api/rotate-pdf", post(rotate_pdf))
        .route("/api/extract-images", post(extract_images))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C or SIGTERM
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::from_config(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("PDF Ops Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
