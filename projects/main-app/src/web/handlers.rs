use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::{
    app_state::AppState,
    camera::{service::WebcamCapture, traits::CameraProvider, traits::FrameReceiver},
    core::{
        errors::AppError,
        state::{CaptureState, CaptureStatus},
    },
};

use super::views;

const BOUNDARY: &str = "webcamframe";

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn root() -> Redirect {
    Redirect::to("/full")
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn render_full<P: CameraProvider>(webcam: &WebcamCapture<P>) -> Html<String> {
    Html(views::full_widget(
        &webcam.status(),
        webcam.captured_image(),
    ))
}

async fn mount_full<P: CameraProvider>(state: &AppState<P>) -> Html<String> {
    let mut webcam = state.full.lock().await;
    if !webcam.is_mounted() {
        if let Err(err) = webcam.mount().await {
            error!("full widget mount: {err:#}");
        }
    }
    render_full(&webcam)
}

pub async fn full_page<P: CameraProvider>(State(state): State<Arc<AppState<P>>>) -> Html<String> {
    let Html(widget) = mount_full(&state).await;
    Html(views::page(&state.config.app_name, &widget))
}

pub async fn full_widget<P: CameraProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> Html<String> {
    mount_full(&state).await
}

pub async fn full_status<P: CameraProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> Json<CaptureStatus> {
    Json(state.full.lock().await.status())
}

pub async fn start<P: CameraProvider>(State(state): State<Arc<AppState<P>>>) -> Html<String> {
    let mut webcam = state.full.lock().await;
    match webcam.start().await {
        Ok(now) => info!("webcam start requested ({now:?})"),
        Err(err) if webcam.state() == CaptureState::Captured => {
            warn!("start skipped: {err:#}")
        }
        Err(err) => error!("{err:#}"),
    }
    render_full(&webcam)
}

pub async fn stop<P: CameraProvider>(State(state): State<Arc<AppState<P>>>) -> Html<String> {
    let mut webcam = state.full.lock().await;
    webcam.stop();
    render_full(&webcam)
}

pub async fn torch<P: CameraProvider>(State(state): State<Arc<AppState<P>>>) -> Html<String> {
    let mut webcam = state.full.lock().await;
    let applied = webcam.toggle_torch().await;
    if !applied {
        debug!(
            "torch flag is {} but hardware unchanged (supported: {})",
            webcam.torch_on(),
            webcam.torch_supported()
        );
    }
    render_full(&webcam)
}

pub async fn capture<P: CameraProvider>(State(state): State<Arc<AppState<P>>>) -> Html<String> {
    let mut webcam = state.full.lock().await;
    if let Err(err) = webcam.capture() {
        warn!("capture skipped in {:?}: {err:#}", webcam.state());
    }
    render_full(&webcam)
}

pub async fn reset<P: CameraProvider>(State(state): State<Arc<AppState<P>>>) -> Html<String> {
    let mut webcam = state.full.lock().await;
    webcam.reset();
    info!("webcam reset");
    render_full(&webcam)
}

pub async fn full_preview<P: CameraProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<Response, AppError> {
    let frames = state
        .full
        .lock()
        .await
        .preview_frames()
        .ok_or_else(|| AppError::not_live("full"))?;
    Ok(mjpeg_response(frames))
}

pub async fn simple_page<P: CameraProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> Html<String> {
    let mut webcam = state.simple.lock().await;
    if !webcam.is_mounted() {
        if let Err(err) = webcam.mount().await {
            error!("simple widget mount: {err:#}");
        }
    }
    let widget = views::simple_widget(webcam.is_live());
    Html(views::page(&state.config.app_name, &widget))
}

pub async fn simple_capture<P: CameraProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> StatusCode {
    let webcam = state.simple.lock().await;
    match webcam.capture() {
        Ok(true) => {}
        Ok(false) => debug!("simple capture: no frame yet"),
        Err(err) => debug!("simple capture: {err:#}"),
    }
    StatusCode::NO_CONTENT
}

pub async fn simple_preview<P: CameraProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<Response, AppError> {
    let frames = state
        .simple
        .lock()
        .await
        .preview_frames()
        .ok_or_else(|| AppError::not_live("simple"))?;
    Ok(mjpeg_response(frames))
}

/// Streams the preview until the track stops or the client goes away.
fn mjpeg_response(mut frames: FrameReceiver) -> Response {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(4);
    tokio::spawn(async move {
        loop {
            let frame = frames.borrow_and_update().clone();
            if let Some(frame) = frame {
                let header = format!(
                    "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
                    frame.len()
                );
                let parts = [Bytes::from(header), frame, Bytes::from_static(b"\r\n")];
                for part in parts {
                    if tx.send(Ok(part)).await.is_err() {
                        debug!("preview client disconnected");
                        return;
                    }
                }
            }
            if frames.changed().await.is_err() {
                break;
            }
        }
        debug!("preview source closed");
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("multipart/x-mixed-replace; boundary=webcamframe"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    (
        StatusCode::OK,
        headers,
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}
