mod app;
mod config;
mod controller;
mod game;
mod geometry;
mod protocol;
mod settings;
mod widgets;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crossbeam_channel::Sender;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::{
    app::OverlayApp,
    config::AppConfig,
    controller::OverlayController,
    protocol::{parse_incoming_message, IncomingMessage, OverlayCommand},
    settings::open_store,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, config_path) = AppConfig::load_or_create()?;
    info!(path = %config_path.display(), scope = ?config.store_scope, "loaded launch config");

    let (tx, rx) = crossbeam_channel::unbounded::<IncomingMessage>();
    spawn_ingest_server(&config.ws_bind, tx);

    let settings_dir = config.resolved_settings_dir()?;
    let controller = OverlayController::new(open_store(config.store_scope, settings_dir));
    let poll_interval = config.poll_interval();

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Target Arrow")
        .with_transparent(true)
        .with_decorations(false)
        .with_maximized(true)
        .with_mouse_passthrough(config.mouse_passthrough)
        .with_taskbar(false);
    if config.always_on_top {
        viewport = viewport.with_always_on_top();
    }

    let native_options = eframe::NativeOptions {
        viewport,
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        "Target Arrow Overlay",
        native_options,
        Box::new(move |_cc| Ok(Box::new(OverlayApp::new(rx, controller, poll_interval)))),
    )
    .map_err(|err| anyhow::anyhow!("failed starting overlay window: {err}"))?;

    Ok(())
}

fn spawn_ingest_server(bind: &str, tx: Sender<IncomingMessage>) {
    let bind = bind.trim().to_owned();
    if bind.is_empty() {
        warn!("ws_bind is empty; game state ingest disabled");
        return;
    }
    if !is_valid_ws_bind(&bind) {
        warn!(bind = %bind, "ws_bind is invalid; game state ingest disabled");
        return;
    }
    tokio::spawn(async move {
        if let Err(err) = run_ingest_server(&bind, tx).await {
            error!(?err, bind = %bind, "ingest server crashed");
        }
    });
}

fn is_valid_ws_bind(value: &str) -> bool {
    value.parse::<SocketAddr>().is_ok()
}

async fn run_ingest_server(bind: &str, tx: Sender<IncomingMessage>) -> Result<()> {
    let tx_events = tx.clone();
    let tx_ingest = tx.clone();
    let tx_stop = tx;
    let app = Router::new()
        .route(
            "/events",
            get(move |ws: WebSocketUpgrade| {
                let tx = tx_events.clone();
                async move { ws.on_upgrade(move |socket| handle_socket(socket, tx)) }
            }),
        )
        .route(
            "/ingest",
            post(move |payload: Json<Value>| {
                let tx = tx_ingest.clone();
                async move { ingest_payload(payload, tx) }
            }),
        )
        .route(
            "/stop",
            post(move || {
                let tx = tx_stop.clone();
                async move { forward(&tx, stop_message()).status() }
            }),
        )
        .route("/health", get(|| async { "ok" }));

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid ws bind address: {bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed binding ingest listener on {addr}"))?;

    info!("game state socket listening on ws://{addr}/events");
    info!("http ingest available at http://{addr}/ingest, stop at http://{addr}/stop");
    axum::serve(listener, app)
        .await
        .context("axum serve failed")?;
    Ok(())
}

async fn handle_socket(mut socket: WebSocket, tx: Sender<IncomingMessage>) {
    while let Some(message_result) = socket.recv().await {
        match message_result {
            Ok(Message::Text(text)) => {
                if deliver_text(&text, &tx) == Delivery::ReceiverGone {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                error!(?err, "socket receive error");
                break;
            }
        }
    }
}

fn ingest_payload(payload: Json<Value>, tx: Sender<IncomingMessage>) -> StatusCode {
    deliver_text(&payload.0.to_string(), &tx).status()
}

fn stop_message() -> IncomingMessage {
    IncomingMessage::Command {
        command: OverlayCommand::Stop,
    }
}

/// What happened to one inbound payload on its way to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Forwarded,
    Rejected,
    ReceiverGone,
}

impl Delivery {
    fn status(self) -> StatusCode {
        match self {
            Delivery::Forwarded => StatusCode::ACCEPTED,
            Delivery::Rejected => StatusCode::BAD_REQUEST,
            Delivery::ReceiverGone => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

fn deliver_text(text: &str, tx: &Sender<IncomingMessage>) -> Delivery {
    match parse_incoming_message(text) {
        Ok(message) => forward(tx, message),
        Err(err) => {
            warn!(?err, payload = %text, "ignored unknown payload");
            Delivery::Rejected
        }
    }
}

fn forward(tx: &Sender<IncomingMessage>, message: IncomingMessage) -> Delivery {
    if tx.send(message).is_ok() {
        Delivery::Forwarded
    } else {
        error!("overlay receiver dropped");
        Delivery::ReceiverGone
    }
}
