mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    city::CycleReport,
    clock::Pacing,
    engine::{EngineBuilder, EngineSettings},
    scenario::Scenario,
};

#[derive(Clone, Serialize)]
pub struct UiFrame {
    pub report: CycleReport,
    pub completed: bool,
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub max_iterations: u32,
    pub frame: Option<UiFrame>,
    pub completed: bool,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<UiFrame>>>,
    frames: Arc<Mutex<Vec<UiFrame>>>,
    max_iterations: u32,
    scenario_name: String,
    simulation_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub max_iterations: u32,
    pub snapshot_interval: u32,
    pub snapshot_dir: PathBuf,
    pub pacing: Pacing,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        max_iterations,
        snapshot_interval,
        snapshot_dir,
        pacing,
        host,
        port,
    } = config;

    let scenario_name = scenario.name.clone();
    let city = scenario.build_city();
    let settings = EngineSettings {
        scenario_name: scenario_name.clone(),
        seed: scenario.seed,
        max_iterations,
        snapshot_interval,
        snapshot_dir,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_standard_stages()
        .with_pacing(pacing)
        .build();

    let (tx, _) = broadcast::channel::<String>(512);
    let latest_frame: Arc<Mutex<Option<UiFrame>>> = Arc::new(Mutex::new(None));
    let frames: Arc<Mutex<Vec<UiFrame>>> = Arc::new(Mutex::new(Vec::new()));
    let simulation_done = Arc::new(AtomicBool::new(false));

    let latest_for_sim = latest_frame.clone();
    let frames_for_sim = frames.clone();
    let done_for_sim = simulation_done.clone();
    let tx_for_sim = tx.clone();
    let scenario_label = scenario_name.clone();

    let sim_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        engine.run_with_hook(&city, |report| {
            let frame = UiFrame {
                report: report.clone(),
                completed: false,
            };
            {
                let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
                *guard = Some(frame.clone());
            }
            {
                let mut guard = frames_for_sim.lock().expect("frames lock poisoned");
                guard.push(frame.clone());
            }
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
        })?;

        done_for_sim.store(true, Ordering::SeqCst);

        let final_frame = {
            let guard = latest_for_sim.lock().expect("latest frame lock poisoned");
            guard.clone()
        };

        if let Some(mut frame) = final_frame {
            frame.completed = true;
            {
                let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
                *guard = Some(frame.clone());
            }
            {
                let mut guard = frames_for_sim.lock().expect("frames lock poisoned");
                if let Some(last) = guard.last_mut() {
                    *last = frame.clone();
                } else {
                    guard.push(frame.clone());
                }
            }
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
        }

        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        latest_frame: latest_frame.clone(),
        frames: frames.clone(),
        max_iterations,
        scenario_name: scenario_name.clone(),
        simulation_done: simulation_done.clone(),
    });

    tokio::spawn(async move {
        match sim_handle.await {
            Ok(Ok(())) => {
                println!("[web] planning run completed for '{scenario_label}'.");
            }
            Ok(Err(err)) => {
                eprintln!("[web] planning run error: {err:?}");
            }
            Err(err) => {
                eprintln!("[web] planning task failed: {err:?}");
            }
        }
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/state", get(latest_state))
        .route("/api/cycles", get(all_cycles))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr = bind_address(&host, port)?;

    println!("[web] metroplan viewer live at http://{host}:{port} (Ctrl+C to stop)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    println!("[web] shutting down viewer...");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/css; charset=utf-8")
        .body(assets::STYLES_CSS.to_string())
        .unwrap()
}

async fn script() -> impl IntoResponse {
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )
        .body(assets::APP_JS.to_string())
        .unwrap()
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = state
        .latest_frame
        .lock()
        .expect("latest frame lock poisoned")
        .clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        max_iterations: state.max_iterations,
        frame,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct CyclesResponse {
    scenario: String,
    max_iterations: u32,
    completed: bool,
    cycles: Vec<UiFrame>,
}

async fn all_cycles(State(state): State<Arc<AppState>>) -> Json<CyclesResponse> {
    let cycles = state.frames.lock().expect("frames lock poisoned").clone();
    Json(CyclesResponse {
        scenario: state.scenario_name.clone(),
        max_iterations: state.max_iterations,
        completed: state.simulation_done.load(Ordering::SeqCst),
        cycles,
    })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
