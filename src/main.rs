use anyhow::{Context, Result};
use clap::Parser;
use cockpit_audio::{
    create_router, AppState, CaptureSupervisor, Config, LinearPcmEncoderFactory, RecorderContext,
    RecordingSwitch, StatusBoard, StreamHub, WavFileDevice,
};
use std::sync::Arc;
use tracing::{error, info};

/// Cockpit audio capture, recording and live streaming
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/cockpit-audio")]
    config: String,

    /// Start with recording disabled regardless of the config file
    #[arg(long)]
    disabled: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    info!("Loaded config: {}", cfg.service.name);
    info!("Recordings directory: {}", cfg.audio.recordings_path);
    info!("Capture source: {}", cfg.audio.source_path);

    let switch = RecordingSwitch::new(cfg.audio.recording_enabled && !cli.disabled);
    let status = StatusBoard::new();
    let hub = StreamHub::new();
    let session_config = cfg.audio.session_config();

    let ctx = RecorderContext {
        device: Arc::new(WavFileDevice::new(&cfg.audio.source_path)),
        encoders: Arc::new(LinearPcmEncoderFactory),
        status: status.clone(),
        switch: switch.clone(),
        hub: hub.clone(),
        config: session_config.clone(),
    };
    let supervisor = CaptureSupervisor::new(ctx, cfg.audio.poll_interval());

    let state = AppState {
        hub,
        status,
        switch,
        gate: supervisor.gate().clone(),
        recordings_dir: session_config.recordings_dir,
    };
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on http://{}", addr);

    tokio::select! {
        result = supervisor.run() => {
            error!("Capture supervisor exited");
            result?;
        }
        result = axum::serve(listener, app) => {
            result.context("HTTP server terminated")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
