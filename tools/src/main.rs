//! replay-runner: headless host for the replay observer core.
//!
//! Usage:
//!   replay-runner --replay game.json
//!   replay-runner --replay game.json --speed 250 --realtime
//!   replay-runner --replay game.json --config viewer.json --ipc-mode

use anyhow::{anyhow, bail, Context, Result};
use observer_core::{
    command::{ControlKey, ViewerCommand},
    config::ViewerConfig,
    engine::ObserverEngine,
    event::{StopReason, ViewerEvent},
    snapshot::Snapshot,
    summary::{PlayerSummary, SelectionStatus, TimelineStatus},
    types::{Millis, Vec2},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

/// Longest span a single `advance` request may simulate.
const MAX_ADVANCE_MS: Millis = 3_600_000.0;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    GetFrame,
    Command { command: ViewerCommand },
    Key { key: String },
    /// Simulate `ms` of host time on both clocks.
    Advance { ms: Millis },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    status:         TimelineStatus,
    selection:      SelectionStatus,
    selection_text: String,
    players:        Vec<PlayerSummary>,
    events:         Vec<ViewerEvent>,
}

#[derive(serde::Serialize)]
struct FrameReply {
    status:        TimelineStatus,
    snapshot:      Option<Snapshot>,
    wormhole_link: Option<(Vec2, Vec2)>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let replay = arg_value(&args, "--replay")
        .ok_or_else(|| anyhow!("usage: replay-runner --replay <file.json> [--config <file>] [--speed <ms>] [--no-interpolation] [--realtime] [--ipc-mode]"))?;
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let realtime = has_flag(&args, "--realtime");

    let mut config = match arg_value(&args, "--config") {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.playback_speed_ms = parse_arg(&args, "--speed", config.playback_speed_ms).max(1);
    if has_flag(&args, "--no-interpolation") {
        config.interpolation_enabled = false;
    }

    let json = std::fs::read_to_string(replay)
        .with_context(|| format!("Cannot read replay {replay}"))?;
    let mut engine = ObserverEngine::new(config);
    engine.load_json(&json)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        println!("Replay observer: replay-runner");
        println!("  replay:        {replay}");
        println!("  frames:        {}", engine.total_frames());
        println!("  speed:         {}ms/frame", engine.config.playback_speed_ms);
        println!("  interpolation: {}", engine.interpolation_enabled());
        println!("  clock:         {}", if realtime { "realtime" } else { "virtual" });
        println!();

        run_playback(&mut engine, realtime);
        print_summary(&engine);
    }

    Ok(())
}

/// Play from the first frame to the end, polling both clocks at the
/// configured cadence.
fn run_playback(engine: &mut ObserverEngine, realtime: bool) {
    let poll = engine.config.poll_interval_ms.max(1);
    report_events(engine);

    engine.play();
    let mut last = Instant::now();
    while engine.is_playing() {
        let delta = if realtime {
            thread::sleep(Duration::from_millis(poll));
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f64() * 1000.0;
            last = now;
            elapsed
        } else {
            poll as Millis
        };
        engine.tick_playback(delta);
        engine.update_transition(delta);
        report_events(engine);
    }
}

fn report_events(engine: &mut ObserverEngine) {
    for event in engine.drain_events() {
        match event {
            ViewerEvent::FrameChanged { index } => {
                if let Some(frame) = engine.frames().get(index) {
                    println!(
                        "  frame {:>5} | ships: {:>3} | asteroids: {:>3} | wormholes: {:>3}",
                        index + 1,
                        frame.ships.len(),
                        frame.asteroids.len(),
                        frame.wormholes.len()
                    );
                }
            }
            ViewerEvent::PlaybackStopped { index, reason: StopReason::EndOfSequence } => {
                println!("  playback finished at frame {}", index + 1);
            }
            other => log::debug!("{other:?}"),
        }
    }
}

fn run_ipc_loop(engine: &mut ObserverEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => {}
            IpcRequest::GetFrame => {
                let reply = FrameReply {
                    status:        engine.status(),
                    snapshot:      engine.displayed_snapshot().map(|s| s.into_owned()),
                    wormhole_link: engine.selected_wormhole_link(),
                };
                writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
                stdout.flush()?;
                continue;
            }
            IpcRequest::Command { command } => engine.submit_command(command),
            IpcRequest::Key { key } => match ControlKey::from_key_name(&key) {
                Some(control) => engine.handle_key(control),
                None => log::warn!("Unbound key: {key}"),
            },
            IpcRequest::Advance { ms } => {
                if let Err(e) = advance(engine, ms) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            }
        }

        let state = build_ui_state(engine);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

/// Feed `ms` of host time in poll-sized slices so playback and
/// transitions see the same cadence as a live host.
fn advance(engine: &mut ObserverEngine, ms: Millis) -> Result<()> {
    let poll = engine.config.poll_interval_ms.max(1) as Millis;
    for delta in advance_slices(ms, poll)? {
        engine.tick_playback(delta);
        engine.update_transition(delta);
    }
    Ok(())
}

/// Whole `poll` slices followed by the remainder. Negative spans are empty.
fn advance_slices(ms: Millis, poll: Millis) -> Result<Vec<Millis>> {
    if !ms.is_finite() || ms > MAX_ADVANCE_MS {
        bail!("advance of {ms}ms is out of range (max {MAX_ADVANCE_MS}ms)");
    }
    let ms = ms.max(0.0);
    let whole = (ms / poll).floor() as usize;
    let mut slices = vec![poll; whole];
    let rest = ms - whole as Millis * poll;
    if rest > 0.0 {
        slices.push(rest);
    }
    Ok(slices)
}

fn build_ui_state(engine: &mut ObserverEngine) -> UiState {
    let selection = engine.selection_status();
    UiState {
        status:         engine.status(),
        selection_text: selection.detail_text(),
        selection,
        players:        engine.player_summaries(),
        events:         engine.drain_events(),
    }
}

fn print_summary(engine: &ObserverEngine) {
    let status = engine.status();

    println!();
    println!("=== REPLAY SUMMARY ===");
    println!("  frames:        {}", status.total_frames);
    println!("  final frame:   {}", status.label);
    println!("  playing:       {}", status.is_playing);

    if let Some(frame) = engine.current_snapshot() {
        println!("  ships:         {}", frame.ships.len());
        println!("  asteroids:     {}", frame.asteroids.len());
        println!("  wormholes:     {}", frame.wormholes.len());
        println!("  radius:        {}", frame.radius);
    }

    println!();
    println!("=== PLAYERS (final frame) ===");
    let players = engine.player_summaries();
    if players.is_empty() {
        println!("  (No players in this frame)");
    } else {
        for p in &players {
            println!(
                "  {} | ships: {} | rock: {} | fuel: {} | {}",
                p.header, p.ships, p.rock, p.fuel, p.color
            );
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
