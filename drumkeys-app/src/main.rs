//! drumkeys - terminal keyboard drum kit
//!
//! Press a bound key to hear its clip and watch its pad pulse.

use std::any::Any;
use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Clear},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use drumkeys_audio::{AudioCommand, AudioEngine, AudioEvent, ClipHandle, EngineState};
use drumkeys_input::{Command, InputHandler};
use drumkeys_kit::{BindingTable, Board, Dispatcher, KeyPress};
use drumkeys_library::{ClipLoader, Config, Kit};
use drumkeys_tui::{App, AppState, HelpWidget, KeyboardWidget, StatusBarWidget, Theme};

/// Frame rate for UI updates and transition ticks
const FPS: u64 = 60;
/// How long to wait for the output stream before loading clips
const READY_TIMEOUT: Duration = Duration::from_secs(2);
/// Clip rate used when no output stream reported its rate
const FALLBACK_SAMPLE_RATE: u32 = 48_000;

#[derive(Parser, Debug)]
#[command(name = "drumkeys", about = "Terminal keyboard drum kit")]
struct Args {
    /// Kit file to play (defaults to the configured kit, then the stock kit)
    kit: Option<PathBuf>,

    /// Theme: classic, green or amber
    #[arg(long)]
    theme: Option<String>,

    /// Directory holding the stock kit's clips
    #[arg(long)]
    sample_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("drumkeys: logging disabled: {:#}", e);
    }
    tracing::info!("drumkeys starting");

    let mut config = Config::load();
    if let Some(dir) = args.sample_dir {
        config.sample_dir = dir;
    }

    let kit = resolve_kit(args.kit.as_deref(), &config)?;
    let table = kit.binding_table()?;
    tracing::info!(bindings = table.len(), "kit ready");

    // Create audio channels
    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();

    // Shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_audio = shutdown.clone();
    let slots = table.len();

    // Spawn audio thread
    let audio_handle = thread::Builder::new()
        .name("drumkeys-audio".into())
        .spawn(move || run_audio_thread(cmd_rx, evt_tx, shutdown_audio, slots))
        .context("failed to spawn audio thread")?;

    // Create engine handle for main thread
    let engine = AudioEngine::new(cmd_tx, evt_rx);

    let mut board = Board::from_table(&table, config.pulse_duration());
    let dispatcher = Dispatcher::new(&table, &mut board, |binding| engine.clip(binding.clip))?;

    let mut state = AppState::new(board, Theme::default());
    state.set_theme(args.theme.as_deref().unwrap_or(&config.theme));
    state.master_volume = config.master_volume;
    engine.send(AudioCommand::SetMasterVolume(config.master_volume));

    let sample_rate = match wait_for_ready(&engine) {
        Ok(rate) => rate,
        Err(msg) => {
            tracing::warn!(error = %msg, "audio output unavailable");
            state.set_error(format!("Audio: {}", msg));
            FALLBACK_SAMPLE_RATE
        }
    };
    state.sample_rate = Some(sample_rate);

    load_clips(
        &kit,
        &table,
        &ClipLoader::with_sample_rate(sample_rate),
        &engine,
        &mut state,
    );

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run main event loop
    let mut app = App::new(state);
    let result = run_app(&mut terminal, &mut app, &engine, &dispatcher, &shutdown);

    // Cleanup
    engine.shutdown();
    shutdown.store(true, Ordering::SeqCst);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Wait for audio thread
    if let Err(payload) = audio_handle.join() {
        tracing::error!(panic = %panic_message(&*payload), "audio thread panicked");
    }
    tracing::info!("drumkeys stopped");

    result
}

/// Route logs to `<data dir>/drumkeys/drumkeys.log`; the terminal belongs to the UI
fn init_logging() -> anyhow::Result<()> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drumkeys");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join("drumkeys.log");
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drumkeys=info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

/// The kit named on the command line, else the configured kit, else the stock kit
fn resolve_kit(cli_kit: Option<&Path>, config: &Config) -> anyhow::Result<Kit> {
    match cli_kit.or(config.kit_file.as_deref()) {
        Some(path) => {
            let kit = Kit::load(path)
                .with_context(|| format!("failed to read kit file {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded kit file");
            Ok(kit)
        }
        None => {
            tracing::info!(sample_dir = %config.sample_dir.display(), "using stock kit");
            Ok(Kit::default_in(&config.sample_dir))
        }
    }
}

/// Block until the audio thread reports its output rate
fn wait_for_ready(engine: &AudioEngine) -> Result<u32, String> {
    let deadline = Instant::now() + READY_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match engine.event_rx.recv_timeout(remaining) {
            Ok(AudioEvent::Ready { sample_rate }) => return Ok(sample_rate),
            Ok(AudioEvent::Error(msg)) => return Err(msg),
            Ok(_) => continue,
            Err(_) => return Err("output stream did not start".to_string()),
        }
    }
}

/// Decode every clip of the kit into its slot. A clip that fails to load
/// leaves its slot empty; the key still lights its pad.
fn load_clips(
    kit: &Kit,
    table: &BindingTable,
    loader: &ClipLoader,
    engine: &AudioEngine,
    state: &mut AppState,
) {
    let mut failed = Vec::new();

    for (entry, binding) in kit.entries().iter().zip(table.iter()) {
        match loader.load(&entry.path) {
            Ok(clip) => {
                tracing::debug!(
                    sound = %entry.sound,
                    frames = clip.frames(),
                    source_rate = clip.source_sample_rate,
                    source_channels = clip.source_channels,
                    "clip loaded"
                );
                // Wrap in Arc to avoid copying sample data through channel
                engine.send(AudioCommand::LoadClip(
                    binding.clip,
                    Arc::new(clip.samples),
                    Some(entry.sound.clone()),
                ));
            }
            Err(e) => {
                tracing::warn!(path = %entry.path.display(), error = %e, "clip failed to load");
                failed.push(entry.sound.clone());
            }
        }
    }

    if failed.is_empty() {
        state.set_success(format!(
            "Loaded {} clips | F1 for help, Esc to quit",
            kit.entries().len()
        ));
    } else {
        state.set_warning(format!("Could not load: {}", failed.join(", ")));
    }
}

/// Text of a thread panic payload
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

fn run_audio_thread(
    cmd_rx: Receiver<AudioCommand>,
    evt_tx: Sender<AudioEvent>,
    shutdown: Arc<AtomicBool>,
    slots: usize,
) {
    // Get audio host and device
    let host = cpal::default_host();
    let device = match host.default_output_device() {
        Some(d) => d,
        None => {
            let _ = evt_tx.send(AudioEvent::Error("No audio output device found".into()));
            return;
        }
    };

    let config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!(
                "Failed to get audio config: {}",
                e
            )));
            return;
        }
    };

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    tracing::info!(sample_rate, channels, "opening output stream");

    // Create engine state
    let engine_state = Arc::new(Mutex::new(EngineState::with_slots(sample_rate, slots)));
    let engine_for_callback = engine_state.clone();

    // Pre-allocated stereo buffer for devices that are not two-channel
    let mut stereo_buffer = vec![0.0f32; 16384];

    // State update interval
    let mut last_state_update = Instant::now();
    let state_update_interval = Duration::from_millis(33); // ~30fps

    // Build audio stream
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Use try_lock to avoid blocking the real-time audio thread
            // On contention (rare), output silence rather than blocking
            let Some(mut state) = engine_for_callback.try_lock() else {
                data.fill(0.0);
                return;
            };

            if channels == 2 {
                state.process(data);
                return;
            }

            let frames = (data.len() / channels.max(1)).min(stereo_buffer.len() / 2);
            let stereo = &mut stereo_buffer[..frames * 2];
            state.process(stereo);
            data.fill(0.0);
            for (frame, out) in data.chunks_mut(channels.max(1)).take(frames).enumerate() {
                let (left, right) = (stereo[frame * 2], stereo[frame * 2 + 1]);
                if let [mono] = out {
                    *mono = (left + right) * 0.5;
                } else {
                    out[0] = left;
                    out[1] = right;
                }
            }
        },
        |err| {
            tracing::error!(error = %err, "audio stream error");
        },
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!(
                "Failed to create audio stream: {}",
                e
            )));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = evt_tx.send(AudioEvent::Error(format!("Failed to start audio: {}", e)));
        return;
    }

    let _ = evt_tx.send(AudioEvent::Ready { sample_rate });

    // Command processing loop
    while !shutdown.load(Ordering::Relaxed) {
        // Process commands
        match cmd_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(AudioCommand::Shutdown) => break,
            Ok(cmd) => engine_state.lock().handle_command(cmd),
            Err(_) => {}
        }

        // Send state updates periodically
        if last_state_update.elapsed() >= state_update_interval {
            let update = engine_state.lock().get_state();
            let _ = evt_tx.try_send(update);
            last_state_update = Instant::now();
        }
    }

    tracing::debug!("audio thread exiting");
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    engine: &AudioEngine,
    dispatcher: &Dispatcher<ClipHandle>,
    shutdown: &AtomicBool,
) -> anyhow::Result<()> {
    let mut input_handler = InputHandler::new();

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();
    let mut last_tick = Instant::now();

    loop {
        // Check for shutdown
        if shutdown.load(Ordering::Relaxed) || app.should_quit {
            break;
        }

        // Process audio events
        while let Ok(event) = engine.event_rx.try_recv() {
            app.state.handle_audio_event(event);
        }

        // Advance pad transitions by wall-clock time; ended pulses clear here
        let now = Instant::now();
        app.state.tick(now - last_tick);
        last_tick = now;

        // Render
        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle input, draining everything queued so fast rolls are not spread over frames
        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            loop {
                if let Event::Key(key) = event::read()? {
                    if let Some(cmd) = input_handler.handle_key(key) {
                        handle_command(app, engine, dispatcher, cmd);
                    }
                    app.state.set_mode(input_handler.mode());
                }
                if app.should_quit || !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        // Maintain frame rate
        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    Ok(())
}

fn handle_command(
    app: &mut App,
    engine: &AudioEngine,
    dispatcher: &Dispatcher<ClipHandle>,
    cmd: Command,
) {
    match cmd {
        Command::Press(code) => {
            dispatcher.handle_key_press(&KeyPress::new(code), &mut app.state.board);
        }
        Command::AdjustVolume(delta) => engine.send(AudioCommand::AdjustMasterVolume(delta)),
        Command::StopAll => {
            engine.send(AudioCommand::StopAll);
            app.state.set_message("All sounds stopped");
        }
        // Mode is synced from the input handler after every key
        Command::ToggleHelp => {}
        Command::Quit => app.quit(),
    }
}

fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let state = &app.state;
    let theme = &state.theme;

    // Clear with background
    frame.render_widget(Block::default().style(theme.normal()), area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title
        Constraint::Min(7),    // Pads
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], theme);

    frame.render_widget(
        KeyboardWidget::new(&state.board, theme).voices(&state.voices),
        chunks[1],
    );

    frame.render_widget(
        StatusBarWidget::new(state.mode, theme)
            .message(state.message.as_deref(), state.message_type)
            .levels(state.master_volume, state.peak_level),
        chunks[2],
    );

    if state.show_help {
        let height = state.board.len().max(1) as u16 + 12;
        let help_area = centered_rect(52, height, chunks[1]);
        frame.render_widget(Clear, help_area);
        frame.render_widget(HelpWidget::new(theme, &state.board), help_area);
    }
}

fn render_title(frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let line = Line::from(Span::styled(title_bar(area.width), theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Title centered in a rule of `width` cells
fn title_bar(width: u16) -> String {
    let title_text = " DRUMKEYS ";
    let width = width as usize;
    let padding = width.saturating_sub(title_text.len()) / 2;
    let rest = width.saturating_sub(padding + title_text.len());
    format!(
        "{:═<pad$}{}{:═<rest$}",
        "",
        title_text,
        "",
        pad = padding,
        rest = rest
    )
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
