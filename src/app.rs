//! Frame orchestrator: the fixed-cadence render/update loop.
//!
//! One thread owns the terminal, the audio device, and all simulation state.
//! The only concurrent task is the backend line reader, which talks to this
//! loop exclusively through the bounded transcript log. Every per-frame fault
//! is contained within its frame; only backend death or an explicit quit
//! request stops the loop.

use crate::audio::{loudness, AudioInput};
use crate::backend::BackendLink;
use crate::config::AppConfig;
use crate::geometry::{depth_sort, Projected, SpherePoint};
use crate::pulse::PulseTracker;
use crate::render::context::RenderContext;
use crate::render::hud::draw_hud;
use crate::render::panels::{draw_panels, OverlayData};
use crate::render::sphere::draw_sphere;
use crate::sysmon::{SystemMonitor, SystemStats};
use crate::terminal::TerminalRestoreGuard;
use crate::theme::ThemeId;
use crate::transcript::TranscriptLog;
use anyhow::{Context as _, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::Canvas;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

/// Sphere rotation rates, radians per second.
const YAW_SPEED: f64 = 0.4;
const PITCH_SPEED: f64 = 0.18;

/// Frames between host telemetry refreshes.
const TELEMETRY_REFRESH_FRAMES: u64 = 60;

/// Exponential smoothing factor for the displayed FPS.
const FPS_SMOOTHING: f64 = 0.1;

/// Why the loop ended; backend death and user quits are both orderly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    QuitRequested,
    BackendExited,
}

/// Run the visualization until a quit request or backend death.
///
/// On every exit path the audio device is released first, then the drawing
/// surface, and the caller stops the backend subprocess last.
pub fn run(
    config: &AppConfig,
    log: &TranscriptLog,
    backend: Option<&mut BackendLink>,
) -> Result<ExitReason> {
    let mut stdout = io::stdout();
    let guard =
        TerminalRestoreGuard::acquire(&mut stdout).context("failed to set up the terminal")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;

    let audio = if config.no_audio {
        AudioInput::silent()
    } else {
        AudioInput::open(config.input_device.clone())
    };

    let result = run_loop(config, log, backend, &mut terminal, audio);

    // Drawing surface released after the audio device, before the backend.
    let _ = terminal.show_cursor();
    guard.restore();
    result
}

fn run_loop(
    config: &AppConfig,
    log: &TranscriptLog,
    mut backend: Option<&mut BackendLink>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut audio: AudioInput,
) -> Result<ExitReason> {
    let mut rng = rand::thread_rng();
    let mut points: Vec<SpherePoint> = (0..config.points.max(1))
        .map(|_| SpherePoint::random(&mut rng))
        .collect();

    let mut pulses = PulseTracker::new();
    let mut monitor = SystemMonitor::new();
    let cpu_count = monitor.cpu_count();
    let mut stats: Option<SystemStats> = None;

    let mut theme = ThemeId::from_key(config.theme).unwrap_or_default();
    let mut bold = config.bold;
    let mut yaw = 0.0f64;
    let mut pitch = 0.0f64;
    let mut fps = f64::from(config.fps);
    let mut frames: u64 = 0;

    let budget = config.frame_budget();
    let start = Instant::now();
    let mut last_tick = start;

    let exit = loop {
        // (1) elapsed time for this frame; pacing happens at the bottom.
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(last_tick).as_secs_f64();
        last_tick = frame_start;
        if dt > 0.0 {
            fps += FPS_SMOOTHING * (1.0 / dt - fps);
        }
        let now = start.elapsed().as_secs_f64();

        // (2) a dead backend ends the session.
        if let Some(link) = backend.as_deref_mut() {
            if !link.alive() {
                tracing::info!("backend exited, shutting down");
                break ExitReason::BackendExited;
            }
        }

        // (3) drain input events.
        match drain_input(&mut theme, &mut bold)? {
            InputOutcome::Quit => break ExitReason::QuitRequested,
            InputOutcome::Continue => {}
        }

        // (4)-(5) one loudness sample feeds both tracker and renderers.
        let frame = audio.read_frame();
        let level = loudness(&frame);
        pulses.on_sample(level, now);
        let active = pulses.active(now).to_vec();

        if frames % TELEMETRY_REFRESH_FRAMES == 0 {
            stats = monitor.sample();
        }

        // (6)-(7) advance rotation and every point.
        yaw += YAW_SPEED * dt;
        pitch += PITCH_SPEED * dt;
        for point in &mut points {
            point.advance(dt);
        }

        let entries = log.snapshot();

        // (8)-(10) depth sort, then draw back-to-front and present.
        terminal.draw(|f| {
            let area = f.size();
            let rc = RenderContext::new(area, theme, bold);
            let view = rc.viewpoint(yaw, pitch);
            depth_sort(&mut points, &view);
            let projections: Vec<Projected> = points.iter().map(|p| p.project(&view)).collect();

            let canvas = Canvas::default()
                .x_bounds([0.0, rc.width])
                .y_bounds([0.0, rc.height])
                .marker(Marker::Braille)
                .paint(|ctx| {
                    draw_sphere(ctx, &rc, &projections);
                    ctx.layer();
                    draw_hud(ctx, &rc, now, level, &active);
                });
            f.render_widget(canvas, area);

            let data = OverlayData {
                now,
                loudness: level,
                fps,
                theme,
                bold,
                entries: &entries,
                stats,
                cpu_count,
            };
            draw_panels(f, area, &data);
        })?;

        frames += 1;
        let spent = frame_start.elapsed();
        if spent < budget {
            std::thread::sleep(budget - spent);
        }
    };

    // Ordered shutdown starts with the audio device.
    audio.close();
    Ok(exit)
}

enum InputOutcome {
    Continue,
    Quit,
}

fn drain_input(theme: &mut ThemeId, bold: &mut bool) -> Result<InputOutcome> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(InputOutcome::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(InputOutcome::Quit);
                }
                KeyCode::Char(c @ '1'..='4') => {
                    if let Some(selected) = ThemeId::from_key(c as u8 - b'0') {
                        *theme = selected;
                    }
                }
                KeyCode::Char('b') | KeyCode::Char('u') => *bold = !*bold,
                _ => {}
            },
            Event::Resize(width, height) => {
                // Layout is re-derived from the frame area every draw; the
                // event is only interesting for diagnostics.
                tracing::debug!(width, height, "terminal resized");
            }
            _ => {}
        }
    }
    Ok(InputOutcome::Continue)
}

#[cfg(test)]
mod tests {
    use crate::audio::{loudness, FRAME_SAMPLES};
    use crate::pulse::PulseTracker;
    use crate::transcript::{parse_line, TranscriptLog};

    /// A full-scale sine frame lands well above the pulse threshold.
    fn sine_frame(amplitude: f64) -> Vec<i16> {
        (0..FRAME_SAMPLES)
            .map(|i| {
                let phase = i as f64 / FRAME_SAMPLES as f64 * std::f64::consts::TAU * 8.0;
                (phase.sin() * amplitude * f64::from(i16::MAX)) as i16
            })
            .collect()
    }

    #[test]
    fn simulated_session_counts_two_pulses() {
        let mut pulses = PulseTracker::new();
        let dt = 1.0 / 60.0;

        // 600 frames of silence broken by two short loud bursts.
        for frame_index in 0..600u32 {
            let now = f64::from(frame_index) * dt;
            let loud = (60..70).contains(&frame_index) || (200..210).contains(&frame_index);
            let samples = if loud {
                sine_frame(0.8)
            } else {
                vec![0i16; FRAME_SAMPLES]
            };
            let level = loudness(&samples);
            pulses.on_sample(level, now);
        }

        // Each burst is one rising edge, and both rings have expired by now.
        assert_eq!(pulses.len(), 2);
        let end = 600.0 * dt;
        assert!(pulses.active(end).is_empty());
    }

    #[test]
    fn burst_level_clears_the_threshold_and_silence_does_not() {
        assert!(loudness(&sine_frame(0.8)) > crate::pulse::PULSE_THRESHOLD);
        assert!(loudness(&vec![0i16; FRAME_SAMPLES]) < crate::pulse::PULSE_THRESHOLD);
    }

    #[test]
    fn backend_lines_reach_the_frame_snapshot() {
        let log = TranscriptLog::new();
        for line in [
            "[COMMAND][YOU] status report",
            "noise the reader ignores",
            "[COMMAND][SIDD] All systems nominal.",
        ] {
            if let Some(entry) = parse_line(line) {
                log.push(entry);
            }
        }
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].text, "status report");
        assert_eq!(snapshot[1].text, "All systems nominal.");
    }
}
