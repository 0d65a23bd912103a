//! Fixed-position telemetry panels composited around the sphere.
//!
//! Each panel is positional arithmetic over the current frame area; none
//! depends on another's content beyond shared placement offsets. Panels that
//! do not fit the terminal are skipped individually.

use crate::sysmon::SystemStats;
use crate::theme::{Rgb, ThemeId};
use crate::transcript::{wrap_text, Speaker, TranscriptEntry};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

const PANEL_BORDER: Rgb = Rgb::new(40, 60, 120);
const TEXT_PRIMARY: Rgb = Rgb::new(220, 230, 255);
const TEXT_DIM: Rgb = Rgb::new(150, 170, 210);
const SPEAKER_SIDD: Rgb = Rgb::new(0, 220, 255);
const SPEAKER_YOU: Rgb = Rgb::new(200, 210, 255);

const LEVEL_LOW: Rgb = Rgb::new(80, 200, 120);
const LEVEL_HIGH: Rgb = Rgb::new(255, 80, 80);

/// Utilization fraction where a metric bar flips from green to red.
const METRIC_ALERT: f64 = 0.7;

/// Analytics gamma differs from the HUD's on purpose.
const PANEL_GAMMA: f64 = 0.8;

const STATS_WIDTH: u16 = 28;
const STATS_HEIGHT: u16 = 7;
const SIDE_WIDTH: u16 = 26;
const SIGNAL_HEIGHT: u16 = 10;
const SYSTEM_HEIGHT: u16 = 8;
const LEVEL_BAR_WIDTH: u16 = 32;
const SIGNAL_BARS: usize = 12;

/// Everything the overlay needs for one frame, gathered by the orchestrator.
pub struct OverlayData<'a> {
    pub now: f64,
    pub loudness: f32,
    pub fps: f64,
    pub theme: ThemeId,
    pub bold: bool,
    pub entries: &'a [TranscriptEntry],
    pub stats: Option<SystemStats>,
    pub cpu_count: usize,
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(PANEL_BORDER.into()))
        .title_style(Style::default().fg(TEXT_PRIMARY.into()))
}

pub fn draw_panels(f: &mut Frame<'_>, area: Rect, data: &OverlayData<'_>) {
    let amp_visual = f64::from(data.loudness.clamp(0.0, 1.0)).powf(PANEL_GAMMA);

    let stats_rect = Rect::new(area.x + 1, area.y, STATS_WIDTH, STATS_HEIGHT);
    if fits(area, stats_rect) {
        draw_stats(f, stats_rect, data);
    }

    let conv_y = stats_rect.bottom() + 1;
    if area.height > conv_y + 4 {
        let conv_rect = Rect::new(area.x + 1, conv_y, STATS_WIDTH, area.height - conv_y - 2);
        if fits(area, conv_rect) {
            draw_conversation(f, conv_rect, data.entries);
        }
    }

    if area.width > LEVEL_BAR_WIDTH && area.height >= 3 {
        let bar_rect = Rect::new(
            area.x + (area.width - LEVEL_BAR_WIDTH) / 2,
            area.bottom() - 3,
            LEVEL_BAR_WIDTH,
            3,
        );
        if fits(area, bar_rect) {
            draw_level_bar(f, bar_rect, amp_visual);
        }
    }

    if area.width > SIDE_WIDTH + 2 && area.height > SIGNAL_HEIGHT + 1 {
        let signal_rect = Rect::new(
            area.right() - SIDE_WIDTH - 1,
            area.bottom() - SIGNAL_HEIGHT - 1,
            SIDE_WIDTH,
            SIGNAL_HEIGHT,
        );
        if fits(area, signal_rect) {
            draw_signal(f, signal_rect, data, amp_visual);
        }

        if signal_rect.y > SYSTEM_HEIGHT {
            let system_rect = Rect::new(
                signal_rect.x,
                signal_rect.y - SYSTEM_HEIGHT - 1,
                SIDE_WIDTH,
                SYSTEM_HEIGHT,
            );
            if fits(area, system_rect) {
                draw_system(f, system_rect, data);
            }
        }
    }
}

fn fits(area: Rect, rect: Rect) -> bool {
    rect.width >= 8
        && rect.height >= 3
        && rect.right() <= area.right()
        && rect.bottom() <= area.bottom()
}

fn draw_stats(f: &mut Frame<'_>, rect: Rect, data: &OverlayData<'_>) {
    let text_style = Style::default().fg(TEXT_PRIMARY.into());
    let lines = vec![
        Line::styled(format!("Theme: {}", data.theme.name()), text_style),
        Line::styled(
            format!("Bold: {}", if data.bold { "ON" } else { "OFF" }),
            text_style,
        ),
        Line::styled(
            format!("Loudness: {:>3} %", (data.loudness * 100.0) as u32),
            text_style,
        ),
        Line::styled(format!("FPS: {:>3}", data.fps as u32), text_style),
    ];
    f.render_widget(Paragraph::new(lines).block(panel_block("ANALYTICS")), rect);
}

fn draw_conversation(f: &mut Frame<'_>, rect: Rect, entries: &[TranscriptEntry]) {
    let inner_width = usize::from(rect.width.saturating_sub(2));
    let inner_height = usize::from(rect.height.saturating_sub(2));
    if inner_width < 8 || inner_height < 2 {
        return;
    }

    let label_width = 6;
    let text_width = inner_width - label_width;

    let mut lines: Vec<Line> = vec![Line::styled(
        "YOU  <->  SIDD",
        Style::default().fg(TEXT_DIM.into()),
    )];

    // Chronological order, most recent window; drawing stops when the panel
    // runs out of rows rather than overflowing it.
    let recent = entries.iter().rev().take(10).rev();
    'outer: for entry in recent {
        let speaker_color = match entry.speaker {
            Speaker::Sidd => SPEAKER_SIDD,
            Speaker::You => SPEAKER_YOU,
        };
        for (i, wrapped) in wrap_text(&entry.text, text_width).into_iter().enumerate() {
            if lines.len() >= inner_height {
                break 'outer;
            }
            let label = if i == 0 {
                format!("{:<label_width$}", format!("{}:", entry.speaker.label()))
            } else {
                " ".repeat(label_width)
            };
            lines.push(Line::from(vec![
                Span::styled(label, Style::default().fg(speaker_color.into())),
                Span::styled(wrapped, Style::default().fg(TEXT_PRIMARY.into())),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines).block(panel_block("CONVERSATION")), rect);
}

fn draw_level_bar(f: &mut Frame<'_>, rect: Rect, amp_visual: f64) {
    let fill = LEVEL_LOW.mix(LEVEL_HIGH, amp_visual);
    let gauge = Gauge::default()
        .block(panel_block("VOICE LEVEL"))
        .gauge_style(Style::default().fg(fill.into()))
        .use_unicode(true)
        .label(format!("{:>3} %", (amp_visual * 100.0) as u32))
        .ratio(amp_visual.clamp(0.0, 1.0));
    f.render_widget(gauge, rect);
}

fn draw_signal(f: &mut Frame<'_>, rect: Rect, data: &OverlayData<'_>, amp_visual: f64) {
    let palette = data.theme.palette();
    let bars: Vec<Bar> = (0..SIGNAL_BARS)
        .map(|i| {
            let phase = data.now * 4.0 + i as f64 * 0.6;
            let wave = (phase.sin() + 1.0) / 2.0;
            let value = (0.25 + 0.75 * amp_visual) * wave;
            let color = palette.quiet.mix(palette.loud, value);
            Bar::default()
                .value((value * 100.0) as u64)
                .text_value(String::new())
                .style(Style::default().fg(color.into()))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel_block("REAL-TIME SIGNAL"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
        .max(100);
    f.render_widget(chart, rect);
}

fn draw_system(f: &mut Frame<'_>, rect: Rect, data: &OverlayData<'_>) {
    let title = format!("SYSTEM PERFORMANCE [{}c] LIVE", data.cpu_count);
    let block = panel_block(&title);
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let Some(stats) = data.stats else {
        let notice = Paragraph::new(Line::styled(
            "telemetry unavailable",
            Style::default().fg(TEXT_DIM.into()),
        ));
        f.render_widget(notice, inner);
        return;
    };

    let rows: [(&str, f64, String); 4] = [
        ("CPU", stats.cpu_percent / 100.0, format!("{:5.1}%", stats.cpu_percent)),
        ("MEM", stats.memory_percent / 100.0, format!("{:5.1}%", stats.memory_percent)),
        ("DISK", stats.disk_percent / 100.0, format!("{:5.1}%", stats.disk_percent)),
        (
            "NET",
            (stats.network_mb / 100.0).min(1.0),
            format!("{:5.1}MB", stats.network_mb),
        ),
    ];

    for (i, (label, ratio, value)) in rows.iter().enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.bottom() {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, 1);
        let color = if *ratio < METRIC_ALERT { LEVEL_LOW } else { LEVEL_HIGH };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color.into()).bg(Color::Rgb(20, 30, 50)))
            .use_unicode(true)
            .label(format!("{label:<5}{value}"))
            .ratio(ratio.clamp(0.0, 1.0));
        f.render_widget(gauge, row);
    }
}
