//! Transport bar widget - gate, pitch, position and engine counters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use partials::engine::TelemetrySnapshot;

use super::controls::ControlState;

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    snapshot: &TelemetrySnapshot,
    controls: &ControlState,
) {
    let block = Block::default().title(" partials ").borders(Borders::ALL);

    let (gate_symbol, gate_color) = if snapshot.gate {
        ("● Gate on ", Color::Green)
    } else {
        ("○ Gate off", Color::Yellow)
    };
    let fundamental = controls.base_frequency * snapshot.pitch_ratio as f64;
    let stats = snapshot.stats;

    let line = Line::from(vec![
        Span::styled(format!(" {}  ", gate_symbol), Style::default().fg(gate_color)),
        Span::styled(
            format!("{:+} st  {:.1} Hz  ", controls.semitones, fundamental),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("@{}  ", snapshot.sample_position),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "blocks {}  overrides {}  dropped {}  silent {}  capped {}",
                stats.blocks,
                stats.overrides,
                stats.dropped_batches,
                stats.silent_blocks,
                stats.capped_events
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
