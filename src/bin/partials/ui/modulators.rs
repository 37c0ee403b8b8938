//! Modulator list: enable state, parameters and a per-partial sparkline

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use partials::{engine::TelemetrySnapshot, modulation::ModulatorKind};

use super::controls::ControlState;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn sparkline(values: &[f32]) -> String {
    values
        .iter()
        .map(|&v| {
            let idx = (v.clamp(0.0, 1.0) * (LEVELS.len() - 1) as f32).round() as usize;
            LEVELS[idx]
        })
        .collect()
}

pub fn render_modulators(
    frame: &mut Frame,
    area: Rect,
    snapshot: &TelemetrySnapshot,
    controls: &ControlState,
) {
    let block = Block::default().title(" Modulators ").borders(Borders::ALL);

    let lines: Vec<Line> = ModulatorKind::ALL
        .iter()
        .enumerate()
        .map(|(slot, &kind)| {
            let enabled = controls.enabled[kind.index()];
            let selected = kind == controls.selected;
            let key = (slot + 1) % 10;

            let mut name_style = Style::default().fg(if enabled { Color::Green } else { Color::DarkGray });
            if selected {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }

            let mut spans = vec![
                Span::styled(
                    format!(" {} [{}] {:<18}", key, if enabled { 'x' } else { ' ' }, kind.name()),
                    name_style,
                ),
                Span::styled(
                    sparkline(snapshot.modulator(kind)),
                    Style::default().fg(if enabled { Color::Cyan } else { Color::DarkGray }),
                ),
                Span::raw("  "),
            ];

            for (i, spec) in kind.params().iter().enumerate() {
                let value = controls.values[kind.index()][i];
                let style = if selected && i == controls.param {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default().fg(Color::White)
                };
                spans.push(Span::styled(format!("{}={:.2}", spec.name, value), style));
                spans.push(Span::raw(" "));
            }

            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
