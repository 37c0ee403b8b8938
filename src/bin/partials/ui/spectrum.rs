//! Per-partial amplitude bars

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use partials::{engine::TelemetrySnapshot, NUM_PARTIALS};

/// Bar heights are in percent of full scale.
const SCALE: f64 = 100.0;

pub fn render_spectrum(frame: &mut Frame, area: Rect, snapshot: &TelemetrySnapshot, headroom: f64) {
    let block = Block::default().title(" Partials ").borders(Borders::ALL);
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / NUM_PARTIALS).max(1) as u16;

    let bars: Vec<Bar> = snapshot
        .amplitude
        .iter()
        .map(|&amp| {
            // Undo headroom so a lone unmodulated partial reads full scale
            let level = (amp as f64 * headroom).clamp(0.0, 1.0);
            let color = if level > 0.0 {
                Color::Cyan
            } else {
                Color::DarkGray
            };
            Bar::default()
                .value((level * SCALE) as u64)
                .text_value(String::new())
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(0)
        .max(SCALE as u64)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}
