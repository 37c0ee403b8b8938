//! TUI module for partials
//!
//! Keyboard control of the engine plus live views of the telemetry it
//! publishes.

mod controls;
mod modulators;
mod spectrum;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use partials::{engine::TelemetrySnapshot, modulation::ModulatorKind, synth::ControlMessage, EngineConfig};

use controls::ControlState;
use modulators::render_modulators;
use spectrum::render_spectrum;
use transport::render_transport;

/// UI application state
pub struct UiApp {
    control_tx: Producer<ControlMessage>,
    telemetry_rx: Consumer<TelemetrySnapshot>,
    /// Latest snapshot received from the audio thread
    latest: TelemetrySnapshot,
    /// What the UI believes the engine holds
    controls: ControlState,
    headroom: f64,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<ControlMessage>,
        telemetry_rx: Consumer<TelemetrySnapshot>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            control_tx,
            telemetry_rx,
            latest: TelemetrySnapshot::new(),
            controls: ControlState::new(config.base_frequency),
            headroom: config.headroom,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_telemetry();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_telemetry(&mut self) {
        // Keep only the latest snapshot
        while let Ok(snapshot) = self.telemetry_rx.pop() {
            self.latest = snapshot;
        }
    }

    fn send(&mut self, msg: ControlMessage) {
        // A full queue means the audio thread is stalled; dropping is fine
        if self.control_tx.push(msg).is_err() {
            tracing::warn!(?msg, "control queue full, message dropped");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let msg = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char(' ') => Some(self.controls.toggle_gate()),
            KeyCode::Up => Some(self.controls.transpose(1)),
            KeyCode::Down => Some(self.controls.transpose(-1)),
            KeyCode::Char('r') => Some(ControlMessage::Start),
            KeyCode::Char(c @ '0'..='9') => {
                // 1..9 then 0 for the tenth modulator
                let slot = (c as usize + 10 - '1' as usize) % 10;
                ModulatorKind::ALL
                    .get(slot)
                    .map(|&kind| self.controls.toggle_modulator(kind))
            }
            KeyCode::Tab => {
                self.controls.select_next_modulator();
                None
            }
            KeyCode::Left => {
                self.controls.select_param(-1);
                None
            }
            KeyCode::Right => {
                self.controls.select_param(1);
                None
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.controls.nudge_param(1.0),
            KeyCode::Char('-') => self.controls.nudge_param(-1.0),
            _ => None,
        };
        if let Some(msg) = msg {
            self.send(msg);
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                             // Transport bar
                Constraint::Min(10),                               // Partial amplitudes
                Constraint::Length(ModulatorKind::COUNT as u16 + 2), // Modulators
                Constraint::Length(1),                             // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.latest, &self.controls);
        render_spectrum(frame, chunks[1], &self.latest, self.headroom);
        render_modulators(frame, chunks[2], &self.latest, &self.controls);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Gate  [Up/Down] Pitch  [1-0] Toggle  [Tab/Left/Right] Select  [+/-] Adjust  [R] Restart",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
