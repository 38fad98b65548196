//! TUI module for zvon
//!
//! Shows the channel table and the output spectrum, and turns key presses
//! into engine commands.

mod channels;
pub mod spectrum;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::{f32::consts::TAU, time::Duration};
use tracing::warn;

use zvon::{
    channel::ChannelParams,
    device::AudioSink,
    event::{Command, NOTE_ON},
    Synth,
};

use super::app::OutputTap;
use channels::render_channels;
use spectrum::Spectrum;

const TONE_CHANNEL: usize = 0;
const STREAM_CHANNEL: usize = 1;
const PLUCK_CHANNEL: usize = 2;

/// Pitch of the sawtooth streamed into the circular buffer box
const STREAM_HZ: f32 = 110.0;
/// Length of the sample loaded by the pluck key, in seconds
const PLUCK_SECONDS: f32 = 0.8;

pub struct UiApp {
    synth: Synth,
    commands_tx: Producer<Command>,
    commands_rx: Consumer<Command>,
    output: OutputTap,
    spectrum: Spectrum,
    master_volume: f32,
    /// Whether the streaming channel is being fed
    streaming: bool,
    stream_phase: (f32, f32),
    produced: u64,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        synth: Synth,
        commands_tx: Producer<Command>,
        commands_rx: Consumer<Command>,
        output: OutputTap,
        master_volume: f32,
    ) -> Self {
        let spectrum = Spectrum::new(synth.config().sample_rate as f32);
        Self {
            synth,
            commands_tx,
            commands_rx,
            output,
            spectrum,
            master_volume,
            streaming: false,
            stream_phase: (0.0, 0.0),
            produced: 0,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.pump();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.synth.stop_all();
        Ok(())
    }

    /// Apply queued commands, top up the stream and mix into the free space
    fn pump(&mut self) {
        self.synth.drain(&mut self.commands_rx);

        if self.streaming {
            self.feed_stream();
        }

        let frames = self.output.available_frames();
        let produced = self.synth.mix(&mut self.output, frames, self.master_volume);
        self.produced += produced as u64;

        self.spectrum.update(self.output.recent());
    }

    /// Fill the circular buffer box with a detuned stereo sawtooth
    fn feed_stream(&mut self) {
        let free_pairs = match self
            .synth
            .channel(STREAM_CHANNEL)
            .ok()
            .and_then(|chan| chan.boxes().first())
            .and_then(|b| b.as_ring())
        {
            Some(ring) => ring.free_pairs(),
            None => {
                self.streaming = false;
                return;
            }
        };

        let sample_rate = self.synth.config().sample_rate as f32;
        let (inc_l, inc_r) = (STREAM_HZ / sample_rate, STREAM_HZ * 1.005 / sample_rate);
        for _ in 0..free_pairs {
            let (l, r) = &mut self.stream_phase;
            let left = 2.0 * *l - 1.0;
            let right = 2.0 * *r - 1.0;
            *l = (*l + inc_l).fract();
            *r = (*r + inc_r).fract();

            if let Err(err) = self.synth.change(STREAM_CHANNEL, 0, NOTE_ON, left, right) {
                warn!(%err, "stream write failed");
                self.streaming = false;
                return;
            }
        }
    }

    fn send(&mut self, command: Command) {
        if self.commands_tx.push(command).is_err() {
            warn!("command queue full");
        }
    }

    pub fn start_tone(&mut self) {
        self.send(Command::Stop {
            channel: Some(TONE_CHANNEL),
        });
        self.send(Command::Push {
            channel: TONE_CHANNEL,
            kind: "test".into(),
        });
        self.send(Command::Set {
            channel: TONE_CHANNEL,
            params: ChannelParams::new().enabled(true).volume(0.5).pan(-0.3),
        });
    }

    fn start_stream(&mut self) {
        self.send(Command::Stop {
            channel: Some(STREAM_CHANNEL),
        });
        self.send(Command::Push {
            channel: STREAM_CHANNEL,
            kind: "custom_stereo".into(),
        });
        self.send(Command::Set {
            channel: STREAM_CHANNEL,
            params: ChannelParams::new().enabled(true).volume(0.2).pan(0.3),
        });
        self.streaming = true;
    }

    /// Load a decaying two-partial pluck and play it once
    fn load_pluck(&mut self) {
        let sample_rate = self.synth.config().sample_rate as f32;
        let len = (sample_rate * PLUCK_SECONDS) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate;
                let decay = (-6.0 * t).exp();
                decay * (0.6 * (TAU * 330.0 * t).sin() + 0.3 * (TAU * 660.0 * t).sin())
            })
            .collect();

        self.send(Command::LoadSamples {
            channel: PLUCK_CHANNEL,
            samples,
            stereo: false,
        });
        self.send(Command::Set {
            channel: PLUCK_CHANNEL,
            params: ChannelParams::new().enabled(true).volume(0.6),
        });
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('t') => self.start_tone(),
            KeyCode::Char('c') => self.start_stream(),
            KeyCode::Char('p') => self.load_pluck(),
            KeyCode::Char('r') => self.send(Command::Change {
                channel: PLUCK_CHANNEL,
                index: 0,
                param: NOTE_ON,
                value: 0.0,
                elem: 0.0,
            }),
            KeyCode::Char('s') => {
                self.streaming = false;
                self.send(Command::Stop { channel: None });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.master_volume = (self.master_volume + 0.05).min(1.0);
            }
            KeyCode::Char('-') => {
                self.master_volume = (self.master_volume - 0.05).max(0.0);
            }
            _ => {}
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Status line
                Constraint::Min(6),     // Channel table
                Constraint::Length(12), // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        let status = Paragraph::new(format!(
            " zvon  {} Hz  master {:.2}  mixed {} frames",
            self.synth.config().sample_rate,
            self.master_volume,
            self.produced
        ))
        .style(Style::default().fg(Color::Cyan));
        frame.render_widget(status, chunks[0]);

        render_channels(frame, chunks[1], &self.synth);
        self.spectrum.render(frame, chunks[2]);

        let help = Paragraph::new(
            " [T] Tone  [C] Stream  [P] Pluck  [R] Rewind  [S] Stop all  [+/-] Volume  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
