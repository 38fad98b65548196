//! Channel table widget

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};
use zvon::{boxes::BoxInstance, channel::Channel, Synth};

/// Short state readout for a box (ring fill, playback position)
fn box_state(instance: &BoxInstance) -> String {
    if let Some(ring) = instance.as_ring() {
        return format!("{}/{} pairs", ring.occupied() / 2, ring.size() / 2);
    }
    if let Some(samples) = instance.as_samples() {
        return format!("{}/{}", samples.head(), samples.len());
    }
    String::new()
}

fn channel_row(index: usize, channel: &Channel) -> Row<'static> {
    let stack = channel
        .boxes()
        .iter()
        .map(|b| b.kind().name())
        .collect::<Vec<_>>()
        .join(" > ");
    let state = channel
        .boxes()
        .iter()
        .map(box_state)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let style = if channel.is_enabled() {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Row::new(vec![
        format!("{index:>2}"),
        if channel.is_enabled() { "on" } else { "off" }.to_string(),
        format!("{:.2}", channel.volume()),
        format!("{:+.2}", channel.pan()),
        stack,
        state,
    ])
    .style(style)
}

/// Render every channel that is enabled or has boxes on its stack
pub fn render_channels(frame: &mut Frame, area: Rect, synth: &Synth) {
    let rows: Vec<Row> = synth
        .channels()
        .enumerate()
        .filter(|(_, chan)| chan.is_enabled() || !chan.boxes().is_empty())
        .map(|(index, chan)| channel_row(index, chan))
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(24),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ch", "on", "vol", "pan", "stack", "state"])
                .style(Style::default().fg(Color::Yellow)),
        )
        .block(Block::default().title(" Channels ").borders(Borders::ALL));

    frame.render_widget(table, area);
}
