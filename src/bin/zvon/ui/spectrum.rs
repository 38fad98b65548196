//! Output spectrum widget
//!
//! Hann-windowed FFT of the latest mixed output, folded into log-spaced
//! bands and drawn as a level curve.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{f32::consts::TAU, sync::Arc};

/// FFT size in samples
pub const FFT_LEN: usize = 1024;
/// Number of displayed bands
const BANDS: usize = 48;
/// Bottom of the level scale
const FLOOR_DB: f64 = -90.0;
/// Lowest displayed frequency in Hz
const LOW_HZ: f32 = 30.0;

pub struct Spectrum {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin range of each band, `BANDS + 1` edges
    edges: Vec<usize>,
    /// (band index, level in dB)
    levels: Vec<(f64, f64)>,
}

impl Spectrum {
    pub fn new(sample_rate: f32) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_LEN);

        let window = (0..FFT_LEN)
            .map(|i| 0.5 - 0.5 * (TAU * i as f32 / (FFT_LEN - 1) as f32).cos())
            .collect();

        let hz_per_bin = sample_rate / FFT_LEN as f32;
        let high_hz = (sample_rate / 2.0).min(16_000.0).max(LOW_HZ * 2.0);
        let edges = (0..=BANDS)
            .map(|band| {
                let hz = LOW_HZ * (high_hz / LOW_HZ).powf(band as f32 / BANDS as f32);
                ((hz / hz_per_bin) as usize).clamp(1, FFT_LEN / 2 - 1)
            })
            .collect();

        let levels = (0..BANDS).map(|band| (band as f64, FLOOR_DB)).collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); FFT_LEN],
            edges,
            levels,
        }
    }

    /// Recompute levels from the newest `FFT_LEN` samples, if there are enough
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() < FFT_LEN {
            return;
        }
        let recent = &samples[samples.len() - FFT_LEN..];

        for ((bin, &s), &w) in self.scratch.iter_mut().zip(recent).zip(&self.window) {
            *bin = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // A full-scale sine through a Hann window peaks at N/4
        let full_scale = (FFT_LEN as f32 / 4.0).powi(2);
        for (band, level) in self.levels.iter_mut().enumerate() {
            let start = self.edges[band];
            let end = self.edges[band + 1].max(start + 1);
            let peak = self.scratch[start..end]
                .iter()
                .map(|c| c.norm_sqr())
                .fold(0.0f32, f32::max);
            let db = 10.0 * ((peak / full_scale).max(1e-12) as f64).log10();
            level.1 = db.max(FLOOR_DB);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&self.levels);

        let chart = Chart::new(vec![dataset])
            .block(Block::default().title(" Spectrum ").borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .bounds([0.0, (BANDS - 1) as f64])
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .y_axis(
                Axis::default()
                    .bounds([FLOOR_DB, 0.0])
                    .labels(vec!["-90", "-45", "0"])
                    .style(Style::default().fg(Color::DarkGray)),
            );

        frame.render_widget(chart, area);
    }
}
