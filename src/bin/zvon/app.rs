//! Player - device setup and the PCM path to the audio thread

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info};

use zvon::{device::AudioSink, event::Command, EngineConfig, Synth};

use super::ui::{spectrum::FFT_LEN, UiApp};
use super::Args;

/// Capacity of the control → engine command queue
const COMMAND_QUEUE_LEN: usize = 64;

pub struct Player {
    args: Args,
}

impl Player {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Open the device, start the stream and hand over to the UI loop
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        // Interleaved stereo i16 between mixer and callback
        let pcm_len = (sample_rate * self.args.latency_ms / 1000).max(256) as usize * 2;
        let (pcm_tx, pcm_rx) = RingBuffer::<i16>::new(pcm_len);
        let (commands_tx, commands_rx) = RingBuffer::<Command>::new(COMMAND_QUEUE_LEN);

        info!(sample_rate, channels, pcm_len, "output device ready");

        let stream = device
            .build_output_stream(
                &config.into(),
                device_callback(pcm_rx, channels),
                |err| error!("stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        let synth = Synth::new(EngineConfig::new(sample_rate).master_volume(self.args.volume));
        let mut app = UiApp::new(
            synth,
            commands_tx,
            commands_rx,
            OutputTap::new(pcm_tx),
            self.args.volume,
        );
        if self.args.tone {
            app.start_tone();
        }

        let mut terminal = ratatui::init();
        let res = app.run(&mut terminal);
        ratatui::restore();
        res
    }
}

/// Pop stereo frames from the PCM ring into the device buffer.
///
/// Extra device channels get silence; a mono device gets the average.
fn device_callback(
    mut pcm_rx: Consumer<i16>,
    channels: usize,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    move |data: &mut [f32], _| {
        for frame in data.chunks_mut(channels) {
            let (left, right) = if pcm_rx.slots() >= 2 {
                (
                    pcm_rx.pop().unwrap_or(0) as f32 / 32768.0,
                    pcm_rx.pop().unwrap_or(0) as f32 / 32768.0,
                )
            } else {
                (0.0, 0.0)
            };

            match frame {
                [mono] => *mono = 0.5 * (left + right),
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }
}

/// PCM sink that forwards to the device ring and keeps recent output
/// (mono, float) for the spectrum view.
pub struct OutputTap {
    producer: Producer<i16>,
    recent: Vec<f32>,
}

impl OutputTap {
    pub fn new(producer: Producer<i16>) -> Self {
        Self {
            producer,
            recent: Vec::with_capacity(FFT_LEN * 2),
        }
    }

    /// The most recent mono samples, oldest first (at most `FFT_LEN * 2`)
    pub fn recent(&self) -> &[f32] {
        &self.recent
    }
}

impl AudioSink for OutputTap {
    fn available_bytes(&self) -> usize {
        self.producer.available_bytes()
    }

    fn write(&mut self, pcm: &[i16]) {
        self.producer.write(pcm);

        self.recent.extend(
            pcm.chunks_exact(2)
                .map(|pair| (pair[0] as f32 + pair[1] as f32) / 65536.0),
        );
        if self.recent.len() > FFT_LEN * 2 {
            let excess = self.recent.len() - FFT_LEN;
            self.recent.drain(..excess);
        }
    }
}
