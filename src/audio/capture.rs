//! CPAL input stream ownership with fault recovery.
//!
//! The device callback converts whatever format the hardware produces into
//! i16 mono frames of [`FRAME_SAMPLES`] and hands them to the render thread
//! over a bounded channel. Reads never block past a short timeout and never
//! fail outward: a faulted stream gets one rebuild attempt with identical
//! parameters, after which the input degrades to synthetic silence.

use super::level::{FRAME_SAMPLES, SAMPLE_RATE};
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on waiting for the callback thread each frame.
const FRAME_TIMEOUT: Duration = Duration::from_millis(40);

/// Pending frames tolerated before the callback starts dropping.
const FRAME_CHANNEL_CAPACITY: usize = 8;

/// Owns the microphone stream for the process lifetime.
pub struct AudioInput {
    preferred: Option<String>,
    state: Option<StreamState>,
}

struct StreamState {
    // Held only so the device stays open; dropping it releases the handle.
    _stream: cpal::Stream,
    frames: Receiver<Vec<i16>>,
    fault: Arc<AtomicBool>,
}

impl AudioInput {
    /// List input device names for the CLI selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }

    /// Open the capture stream. Failure is logged and degrades to silence
    /// rather than propagating; the frame pipeline must never be starved.
    pub fn open(preferred: Option<String>) -> Self {
        let state = match build_stream(preferred.as_deref()) {
            Ok(state) => Some(state),
            Err(err) => {
                tracing::warn!(error = %err, "audio open failed, running silent");
                None
            }
        };
        Self { preferred, state }
    }

    /// A permanently-silent input for `--no-audio` runs.
    pub fn silent() -> Self {
        Self {
            preferred: None,
            state: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state.is_some()
    }

    /// Fetch the most recent frame, padded or truncated to [`FRAME_SAMPLES`].
    ///
    /// Returns an all-zero frame when the device is unavailable, when no data
    /// arrived within the timeout, or after a failed recovery.
    pub fn read_frame(&mut self) -> Vec<i16> {
        if self.state.as_ref().is_some_and(|s| s.fault.swap(false, Ordering::Relaxed)) {
            self.reopen();
        }

        let outcome = match self.state.as_ref() {
            None => return silent_frame(),
            Some(state) => {
                // Drain to the newest frame so loudness tracks the live signal
                // even if the render loop fell behind for a few ticks.
                let mut latest = None;
                while let Ok(frame) = state.frames.try_recv() {
                    latest = Some(frame);
                }
                match latest {
                    Some(frame) => Ok(frame),
                    None => state.frames.recv_timeout(FRAME_TIMEOUT),
                }
            }
        };

        match outcome {
            Ok(frame) => normalize(frame),
            Err(RecvTimeoutError::Timeout) => silent_frame(),
            Err(RecvTimeoutError::Disconnected) => {
                self.reopen();
                silent_frame()
            }
        }
    }

    /// One stop/close/reopen cycle with identical parameters.
    fn reopen(&mut self) {
        self.state = None;
        match build_stream(self.preferred.as_deref()) {
            Ok(state) => {
                tracing::info!("audio stream reopened");
                self.state = Some(state);
            }
            Err(err) => {
                tracing::warn!(error = %err, "audio reopen failed, degrading to silence");
            }
        }
    }

    /// Release the device; part of the ordered shutdown sequence.
    pub fn close(&mut self) {
        self.state = None;
    }
}

fn silent_frame() -> Vec<i16> {
    vec![0i16; FRAME_SAMPLES]
}

fn normalize(mut frame: Vec<i16>) -> Vec<i16> {
    frame.resize(FRAME_SAMPLES, 0);
    frame
}

fn build_stream(preferred: Option<&str>) -> Result<StreamState> {
    let host = cpal::default_host();
    let device = match preferred {
        Some(name) => {
            let mut devices = host.input_devices().context("no input devices available")?;
            devices
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("input device '{name}' not found"))?
        }
        None => host
            .default_input_device()
            .context("no default input device available")?,
    };

    let default_config = device.default_input_config()?;
    let format = default_config.sample_format();
    let mut config: StreamConfig = default_config.into();
    let channels = usize::from(config.channels.max(1));

    let (tx, rx) = bounded(FRAME_CHANNEL_CAPACITY);
    let fault = Arc::new(AtomicBool::new(false));
    let dispatcher = FrameDispatcher::new(FRAME_SAMPLES, tx);

    // Ask for the fixed capture rate first; fall back to the device default.
    config.sample_rate = SampleRate(SAMPLE_RATE);
    let stream = match open_with(&device, &config, format, channels, dispatcher, fault.clone()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::debug!(error = %err, "fixed-rate open failed, using device default");
            let default_config = device.default_input_config()?;
            let config: StreamConfig = default_config.into();
            let (tx, new_rx) = bounded(FRAME_CHANNEL_CAPACITY);
            let dispatcher = FrameDispatcher::new(FRAME_SAMPLES, tx);
            let stream = open_with(&device, &config, format, channels, dispatcher, fault.clone())?;
            return Ok(StreamState {
                _stream: stream,
                frames: new_rx,
                fault,
            });
        }
    };

    Ok(StreamState {
        _stream: stream,
        frames: rx,
        fault,
    })
}

fn open_with(
    device: &cpal::Device,
    config: &StreamConfig,
    format: SampleFormat,
    channels: usize,
    mut dispatcher: FrameDispatcher,
    fault: Arc<AtomicBool>,
) -> Result<cpal::Stream> {
    // Surface callback-thread errors to the render thread via the fault flag.
    let err_fn = move |err: cpal::StreamError| {
        tracing::debug!(error = %err, "audio stream error");
        fault.store(true, Ordering::Relaxed);
    };

    let stream = match format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _| dispatcher.push(data, channels, |s| s),
            err_fn,
            None,
        )?,
        SampleFormat::U16 => device.build_input_stream(
            config,
            move |data: &[u16], _| {
                dispatcher.push(data, channels, |s| (i32::from(s) - 32_768) as i16)
            },
            err_fn,
            None,
        )?,
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _| {
                dispatcher.push(data, channels, |s| (s.clamp(-1.0, 1.0) * 32_767.0) as i16)
            },
            err_fn,
            None,
        )?,
        other => return Err(anyhow!("unsupported sample format {other:?}")),
    };
    stream.play()?;
    Ok(stream)
}

/// Accumulates callback samples into fixed frames, downmixing to mono.
struct FrameDispatcher {
    frame_samples: usize,
    pending: Vec<i16>,
    sender: Sender<Vec<i16>>,
    dropped: usize,
}

impl FrameDispatcher {
    fn new(frame_samples: usize, sender: Sender<Vec<i16>>) -> Self {
        Self {
            frame_samples: frame_samples.max(1),
            pending: Vec::with_capacity(frame_samples),
            sender,
            dropped: 0,
        }
    }

    fn push<T, F>(&mut self, data: &[T], channels: usize, mut convert: F)
    where
        T: Copy,
        F: FnMut(T) -> i16,
    {
        append_downmixed(&mut self.pending, data, channels, &mut convert);

        while self.pending.len() >= self.frame_samples {
            let frame: Vec<i16> = self.pending.drain(..self.frame_samples).collect();
            match self.sender.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped += 1;
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }
}

/// Average interleaved channels down to mono.
fn append_downmixed<T, F>(buf: &mut Vec<i16>, data: &[T], channels: usize, convert: &mut F)
where
    T: Copy,
    F: FnMut(T) -> i16,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(|s| convert(s)));
        return;
    }

    let mut acc = 0i32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += i32::from(convert(sample));
        count += 1;
        if count == channels {
            buf.push((acc / channels as i32) as i16);
            acc = 0;
            count = 0;
        }
    }
    if count > 0 {
        buf.push((acc / count as i32) as i16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_stereo_frames() {
        let mut buf = Vec::new();
        append_downmixed(&mut buf, &[100i16, 300, -50, 50], 2, &mut |s| s);
        assert_eq!(buf, vec![200, 0]);
    }

    #[test]
    fn downmix_handles_trailing_partial_frame() {
        let mut buf = Vec::new();
        append_downmixed(&mut buf, &[10i16, 20, 30], 2, &mut |s| s);
        assert_eq!(buf, vec![15, 30]);
    }

    #[test]
    fn dispatcher_emits_fixed_frames() {
        let (tx, rx) = bounded(4);
        let mut dispatcher = FrameDispatcher::new(4, tx);
        dispatcher.push(&[1i16, 2, 3, 4, 5, 6], 1, |s| s);
        assert_eq!(rx.try_recv().unwrap(), vec![1, 2, 3, 4]);
        assert!(rx.try_recv().is_err());
        dispatcher.push(&[7i16, 8], 1, |s| s);
        assert_eq!(rx.try_recv().unwrap(), vec![5, 6, 7, 8]);
    }

    #[test]
    fn dispatcher_drops_when_channel_is_full() {
        let (tx, rx) = bounded(1);
        let mut dispatcher = FrameDispatcher::new(2, tx);
        dispatcher.push(&[1i16, 2, 3, 4, 5, 6], 1, |s| s);
        assert_eq!(dispatcher.dropped, 2);
        assert_eq!(rx.try_recv().unwrap(), vec![1, 2]);
    }

    #[test]
    fn normalize_pads_and_truncates() {
        assert_eq!(normalize(vec![5i16; 10]).len(), FRAME_SAMPLES);
        assert_eq!(normalize(vec![5i16; FRAME_SAMPLES * 2]).len(), FRAME_SAMPLES);
        let padded = normalize(vec![5i16; 10]);
        assert!(padded[10..].iter().all(|&s| s == 0));
    }

    #[test]
    fn silent_input_always_yields_zero_frames() {
        let mut input = AudioInput::silent();
        let frame = input.read_frame();
        assert_eq!(frame.len(), FRAME_SAMPLES);
        assert!(frame.iter().all(|&s| s == 0));
        assert!(!input.is_live());
    }
}
