//! RMS loudness over fixed-size i16 frames.

/// Samples per frame requested from the input device.
pub const FRAME_SAMPLES: usize = 1024;

/// Capture sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// RMS value (i16 scale) that maps to full loudness.
const SENSITIVITY: f64 = 3000.0;

/// Normalized loudness in [0,1] for one frame of samples.
///
/// Undersized buffers are treated as zero-padded and oversized buffers as
/// truncated to [`FRAME_SAMPLES`], so a length mismatch can never skew the
/// result or crash the frame pipeline.
pub fn loudness(samples: &[i16]) -> f32 {
    let used = samples.len().min(FRAME_SAMPLES);
    if used == 0 {
        return 0.0;
    }
    let sum_squares: f64 = samples[..used]
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    // Zero-padding only changes the divisor, so divide by the full frame size.
    let rms = (sum_squares / FRAME_SAMPLES as f64).sqrt();
    (rms / SENSITIVITY).min(1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_silent() {
        assert_eq!(loudness(&[]), 0.0);
    }

    #[test]
    fn all_zero_buffer_is_silent() {
        assert_eq!(loudness(&[0i16; FRAME_SAMPLES]), 0.0);
    }

    #[test]
    fn full_scale_buffer_clamps_to_one() {
        assert_eq!(loudness(&[i16::MAX; FRAME_SAMPLES]), 1.0);
        assert_eq!(loudness(&[i16::MIN; FRAME_SAMPLES]), 1.0);
    }

    #[test]
    fn undersized_buffer_acts_zero_padded() {
        let half = vec![2000i16; FRAME_SAMPLES / 2];
        let mut padded = half.clone();
        padded.resize(FRAME_SAMPLES, 0);
        assert_eq!(loudness(&half), loudness(&padded));
    }

    #[test]
    fn oversized_buffer_is_truncated() {
        let mut long = vec![1500i16; FRAME_SAMPLES];
        long.extend_from_slice(&[i16::MAX; 256]);
        assert_eq!(loudness(&long), loudness(&long[..FRAME_SAMPLES]));
    }

    #[test]
    fn loudness_is_always_in_unit_range() {
        for amplitude in [1i16, 100, 1000, 5000, 20000, i16::MAX] {
            let frame = vec![amplitude; FRAME_SAMPLES];
            let level = loudness(&frame);
            assert!((0.0..=1.0).contains(&level), "level {level} for amplitude {amplitude}");
        }
    }

    #[test]
    fn louder_input_yields_higher_level() {
        let quiet = loudness(&vec![500i16; FRAME_SAMPLES]);
        let loud = loudness(&vec![2500i16; FRAME_SAMPLES]);
        assert!(loud > quiet);
    }
}
