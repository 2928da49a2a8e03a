// Loudness meter for cockpit UI feedback
//
// Produces one dBFS value per capture buffer. The level is derived from the
// largest *signed* sample in the buffer, not the largest magnitude, so a
// buffer whose energy sits entirely below zero reads as silence.
//
// A negative peak has no logarithm. Taking `log10` of it directly would
// report NaN; negative-only buffers report `SILENCE_DB` instead.

/// Full-scale reference for 16-bit PCM.
const FULL_SCALE: f64 = i16::MAX as f64;

/// Level reported for a buffer with no positive sample (silence, empty or
/// negative-only buffers).
pub const SILENCE_DB: f32 = f32::NEG_INFINITY;

/// Compute the loudness of one PCM buffer in dBFS.
///
/// `[32767]` reads 0.0 dB. Any buffer whose maximum signed sample is zero or
/// below reads [`SILENCE_DB`].
pub fn loudness(samples: &[i16]) -> f32 {
    let peak = samples.iter().copied().max().unwrap_or(0);
    if peak <= 0 {
        return SILENCE_DB;
    }

    (20.0 * (peak as f64 / FULL_SCALE).log10()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale_is_zero_db() {
        assert_eq!(loudness(&[32767]), 0.0);
    }

    #[test]
    fn test_all_zeros_is_silence() {
        assert_eq!(loudness(&[0, 0, 0, 0]), SILENCE_DB);
        assert!(loudness(&[0; 16]).is_infinite());
    }

    #[test]
    fn test_empty_buffer_is_silence() {
        assert_eq!(loudness(&[]), SILENCE_DB);
    }

    #[test]
    fn test_half_scale_is_about_minus_six_db() {
        let db = loudness(&[16384, -100, 12]);
        assert!((db - (-6.02)).abs() < 0.01, "got {}", db);
    }

    #[test]
    fn test_uses_signed_maximum_not_magnitude() {
        // A loud negative excursion does not count; only the positive 100 does
        let db = loudness(&[-32768, 100, -20000]);
        let expected = (20.0 * (100.0f64 / 32767.0).log10()) as f32;
        assert_eq!(db, expected);
    }

    #[test]
    fn test_negative_only_buffer_is_silence() {
        let db = loudness(&[-5, -32768, -1]);
        assert!(!db.is_nan());
        assert_eq!(db, SILENCE_DB);
    }
}
