//! Time units and frame conversion

use easel_core::{EaselError, Result};

/// Units a duration can be expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Frames,
    Milliseconds,
    #[default]
    Seconds,
}

impl TimeUnit {
    /// Number of frames in `time` units at `fps`, truncated toward zero.
    ///
    /// Negative or non-finite durations are a configuration error.
    pub fn as_frames(self, time: f64, fps: u32) -> Result<u64> {
        if !time.is_finite() || time < 0.0 {
            return Err(EaselError::configuration(format!(
                "duration must be a non-negative number, got {time} {self:?}"
            )));
        }
        let frames = match self {
            TimeUnit::Frames => time,
            TimeUnit::Milliseconds => time * fps as f64 / 1000.0,
            TimeUnit::Seconds => time * fps as f64,
        };
        Ok(frames.trunc() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert_eq!(TimeUnit::Seconds.as_frames(2.0, 30), Ok(60));
        assert_eq!(TimeUnit::Milliseconds.as_frames(500.0, 30), Ok(15));
        assert_eq!(TimeUnit::Frames.as_frames(7.9, 30), Ok(7));
        assert_eq!(TimeUnit::Seconds.as_frames(0.0, 60), Ok(0));
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(matches!(
            TimeUnit::Seconds.as_frames(-1.0, 30),
            Err(EaselError::Configuration(_))
        ));
        assert!(TimeUnit::Frames.as_frames(f64::NAN, 30).is_err());
    }
}
