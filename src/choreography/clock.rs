use crate::errors::SampleError;

use super::threshold::PlaybackSample;

/// Playback position as reported by the external audio transport.
///
/// The transport owns the real clock; this type only remembers the last
/// accepted position so every event can be turned into a `PlaybackSample`
/// whose `previous` and `current` are updated together.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    position: f64,
    is_playing: bool,
    duration: Option<f64>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Periodic position report during playback
    pub fn time_update(&mut self, position: f64) -> Result<PlaybackSample, SampleError> {
        self.check(position)?;
        let sample = PlaybackSample::new(self.position, position, self.is_playing);
        self.position = position;
        Ok(sample)
    }

    /// User seek: the baseline moves with the position, so a seek never
    /// reads as crossing anything between the old and new position.
    pub fn seek(&mut self, position: f64) -> Result<PlaybackSample, SampleError> {
        self.check(position)?;
        self.position = position;
        Ok(PlaybackSample::at(position, self.is_playing))
    }

    pub fn play(&mut self) -> PlaybackSample {
        self.is_playing = true;
        PlaybackSample::at(self.position, true)
    }

    pub fn pause(&mut self) -> PlaybackSample {
        self.is_playing = false;
        PlaybackSample::at(self.position, false)
    }

    /// Track length once the transport knows it. Zero means unknown.
    pub fn set_duration(&mut self, duration: f64) -> Result<(), SampleError> {
        if !duration.is_finite() {
            return Err(SampleError::NonFinite(duration));
        }
        if duration < 0.0 {
            return Err(SampleError::Negative(duration));
        }
        self.duration = (duration > 0.0).then_some(duration);
        Ok(())
    }

    fn check(&self, position: f64) -> Result<(), SampleError> {
        if !position.is_finite() {
            return Err(SampleError::NonFinite(position));
        }
        if position < 0.0 {
            return Err(SampleError::Negative(position));
        }
        if let Some(duration) = self.duration {
            if position > duration {
                return Err(SampleError::BeyondDuration { position, duration });
            }
        }
        Ok(())
    }
}
