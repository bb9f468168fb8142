//! Audio activity samples produced by the voice activity detector.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default duration of one audio activity sample, in seconds.
pub const DEFAULT_AUDIO_FRAME_DURATION: f64 = 0.04;

/// Voice activity for one fixed-length audio window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioActivity {
    /// RMS energy of the window
    #[serde(default)]
    pub audio_energy: f64,
    /// Energy normalized to the loudest window (0.0-1.0)
    #[serde(default)]
    pub speech_intensity: f64,
    /// Whether speech is present
    #[serde(default, alias = "is_talking")]
    pub is_speech: bool,
    /// Speech probability (0.0-1.0)
    #[serde(default)]
    pub speech_prob: f64,
}

impl AudioActivity {
    /// The "no speech" sample used when audio is missing for a frame.
    pub fn silent() -> Self {
        Self::default()
    }
}

/// The whole clip's audio activity, sampled at a fixed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioTrack {
    /// Duration of each sample in seconds
    #[serde(default = "default_frame_duration")]
    pub frame_duration: f64,
    /// Samples in time order
    #[serde(default)]
    pub samples: Vec<AudioActivity>,
}

fn default_frame_duration() -> f64 {
    DEFAULT_AUDIO_FRAME_DURATION
}

impl Default for AudioTrack {
    fn default() -> Self {
        Self::empty()
    }
}

impl AudioTrack {
    /// Create a track from samples.
    pub fn new(frame_duration: f64, samples: Vec<AudioActivity>) -> Self {
        Self {
            frame_duration,
            samples,
        }
    }

    /// A track with no samples (audio extraction failed or absent).
    pub fn empty() -> Self {
        Self::new(DEFAULT_AUDIO_FRAME_DURATION, Vec::new())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the track has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vad_field_names_accepted() {
        let json = r#"{"audio_energy": 0.12, "speech_intensity": 0.8, "is_talking": true, "speech_prob": 1.0}"#;
        let sample: AudioActivity = serde_json::from_str(json).unwrap();
        assert!(sample.is_speech);
        assert_eq!(sample.speech_prob, 1.0);
    }

    #[test]
    fn test_silent_sample() {
        let silent = AudioActivity::silent();
        assert!(!silent.is_speech);
        assert_eq!(silent.speech_prob, 0.0);
    }

    #[test]
    fn test_track_defaults() {
        let track: AudioTrack = serde_json::from_str(r#"{"samples": []}"#).unwrap();
        assert_eq!(track.frame_duration, DEFAULT_AUDIO_FRAME_DURATION);
        assert!(track.is_empty());
    }
}
