use crate::models::media::AudioTrack;
use crate::traits::audio_router::AudioRouter;
use crate::traits::media_decoder::MediaDecoder;

/// Result of trying to carry source audio into the encoded stream.
///
/// Never an error: a failed bridge degrades the run to video only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioBridgeOutcome {
    Bridged(AudioTrack),
    VideoOnly { reason: String },
}

impl AudioBridgeOutcome {
    pub fn track(&self) -> Option<&AudioTrack> {
        match self {
            Self::Bridged(track) => Some(track),
            Self::VideoOnly { .. } => None,
        }
    }

    pub fn is_bridged(&self) -> bool {
        matches!(self, Self::Bridged(_))
    }
}

/// Route the decoder's audio through `router`, swallowing any failure.
pub fn bridge_audio<A: AudioRouter + ?Sized>(router: &mut A, decoder: &mut dyn MediaDecoder) -> AudioBridgeOutcome {
    match router.route(decoder) {
        Ok(track) => {
            log::info!(
                "Audio bridged: track {} ({} Hz, {} ch)",
                track.id,
                track.sample_rate,
                track.channels
            );
            AudioBridgeOutcome::Bridged(track)
        }
        Err(reason) => {
            log::warn!("Audio bridge unavailable, continuing video-only: {}", reason);
            AudioBridgeOutcome::VideoOnly { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAudioRouter, FakeDecoder, ManualClock};

    #[test]
    fn successful_route_is_bridged() {
        let clock = ManualClock::new();
        let mut decoder = FakeDecoder::new(clock, 640, 360, 1.0);
        let mut router = FakeAudioRouter::working();

        let outcome = bridge_audio(&mut router, &mut decoder);
        assert!(outcome.is_bridged());
        assert_eq!(outcome.track().map(|t| t.channels), Some(2));
    }

    #[test]
    fn failure_degrades_to_video_only() {
        let clock = ManualClock::new();
        let mut decoder = FakeDecoder::new(clock, 640, 360, 1.0);
        let mut router = FakeAudioRouter::failing("no audio graph");

        let outcome = bridge_audio(&mut router, &mut decoder);
        assert_eq!(
            outcome,
            AudioBridgeOutcome::VideoOnly {
                reason: "no audio graph".into()
            }
        );
        assert!(outcome.track().is_none());
    }
}
