use crate::models::media::AudioTrack;
use crate::traits::media_decoder::MediaDecoder;

/// Interface for routing a source's audio output into the encoded stream.
///
/// Failure is expected on sources without audio or hosts without an audio
/// graph; the session treats any `Err` as "video only".
pub trait AudioRouter: Send {
    fn route(&mut self, decoder: &mut dyn MediaDecoder) -> Result<AudioTrack, String>;

    /// Tear down the routing graph. Only called after a successful `route`.
    fn disconnect(&mut self);
}
