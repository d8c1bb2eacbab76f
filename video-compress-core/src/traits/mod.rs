pub mod audio_router;
pub mod frame_scheduler;
pub mod media_decoder;
pub mod stream_encoder;
pub mod transcode_delegate;
