pub mod cancel;
pub mod realtime;
pub mod transcode;
