pub mod admission;
pub mod audio_bridge;
pub mod chunk_collector;
pub mod codec_select;
pub mod format;
pub mod frame_surface;
pub mod geometry;
pub mod progress_reporter;
pub mod render_loop;
