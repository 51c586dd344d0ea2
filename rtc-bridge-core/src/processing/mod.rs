pub mod audio_read_buffer;
pub mod frame_queue;
pub mod moving_average;
pub mod resampler;
pub mod sample_ring;
