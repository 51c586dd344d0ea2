pub mod audio_sink;
pub mod data_channel;
pub mod video_sink;

#[cfg(test)]
pub(crate) mod test_support;
