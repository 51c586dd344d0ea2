pub mod channel_events;
pub mod media_engine;
