pub mod chat;
pub mod delivery;
pub mod metadata;
pub mod renderer;
pub mod transcripts;
pub mod video_source;
