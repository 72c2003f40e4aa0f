pub mod chat_stream;
pub mod code_blocks;
pub mod config;
pub mod message;
pub mod persona;
pub mod response;
pub mod segmenter;
pub mod session;
pub mod text_wrapping;
