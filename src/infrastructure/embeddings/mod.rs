pub mod gemini_engine;
pub mod random_engine;

pub use gemini_engine::GeminiEmbedEngine;
pub use random_engine::RandomEmbedEngine;
