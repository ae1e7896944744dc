pub mod gemini;

pub use gemini::GeminiLightingAdapter;
