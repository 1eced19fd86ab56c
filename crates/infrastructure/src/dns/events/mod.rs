pub mod emitter;
pub mod types;

pub use emitter::QuestionEmitter;
pub use types::QuestionEvent;
