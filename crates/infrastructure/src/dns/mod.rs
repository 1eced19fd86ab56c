pub mod events;
pub mod listener;
pub mod question_reader;
pub mod socket;

pub use events::{QuestionEmitter, QuestionEvent};
pub use listener::{DnsListener, ListenerExit};
pub use question_reader::QuestionReader;
