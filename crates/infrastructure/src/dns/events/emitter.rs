use super::QuestionEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct QuestionEmitter {
    sender: Option<mpsc::UnboundedSender<QuestionEvent>>,
}

impl QuestionEmitter {
    pub fn new_disabled() -> Self {
        Self { sender: None }
    }

    pub fn new_enabled() -> (Self, mpsc::UnboundedReceiver<QuestionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self { sender: Some(tx) };
        (emitter, rx)
    }

    pub fn emit(&self, event: QuestionEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl Default for QuestionEmitter {
    fn default() -> Self {
        Self::new_disabled()
    }
}

impl std::fmt::Debug for QuestionEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
