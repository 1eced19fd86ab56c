use std::net::SocketAddr;
use twirl_domain::DnsQuestion;

#[derive(Debug, Clone)]
pub struct QuestionEvent {
    pub question: DnsQuestion,

    pub peer: SocketAddr,
}

impl QuestionEvent {
    pub fn new(question: DnsQuestion, peer: SocketAddr) -> Self {
        Self { question, peer }
    }
}
