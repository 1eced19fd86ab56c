//! Question-section reader for raw DNS messages (RFC 1035 §4.1.1, §4.1.2).
//!
//! Only the header and the questions are decoded. Answer, authority and
//! additional sections are never touched, so trailing garbage after the
//! questions does not make an otherwise readable query fail.

use hickory_proto::op::{Header, Query};
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder};
use twirl_domain::{DnsQuestion, DomainError};

const HEADER_LEN: usize = 12;

/// Iterates over the questions of a DNS message.
///
/// Yields at most QDCOUNT items and stops after the first malformed
/// question, so a caller can log every readable question and then the error.
pub struct QuestionReader<'a> {
    decoder: BinDecoder<'a>,
    id: u16,
    count: u16,
    index: u16,
    failed: bool,
}

impl<'a> QuestionReader<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self, DomainError> {
        if buf.len() < HEADER_LEN {
            return Err(DomainError::MalformedMessage(format!(
                "{} bytes is shorter than the {}-byte header",
                buf.len(),
                HEADER_LEN
            )));
        }

        let mut decoder = BinDecoder::new(buf);
        Header::read(&mut decoder).map_err(|e| DomainError::MalformedMessage(e.to_string()))?;

        Ok(Self {
            decoder,
            id: u16::from_be_bytes([buf[0], buf[1]]),
            count: u16::from_be_bytes([buf[4], buf[5]]),
            index: 0,
            failed: false,
        })
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// QDCOUNT as announced by the header.
    pub fn question_count(&self) -> u16 {
        self.count
    }
}

impl Iterator for QuestionReader<'_> {
    type Item = Result<DnsQuestion, DomainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.count {
            return None;
        }

        let index = self.index;
        self.index += 1;

        match Query::read(&mut self.decoder) {
            Ok(query) => Some(Ok(DnsQuestion::new(
                query.name().to_string(),
                query.query_type().to_string(),
                query.query_class().to_string(),
            ))),
            Err(e) => {
                self.failed = true;
                Some(Err(DomainError::MalformedQuestion {
                    index,
                    reason: e.to_string(),
                }))
            }
        }
    }
}
