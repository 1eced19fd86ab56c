use std::fmt;
use std::sync::Arc;

/// One entry of a DNS message's question section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    /// Fully qualified name, with trailing dot (e.g. `example.com.`).
    pub name: Arc<str>,
    pub record_type: Arc<str>,
    pub class: Arc<str>,
}

impl DnsQuestion {
    pub fn new(
        name: impl Into<Arc<str>>,
        record_type: impl Into<Arc<str>>,
        class: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            class: class.into(),
        }
    }
}

impl fmt::Display for DnsQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.class, self.record_type)
    }
}
