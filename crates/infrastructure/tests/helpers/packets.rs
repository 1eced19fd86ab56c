#![allow(dead_code)]

/// Builds a standard query with one question per name (QTYPE A, QCLASS IN).
pub fn build_query(id: u16, names: &[&str]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&[0x01, 0x00]); // flags: RD set
    buf.extend_from_slice(&(names.len() as u16).to_be_bytes()); // QDCOUNT
    buf.extend_from_slice(&[0x00, 0x00]); // ANCOUNT
    buf.extend_from_slice(&[0x00, 0x00]); // NSCOUNT
    buf.extend_from_slice(&[0x00, 0x00]); // ARCOUNT
    for name in names {
        for label in name.trim_end_matches('.').split('.') {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
        buf.push(0x00);
        buf.extend_from_slice(&[0x00, 0x01]); // QTYPE = A
        buf.extend_from_slice(&[0x00, 0x01]); // QCLASS = IN
    }
    buf
}

/// Two questions, the second naming the first through a compression pointer.
pub fn build_compressed_query(id: u16) -> Vec<u8> {
    let mut buf = build_query(id, &["example.com"]);
    buf[5] = 2; // QDCOUNT = 2
    buf.extend_from_slice(&[3, b'w', b'w', b'w', 0xC0, 12]); // www + pointer to offset 12
    buf.extend_from_slice(&[0x00, 0x1c]); // QTYPE = AAAA
    buf.extend_from_slice(&[0x00, 0x01]); // QCLASS = IN
    buf
}

pub fn garbage() -> Vec<u8> {
    vec![0xde, 0xad, 0xbe, 0xef, 0x00]
}
