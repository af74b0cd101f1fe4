//! Lenient text decoding
//!
//! Turns a stream of byte chunks into UTF-8 text. Invalid bytes become
//! U+FFFD; a character split across two chunks is kept whole.

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct LossyUtf8Decoder {
    pending: Vec<u8>,
}

impl LossyUtf8Decoder {
    /// Decodes as much of `chunk` as possible, holding back an incomplete tail.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::new();
        let mut consumed = 0;

        while consumed < self.pending.len() {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    consumed = self.pending.len();
                }
                Err(e) => {
                    let valid_end = consumed + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    consumed = valid_end;

                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            consumed += len;
                        }
                        None => break,
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        out
    }

    /// Flushes whatever is still held back at end of stream.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
