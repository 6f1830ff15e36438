//! Fixed-size storage for loader diagnostics.

/// Maximum visible bytes kept from a diagnostic.
pub const LAST_ERROR_CAPACITY: usize = 511;

/// A NUL-terminated message in a fixed buffer.
///
/// At most [`LAST_ERROR_CAPACITY`] bytes are kept, cut on a UTF-8 boundary.
/// The byte after the capacity is a guard that is always NUL, so a reader
/// racing a writer can never run off the end of the buffer.
#[derive(Clone)]
pub struct BoundedMessage {
    buf: [u8; LAST_ERROR_CAPACITY + 1],
    len: usize,
}

impl BoundedMessage {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; LAST_ERROR_CAPACITY + 1],
            len: 0,
        }
    }

    /// Replaces the content, truncating to capacity.
    ///
    /// Interior NUL bytes end the message early, as a C reader would see it.
    pub fn set(&mut self, message: &str) {
        let message = match message.find('\0') {
            Some(pos) => &message[..pos],
            None => message,
        };
        let mut len = message.len().min(LAST_ERROR_CAPACITY);
        while !message.is_char_boundary(len) {
            len -= 1;
        }
        self.buf[..len].copy_from_slice(&message.as_bytes()[..len]);
        self.buf[len..].fill(0);
        self.len = len;
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.len = 0;
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only whole UTF-8 prefixes are ever copied in.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    /// Content followed by its terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for BoundedMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BoundedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoundedMessage").field(&self.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_kept_verbatim() {
        let mut msg = BoundedMessage::new();
        msg.set("cannot open vm.so");
        assert_eq!(msg.as_str(), "cannot open vm.so");
        assert_eq!(msg.as_bytes_with_nul().last(), Some(&0));
        assert_eq!(msg.len(), 17);
    }

    #[test]
    fn long_message_truncated_with_guard() {
        let mut msg = BoundedMessage::new();
        msg.set(&"x".repeat(2000));
        assert_eq!(msg.len(), LAST_ERROR_CAPACITY);
        assert_eq!(msg.as_bytes_with_nul().len(), LAST_ERROR_CAPACITY + 1);
        assert_eq!(msg.as_bytes_with_nul()[LAST_ERROR_CAPACITY], 0);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut msg = BoundedMessage::new();
        // 510 ASCII bytes then a 3-byte char straddling the limit.
        let text = format!("{}€tail", "a".repeat(510));
        msg.set(&text);
        assert_eq!(msg.len(), 510);
        assert!(msg.as_str().chars().all(|c| c == 'a'));
    }

    #[test]
    fn shorter_overwrite_leaves_no_residue() {
        let mut msg = BoundedMessage::new();
        msg.set("a long first message");
        msg.set("short");
        assert_eq!(msg.as_bytes_with_nul(), b"short\0");
        msg.clear();
        assert!(msg.is_empty());
        assert_eq!(msg.as_str(), "");
    }

    #[test]
    fn interior_nul_ends_message() {
        let mut msg = BoundedMessage::new();
        msg.set("visible\0hidden");
        assert_eq!(msg.as_str(), "visible");
    }
}
