//! Size limits for the line protocol.

/// Maximum length of one line in bytes, excluding the terminator.
///
/// The longest message the server ever produces is an advisory `MESSAGE`,
/// well under this. Anything longer from a peer is treated as abuse.
pub const MAX_LINE_LEN: usize = 1024;

/// Initial capacity for per-connection receive buffers.
pub const RX_BUFFER_SIZE: usize = 4 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_buffer_holds_a_full_line() {
        assert!(RX_BUFFER_SIZE > MAX_LINE_LEN + 2);
    }
}
