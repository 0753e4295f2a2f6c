/// TCP port the server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 12345;

/// Line terminator. A trailing `\r` before it is tolerated on input.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Separator between a keyword and its fields.
pub const FIELD_SEPARATOR: char = ' ';
