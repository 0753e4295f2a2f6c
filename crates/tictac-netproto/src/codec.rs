use crate::{
    constants::LINE_TERMINATOR,
    error::ProtoError,
    limits::MAX_LINE_LEN,
    messages::Message,
    msg_id::Keyword,
};

/// Encode a message into one `\n`-terminated line.
///
/// # Example
/// ```
/// use tictac_netproto::{ClientMsg, encode_message};
///
/// let line = encode_message(&ClientMsg::Move { row: 1, col: 2 }).unwrap();
/// assert_eq!(line, b"MOVE 1 2\n");
/// ```
pub fn encode_message<T: Message>(msg: &T) -> Result<Vec<u8>, ProtoError> {
    let mut line = String::from(msg.keyword().as_str());
    msg.write_fields(&mut line)?;

    if line.len() > MAX_LINE_LEN {
        return Err(ProtoError::LineTooLong(line.len()));
    }

    let mut out = line.into_bytes();
    out.push(LINE_TERMINATOR);
    Ok(out)
}

/// Decode one line (terminator optional) into a message of direction `T`.
pub fn decode_message<T: Message>(line: &str) -> Result<T, ProtoError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.len() > MAX_LINE_LEN {
        return Err(ProtoError::LineTooLong(line.len()));
    }

    let line = line.trim_start();
    if line.trim_end().is_empty() {
        return Err(ProtoError::Empty);
    }

    let (head, rest) = line
        .split_once(|c: char| c.is_ascii_whitespace())
        .unwrap_or((line, ""));
    let keyword = head
        .parse::<Keyword>()
        .map_err(|_| ProtoError::UnknownCommand(head.to_string()))?;
    T::parse_fields(keyword, rest)
}

/// Split every complete line out of `in_buf`.
///
/// Returns the lines (terminator and trailing `\r` removed) and the number of
/// bytes consumed. Invalid UTF-8 is replaced rather than rejected, so garbage
/// surfaces later as an undecodable line. A line, complete or not, longer
/// than [`MAX_LINE_LEN`] is an error.
pub fn try_decode_lines(in_buf: &[u8]) -> Result<(Vec<String>, usize), ProtoError> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    while let Some(pos) = in_buf[offset..]
        .iter()
        .position(|&b| b == LINE_TERMINATOR)
    {
        let mut raw = &in_buf[offset..offset + pos];
        if let [head @ .., b'\r'] = raw {
            raw = head;
        }
        if raw.len() > MAX_LINE_LEN {
            return Err(ProtoError::LineTooLong(raw.len()));
        }

        lines.push(String::from_utf8_lossy(raw).into_owned());
        offset += pos + 1;
    }

    let pending = in_buf.len() - offset;
    if pending > MAX_LINE_LEN {
        return Err(ProtoError::LineTooLong(pending));
    }

    Ok((lines, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::client::ClientMsg;
    use crate::messages::server::ServerMsg;

    #[test]
    fn splits_complete_lines_only() {
        let (lines, used) = try_decode_lines(b"YOUR_TURN\nMOVE X 0 0\r\nMOV").unwrap();
        assert_eq!(lines, vec!["YOUR_TURN", "MOVE X 0 0"]);
        assert_eq!(used, 22);
    }

    #[test]
    fn keyword_may_be_followed_by_any_ascii_whitespace() {
        assert_eq!(
            decode_message::<ClientMsg>("MOVE\t0\t2"),
            Ok(ClientMsg::Move { row: 0, col: 2 })
        );
        assert_eq!(
            decode_message::<ServerMsg>("YOUR_TURN \t"),
            Ok(ServerMsg::YourTurn)
        );
    }

    #[test]
    fn empty_buffer_consumes_nothing() {
        let (lines, used) = try_decode_lines(b"").unwrap();
        assert!(lines.is_empty());
        assert_eq!(used, 0);
    }

    #[test]
    fn invalid_utf8_becomes_replacement_text() {
        let (lines, _) = try_decode_lines(b"MOVE \xff 0\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert!(matches!(
            decode_message::<ClientMsg>(&lines[0]),
            Err(ProtoError::BadInteger { field: "row", .. })
        ));
    }

    #[test]
    fn oversized_partial_line_is_fatal() {
        let junk = vec![b'a'; MAX_LINE_LEN + 1];
        assert_eq!(
            try_decode_lines(&junk),
            Err(ProtoError::LineTooLong(MAX_LINE_LEN + 1))
        );
    }

    #[test]
    fn oversized_text_is_not_encodable() {
        let msg = ServerMsg::message("x".repeat(MAX_LINE_LEN));
        assert!(matches!(
            encode_message(&msg),
            Err(ProtoError::LineTooLong(_))
        ));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(decode_message::<ClientMsg>("   "), Err(ProtoError::Empty));
        assert_eq!(
            decode_message::<ClientMsg>("move 0 0"),
            Err(ProtoError::UnknownCommand("move".into()))
        );
    }

    #[test]
    fn every_server_line_decodes_to_what_was_encoded() {
        let msgs = [
            ServerMsg::Assign(tictac_core::Symbol::Nought),
            ServerMsg::YourTurn,
            ServerMsg::OpponentTurn,
            ServerMsg::GameOver(tictac_core::Outcome::Draw),
            ServerMsg::invalid_command("Unknown command. Try again."),
        ];
        let stream: Vec<u8> = msgs
            .iter()
            .flat_map(|m| encode_message(m).unwrap())
            .collect();

        let (lines, used) = try_decode_lines(&stream).unwrap();
        assert_eq!(used, stream.len());
        let decoded: Vec<ServerMsg> = lines
            .iter()
            .map(|l| decode_message(l).unwrap())
            .collect();
        assert_eq!(decoded, msgs);
    }
}
