//! Cutting a raw read into individual key sequences
//!
//! One `read` from the terminal may carry several keystrokes (fast typing,
//! paste, a burst of mouse motion). Each piece returned by [`split`] is a
//! candidate for a single [`decode`](super::decode) call.

const ESC: u8 = 0x1b;

/// Split `chunk` into sequences, in order, without dropping any byte
pub fn split(chunk: &[u8]) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut rest = chunk;
    while !rest.is_empty() {
        let len = sequence_len(rest);
        let (head, tail) = rest.split_at(len);
        pieces.push(head);
        rest = tail;
    }
    pieces
}

/// Length of the sequence at the start of `bytes` (never zero)
fn sequence_len(bytes: &[u8]) -> usize {
    match bytes {
        [] => 0,
        [ESC] => 1,
        [ESC, b'[', b'<', ..] => mouse_len(bytes),
        [ESC, b'[', b'[', _, ..] => 4,
        [ESC, b'[', ..] => csi_len(bytes),
        [ESC, b'O', _, ..] => 3,
        // ESC ESC: the first one stands alone
        [ESC, ESC, ..] => 1,
        [ESC, ..] => 2,
        [first, ..] => utf8_len(*first).min(bytes.len()),
    }
}

/// `ESC [` parameters and intermediates up to a final byte in `0x40..=0x7E`
fn csi_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .skip(2)
        .position(|b| (0x40..=0x7e).contains(b))
        .map_or(bytes.len(), |i| i + 3)
}

/// SGR mouse reports run to their `M` or `m` terminator
fn mouse_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .skip(3)
        .position(|b| !(b.is_ascii_digit() || *b == b';'))
        .map_or(bytes.len(), |i| {
            let end = i + 3;
            if matches!(bytes[end], b'M' | b'm') {
                end + 1
            } else {
                end
            }
        })
}

fn utf8_len(first: u8) -> usize {
    match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_keys() {
        assert_eq!(split(b"ab\r"), vec![&b"a"[..], b"b", b"\r"]);
        assert!(split(b"").is_empty());
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(
            split(b"\x1b[A\x1bOPx\x1b[15~"),
            vec![&b"\x1b[A"[..], b"\x1bOP", b"x", b"\x1b[15~"]
        );
        assert_eq!(split(b"\x1bq\x1b"), vec![&b"\x1bq"[..], b"\x1b"]);
        assert_eq!(split(b"\x1b\x1b[B"), vec![&b"\x1b"[..], b"\x1b[B"]);
        assert_eq!(split(b"\x1b[[A"), vec![&b"\x1b[[A"[..]]);
    }

    #[test]
    fn test_mouse_reports() {
        assert_eq!(
            split(b"\x1b[<0;10;5M\x1b[<0;10;5ma"),
            vec![&b"\x1b[<0;10;5M"[..], b"\x1b[<0;10;5m", b"a"]
        );
        // A truncated report stays whole so it decodes as a partial match
        assert_eq!(split(b"\x1b[<0;10"), vec![&b"\x1b[<0;10"[..]]);
    }

    #[test]
    fn test_utf8_scalars() {
        let text = "é日a";
        let pieces = split(text.as_bytes());
        assert_eq!(pieces, vec!["é".as_bytes(), "日".as_bytes(), b"a"]);
        // A truncated scalar is kept as one piece
        assert_eq!(split(&[0xe6, 0x97]), vec![&[0xe6, 0x97][..]]);
    }

    #[test]
    fn test_split_preserves_every_byte() {
        let chunk = b"\x1b[<35;2;2M\x1b[Bz\x1b";
        let joined: Vec<u8> = split(chunk).concat();
        assert_eq!(joined, chunk);
    }
}
