//! Pull a move token out of a model reply.
//!
//! Only the first line is scanned; everything after it is explanation. The
//! matcher is deliberately shallow: it recognizes the *shape* of algebraic
//! notation (pawn move, capture, piece move, castling, promotion) and leaves
//! correctness entirely to the legal-move membership check downstream.

/// Extract the first token on the first reply line that is shaped like a
/// move in algebraic notation. Trailing check/mate suffixes are trimmed so
/// "Qh5+" compares equal to the bare legal SAN "Qh5".
pub fn extract_move_token(reply: &str) -> Option<String> {
    let first_line = reply.trim().lines().next()?;
    first_line
        .split(|c: char| !(c.is_ascii_alphanumeric() || "-=+#".contains(c)))
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches(|c| c == '+' || c == '#'))
        .find(|s| is_san_shaped(s))
        .map(str::to_string)
}

/// Does `token` look like a SAN move? Accepts castling, an optional piece
/// letter, optional disambiguation, an optional capture marker, a
/// destination square and an optional promotion suffix.
fn is_san_shaped(token: &str) -> bool {
    if token == "O-O" || token == "O-O-O" {
        return true;
    }

    let bytes = token.as_bytes();
    let mut end = bytes.len();

    // Promotion suffix: "=Q" etc.
    if end >= 2 && bytes[end - 2] == b'=' && matches!(bytes[end - 1], b'Q' | b'R' | b'B' | b'N') {
        end -= 2;
    }
    if end < 2 {
        return false;
    }

    // Destination square.
    if !(bytes[end - 2].is_ascii_lowercase() && (b'a'..=b'h').contains(&bytes[end - 2])) {
        return false;
    }
    if !(b'1'..=b'8').contains(&bytes[end - 1]) {
        return false;
    }

    // Optional piece letter.
    let mut i = 0;
    if matches!(bytes[0], b'K' | b'Q' | b'R' | b'B' | b'N') {
        i = 1;
    }

    // Between piece letter and destination: optional disambiguation file,
    // optional disambiguation rank, optional capture marker, nothing else.
    let mut mid = &bytes[i..end - 2];
    if let [b'a'..=b'h', rest @ ..] = mid {
        mid = rest;
    }
    if let [b'1'..=b'8', rest @ ..] = mid {
        mid = rest;
    }
    if let [b'x', rest @ ..] = mid {
        mid = rest;
    }
    mid.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_move_from_first_line() {
        assert_eq!(
            extract_move_token("e4\n\nGood central move."),
            Some("e4".to_string())
        );
        assert_eq!(extract_move_token("Nf6"), Some("Nf6".to_string()));
    }

    #[test]
    fn ignores_later_lines() {
        // "e5" on the second line must not be picked up.
        assert_eq!(
            extract_move_token("I would not commit yet.\ne5 is also playable."),
            None
        );
    }

    #[test]
    fn finds_token_inside_prose() {
        assert_eq!(
            extract_move_token("The move Nf6 develops a piece."),
            Some("Nf6".to_string())
        );
        assert_eq!(
            extract_move_token("1... exd5! wins a pawn"),
            Some("exd5".to_string())
        );
    }

    #[test]
    fn strips_quotes_and_check_suffixes() {
        assert_eq!(extract_move_token("\"Qh5+\""), Some("Qh5".to_string()));
        assert_eq!(extract_move_token("Qxf7#."), Some("Qxf7".to_string()));
    }

    #[test]
    fn recognizes_castling() {
        assert_eq!(extract_move_token("O-O"), Some("O-O".to_string()));
        assert_eq!(
            extract_move_token("O-O-O, tucking the king away"),
            Some("O-O-O".to_string())
        );
    }

    #[test]
    fn recognizes_promotion() {
        assert_eq!(extract_move_token("e8=Q"), Some("e8=Q".to_string()));
        assert_eq!(extract_move_token("bxa1=N+"), Some("bxa1=N".to_string()));
    }

    #[test]
    fn recognizes_disambiguated_piece_moves() {
        assert_eq!(extract_move_token("Nbd7"), Some("Nbd7".to_string()));
        assert_eq!(extract_move_token("R1e2"), Some("R1e2".to_string()));
        assert_eq!(extract_move_token("Qh4xe1"), Some("Qh4xe1".to_string()));
    }

    #[test]
    fn rejects_plain_prose() {
        assert_eq!(
            extract_move_token("I think you should play something solid."),
            None
        );
        assert_eq!(extract_move_token(""), None);
        assert_eq!(extract_move_token("Good luck!"), None);
    }
}
