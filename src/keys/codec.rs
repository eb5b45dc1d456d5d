//! Free text to storage key segments, and the underscore escape used in
//! user-facing path segments.

fn is_safe(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '.' | '-')
}

/// Lower-cases `s` and replaces every run of characters outside
/// `[a-z0-9._-]` (an existing `_` included) with a single `_`.
///
/// Lossy: `"X Men"` and `"x_men"` both become `"x_men"`.
pub fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;

    for c in s.chars().flat_map(char::to_lowercase) {
        if is_safe(c) {
            out.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    out
}

/// Escapes every byte outside `[a-z0-9.-]` as `_` followed by two lowercase
/// hex digits. `_` itself is escaped so that [`underscore_decode`] inverts it.
pub fn underscore_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        let c = b as char;
        if b.is_ascii() && is_safe(c) {
            out.push(c);
        } else {
            out.push('_');
            out.push_str(&format!("{:02x}", b));
        }
    }
    out
}

/// Reverses [`underscore_encode`]. An underscore followed by two hex digits
/// becomes that byte; any other underscore is copied through together with
/// whatever it peeked at.
pub fn underscore_decode(s: &str) -> String {
    if !s.contains('_') {
        return s.to_string();
    }

    let mut buf: Vec<u8> = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '_' {
            let mut utf8 = [0u8; 4];
            buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            continue;
        }

        let peek: String = chars.by_ref().take(2).collect();
        match decode_hex_pair(&peek) {
            Some(byte) => buf.push(byte),
            None => {
                buf.push(b'_');
                buf.extend_from_slice(peek.as_bytes());
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn decode_hex_pair(pair: &str) -> Option<u8> {
    if pair.len() != 2 || !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(pair, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_lowercases_and_collapses() {
        assert_eq!(sanitize("X-Men"), "x-men");
        assert_eq!(sanitize("Star Wars: A New Hope"), "star_wars_a_new_hope");
        assert_eq!(sanitize("a__b"), "a_b");
        assert_eq!(sanitize("a _ b"), "a_b");
        assert_eq!(sanitize("Vol. 2"), "vol._2");
    }

    #[test]
    fn sanitize_edge_cases() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("!!!"), "_");
        assert_eq!(sanitize("½"), "_");
        assert_eq!(sanitize("_"), "_");
    }

    #[test]
    fn sanitize_is_idempotent_and_never_doubles_underscores() {
        let inputs = [
            "The Amazing Spider-Man", "x__men", "  padded  ", "Æon Flux", "1/2", "__", "a_ _b",
            "Über_Comics!!", "½", "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input {:?}", input);
            assert!(!once.contains("__"), "input {:?} gave {:?}", input, once);
            assert_eq!(once.is_empty(), input.is_empty());
        }
    }

    #[test]
    fn decode_hex_escapes() {
        assert_eq!(underscore_decode("x_2dmen"), "x-men");
        assert_eq!(underscore_decode("star_20wars"), "star wars");
        assert_eq!(underscore_decode("plain"), "plain");
    }

    #[test]
    fn decode_passes_bad_escapes_through() {
        assert_eq!(underscore_decode("x_men"), "x_men");
        assert_eq!(underscore_decode("trailing_"), "trailing_");
        assert_eq!(underscore_decode("one_4"), "one_4");
        assert_eq!(underscore_decode("_zz_41"), "_zzA");
    }

    #[test]
    fn encode_then_decode_restores_input() {
        for input in ["X-Men", "Star Wars: 1977", "a_b", "½ issue", "Æon"] {
            let encoded = underscore_encode(input);
            assert!(encoded.bytes().all(|b| b.is_ascii()));
            assert_eq!(underscore_decode(&encoded), input);
        }
    }
}
