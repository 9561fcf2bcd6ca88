/// Percent-encode `value` for use inside a URL query string.
///
/// Unreserved characters (RFC 3986) pass through; everything else is
/// encoded byte by byte, spaces included (`%20`).
pub fn encode_query_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_and_spaces() {
        assert_eq!(encode_query_component("rust tui"), "rust%20tui");
        assert_eq!(encode_query_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query_component("safe-_.~"), "safe-_.~");
    }

    #[test]
    fn encodes_multibyte_utf8() {
        assert_eq!(encode_query_component("é"), "%C3%A9");
    }
}
