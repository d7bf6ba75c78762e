/// Extracts a save name from a `Content-Disposition` header value.
///
/// The extended form (`filename*=UTF-8''…`, RFC 5987, percent-encoded) wins
/// over the simple quoted or bare form when both are present. Returns `None`
/// when the header carries no usable name.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let mut extended = None;
    let mut simple = None;

    for segment in value.split(';') {
        let segment = segment.trim();
        let Some(eq) = segment.find('=') else {
            continue;
        };
        let (name, rest) = segment.split_at(eq);
        let name = name.trim();
        let raw = rest[1..].trim();

        if name.eq_ignore_ascii_case("filename*") {
            extended = extended.or_else(|| decode_extended_value(raw));
        } else if name.eq_ignore_ascii_case("filename") {
            simple = simple.or_else(|| decode_simple_value(raw));
        }
    }

    extended.or(simple)
}

/// `charset'language'percent-encoded-value`; only UTF-8 is accepted.
fn decode_extended_value(raw: &str) -> Option<String> {
    let mut parts = raw.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    percent_decode(encoded)
}

fn decode_simple_value(raw: &str) -> Option<String> {
    let name = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw)
        .trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = hex_digit(*bytes.get(i + 1)?)?;
                let lo = hex_digit(*bytes.get(i + 2)?)?;
                out.push(hi << 4 | lo);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
