use std::iter::Peekable;
use std::str::Chars;

/// Strips the prefix and quotes of a Python string literal as written in
/// source and, unless the literal is raw, decodes its escape sequences.
pub fn unquote_string_literal(raw: &str) -> String {
    let Some(start) = raw.find(['"', '\'']) else {
        return raw.to_string();
    };
    let (prefix, body) = raw.split_at(start);
    let inner = strip_quotes(body);
    if prefix.contains(['r', 'R']) {
        inner.to_string()
    } else {
        decode_escapes(inner)
    }
}

fn strip_quotes(body: &str) -> &str {
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            return &body[quote.len()..body.len() - quote.len()];
        }
    }
    body
}

/// Unknown or truncated escapes are kept as written.
fn decode_escapes(body: &str) -> String {
    let mut decoded = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\\') => decoded.push('\\'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('a') => decoded.push('\u{07}'),
            Some('b') => decoded.push('\u{08}'),
            Some('f') => decoded.push('\u{0c}'),
            Some('n') => decoded.push('\n'),
            Some('r') => decoded.push('\r'),
            Some('t') => decoded.push('\t'),
            Some('v') => decoded.push('\u{0b}'),
            Some(marker @ ('x' | 'u' | 'U')) => {
                let width = match marker {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits = take_digits(&mut chars, 16, width);
                match code_point(&digits, 16).filter(|_| digits.len() == width) {
                    Some(decoded_char) => decoded.push(decoded_char),
                    None => {
                        decoded.push('\\');
                        decoded.push(marker);
                        decoded.push_str(&digits);
                    }
                }
            }
            Some(first @ '0'..='7') => {
                let mut digits = first.to_string();
                digits.push_str(&take_digits(&mut chars, 8, 2));
                match code_point(&digits, 8) {
                    Some(decoded_char) => decoded.push(decoded_char),
                    None => {
                        decoded.push('\\');
                        decoded.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }
    decoded
}

fn take_digits(chars: &mut Peekable<Chars<'_>>, radix: u32, max: usize) -> String {
    let mut digits = String::new();
    while digits.len() < max {
        match chars.next_if(|ch| ch.is_digit(radix)) {
            Some(digit) => digits.push(digit),
            None => break,
        }
    }
    digits
}

fn code_point(digits: &str, radix: u32) -> Option<char> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
}

/// Normalizes docstring indentation: tabs expand to 8 columns, the first
/// line loses its leading whitespace, the remaining lines lose their common
/// indentation, and blank lines at both ends are dropped.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines = expanded.lines().collect::<Vec<_>>();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim().to_string());
    for line in &lines[1..] {
        let stripped = line.get(margin..).unwrap_or_else(|| line.trim_start());
        cleaned.push(stripped.trim_end().to_string());
    }

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
