/// Escapes the characters that let a value break out of HTML text or
/// attribute context: `<`, `>`, `"`, `'` and `/`.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

/// Turns line breaks into `<br>` for already escaped text.
pub fn line_breaks_to_html(escaped: &str) -> String {
    escaped.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Reverses [`escape_html`] for plain-text output such as subjects and
/// text bodies.
pub fn unescape_html(escaped: &str) -> String {
    escaped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
}
