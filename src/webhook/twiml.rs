//! TwiML reply envelope — the minimal XML the carrier webhook expects back.

/// Wrap a reply in a `<Response><Message>` envelope.
pub fn message_response(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Response><Message>{}</Message></Response>",
        escape_xml(body)
    )
}

/// Escape the five XML special characters.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
