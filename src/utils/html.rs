use std::collections::HashSet;

use ammonia::Builder;

/// Reduce user-supplied text to plain text using the ammonia library.
///
/// No tags are allowed: markup is dropped, <script> and <style> together with
/// their contents. Ammonia serializes the remaining text HTML-escaped; that
/// escaping is undone so the stored text is what the user typed. Clients are
/// responsible for escaping on render.
pub fn strip_tags(input: &str) -> String {
    let cleaned = Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();

    unescape_text(&cleaned).trim().to_string()
}

/// Reverses the escapes html5ever applies when serializing text nodes.
/// `&amp;` goes last so that an escaped `&lt;` stays literal.
fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
