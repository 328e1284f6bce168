//! HTML view of the board.
//!
//! Message fields arrive pre-escaped as [`SafeHtml`] and are written
//! verbatim. Anything else placed in the page goes through `escape` here.

use crate::models::Message;
use crate::posting::{MAX_MESSAGE_CHARS, MAX_SIGNATURE_CHARS, MAX_USERNAME_CHARS};
use crate::sanitize::escape;
use std::fmt::Write as _;

const HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Message Board</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }
.flash { color: #a00; }
.msg { border-bottom: 1px solid #ddd; padding: .5rem 0; }
.sig { color: #666; font-size: .85em; white-space: pre-wrap; }
.body { white-space: pre-wrap; }
</style>
</head>
<body>
<h1>Message Board</h1>
"#;

const TAIL: &str = "</body>\n</html>\n";

pub fn render_board(messages: &[Message], flash: Option<&str>) -> String {
    let mut page = String::from(HEAD);

    if let Some(flash) = flash {
        let _ = writeln!(page, "<p class=\"flash\">{}</p>", escape(flash));
    }

    let _ = write!(
        page,
        r#"<form method="post" action="/">
<input name="username" placeholder="Name" maxlength="{MAX_USERNAME_CHARS}" required>
<input name="password" type="password" placeholder="Password (reserved names)">
<textarea name="msg" placeholder="Message" maxlength="{MAX_MESSAGE_CHARS}" required></textarea>
<textarea name="signature" placeholder="Signature (optional)" maxlength="{MAX_SIGNATURE_CHARS}"></textarea>
<button type="submit">Post</button>
</form>
"#
    );

    page.push_str("<section>\n");
    for message in messages {
        let _ = write!(
            page,
            "<div class=\"msg\"><strong>{}</strong> <small>{}</small><div class=\"body\">{}</div>",
            message.username,
            message.posted_at.format("%Y-%m-%d %H:%M UTC"),
            message.body,
        );
        if let Some(signature) = &message.signature {
            let _ = write!(page, "<div class=\"sig\">{}</div>", signature);
        }
        page.push_str("</div>\n");
    }
    if messages.is_empty() {
        page.push_str("<p>No messages yet.</p>\n");
    }
    page.push_str("</section>\n");

    page.push_str(TAIL);
    page
}
