//! Inline HTML templates for the two transactional emails.

/// Visual identity shared by every template.
#[derive(Debug, Clone, Default)]
pub struct Branding {
    pub app_name: String,
    /// Absolute URL of the logo image, if any.
    pub logo_url: Option<String>,
    /// CSS color used for headings and the call-to-action button.
    pub color: String,
}

const DEFAULT_COLOR: &str = "#1f6feb";

/// Escape text for safe inclusion in HTML element content and attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn color(branding: &Branding) -> String {
    if branding.color.trim().is_empty() {
        DEFAULT_COLOR.to_string()
    } else {
        escape_html(branding.color.trim())
    }
}

fn logo(branding: &Branding) -> String {
    match branding.logo_url.as_deref().filter(|l| !l.is_empty()) {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" style="max-height:64px"/>"#,
            escape_html(url),
            escape_html(&branding.app_name)
        ),
        None => String::new(),
    }
}

/// Subject and body of the password reset email.
pub fn password_reset(branding: &Branding, user_name: &str, reset_url: &str) -> (String, String) {
    let subject = format!("{}: password change request", branding.app_name);
    let color = color(branding);
    let html = format!(
        r#"<div style="font-family:sans-serif">
{logo}
<h2 style="color:{color}">Hello {name},</h2>
<p>We received a request to reset your password. Use the button below to choose a new one.</p>
<p><a href="{url}" style="background:{color};color:#fff;padding:10px 16px;text-decoration:none">Reset password</a></p>
<p>If you did not request this change you can ignore this message.</p>
</div>"#,
        logo = logo(branding),
        name = escape_html(user_name),
        url = escape_html(reset_url),
    );
    (subject, html)
}

/// Subject and body of a contact form message forwarded to the inbox.
///
/// The subject is `"{from}: {subject}"`, or `"{from}: No subject"` when the
/// sender left it blank.
pub fn contact_message(
    branding: &Branding,
    from_email: &str,
    from_name: &str,
    subject: Option<&str>,
    text: &str,
) -> (String, String) {
    let subject = match subject.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => format!("{from_email}: {s}"),
        None => format!("{from_email}: No subject"),
    };
    let html = format!(
        r#"<div style="font-family:sans-serif">
<h3 style="color:{color}">{name} &lt;{email}&gt;</h3>
<p>{body}</p>
</div>"#,
        color = color(branding),
        name = escape_html(from_name),
        email = escape_html(from_email),
        body = escape_html(text).replace('\n', "<br/>"),
    );
    (subject, html)
}
