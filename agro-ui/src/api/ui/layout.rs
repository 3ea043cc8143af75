//! Shared page shell: theme, navbar, notices

use axum::response::Html;

use crate::session::Notice;

/// Navbar entry highlighted on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Scan,
    None,
}

const THEME_CSS: &str = r#"
body { margin:0; background:#87CEEB; color:black; font-family:'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; }
.navbar { display:flex; justify-content:space-between; align-items:center; padding:16px 40px; background:#5DADE2; border-bottom:2px solid #2E86C1; }
.logo { font-size:26px; font-weight:700; color:#0B3C5D; }
.menu span { margin-left:22px; font-weight:600; }
.menu .active { background:#2E86C1; color:white; padding:8px 18px; border-radius:20px; }
.build-info { font-family:'Courier New', monospace; font-size:12px; color:#0B3C5D; text-align:right; }
.content { padding:4.5rem 40px 40px 40px; }
.hero { background:linear-gradient(135deg,#AEDFF7,#5DADE2); border-radius:26px; padding:50px; margin:0 0 30px 0; }
.hero h1 { color:#0B3C5D; margin-top:0; }
.box { background:#D6ECFA; border-radius:18px; padding:30px; box-shadow:0 0 0 2px #5DADE2; max-width:480px; }
.box label { display:block; margin-top:12px; font-weight:600; }
.box input[type=text], .box input[type=password] { width:100%; padding:8px; margin-top:4px; box-sizing:border-box; }
.button, button { display:inline-block; background:#2E86C1; color:white; border:none; border-radius:10px; font-weight:700; padding:10px 20px; margin:12px 8px 0 0; text-decoration:none; cursor:pointer; font-size:15px; }
.button:hover, button:hover { background:#1B4F72; }
.upload { background:#D6ECFA; border-radius:14px; padding:14px; border:2px dashed #2E86C1; margin-bottom:14px; }
.notice { border-radius:8px; padding:12px 16px; margin:10px 0; max-width:640px; }
.notice.success { background:#d4edda; }
.notice.info { background:#d1ecf1; }
.notice.warning { background:#fff3cd; }
.notice.error { background:#f8d7da; }
.preview { max-width:320px; border-radius:8px; display:block; margin:10px 0; }
"#;

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// A coloured message box; `class` is one of success, info, warning, error
pub fn notice_box(class: &str, text: &str) -> String {
    format!(
        r#"<div class="notice {}">{}</div>"#,
        class,
        escape_html(text)
    )
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(text) => notice_box("success", text),
        Notice::Error(text) => notice_box("error", text),
    }
}

fn nav_class(item: NavItem, active: NavItem) -> &'static str {
    if item == active {
        "active"
    } else {
        ""
    }
}

/// Wrap `body` in the full page shell
pub fn render_page(title: &str, active: NavItem, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - AgroDetect AI</title>
    <style>{css}</style>
</head>
<body>
    <div class="navbar">
        <div class="logo">🌱 AgroDetect AI</div>
        <div class="menu">
            <span class="{home}">Home</span>
            <span class="{scan}">Scan</span>
            <span>Market</span>
            <span>Certificate</span>
        </div>
        <div class="build-info">
            <div>agro-ui v{version}</div>
            <div>{git} ({profile})</div>
        </div>
    </div>
    <div class="content">
{body}
    </div>
</body>
</html>"#,
        title = escape_html(title),
        css = THEME_CSS,
        home = nav_class(NavItem::Home, active),
        scan = nav_class(NavItem::Scan, active),
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        profile = env!("BUILD_PROFILE"),
        body = body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Asha" & 'Ravi'</b>"#),
            "&lt;b&gt;&quot;Asha&quot; &amp; &#39;Ravi&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("ఆశ"), "ఆశ");
    }

    #[test]
    fn test_render_page_marks_active_item() {
        let Html(page) = render_page("Scan", NavItem::Scan, "<p>hi</p>");
        assert!(page.contains(r#"<span class="active">Scan</span>"#));
        assert!(page.contains(r#"<span class="">Home</span>"#));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn test_notice_is_escaped() {
        let html = render_notice(&Notice::Error("<script>".into()));
        assert_eq!(html, r#"<div class="notice error">&lt;script&gt;</div>"#);
    }
}
