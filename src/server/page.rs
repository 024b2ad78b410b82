use crate::dashboard::DashboardView;

/// Escape text for embedding in HTML
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Minimal page: the text rendering, reloaded whenever the event stream
/// reports a change
pub fn render_page(view: &DashboardView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        :root {{ color-scheme: dark; }}
        body {{
            margin: 0;
            padding: 2rem;
            background: #111;
            color: #ddd;
            font-family: ui-monospace, monospace;
        }}
        h1 {{ margin: 0; font-size: 1.5rem; }}
        p.subtitle {{ margin: 0 0 1.5rem 0; color: #888; }}
        pre {{ line-height: 1.4; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p class="subtitle">{subtitle}</p>
    <pre id="dashboard">{body}</pre>
    <script>
        const events = new EventSource("/api/events");
        let pending = null;
        ["device_toggled", "device_value_changed", "device_status_changed",
         "camera_refreshed", "camera_recording_changed", "camera_status_changed",
         "devices_replaced", "cameras_replaced", "feed_phase_changed"].forEach((name) => {{
            events.addEventListener(name, () => {{
                clearTimeout(pending);
                pending = setTimeout(() => window.location.reload(), 250);
            }});
        }});
    </script>
</body>
</html>
"#,
        title = escape(view.title),
        subtitle = escape(view.subtitle),
        body = escape(&view.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
