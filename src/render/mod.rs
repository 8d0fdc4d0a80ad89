//! HTML presentation for the status page.
//!
//! Takes the collected [`ProbeResult`] set and renders the single-page
//! dashboard: one card per dependency, grouped into internal (database) and
//! external (egress) sections. The page always renders — failed probes
//! degrade to Disconnected/Unreachable chips, never to an error page.

use crate::probe::{ProbeKind, ProbeResult};

const PAGE_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Ubuntu, sans-serif;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    min-height: 100vh;
    display: flex;
    align-items: center;
    justify-content: center;
    padding: 20px;
}
.container {
    background: white;
    border-radius: 16px;
    box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3);
    padding: 40px;
    max-width: 600px;
    width: 100%;
}
h1 { color: #333; font-size: 2rem; margin-bottom: 8px; text-align: center; }
.subtitle { color: #666; text-align: center; margin-bottom: 30px; font-size: 0.95rem; }
.card { background: #f8f9fa; border-radius: 12px; padding: 20px; margin-bottom: 16px; }
.card-header { display: flex; align-items: center; margin-bottom: 12px; }
.card-icon {
    width: 40px; height: 40px; border-radius: 10px;
    display: flex; align-items: center; justify-content: center;
    margin-right: 12px; font-size: 1.2rem;
    background: linear-gradient(135deg, #667eea, #764ba2);
}
.card-title { font-weight: 600; color: #333; }
.card-content { color: #555; font-size: 0.95rem; padding-left: 52px; }
.status {
    display: inline-flex; align-items: center;
    padding: 6px 12px; border-radius: 20px;
    font-size: 0.8rem; font-weight: 500; margin-top: 8px;
}
.status.success { background: #d4edda; color: #155724; }
.status.error { background: #f8d7da; color: #721c24; }
.status-dot { width: 8px; height: 8px; border-radius: 50%; margin-right: 6px; }
.status.success .status-dot { background: #28a745; }
.status.error .status-dot { background: #dc3545; }
.section-title {
    font-size: 0.85rem; color: #999; text-transform: uppercase;
    letter-spacing: 1px; margin: 24px 0 12px 0;
    padding-bottom: 8px; border-bottom: 1px solid #eee;
}
.footer { text-align: center; margin-top: 24px; color: #999; font-size: 0.85rem; }
"#;

/// Render the full status page for one probe collection.
pub fn status_page(results: &[ProbeResult], port: u16) -> String {
    let internal: String = results
        .iter()
        .filter(|r| r.kind == ProbeKind::Database)
        .map(card)
        .collect();
    let external: String = results
        .iter()
        .filter(|r| r.kind == ProbeKind::Http)
        .map(card)
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Dependency Status</title>
    <style>{PAGE_STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Dependency Status</h1>
        <p class="subtitle">statusd &mdash; external dependency reachability</p>

        <div class="section-title">Internal Services</div>
{internal}
        <div class="section-title">External Services (Egress)</div>
{external}
        <div class="footer">
            Running on port {port}
        </div>
    </div>
</body>
</html>"#
    )
}

/// One dependency card: icon, label, target, detail, and a status chip.
fn card(result: &ProbeResult) -> String {
    let (status_label, status_class) = status_chip(result);
    let icon = icon_for(result);
    let label = escape_html(&result.label);
    let target = escape_html(&result.target);
    let detail = escape_html(&result.detail);
    let latency = match result.latency_ms {
        Some(ms) => format!(" ({ms}ms)"),
        None => String::new(),
    };

    format!(
        r#"        <div class="card">
            <div class="card-header">
                <div class="card-icon">{icon}</div>
                <span class="card-title">{label}</span>
            </div>
            <div class="card-content">
                {target}<br>
                {detail}{latency}
                <div class="status {status_class}">
                    <span class="status-dot"></span>
                    {status_label}
                </div>
            </div>
        </div>
"#
    )
}

/// Chip wording per kind: databases disconnect, endpoints become unreachable.
fn status_chip(result: &ProbeResult) -> (&'static str, &'static str) {
    match (result.kind, result.reachable) {
        (_, true) => ("Connected", "success"),
        (ProbeKind::Database, false) => ("Disconnected", "error"),
        (ProbeKind::Http, false) => ("Unreachable", "error"),
    }
}

fn icon_for(result: &ProbeResult) -> &'static str {
    match result.name.as_str() {
        "database" => "&#x1F5C4;",
        "github" => "&#x1F419;",
        "cloudflare" => "&#x2601;",
        _ => "&#x1F50C;",
    }
}

/// Minimal HTML escape for text interpolated into the page.
/// Probe details carry raw driver error text and must not inject markup.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
