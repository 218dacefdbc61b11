//! Landing page at `/`.
//!
//! The wizard itself is driven through the JSON API; this page only lists
//! the steps and points at the endpoints.

use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use vega_core::wizard::Step;

use crate::state::AppState;

/// Build the UI router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(landing_page))
}

async fn landing_page() -> Html<String> {
    let steps: String = Step::ALL
        .iter()
        .map(|s| format!("<li>{}</li>", s.label()))
        .collect();

    let mut html = String::with_capacity(LANDING_HEAD.len() + LANDING_BODY.len() + 256);
    html.push_str(LANDING_HEAD);
    html.push_str(&LANDING_BODY.replace("{{STEPS}}", &steps));
    Html(html)
}

const LANDING_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>Vega Video</title>
<style>
body{font-family:-apple-system,sans-serif;max-width:640px;margin:48px auto;padding:0 24px;line-height:1.6}
code{background:#f3f3f3;padding:2px 6px;border-radius:4px}
</style></head>
"##;

const LANDING_BODY: &str = r##"<body>
<h1>Vega Video</h1>
<p>Create a lip-synced avatar video in three steps:</p>
<ol>{{STEPS}}</ol>
<p>Start a session with <code>POST /v1/wizard</code>. Available avatars are listed at <a href="/v1/avatars"><code>/v1/avatars</code></a>.</p>
</body></html>
"##;
