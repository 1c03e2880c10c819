//! Landing page — the single view, with the session gate applied.
//!
//! The page is a fixed template. The server fills in the heading and the
//! current display name, and opens the name prompt when the session gate
//! says so; everything live happens over `/api/ws` afterwards.

use askama::Template;
use axum::response::Html;

use crate::controllers::landing::WELCOME;
use crate::services::session::SessionIdentity;

/// `templates/landing.html`. Askama escapes every field for HTML.
#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate<'a> {
    welcome: &'a str,
    user_name: &'a str,
    /// `open` or `closed`; the page script reads it from `data-modal`.
    modal_state: &'a str,
}

/// `GET /index.html`
pub async fn index(identity: SessionIdentity) -> Html<String> {
    Html(render(&identity))
}

#[must_use]
pub fn render(identity: &SessionIdentity) -> String {
    let template = LandingTemplate {
        welcome: WELCOME,
        user_name: identity.get_user(),
        modal_state: if identity.needs_prompt() { "open" } else { "closed" },
    };
    template.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "landing: template render failed");
        "Internal Server Error".to_string()
    })
}
