//! Session routes — the HTTP face of the name prompt.

use axum::extract::State;
use axum::response::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::controllers::modal::{ModalController, ModalOutcome};
use crate::services::session::SessionIdentity;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    /// Raw persisted name, if any.
    pub user_name: Option<String>,
    /// Name used on outgoing messages.
    pub display_name: String,
    pub needs_prompt: bool,
}

impl From<&SessionIdentity> for SessionView {
    fn from(identity: &SessionIdentity) -> Self {
        Self {
            user_name: identity.user_name().map(str::to_owned),
            display_name: identity.get_user().to_owned(),
            needs_prompt: identity.needs_prompt(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModalReply {
    pub outcome: ModalOutcome,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct SubmitName {
    pub name: String,
}

/// `GET /api/session`
pub async fn show(identity: SessionIdentity) -> Json<SessionView> {
    Json(SessionView::from(&identity))
}

/// `POST /api/session` — persist the chosen name.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SubmitName>,
) -> (CookieJar, Json<ModalReply>) {
    let (jar, outcome) = ModalController::new(jar, state.cookie_secure).submit(&body.name);
    tracing::info!(user_name = %body.name, "session: name submitted");
    reply(jar, outcome)
}

/// `DELETE /api/session` — forget the persisted name.
pub async fn remove(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<ModalReply>) {
    let (jar, outcome) = ModalController::new(jar, state.cookie_secure).remove();
    tracing::info!("session: name removed");
    reply(jar, outcome)
}

/// `POST /api/session/cancel` — dismiss the prompt; nothing is stored.
pub async fn cancel(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<ModalReply>) {
    let (jar, outcome) = ModalController::new(jar, state.cookie_secure).cancel();
    reply(jar, outcome)
}

fn reply(jar: CookieJar, outcome: ModalOutcome) -> (CookieJar, Json<ModalReply>) {
    let session = SessionView::from(&SessionIdentity::from_jar(&jar));
    (jar, Json(ModalReply { outcome, session }))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
