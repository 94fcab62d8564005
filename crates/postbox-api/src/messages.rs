use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, info};

use postbox_types::models::FormSubmission;

use crate::MESSAGE_PAGE;
use crate::state::AppState;

/// Relay a submitted message form to the ingest server.
///
/// Redirects back to the message page once the relay has written the data.
/// Anything downstream of the relay (ingest, storage) is invisible here.
pub async fn submit_message(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let form: FormSubmission = fields.into_iter().collect();
    info!("Data from form: {:?}", form);

    state.relay.send(&form).await.map_err(|e| {
        error!("Failed to relay form data: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server error: failed to process data",
        )
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, MESSAGE_PAGE)]))
}
