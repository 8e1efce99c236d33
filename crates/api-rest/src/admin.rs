//! Admin endpoint for repointing the document store at runtime.

use crate::{ApiError, AppState};
use api_shared::{ErrorRes, MessageRes};
use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};
use ehr_core::{parse_body, ConnectionDetails};

const USERNAME_HEADER: &str = "username";
const PASSWORD_HEADER: &str = "password";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/change-connection",
    request_body = ConnectionDetails,
    params(
        ("username" = String, Header, description = "Admin username"),
        ("password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Store connection replaced", body = MessageRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 401, description = "Missing or wrong admin credentials", body = ErrorRes),
        (status = 422, description = "Body does not match the connection schema", body = ErrorRes),
        (status = 500, description = "New store handle could not be built", body = ErrorRes)
    )
)]
/// Replace the active store connection
///
/// Credentials are checked before the body is read, so an unauthorised caller
/// learns nothing about body validation and the active store is never touched.
/// A MongoDB handle is built lazily: success does not prove the new server is
/// reachable.
#[axum::debug_handler]
pub async fn change_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    state.admin.verify(
        header(&headers, USERNAME_HEADER),
        header(&headers, PASSWORD_HEADER),
    )?;

    let details: ConnectionDetails = parse_body("ConnectionDetails", &body)?;
    state.reconnection.change_connection(&details).await?;

    Ok(Json(MessageRes::new("MongoDB connection updated successfully")))
}
