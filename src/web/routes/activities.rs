use axum::{
    async_trait,
    extract::{rejection::PathRejection, FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, Uri},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ActivityListing;
use crate::services::activities_service::{self, ActivityError};
use crate::state::AppState;
use crate::web::error::ApiError;

// Segment positions in `/activities/{activity_name}/...`.
const ACTIVITY_SEGMENT: usize = 2;
const EMAIL_SEGMENT: usize = 4;

/// Signup body, read from either a urlencoded or a multipart form.
#[derive(Debug)]
pub struct SignupForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct UrlencodedSignup {
    email: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for SignupForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        // Anything that does not yield an `email` value counts as the field being absent.
        let email = if is_multipart {
            email_from_multipart(req, state).await
        } else {
            match Form::<UrlencodedSignup>::from_request(req, state).await {
                Ok(Form(form)) => form.email,
                Err(rejection) => {
                    debug!("Signup form rejected: {}", rejection);
                    None
                }
            }
        };

        email
            .map(|email| SignupForm { email })
            .ok_or(ApiError::MissingRequiredField("email"))
    }
}

async fn email_from_multipart<S: Send + Sync>(req: Request, state: &S) -> Option<String> {
    let mut multipart = match Multipart::from_request(req, state).await {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!("Signup multipart rejected: {}", rejection);
            return None;
        }
    };

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("email") => {
                return match field.text().await {
                    Ok(email) => Some(email),
                    Err(e) => {
                        debug!("Unreadable email field: {}", e);
                        None
                    }
                };
            }
            Ok(Some(_)) => continue,
            Ok(None) => return None,
            Err(e) => {
                debug!("Malformed multipart body: {}", e);
                return None;
            }
        }
    }
}

/// Percent-decodes one raw path segment, replacing invalid UTF-8 with U+FFFD.
/// Such a value can never equal a stored name or email, so lookups on it
/// simply miss.
fn lossy_segment(uri: &Uri, index: usize) -> Option<String> {
    let raw = uri.path().split('/').nth(index)?;
    let bytes = urlencoding::decode_binary(raw.as_bytes());
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_activities_handler(State(state): State<AppState>) -> Json<ActivityListing> {
    Json(activities_service::list_activities(&state.directory))
}

pub async fn signup_handler(
    State(state): State<AppState>,
    uri: Uri,
    path: Result<Path<String>, PathRejection>,
    form: SignupForm,
) -> Result<Json<MessageResponse>, ApiError> {
    let activity_name = match path {
        Ok(Path(name)) => name,
        Err(rejection) => {
            debug!("Activity segment not decodable: {}", rejection);
            lossy_segment(&uri, ACTIVITY_SEGMENT).ok_or(ActivityError::ActivityNotFound)?
        }
    };

    let message =
        activities_service::signup(&state.directory, state.capacity, &activity_name, &form.email)?;
    Ok(Json(MessageResponse { message }))
}

pub async fn unregister_handler(
    State(state): State<AppState>,
    uri: Uri,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (activity_name, email) = match path {
        Ok(Path(params)) => params,
        Err(rejection) => {
            debug!("Path segment not decodable: {}", rejection);
            let activity_name =
                lossy_segment(&uri, ACTIVITY_SEGMENT).ok_or(ActivityError::ActivityNotFound)?;
            let email =
                lossy_segment(&uri, EMAIL_SEGMENT).ok_or(ActivityError::ParticipantNotFound)?;
            (activity_name, email)
        }
    };

    let message = activities_service::unregister(&state.directory, &activity_name, &email)?;
    Ok(Json(MessageResponse { message }))
}
