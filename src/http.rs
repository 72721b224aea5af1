use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::service::UserService;
use crate::user::{self, NewUser, User};

pub type Result<T> = std::result::Result<T, ApiError>;

/// A failed request. Responds with a bare status code; the cause is
/// only logged.
#[derive(Debug, Error)]
#[error("request failed with {status}")]
pub struct ApiError {
    status: StatusCode,
    #[source]
    source: user::Error,
}

impl ApiError {
    pub fn internal(source: user::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            source,
        }
    }

    /// Not found becomes 404, anything else stays a server error.
    pub fn not_found_or_internal(source: user::Error) -> Self {
        if source.is_not_found() {
            Self {
                status: StatusCode::NOT_FOUND,
                source,
            }
        } else {
            Self::internal(source)
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        if self.status.is_server_error() {
            log::error!("{self}: {:?}", self.source);
        } else {
            log::debug!("{self}: {}", self.source);
        }
        HttpResponse::new(self.status)
    }
}

#[derive(Debug, Serialize)]
struct UserList {
    data: Vec<User>,
}

/// Path ids that are missing or not integers fall back to 0.
pub fn parse_id(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("HELLO WORLD!")
}

#[get("/users")]
async fn list_users(service: web::Data<UserService>) -> Result<web::Json<UserList>> {
    let data = service.list_users().await.map_err(ApiError::internal)?;
    Ok(web::Json(UserList { data }))
}

#[get("/users/{id}")]
async fn get_user(
    service: web::Data<UserService>,
    id: web::Path<String>,
) -> Result<web::Json<User>> {
    let user = service
        .get_user(parse_id(&id))
        .await
        .map_err(ApiError::internal)?;
    Ok(web::Json(user))
}

#[post("/users")]
async fn create_user(
    service: web::Data<UserService>,
    input: web::Json<NewUser>,
) -> Result<web::Json<User>> {
    let user = service
        .create_user(&input)
        .await
        .map_err(ApiError::internal)?;
    Ok(web::Json(user))
}

#[put("/user/{id}")]
async fn update_user(
    service: web::Data<UserService>,
    id: web::Path<String>,
    input: web::Json<NewUser>,
) -> Result<web::Json<User>> {
    let user = service
        .update_user(parse_id(&id), &input)
        .await
        .map_err(ApiError::not_found_or_internal)?;
    Ok(web::Json(user))
}

#[delete("/user/{id}")]
async fn delete_user(
    service: web::Data<UserService>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let deleted = service
        .delete_user(parse_id(&id))
        .await
        .map_err(ApiError::internal)?;

    let message = if deleted {
        "Delete Success"
    } else {
        "Delete Failed"
    };
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}
