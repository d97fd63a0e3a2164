use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, AuthenticatedUser,
        ChangePasswordRequest, LoginRequest, RegisterRequest,
    },
    error::AppError,
    models::{User, UserProfile},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, created_at, updated_at, is_active";

async fn fetch_active_user(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1 AND is_active",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let username_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&register_data.username)
            .fetch_one(&**pool)
            .await?;
    if username_taken {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    let email_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&register_data.email)
            .fetch_one(&**pool)
            .await?;
    if email_taken {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let password_hash = hash_password(&register_data.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, username, email, password_hash, first_name, last_name) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&register_data.username)
    .bind(&register_data.email)
    .bind(&password_hash)
    .bind(&register_data.first_name)
    .bind(&register_data.last_name)
    .fetch_one(&**pool)
    .await?;

    let (token, expires_at) = generate_token(&user)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        expires_at,
    }))
}

/// Login user
///
/// Authenticates by username or email plus password and returns a token.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let identifier = login_data
        .identifier()
        .ok_or_else(|| AppError::BadRequest("Username or email is required".into()))?
        .to_string();
    if login_data.password.trim().is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1 OR email = $1",
        USER_COLUMNS
    ))
    .bind(&identifier)
    .fetch_optional(&**pool)
    .await?;

    let user = user.ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is not active".into()));
    }
    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let (token, expires_at) = generate_token(&user)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        expires_at,
    }))
}

/// Change the authenticated user's password
///
/// Requires the current password to verify before the hash is replaced.
#[post("/change-password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    auth_user: AuthenticatedUser,
    change_data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    change_data.validate()?;

    let user = fetch_active_user(&pool, auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&change_data.current_password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let new_hash = hash_password(&change_data.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(&new_hash)
        .bind(user.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password changed successfully"
    })))
}

/// Get the authenticated user's profile
#[get("/profile")]
pub async fn profile(
    pool: web::Data<PgPool>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = fetch_active_user(&pool, auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

/// Validate the bearer token
///
/// Answers purely from the token's claims; no database round trip.
#[get("/validate-token")]
pub async fn validate_token(auth_user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "valid": true,
        "userId": auth_user.id,
        "username": auth_user.username,
        "email": auth_user.email
    }))
}

/// Database connectivity probe
#[get("/db-health")]
pub async fn db_health(pool: web::Data<PgPool>) -> impl Responder {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active")
        .fetch_one(&**pool)
        .await
    {
        Ok(user_count) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "userCount": user_count,
            "timestamp": Utc::now()
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "status": "unhealthy",
            "message": e.to_string(),
            "timestamp": Utc::now()
        })),
    }
}
