use actix_web::{
    get, post,
    web::{self, Json},
    HttpRequest, HttpResponse,
};
use bcrypt::{hash, DEFAULT_COST};

use qingsu_db::connection::PgPool;
use qingsu_db::models::activity::Activity as ActivityData;
use qingsu_db::models::grade::Grade;
use qingsu_db::models::profile::Profile as ProfileData;
use qingsu_db::models::registration::Registration as RegistrationData;
use qingsu_db::models::session::Session as SessionData;
use qingsu_db::models::user::User;

use crate::auth::require_user;
use crate::config::Config;
use crate::error::AppError;
use crate::models::profile::{Profile, ProfileEditInput, Registration};
use crate::pool_conn;

#[get("/profile")]
pub async fn my_profile(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let claims = require_user(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let user = User::get(&claims.sub, &conn)?;
    let profile = ProfileData::get_by_user(&user.id, &conn)?;

    let grade = match profile.grade_id {
        Some(gid) => Some(Grade::find(gid, &conn)?.name),
        None => None,
    };
    let tags = profile
        .tags(&conn)?
        .into_iter()
        .map(|t| t.name)
        .collect::<Vec<_>>();

    let registrations = RegistrationData::list_by_profile(profile.id, &conn)?
        .iter()
        .map(|r| {
            let activity = ActivityData::find(r.activity_id, &conn)?;
            let session = match r.session_id {
                Some(sid) => match SessionData::find(sid, &conn) {
                    Ok(s) => Some(format!("{} {}~{}", s.date, s.start_time, s.end_time)),
                    Err(diesel::result::Error::NotFound) => None,
                    Err(e) => return Err(e.into()),
                },
                None => None,
            };
            Ok(Registration {
                id: r.id,
                activity_id: r.activity_id,
                activity_title: activity.title,
                session,
                status: r.status.clone(),
                hours_awarded: r.hours_awarded,
                registered_at: r.registered_at,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "profile": Profile::assemble(&profile, &user.name, grade, tags),
        "registrations": registrations,
    })))
}

#[get("/profile/edit")]
pub async fn edit_profile_form(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let claims = require_user(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let user = User::get(&claims.sub, &conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "username": user.id,
        "name": user.name,
    })))
}

#[post("/profile/edit")]
pub async fn edit_profile(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<ProfileEditInput>,
) -> Result<HttpResponse, AppError> {
    let claims = require_user(&req, &config)?;
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("姓名不能为空".to_string()));
    }

    let conn = pool_conn(&pool)?;
    let user = User::get(&claims.sub, &conn)?;

    // 只有填了密码才改密码，且两次输入必须一致
    if let Some(password) = input.password.as_deref().filter(|p| !p.is_empty()) {
        if input.password_confirm.as_deref() != Some(password) {
            return Err(AppError::BadRequest("两次输入的密码不一致".to_string()));
        }
        user.update_password_hash(hash(password, DEFAULT_COST)?, &conn)?;
    }
    user.update_name(input.name.trim(), &conn)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "message": "个人信息已更新！",
    })))
}
