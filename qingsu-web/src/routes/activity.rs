use actix_web::{
    get, post,
    web::{self, Json, Path, Query},
    HttpRequest, HttpResponse,
};
use serde::Deserialize;

use qingsu_db::connection::PgPool;
use qingsu_db::models::activity::Activity as ActivityData;
use qingsu_db::models::announcement::Announcement;
use qingsu_db::models::profile::Profile as ProfileData;
use qingsu_db::models::registration::Registration as RegistrationData;
use qingsu_db::models::session::Session as SessionData;

use crate::auth::require_user;
use crate::config::Config;
use crate::error::AppError;
use crate::models::activity::{Activity, RegistrationInput, Session};
use crate::models::ActivityStatus;
use crate::workflow::{self, SubmitError};
use crate::{flash_err, pool_conn};

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[get("/")]
pub async fn activity_list(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let open = ActivityStatus::Open.to_string();
    let activities = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => ActivityData::search(&open, q, &conn)?,
        None => ActivityData::list_by_status(&open, &conn)?,
    };
    let announcements = Announcement::latest(3, &conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "activities": activities.iter().map(Activity::from).collect::<Vec<_>>(),
        "announcements": announcements,
        "search_query": query.q.clone().unwrap_or_default(),
    })))
}

#[get("/activity/{id}")]
pub async fn activity_detail(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
) -> Result<HttpResponse, AppError> {
    let claims = require_user(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    let profile = ProfileData::get_by_user(&claims.sub, &conn)?;

    let is_registered = RegistrationData::exists_for(profile.id, activity.id, &conn)?;
    let approved = RegistrationData::count_approved_for_activity(activity.id, &conn)?;
    let is_full = workflow::activity_full(activity.capacity, approved);
    let allowed_grades = activity.allowed_grade_ids(&conn)?;
    let is_eligible = workflow::check_eligibility(&profile, &activity, &allowed_grades);

    let sessions = SessionData::list_for_activity(activity.id, &conn)?
        .iter()
        .map(|s| {
            let occupancy = RegistrationData::count_active_for_session(s.id, &conn)?;
            Ok(Session::with_occupancy(s, occupancy))
        })
        .collect::<Result<Vec<_>, diesel::result::Error>>()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "activity": Activity::from(&activity),
        "sessions": sessions,
        "approved_count": approved,
        "is_registered": is_registered,
        "is_full": is_full,
        "is_eligible": is_eligible,
    })))
}

#[post("/activity/{id}")]
pub async fn activity_register(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
    input: Json<RegistrationInput>,
) -> Result<HttpResponse, AppError> {
    let claims = require_user(&req, &config)?;
    if input.phone.trim().is_empty()
        || input.class_name.trim().is_empty()
        || input.teacher_name.trim().is_empty()
    {
        return Err(AppError::BadRequest("联系信息不完整".to_string()));
    }

    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    let profile = ProfileData::get_by_user(&claims.sub, &conn)?;
    let session = match input.session_id {
        Some(sid) => {
            let session = SessionData::find(sid, &conn)?;
            if session.activity_id != activity.id {
                return Err(AppError::BadRequest("时段不属于该活动".to_string()));
            }
            Some(session)
        }
        None => None,
    };

    match workflow::submit_registration(&profile, &activity, session.as_ref(), &input, &conn) {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "ok": true,
            "message": "报名成功！",
        }))),
        Err(SubmitError::Rejected(rejection)) => Ok(flash_err(rejection.message())),
        Err(SubmitError::Db(e)) => Err(e.into()),
    }
}
