use std::str::FromStr;

use actix_web::{
    delete, get, post, put,
    web::{self, Bytes, Json, Path},
    HttpRequest, HttpResponse,
};
use chrono::{FixedOffset, Utc};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use qingsu_db::connection::PgPool;
use qingsu_db::models::activity::Activity as ActivityData;
use qingsu_db::models::announcement::NewAnnouncement;
use qingsu_db::models::grade::Grade;
use qingsu_db::models::message::Message as MessageData;
use qingsu_db::models::profile::Profile as ProfileData;
use qingsu_db::models::registration::Registration as RegistrationData;
use qingsu_db::models::session::{NewSession, Session as SessionData};
use qingsu_db::models::tag::{NewTag, Tag};
use qingsu_db::models::user::User;

use crate::auth::require_admin;
use crate::config::Config;
use crate::error::AppError;
use crate::jobs;
use crate::models::activity::{Activity, ActivityInput, SessionInput};
use crate::models::{ActivityStatus, GenderRestriction, RegistrationStatus};
use crate::pool_conn;
use crate::xlsx::{self, ExportRow};

fn validate_activity(input: &ActivityInput) -> Result<(), AppError> {
    ActivityStatus::from_str(&input.status)
        .map_err(|_| AppError::BadRequest(format!("未知活动状态：{}", input.status)))?;
    GenderRestriction::from_str(&input.gender_restriction)
        .map_err(|_| AppError::BadRequest(format!("未知性别限制：{}", input.gender_restriction)))?;
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("活动标题不能为空".to_string()));
    }
    if input.min_xp > input.max_xp {
        return Err(AppError::BadRequest("经验值下限不能高于上限".to_string()));
    }
    if input.hours_reward < 0 || input.capacity < 0 {
        return Err(AppError::BadRequest("时长与名额不能为负".to_string()));
    }
    Ok(())
}

#[post("/activities")]
pub async fn create_activity(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<ActivityInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    validate_activity(&input)?;
    let conn = pool_conn(&pool)?;
    let activity = input.to_row().create(&conn)?;
    activity.set_allowed_grades(&input.allowed_grade_ids, &conn)?;
    Ok(HttpResponse::Ok().json(Activity::from(&activity)))
}

#[put("/activities/{id}")]
pub async fn update_activity(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
    input: Json<ActivityInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    validate_activity(&input)?;
    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    let updated = activity.update_fields(&input.to_row(), &conn)?;
    updated.set_allowed_grades(&input.allowed_grade_ids, &conn)?;
    Ok(HttpResponse::Ok().json(Activity::from(&updated)))
}

#[post("/activities/{id}/sessions")]
pub async fn add_session(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
    input: Json<SessionInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    if input.start_time >= input.end_time {
        return Err(AppError::BadRequest("结束时间要晚于开始时间".to_string()));
    }
    if input.capacity < 0 {
        return Err(AppError::BadRequest("名额不能为负".to_string()));
    }
    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    let session = NewSession {
        activity_id: activity.id,
        date: input.date,
        start_time: input.start_time,
        end_time: input.end_time,
        location: input.location.clone(),
        capacity: input.capacity,
    }
    .create(&conn)?;
    Ok(HttpResponse::Ok().json(session))
}

#[delete("/sessions/{id}")]
pub async fn remove_session(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    if SessionData::delete(id, &conn)? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

#[derive(Serialize)]
pub struct RegistrationDetail {
    pub id: i32,
    pub name: String,
    pub student_id: String,
    pub activity_title: String,
    pub session: String,
    pub grade: String,
    pub class_name: String,
    pub gender: String,
    pub phone: String,
    pub teacher_name: String,
    pub registered_at: String,
    pub status: String,
}

fn collect_details(
    activity: &ActivityData,
    conn: &PgConnection,
) -> Result<Vec<RegistrationDetail>, AppError> {
    let mut details = Vec::new();
    for r in RegistrationData::list_by_activity(activity.id, conn)? {
        let profile = ProfileData::get(r.profile_id, conn)?;
        let user = User::get(&profile.user_id, conn)?;
        let grade = match profile.grade_id {
            Some(gid) => Grade::find(gid, conn)?.name,
            None => String::new(),
        };
        let session = match r.session_id {
            Some(sid) => match SessionData::find(sid, conn) {
                Ok(s) => format!("{} {}~{}", s.date, s.start_time, s.end_time),
                Err(diesel::result::Error::NotFound) => String::new(),
                Err(e) => return Err(e.into()),
            },
            None => String::new(),
        };
        details.push(RegistrationDetail {
            id: r.id,
            name: user.name,
            student_id: profile.student_id,
            activity_title: activity.title.clone(),
            session,
            grade,
            class_name: r.class_name.clone(),
            gender: profile.gender.clone(),
            phone: r.phone.clone(),
            teacher_name: r.teacher_name.clone(),
            registered_at: r.registered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: r.status.clone(),
        });
    }
    Ok(details)
}

#[get("/activities/{id}/registrations")]
pub async fn list_registrations(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    Ok(HttpResponse::Ok().json(collect_details(&activity, &conn)?))
}

#[derive(Deserialize)]
pub struct StatusBatch {
    pub ids: Vec<i32>,
    pub status: String,
}

/// 批量审核，显式传 id 列表
#[post("/registrations/status")]
pub async fn batch_status(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<StatusBatch>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let status = RegistrationStatus::from_str(&input.status)
        .map_err(|_| AppError::BadRequest(format!("未知报名状态：{}", input.status)))?;
    let conn = pool_conn(&pool)?;
    let updated = RegistrationData::update_status_many(&input.ids, &status.to_string(), &conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}

#[derive(Deserialize)]
pub struct HoursBatch {
    pub ids: Vec<i32>,
    pub hours: i32,
}

/// 实际授予时长可与活动标称时长不同
#[post("/registrations/hours")]
pub async fn batch_hours(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<HoursBatch>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    if input.hours < 0 {
        return Err(AppError::BadRequest("时长不能为负".to_string()));
    }
    let conn = pool_conn(&pool)?;
    let updated = RegistrationData::set_hours_many(&input.ids, input.hours, &conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}

#[get("/activities/{id}/registrations/export")]
pub async fn export_registrations(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    let rows: Vec<ExportRow> = collect_details(&activity, &conn)?
        .into_iter()
        .map(|d| ExportRow {
            name: d.name,
            student_id: d.student_id,
            activity_title: d.activity_title,
            session: d.session,
            grade: d.grade,
            class_name: d.class_name,
            gender: d.gender,
            phone: d.phone,
            teacher_name: d.teacher_name,
            registered_at: d.registered_at,
            status: d.status,
        })
        .collect();
    let bytes = xlsx::export_registrations(&rows)?;
    let today = Utc::now()
        .with_timezone(&FixedOffset::east(config.tz_offset_hours * 3600))
        .format("%Y%m%d");
    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"registrations_{}.xlsx\"", today),
        )
        .body(bytes))
}

#[post("/import/roster")]
pub async fn import_roster(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let rows = xlsx::read_rows(&body)?;
    let roster = xlsx::roster_from_rows(&rows)?;
    let conn = pool_conn(&pool)?;
    let report = jobs::import_roster(&roster, &conn);
    Ok(HttpResponse::Ok().json(report))
}

#[post("/activities/{id}/import-hours")]
pub async fn import_hours(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let activity = ActivityData::find(id, &conn)?;
    let rows = xlsx::read_rows(&body)?;
    let hours = xlsx::hours_from_rows(&rows)?;
    let report = jobs::award_hours(&hours, activity.id, &conn);
    Ok(HttpResponse::Ok().json(report))
}

#[derive(Deserialize)]
pub struct IdList {
    pub ids: Vec<i32>,
}

#[post("/profiles/recompute-xp")]
pub async fn recompute_xp(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<IdList>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let updated = jobs::recompute_xp(&input.ids, &conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}

#[derive(Deserialize)]
pub struct AnnouncementInput {
    pub title: String,
    pub content: String,
}

#[post("/announcements")]
pub async fn create_announcement(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<AnnouncementInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("公告标题不能为空".to_string()));
    }
    let conn = pool_conn(&pool)?;
    let announcement = NewAnnouncement {
        title: input.title.trim().to_string(),
        content: input.content.clone(),
    }
    .create(&conn)?;
    Ok(HttpResponse::Ok().json(announcement))
}

#[derive(Deserialize)]
pub struct VisibilityBatch {
    pub ids: Vec<i32>,
    pub visible: bool,
}

/// 留言只能隐藏/恢复，不提供删改
#[post("/messages/visibility")]
pub async fn moderate_messages(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<VisibilityBatch>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let updated = MessageData::set_visible_many(&input.ids, input.visible, &conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}

#[get("/tags")]
pub async fn list_tags(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    Ok(HttpResponse::Ok().json(Tag::list_all(&conn)?))
}

#[derive(Deserialize)]
pub struct TagInput {
    pub name: String,
    pub xp_bonus: i32,
}

#[post("/tags")]
pub async fn create_tag(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<TagInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("标签名不能为空".to_string()));
    }
    if input.xp_bonus < 0 {
        return Err(AppError::BadRequest("经验加成不能为负".to_string()));
    }
    let conn = pool_conn(&pool)?;
    let tag = NewTag {
        name: input.name.trim().to_string(),
        xp_bonus: input.xp_bonus,
    }
    .create(&conn)?;
    Ok(HttpResponse::Ok().json(tag))
}

#[delete("/tags/{id}")]
pub async fn remove_tag(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    Path(id): Path<i32>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &config)?;
    let conn = pool_conn(&pool)?;
    if Tag::delete(id, &conn)? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
