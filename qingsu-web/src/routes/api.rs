use actix_web::{get, web, HttpRequest, HttpResponse};

use qingsu_db::connection::PgPool;
use qingsu_db::models::activity::Activity as ActivityData;
use qingsu_db::models::grade::Grade;
use qingsu_db::models::profile::Profile as ProfileData;
use qingsu_db::models::user::User;

use crate::auth::require_user;
use crate::config::Config;
use crate::error::AppError;
use crate::models::activity::Activity;
use crate::models::profile::Profile;
use crate::models::ActivityStatus;
use crate::pool_conn;

/// 报名中的活动对外公开，无需令牌
#[get("/activities/")]
pub async fn activities(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let conn = pool_conn(&pool)?;
    let open = ActivityStatus::Open.to_string();
    let list = ActivityData::list_by_status(&open, &conn)?;
    Ok(HttpResponse::Ok().json(list.iter().map(Activity::from).collect::<Vec<_>>()))
}

#[get("/profile/")]
pub async fn profile(
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

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "username": user.id,
        "name": user.name,
        "profile": Profile::assemble(&profile, &user.name, grade, tags),
    })))
}
