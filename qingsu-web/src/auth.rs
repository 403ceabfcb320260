use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use bcrypt::verify as verify_password;
use chrono::{Duration, NaiveDateTime, Utc};
use lazy_static::lazy_static;

use qingsu_common::utils::{
    create_token, decode_token, Claims, Role, TokenKind, ACCESS_TTL_MINUTES, REFRESH_TTL_DAYS,
    REMEMBER_TTL_DAYS,
};
use qingsu_db::connection::PgPool;
use qingsu_db::models::user::User;

use crate::captcha;
use crate::config::Config;
use crate::error::AppError;
use crate::models::user::{LoginInput, RefreshInput, TokenInput, TokenPair};
use crate::{flash_err, pool_conn};

/// 连续输错 5 次后短暂锁定该学号
const MAX_LOGIN_FAILURES: u32 = 5;
const LOCKOUT_MINUTES: i64 = 6;

lazy_static! {
    static ref LOGIN_FAILURES: Mutex<HashMap<String, FailureRecord>> = Mutex::new(HashMap::new());
}

#[derive(Clone, Copy)]
struct FailureRecord {
    count: u32,
    last_at: NaiveDateTime,
}

fn is_locked(rec: &FailureRecord, now: NaiveDateTime) -> bool {
    rec.count >= MAX_LOGIN_FAILURES && now - rec.last_at < Duration::minutes(LOCKOUT_MINUTES)
}

fn bump(rec: &mut FailureRecord, now: NaiveDateTime) {
    // 冷却期过了重新计数
    if now - rec.last_at >= Duration::minutes(LOCKOUT_MINUTES) {
        rec.count = 0;
    }
    rec.count += 1;
    rec.last_at = now;
}

fn locked_out(uid: &str) -> bool {
    let map = LOGIN_FAILURES.lock().expect("poisoned lock");
    map.get(uid)
        .map(|rec| is_locked(rec, Utc::now().naive_utc()))
        .unwrap_or(false)
}

fn record_failure(uid: &str) {
    let mut map = LOGIN_FAILURES.lock().expect("poisoned lock");
    let now = Utc::now().naive_utc();
    let rec = map.entry(uid.to_string()).or_insert(FailureRecord {
        count: 0,
        last_at: now,
    });
    bump(rec, now);
}

fn clear_failures(uid: &str) {
    LOGIN_FAILURES.lock().expect("poisoned lock").remove(uid);
}

pub fn claims_from_request(req: &HttpRequest, config: &Config) -> Option<Claims> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    let claims = decode_token(token, &config.secret_key).ok()?;
    if !claims.is_kind(TokenKind::Access) {
        return None;
    }
    Some(claims)
}

pub fn require_user(req: &HttpRequest, config: &Config) -> Result<Claims, AppError> {
    claims_from_request(req, config).ok_or(AppError::Unauthorized("未登录"))
}

pub fn require_admin(req: &HttpRequest, config: &Config) -> Result<Claims, AppError> {
    let claims = require_user(req, config)?;
    match claims.role() {
        Some(Role::Admin) => Ok(claims),
        _ => Err(AppError::Forbidden),
    }
}

fn issue_pair(user: &User, remember: bool, secret: &str) -> Result<TokenPair, AppError> {
    let role = Role::from_str(&user.user_role)
        .map_err(|_| AppError::Internal(format!("bad role: {}", user.user_role)))?;
    let refresh_days = if remember {
        REMEMBER_TTL_DAYS
    } else {
        REFRESH_TTL_DAYS
    };
    Ok(TokenPair {
        access: create_token(
            &user.id,
            role,
            TokenKind::Access,
            Duration::minutes(ACCESS_TTL_MINUTES),
            secret,
        )?,
        refresh: create_token(
            &user.id,
            role,
            TokenKind::Refresh,
            Duration::days(refresh_days),
            secret,
        )?,
    })
}

#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    if locked_out(&input.username) {
        return Ok(flash_err("尝试次数过多，请稍后再试"));
    }
    if let Some(captcha_cfg) = &config.captcha {
        let token = input.captcha_token.as_deref().unwrap_or("");
        if !captcha::verify(captcha_cfg, token).await {
            record_failure(&input.username);
            return Ok(flash_err("人机校验未通过"));
        }
    }

    let conn = pool_conn(&pool)?;
    let user = match User::get(&input.username, &conn) {
        Ok(user) => user,
        Err(diesel::result::Error::NotFound) => {
            record_failure(&input.username);
            return Ok(flash_err("学号或密码错误。"));
        }
        Err(e) => return Err(e.into()),
    };
    if !verify_password(&input.password, &user.hash_pwd)? {
        record_failure(&input.username);
        return Ok(flash_err("学号或密码错误。"));
    }
    if !user.is_active {
        return Ok(flash_err("账号已停用"));
    }

    clear_failures(&input.username);
    user.update_last_login(Utc::now().naive_utc(), &conn)?;
    let pair = issue_pair(&user, input.remember_me, &config.secret_key)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "name": user.name,
        "access": pair.access,
        "refresh": pair.refresh,
    })))
}

#[get("/logout")]
pub async fn logout() -> HttpResponse {
    // 无状态令牌，前端丢弃即可
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

#[post("/token/")]
pub async fn token_obtain(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: web::Json<TokenInput>,
) -> Result<HttpResponse, AppError> {
    let conn = pool_conn(&pool)?;
    let user = match User::get(&input.username, &conn) {
        Ok(user) => user,
        Err(diesel::result::Error::NotFound) => {
            return Err(AppError::Unauthorized("学号或密码错误"))
        }
        Err(e) => return Err(e.into()),
    };
    if !verify_password(&input.password, &user.hash_pwd)? {
        return Err(AppError::Unauthorized("学号或密码错误"));
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("账号已停用"));
    }
    user.update_last_login(Utc::now().naive_utc(), &conn)?;
    let pair = issue_pair(&user, false, &config.secret_key)?;
    Ok(HttpResponse::Ok().json(pair))
}

#[post("/token/refresh/")]
pub async fn token_refresh(
    config: web::Data<Config>,
    input: web::Json<RefreshInput>,
) -> Result<HttpResponse, AppError> {
    let claims = decode_token(&input.refresh, &config.secret_key)?;
    if !claims.is_kind(TokenKind::Refresh) {
        return Err(AppError::Unauthorized("需要刷新令牌"));
    }
    let role = claims.role().ok_or(AppError::Unauthorized("登录凭证无效"))?;
    let access = create_token(
        &claims.sub,
        role,
        TokenKind::Access,
        Duration::minutes(ACCESS_TTL_MINUTES),
        &config.secret_key,
    )?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "access": access })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd(2026, 9, 1).and_hms(h, m, 0)
    }

    #[test]
    fn locks_after_five_failures() {
        let mut rec = FailureRecord {
            count: 0,
            last_at: at(12, 0),
        };
        for i in 0..5 {
            assert!(!is_locked(&rec, at(12, i)));
            bump(&mut rec, at(12, i));
        }
        assert!(is_locked(&rec, at(12, 5)));
    }

    #[test]
    fn lock_expires_after_cooloff() {
        let rec = FailureRecord {
            count: 5,
            last_at: at(12, 0),
        };
        assert!(is_locked(&rec, at(12, 5)));
        assert!(!is_locked(&rec, at(12, 6)));
    }

    #[test]
    fn counter_resets_after_cooloff() {
        let mut rec = FailureRecord {
            count: 5,
            last_at: at(12, 0),
        };
        bump(&mut rec, at(12, 30));
        assert_eq!(rec.count, 1);
    }
}
