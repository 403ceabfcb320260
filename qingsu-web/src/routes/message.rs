use actix_web::{
    get, post,
    web::{self, Json},
    HttpRequest, HttpResponse,
};

use qingsu_db::connection::PgPool;
use qingsu_db::models::message::{Message as MessageData, NewMessage};
use qingsu_db::models::user::User;

use crate::auth::require_user;
use crate::config::Config;
use crate::error::AppError;
use crate::models::message::{Message, MessageInput, MESSAGE_COLORS};
use crate::pool_conn;

#[get("/message-wall")]
pub async fn message_wall(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    require_user(&req, &config)?;
    let conn = pool_conn(&pool)?;
    let messages = MessageData::list_visible(&conn)?
        .iter()
        .map(|m| {
            let author = User::get(&m.user_id, &conn)?;
            Ok(Message::published(m, &author.name))
        })
        .collect::<Result<Vec<_>, diesel::result::Error>>()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "messages": messages,
        "colors": MESSAGE_COLORS,
    })))
}

#[post("/message-wall")]
pub async fn post_message(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    input: Json<MessageInput>,
) -> Result<HttpResponse, AppError> {
    let claims = require_user(&req, &config)?;
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let conn = pool_conn(&pool)?;
    NewMessage {
        user_id: claims.sub.clone(),
        body: input.body.trim().to_string(),
        color: input.color.clone(),
        is_anonymous: input.is_anonymous,
    }
    .create(&conn)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "message": "留言成功！",
    })))
}
