use super::user::User;
use crate::schema::messages;
use crate::schema::messages::dsl::*;
use chrono::NaiveDateTime;
use diesel::{dsl::any, prelude::*};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, Clone, Identifiable, Associations,
)]
#[belongs_to(User)]
#[table_name = "messages"]
pub struct Message {
    pub id: i32,
    pub user_id: String,
    pub body: String,
    pub color: String,
    pub is_visible: bool,
    pub is_anonymous: bool,
    pub created_at: NaiveDateTime,
}

impl Message {
    pub fn list_visible(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        messages
            .filter(is_visible.eq(true))
            .order(created_at.desc())
            .load(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        messages.order(created_at.desc()).load(conn)
    }

    pub fn set_visible_many(ids: &[i32], visible: bool, conn: &PgConnection) -> QueryResult<usize> {
        diesel::update(messages.filter(id.eq(any(ids))))
            .set(is_visible.eq(visible))
            .execute(conn)
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug)]
#[table_name = "messages"]
pub struct NewMessage {
    pub user_id: String,
    pub body: String,
    pub color: String,
    pub is_anonymous: bool,
}

impl NewMessage {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Message> {
        diesel::insert_into(messages::table)
            .values(self)
            .get_result(conn)
    }
}
