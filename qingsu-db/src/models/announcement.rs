use crate::schema::announcements;
use crate::schema::announcements::dsl::*;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable,
)]
#[table_name = "announcements"]
pub struct Announcement {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl Announcement {
    pub fn latest(n: i64, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        announcements.order(created_at.desc()).limit(n).load(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        announcements.order(created_at.desc()).load(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[table_name = "announcements"]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
}

impl NewAnnouncement {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Announcement> {
        diesel::insert_into(announcements::table)
            .values(self)
            .get_result(conn)
    }
}
