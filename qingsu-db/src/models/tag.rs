use crate::schema::tags;
use crate::schema::tags::dsl::*;
use diesel::{dsl::any, prelude::*};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable,
)]
#[table_name = "tags"]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub xp_bonus: i32,
}

impl Tag {
    pub fn find(tid: i32, conn: &PgConnection) -> QueryResult<Self> {
        tags.find(tid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        tags.order(id.asc()).load(conn)
    }

    /// 未知名称直接丢弃，结果按传入名称过滤
    pub fn find_by_names(names: &[String], conn: &PgConnection) -> QueryResult<Vec<Self>> {
        tags.filter(name.eq(any(names))).load(conn)
    }

    pub fn delete(tid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(tags.find(tid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[table_name = "tags"]
pub struct NewTag {
    pub name: String,
    pub xp_bonus: i32,
}

impl NewTag {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Tag> {
        diesel::insert_into(tags::table)
            .values(self)
            .get_result(conn)
    }
}
