use crate::schema::activities;
use crate::schema::activities::dsl::*;
use crate::schema::activity_grades;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use super::session::Session;

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable,
)]
#[table_name = "activities"]
pub struct Activity {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub hours_reward: i32,
    pub min_xp: i32,
    pub max_xp: i32,
    pub gender_restriction: String,
    pub capacity: i32,
    pub created_at: NaiveDateTime,
}

impl Activity {
    pub fn find(aid: i32, conn: &PgConnection) -> QueryResult<Self> {
        activities.find(aid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        activities.order(id.desc()).load(conn)
    }

    pub fn list_by_status(s: &str, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        activities.filter(status.eq(s)).order(id.desc()).load(conn)
    }

    /// 标题/详情子串检索，只在给定状态内查
    pub fn search(s: &str, query: &str, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        let pattern = format!("%{}%", query);
        activities
            .filter(status.eq(s))
            .filter(title.ilike(pattern.clone()).or(description.ilike(pattern)))
            .order(id.desc())
            .load(conn)
    }

    pub fn sessions(&self, conn: &PgConnection) -> QueryResult<Vec<Session>> {
        Session::belonging_to(self).load(conn)
    }

    pub fn allowed_grade_ids(&self, conn: &PgConnection) -> QueryResult<Vec<i32>> {
        activity_grades::table
            .filter(activity_grades::activity_id.eq(self.id))
            .select(activity_grades::grade_id)
            .load(conn)
    }

    pub fn set_allowed_grades(&self, grade_ids: &[i32], conn: &PgConnection) -> QueryResult<()> {
        diesel::delete(
            activity_grades::table.filter(activity_grades::activity_id.eq(self.id)),
        )
        .execute(conn)?;
        if grade_ids.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewActivityGrade> = grade_ids
            .iter()
            .map(|gid| NewActivityGrade {
                activity_id: self.id,
                grade_id: *gid,
            })
            .collect();
        diesel::insert_into(activity_grades::table)
            .values(&rows)
            .execute(conn)?;
        Ok(())
    }

    pub fn update_fields(&self, changes: &NewActivity, conn: &PgConnection) -> QueryResult<Self> {
        diesel::update(self).set(changes).get_result(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "activities"]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub hours_reward: i32,
    pub min_xp: i32,
    pub max_xp: i32,
    pub gender_restriction: String,
    pub capacity: i32,
}

impl NewActivity {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Activity> {
        diesel::insert_into(activities::table)
            .values(self)
            .get_result(conn)
    }
}

#[derive(Insertable, Debug)]
#[table_name = "activity_grades"]
pub struct NewActivityGrade {
    pub activity_id: i32,
    pub grade_id: i32,
}
