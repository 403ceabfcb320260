use super::activity::Activity;
use super::profile::Profile;
use super::session::Session;
use crate::schema::registrations;
use crate::schema::registrations::dsl::*;
use chrono::NaiveDateTime;
use diesel::{dsl::any, prelude::*};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[belongs_to(Profile)]
#[belongs_to(Activity)]
#[belongs_to(Session)]
#[table_name = "registrations"]
pub struct Registration {
    pub id: i32,
    pub profile_id: i32,
    pub activity_id: i32,
    pub session_id: Option<i32>,
    pub phone: String,
    pub class_name: String,
    pub teacher_name: String,
    pub status: String,
    pub hours_awarded: i32,
    pub registered_at: NaiveDateTime,
}

impl Registration {
    pub fn find(rid: i32, conn: &PgConnection) -> QueryResult<Self> {
        registrations.find(rid).first(conn)
    }

    pub fn find_many(ids: &[i32], conn: &PgConnection) -> QueryResult<Vec<Self>> {
        registrations.filter(id.eq(any(ids))).load(conn)
    }

    /// 同一(档案, 活动)只允许一条，与时段无关
    pub fn exists_for(pid: i32, aid: i32, conn: &PgConnection) -> QueryResult<bool> {
        diesel::select(diesel::dsl::exists(
            registrations
                .filter(profile_id.eq(pid))
                .filter(activity_id.eq(aid)),
        ))
        .get_result(conn)
    }

    pub fn get_for(pid: i32, aid: i32, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        registrations
            .filter(profile_id.eq(pid))
            .filter(activity_id.eq(aid))
            .load(conn)
    }

    /// 活动总名额只数已通过的
    pub fn count_approved_for_activity(aid: i32, conn: &PgConnection) -> QueryResult<i64> {
        registrations
            .filter(activity_id.eq(aid))
            .filter(status.eq("APPROVED"))
            .count()
            .get_result(conn)
    }

    /// 时段占位数未被拒绝的都算
    pub fn count_active_for_session(sid: i32, conn: &PgConnection) -> QueryResult<i64> {
        registrations
            .filter(session_id.eq(sid))
            .filter(status.ne("REJECTED"))
            .count()
            .get_result(conn)
    }

    pub fn list_by_profile(pid: i32, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        registrations
            .filter(profile_id.eq(pid))
            .order(registered_at.desc())
            .load(conn)
    }

    pub fn list_by_activity(aid: i32, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        registrations
            .filter(activity_id.eq(aid))
            .order(registered_at.asc())
            .load(conn)
    }

    pub fn update_status_many(ids: &[i32], new_status: &str, conn: &PgConnection) -> QueryResult<usize> {
        diesel::update(registrations.filter(id.eq(any(ids))))
            .set(status.eq(new_status))
            .execute(conn)
    }

    pub fn set_hours_many(ids: &[i32], hours: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::update(registrations.filter(id.eq(any(ids))))
            .set(hours_awarded.eq(hours))
            .execute(conn)
    }

    /// 时长导入命中的报名记录追加工时并强制置为已通过
    pub fn award_hours(pid: i32, aid: i32, delta: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::update(
            registrations
                .filter(profile_id.eq(pid))
                .filter(activity_id.eq(aid)),
        )
        .set((
            hours_awarded.eq(hours_awarded + delta),
            status.eq("APPROVED"),
        ))
        .execute(conn)
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug)]
#[table_name = "registrations"]
pub struct NewRegistration {
    pub profile_id: i32,
    pub activity_id: i32,
    pub session_id: Option<i32>,
    pub phone: String,
    pub class_name: String,
    pub teacher_name: String,
    pub status: String,
}

impl NewRegistration {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Registration> {
        diesel::insert_into(registrations::table)
            .values(self)
            .get_result(conn)
    }
}
