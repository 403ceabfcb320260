use super::activity::Activity;
use crate::schema::sessions;
use crate::schema::sessions::dsl::*;
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[belongs_to(Activity)]
#[table_name = "sessions"]
pub struct Session {
    pub id: i32,
    pub activity_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub capacity: i32,
}

impl Session {
    pub fn find(sid: i32, conn: &PgConnection) -> QueryResult<Self> {
        sessions.find(sid).first(conn)
    }

    pub fn list_for_activity(aid: i32, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        sessions
            .filter(activity_id.eq(aid))
            .order((date.asc(), start_time.asc()))
            .load(conn)
    }

    /// capacity 为 0 表示不限员，永远不满
    pub fn is_full(&self, occupancy: i64) -> bool {
        self.capacity > 0 && occupancy >= self.capacity as i64
    }

    pub fn delete(sid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(sessions.find(sid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "sessions"]
pub struct NewSession {
    pub activity_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub capacity: i32,
}

impl NewSession {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Session> {
        diesel::insert_into(sessions::table)
            .values(self)
            .get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_capacity(cap: i32) -> Session {
        Session {
            id: 1,
            activity_id: 1,
            date: NaiveDate::from_ymd(2026, 9, 12),
            start_time: NaiveTime::from_hms(9, 0, 0),
            end_time: NaiveTime::from_hms(11, 0, 0),
            location: "图书馆".to_string(),
            capacity: cap,
        }
    }

    #[test]
    fn full_when_occupancy_reaches_capacity() {
        let s = session_with_capacity(20);
        assert!(!s.is_full(19));
        assert!(s.is_full(20));
        assert!(s.is_full(21));
    }

    #[test]
    fn zero_capacity_never_full() {
        let s = session_with_capacity(0);
        assert!(!s.is_full(0));
        assert!(!s.is_full(10_000));
    }
}
