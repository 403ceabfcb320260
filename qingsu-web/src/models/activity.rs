use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use qingsu_db::models::activity::{Activity as ActivityData, NewActivity};
use qingsu_db::models::session::Session as SessionData;

#[derive(Serialize)]
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

impl From<&ActivityData> for Activity {
    fn from(a: &ActivityData) -> Self {
        Activity {
            id: a.id,
            title: a.title.clone(),
            description: a.description.clone(),
            status: a.status.clone(),
            start_date: a.start_date,
            end_date: a.end_date,
            hours_reward: a.hours_reward,
            min_xp: a.min_xp,
            max_xp: a.max_xp,
            gender_restriction: a.gender_restriction.clone(),
            capacity: a.capacity,
            created_at: a.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct Session {
    pub id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub capacity: i32,
    pub occupancy: i64,
    pub is_full: bool,
}

impl Session {
    pub fn with_occupancy(s: &SessionData, occupancy: i64) -> Self {
        Session {
            id: s.id,
            date: s.date,
            start_time: s.start_time,
            end_time: s.end_time,
            location: s.location.clone(),
            capacity: s.capacity,
            occupancy,
            is_full: s.is_full(occupancy),
        }
    }
}

#[derive(Deserialize)]
pub struct ActivityInput {
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
    #[serde(default)]
    pub allowed_grade_ids: Vec<i32>,
}

impl ActivityInput {
    pub fn to_row(&self) -> NewActivity {
        NewActivity {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            hours_reward: self.hours_reward,
            min_xp: self.min_xp,
            max_xp: self.max_xp,
            gender_restriction: self.gender_restriction.clone(),
            capacity: self.capacity,
        }
    }
}

#[derive(Deserialize)]
pub struct SessionInput {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub capacity: i32,
}

#[derive(Deserialize)]
pub struct RegistrationInput {
    pub session_id: Option<i32>,
    pub phone: String,
    pub class_name: String,
    pub teacher_name: String,
}
