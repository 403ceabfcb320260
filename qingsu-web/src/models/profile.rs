use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use qingsu_db::models::profile::Profile as ProfileData;

use super::{next_level_xp, xp_in_level, Rank};

#[derive(Serialize)]
pub struct Profile {
    pub student_id: String,
    pub name: String,
    pub class_name: String,
    pub gender: String,
    pub grade: Option<String>,
    pub total_hours: i32,
    pub total_xp: i32,
    pub level: i32,
    pub rank: String,
    pub xp_in_level: i32,
    pub next_level_xp: i32,
    pub tags: Vec<String>,
}

impl Profile {
    pub fn assemble(
        p: &ProfileData,
        display_name: &str,
        grade: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        Profile {
            student_id: p.student_id.clone(),
            name: display_name.to_string(),
            class_name: p.class_name.clone(),
            gender: p.gender.clone(),
            grade,
            total_hours: p.total_hours,
            total_xp: p.total_xp,
            level: p.level(),
            rank: Rank::of_level(p.level()).cn().to_string(),
            xp_in_level: xp_in_level(p.total_xp),
            next_level_xp: next_level_xp(p.total_xp),
            tags,
        }
    }
}

#[derive(Serialize)]
pub struct Registration {
    pub id: i32,
    pub activity_id: i32,
    pub activity_title: String,
    pub session: Option<String>,
    pub status: String,
    pub hours_awarded: i32,
    pub registered_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct ProfileEditInput {
    pub name: String,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}
