use std::str::FromStr;

use diesel::prelude::*;
use diesel::PgConnection;

use qingsu_db::models::activity::Activity;
use qingsu_db::models::profile::Profile;
use qingsu_db::models::registration::{NewRegistration, Registration};
use qingsu_db::models::session::Session;

use crate::models::activity::RegistrationInput;
use crate::models::{GenderRestriction, RegistrationStatus};

/// 报名被业务规则拦下的四种结果，按校验顺序排列
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Rejection {
    AlreadyRegistered,
    ActivityFull,
    NotEligible,
    SessionFull,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::AlreadyRegistered => "你已报名过该活动",
            Rejection::ActivityFull => "活动名额已满",
            Rejection::NotEligible => "不符合报名条件",
            Rejection::SessionFull => "该时段已满",
        }
    }
}

#[derive(Debug)]
pub enum SubmitError {
    Rejected(Rejection),
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for SubmitError {
    fn from(e: diesel::result::Error) -> Self {
        SubmitError::Db(e)
    }
}

/// 资格校验是 (档案, 活动) 上的纯函数，不碰库
pub fn check_eligibility(profile: &Profile, activity: &Activity, allowed_grades: &[i32]) -> bool {
    if profile.total_xp < activity.min_xp || profile.total_xp > activity.max_xp {
        return false;
    }
    match GenderRestriction::from_str(&activity.gender_restriction) {
        Ok(restriction) if !restriction.admits(&profile.gender) => return false,
        _ => {}
    }
    if !allowed_grades.is_empty() {
        match profile.grade_id {
            Some(gid) if allowed_grades.contains(&gid) => {}
            // 活动限了年级而档案没有年级，一律不符合
            _ => return false,
        }
    }
    true
}

/// 总名额只数已通过的报名
pub fn activity_full(capacity: i32, approved_count: i64) -> bool {
    capacity > 0 && approved_count >= capacity as i64
}

/// 按序校验后落库；任何一条不过整个事务回滚，不留半截记录
pub fn submit_registration(
    profile: &Profile,
    activity: &Activity,
    session: Option<&Session>,
    contact: &RegistrationInput,
    conn: &PgConnection,
) -> Result<Registration, SubmitError> {
    let created = conn.transaction::<Registration, SubmitError, _>(|| {
        if Registration::exists_for(profile.id, activity.id, conn)? {
            return Err(SubmitError::Rejected(Rejection::AlreadyRegistered));
        }
        let approved = Registration::count_approved_for_activity(activity.id, conn)?;
        if activity_full(activity.capacity, approved) {
            return Err(SubmitError::Rejected(Rejection::ActivityFull));
        }
        let allowed = activity.allowed_grade_ids(conn)?;
        if !check_eligibility(profile, activity, &allowed) {
            return Err(SubmitError::Rejected(Rejection::NotEligible));
        }
        if let Some(session) = session {
            let occupancy = Registration::count_active_for_session(session.id, conn)?;
            if session.is_full(occupancy) {
                return Err(SubmitError::Rejected(Rejection::SessionFull));
            }
        }
        NewRegistration {
            profile_id: profile.id,
            activity_id: activity.id,
            session_id: session.map(|s| s.id),
            phone: contact.phone.clone(),
            class_name: contact.class_name.clone(),
            teacher_name: contact.teacher_name.clone(),
            status: RegistrationStatus::Pending.to_string(),
        }
        .create(conn)
        .map_err(SubmitError::from)
    });

    // 并发下撞到唯一约束等价于重复报名
    match created {
        Err(SubmitError::Db(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ))) => Err(SubmitError::Rejected(Rejection::AlreadyRegistered)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile(xp: i32, gender: &str, grade_id: Option<i32>) -> Profile {
        Profile {
            id: 1,
            user_id: "20230001".to_string(),
            student_id: "20230001".to_string(),
            class_name: "2023级1班".to_string(),
            gender: gender.to_string(),
            grade_id,
            total_hours: 0,
            total_xp: xp,
        }
    }

    fn activity(min_xp: i32, max_xp: i32, restriction: &str) -> Activity {
        Activity {
            id: 1,
            title: "图书馆整理".to_string(),
            description: "整理开架书库".to_string(),
            status: "OPEN".to_string(),
            start_date: None,
            end_date: None,
            hours_reward: 2,
            min_xp,
            max_xp,
            gender_restriction: restriction.to_string(),
            capacity: 0,
            created_at: NaiveDate::from_ymd(2026, 9, 1).and_hms(8, 0, 0),
        }
    }

    #[test]
    fn xp_bounds_inclusive() {
        let a = activity(10, 50, "UNRESTRICTED");
        assert!(check_eligibility(&profile(10, "MALE", None), &a, &[]));
        assert!(check_eligibility(&profile(50, "MALE", None), &a, &[]));
        assert!(!check_eligibility(&profile(9, "MALE", None), &a, &[]));
        assert!(!check_eligibility(&profile(51, "MALE", None), &a, &[]));
    }

    #[test]
    fn gender_restriction_applies() {
        let a = activity(0, 100, "FEMALE");
        assert!(check_eligibility(&profile(30, "FEMALE", None), &a, &[]));
        assert!(!check_eligibility(&profile(30, "MALE", None), &a, &[]));
    }

    #[test]
    fn grade_restriction_applies() {
        let a = activity(0, 100, "UNRESTRICTED");
        assert!(check_eligibility(&profile(30, "MALE", Some(2)), &a, &[1, 2]));
        assert!(!check_eligibility(&profile(30, "MALE", Some(3)), &a, &[1, 2]));
        // 限了年级而档案没有年级
        assert!(!check_eligibility(&profile(30, "MALE", None), &a, &[1, 2]));
        // 没限年级就不看档案
        assert!(check_eligibility(&profile(30, "MALE", None), &a, &[]));
    }

    #[test]
    fn widening_never_revokes_eligibility() {
        let p = profile(30, "FEMALE", Some(1));
        let narrow = activity(20, 40, "FEMALE");
        assert!(check_eligibility(&p, &narrow, &[1]));
        // 放宽经验区间
        assert!(check_eligibility(&p, &activity(0, 100, "FEMALE"), &[1]));
        // 取消性别限制
        assert!(check_eligibility(&p, &activity(20, 40, "UNRESTRICTED"), &[1]));
        // 取消年级限制
        assert!(check_eligibility(&p, &narrow, &[]));
    }

    #[test]
    fn aggregate_capacity_counts_approved_only() {
        // 容量 1：没有已通过的报名就不算满，Pending 不占总名额
        assert!(!activity_full(1, 0));
        assert!(activity_full(1, 1));
        assert!(!activity_full(0, 9999));
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(Rejection::AlreadyRegistered.message(), "你已报名过该活动");
        assert_eq!(Rejection::ActivityFull.message(), "活动名额已满");
    }
}
