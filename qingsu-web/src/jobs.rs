use std::collections::HashSet;

use bcrypt::{hash, DEFAULT_COST};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::Serialize;

use qingsu_common::utils::Role;
use qingsu_db::models::grade::Grade;
use qingsu_db::models::profile::{NewProfile, Profile};
use qingsu_db::models::registration::Registration;
use qingsu_db::models::tag::Tag;
use qingsu_db::models::user::{NewUser, User};

use crate::error::AppError;
use crate::models::Gender;

/// 花名册一行，列对应 学号/姓名/初始密码/性别/班级/志愿者时长/标签
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub student_id: String,
    pub name: String,
    pub password: String,
    pub gender: Option<String>,
    pub class_name: String,
    pub hours: Option<i32>,
    pub tag_names: Vec<String>,
}

/// 时长表一行，列对应 学号/服务时长
#[derive(Debug, Clone)]
pub struct HoursRow {
    pub student_id: String,
    pub hours: i32,
}

#[derive(Debug, Default, Serialize)]
pub struct JobReport {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub warnings: Vec<String>,
}

impl JobReport {
    fn warn(&mut self, msg: String) {
        log::warn!("{}", msg);
        self.warnings.push(msg);
    }
}

enum RowOutcome {
    Created,
    Updated,
}

/// 班级名的前导数字就是年级，如 "2023级3班" -> "2023"
pub fn grade_prefix(class_name: &str) -> Option<String> {
    let prefix: String = class_name
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}

/// 中英文逗号都认，空白裁掉，空段丢弃
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '，')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 逐行导入，单行失败只记警告不终止
pub fn import_roster(rows: &[RosterRow], conn: &PgConnection) -> JobReport {
    let mut report = JobReport::default();
    let mut seen = HashSet::new();
    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 2; // 第 1 行是表头
        if row.student_id.is_empty() {
            report.warn(format!("第 {} 行：缺少学号，跳过", line));
            report.skipped += 1;
            continue;
        }
        if row.name.is_empty() {
            report.warn(format!("第 {} 行：缺少姓名，跳过", line));
            report.skipped += 1;
            continue;
        }
        if !seen.insert(row.student_id.clone()) {
            report.warn(format!("第 {} 行：学号 {} 在表内重复，跳过", line, row.student_id));
            report.skipped += 1;
            continue;
        }
        match import_roster_row(row, conn) {
            Ok(RowOutcome::Created) => report.created += 1,
            Ok(RowOutcome::Updated) => report.updated += 1,
            Err(e) => {
                report.warn(format!("第 {} 行：学号 {} 导入失败：{}", line, row.student_id, e));
                report.skipped += 1;
            }
        }
    }
    log::info!(
        "花名册导入完成：新建 {}，更新 {}，跳过 {}",
        report.created,
        report.updated,
        report.skipped
    );
    report
}

fn import_roster_row(row: &RosterRow, conn: &PgConnection) -> Result<RowOutcome, AppError> {
    conn.transaction::<RowOutcome, AppError, _>(|| {
        let gender = row.gender.as_deref().and_then(Gender::from_cn);
        let grade_id = match grade_prefix(&row.class_name) {
            Some(prefix) => Some(Grade::get_or_create(&prefix, conn)?.id),
            None => None,
        };
        // 未知标签名静默丢弃
        let tags = Tag::find_by_names(&row.tag_names, conn)?;
        let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
        let bonus: i32 = tags.iter().map(|t| t.xp_bonus).sum();

        match User::get(&row.student_id, conn) {
            Ok(user) => {
                user.update_name(&row.name, conn)?;
                let profile = match Profile::get_by_user(&user.id, conn) {
                    Ok(profile) => profile,
                    Err(diesel::result::Error::NotFound) => NewProfile {
                        user_id: user.id.clone(),
                        student_id: user.id.clone(),
                        class_name: String::new(),
                        gender: Gender::Male.to_string(),
                        grade_id: None,
                        total_hours: 0,
                        total_xp: 0,
                    }
                    .create(conn)?,
                    Err(e) => return Err(e.into()),
                };
                let gender_value = gender
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| profile.gender.clone());
                profile.update_info(&row.class_name, &gender_value, grade_id, conn)?;
                let hours = row.hours.unwrap_or(profile.total_hours);
                profile.set_hours(hours, conn)?;
                profile.set_xp(hours + bonus, conn)?;
                profile.set_tags(&tag_ids, conn)?;
                Ok(RowOutcome::Updated)
            }
            Err(diesel::result::Error::NotFound) => {
                if row.password.is_empty() {
                    return Err(AppError::BadRequest("缺少初始密码".to_string()));
                }
                let hours = row.hours.unwrap_or(0);
                let user = NewUser {
                    id: row.student_id.clone(),
                    name: row.name.clone(),
                    hash_pwd: hash(&row.password, DEFAULT_COST)?,
                    user_role: Role::User.to_string(),
                }
                .create(conn)?;
                let profile = NewProfile {
                    user_id: user.id.clone(),
                    student_id: row.student_id.clone(),
                    class_name: row.class_name.clone(),
                    gender: gender.unwrap_or(Gender::Male).to_string(),
                    grade_id,
                    total_hours: hours,
                    total_xp: hours + bonus,
                }
                .create(conn)?;
                profile.set_tags(&tag_ids, conn)?;
                Ok(RowOutcome::Created)
            }
            Err(e) => Err(e.into()),
        }
    })
}

/// 为指定活动批量加时长；命中的报名记录同步加工时并置为已通过
pub fn award_hours(rows: &[HoursRow], activity_id: i32, conn: &PgConnection) -> JobReport {
    let mut report = JobReport::default();
    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 2;
        if row.student_id.is_empty() {
            report.warn(format!("第 {} 行：缺少学号，跳过", line));
            report.skipped += 1;
            continue;
        }
        match award_row(row, activity_id, conn) {
            Ok(()) => report.updated += 1,
            Err(AppError::NotFound) => {
                report.warn(format!(
                    "未找到学号为 {} 的志愿者档案，跳过",
                    row.student_id
                ));
                report.skipped += 1;
            }
            Err(e) => {
                report.warn(format!("第 {} 行：学号 {} 更新失败：{}", line, row.student_id, e));
                report.skipped += 1;
            }
        }
    }
    log::info!(
        "时长导入完成：更新 {}，跳过 {}",
        report.updated,
        report.skipped
    );
    report
}

fn award_row(row: &HoursRow, activity_id: i32, conn: &PgConnection) -> Result<(), AppError> {
    conn.transaction::<(), AppError, _>(|| {
        let profile = match Profile::get_by_student_id(&row.student_id, conn) {
            Ok(profile) => profile,
            // 账号在而档案缺失时补一个最小档案
            Err(diesel::result::Error::NotFound) => {
                let user = User::get(&row.student_id, conn)?;
                NewProfile {
                    user_id: user.id.clone(),
                    student_id: user.id.clone(),
                    class_name: String::new(),
                    gender: Gender::Male.to_string(),
                    grade_id: None,
                    total_hours: 0,
                    total_xp: 0,
                }
                .create(conn)?
            }
            Err(e) => return Err(e.into()),
        };
        profile.add_hours(row.hours, conn)?;
        Registration::award_hours(profile.id, activity_id, row.hours, conn)?;
        Ok(())
    })
}

/// 以 时长 + 标签加成 重算经验，覆盖漂移
pub fn recompute_xp(profile_ids: &[i32], conn: &PgConnection) -> Result<usize, AppError> {
    let profiles = Profile::find_many(profile_ids, conn)?;
    let count = profiles.len();
    for profile in &profiles {
        let bonus = profile.tag_bonus_sum(conn)? as i32;
        profile.set_xp(profile.total_hours + bonus, conn)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_prefix_parsing() {
        assert_eq!(grade_prefix("2023级3班"), Some("2023".to_string()));
        assert_eq!(grade_prefix(" 2024机电1班 "), Some("2024".to_string()));
        assert_eq!(grade_prefix("机电1班"), None);
        assert_eq!(grade_prefix(""), None);
    }

    #[test]
    fn tag_splitting() {
        assert_eq!(
            split_tags("组长, 宣传委员，  骨干"),
            vec!["组长", "宣传委员", "骨干"]
        );
        assert_eq!(split_tags("  "), Vec::<String>::new());
        assert_eq!(split_tags("组长,,组长"), vec!["组长", "组长"]);
    }
}
