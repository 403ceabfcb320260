use super::grade::Grade;
use super::tag::Tag;
use crate::schema::profiles;
use crate::schema::profiles::dsl::*;
use crate::schema::{profile_tags, tags};
use diesel::{dsl::any, prelude::*};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[belongs_to(Grade)]
pub struct Profile {
    pub id: i32,
    pub user_id: String,
    pub student_id: String,
    pub class_name: String,
    pub gender: String,
    pub grade_id: Option<i32>,
    pub total_hours: i32,
    pub total_xp: i32,
}

impl Profile {
    pub fn get(pid: i32, conn: &PgConnection) -> QueryResult<Self> {
        profiles.find(pid).first(conn)
    }

    pub fn get_by_user(uid: &str, conn: &PgConnection) -> QueryResult<Self> {
        profiles.filter(user_id.eq(uid)).first(conn)
    }

    pub fn get_by_student_id(sid: &str, conn: &PgConnection) -> QueryResult<Self> {
        profiles.filter(student_id.eq(sid)).first(conn)
    }

    pub fn find_many(ids: &[i32], conn: &PgConnection) -> QueryResult<Vec<Self>> {
        profiles.filter(id.eq(any(ids))).load(conn)
    }

    /// 等级 = 经验值整除 100
    pub fn level(&self) -> i32 {
        self.total_xp / 100
    }

    /// 同一条 update 内同时累加时长与经验
    pub fn add_hours(&self, delta: i32, conn: &PgConnection) -> QueryResult<()> {
        diesel::update(self)
            .set((
                total_hours.eq(total_hours + delta),
                total_xp.eq(total_xp + delta),
            ))
            .execute(conn)?;
        Ok(())
    }

    pub fn set_hours(&self, hours: i32, conn: &PgConnection) -> QueryResult<()> {
        diesel::update(self).set(total_hours.eq(hours)).execute(conn)?;
        Ok(())
    }

    pub fn set_xp(&self, xp: i32, conn: &PgConnection) -> QueryResult<()> {
        diesel::update(self).set(total_xp.eq(xp)).execute(conn)?;
        Ok(())
    }

    pub fn update_info(
        &self,
        new_class_name: &str,
        new_gender: &str,
        new_grade_id: Option<i32>,
        conn: &PgConnection,
    ) -> QueryResult<()> {
        diesel::update(self)
            .set((
                class_name.eq(new_class_name),
                gender.eq(new_gender),
                grade_id.eq(new_grade_id),
            ))
            .execute(conn)?;
        Ok(())
    }

    pub fn tags(&self, conn: &PgConnection) -> QueryResult<Vec<Tag>> {
        profile_tags::table
            .inner_join(tags::table)
            .filter(profile_tags::profile_id.eq(self.id))
            .select(tags::all_columns)
            .load(conn)
    }

    pub fn tag_bonus_sum(&self, conn: &PgConnection) -> QueryResult<i64> {
        let sum: Option<i64> = profile_tags::table
            .inner_join(tags::table)
            .filter(profile_tags::profile_id.eq(self.id))
            .select(diesel::dsl::sum(tags::xp_bonus))
            .first(conn)?;
        Ok(sum.unwrap_or(0))
    }

    /// 覆盖式更新标签集合
    pub fn set_tags(&self, tag_ids: &[i32], conn: &PgConnection) -> QueryResult<()> {
        diesel::delete(profile_tags::table.filter(profile_tags::profile_id.eq(self.id)))
            .execute(conn)?;
        if tag_ids.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewProfileTag> = tag_ids
            .iter()
            .map(|tid| NewProfileTag {
                profile_id: self.id,
                tag_id: *tid,
            })
            .collect();
        diesel::insert_into(profile_tags::table)
            .values(&rows)
            .execute(conn)?;
        Ok(())
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug, AsChangeset)]
#[table_name = "profiles"]
pub struct NewProfile {
    pub user_id: String,
    pub student_id: String,
    pub class_name: String,
    pub gender: String,
    pub grade_id: Option<i32>,
    pub total_hours: i32,
    pub total_xp: i32,
}

impl NewProfile {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Profile> {
        diesel::insert_into(profiles::table)
            .values(self)
            .get_result(conn)
    }
}

#[derive(Insertable, Debug)]
#[table_name = "profile_tags"]
pub struct NewProfileTag {
    pub profile_id: i32,
    pub tag_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_xp(xp: i32) -> Profile {
        Profile {
            id: 1,
            user_id: "20230001".to_string(),
            student_id: "20230001".to_string(),
            class_name: "2023级1班".to_string(),
            gender: "MALE".to_string(),
            grade_id: None,
            total_hours: 0,
            total_xp: xp,
        }
    }

    #[test]
    fn level_is_xp_div_100() {
        assert_eq!(profile_with_xp(0).level(), 0);
        assert_eq!(profile_with_xp(99).level(), 0);
        assert_eq!(profile_with_xp(100).level(), 1);
        assert_eq!(profile_with_xp(1050).level(), 10);
    }
}
