use crate::schema::grades;
use crate::schema::grades::dsl::*;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable,
)]
#[table_name = "grades"]
pub struct Grade {
    pub id: i32,
    pub name: String,
}

impl Grade {
    pub fn find(gid: i32, conn: &PgConnection) -> QueryResult<Grade> {
        grades.find(gid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        grades.load(conn)
    }

    pub fn get_or_create(grade_name: &str, conn: &PgConnection) -> QueryResult<Grade> {
        diesel::insert_into(grades::table)
            .values(&NewGrade {
                name: grade_name.to_string(),
            })
            .on_conflict(name)
            .do_nothing()
            .execute(conn)?;
        grades.filter(name.eq(grade_name)).first(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[table_name = "grades"]
pub struct NewGrade {
    pub name: String,
}

impl NewGrade {
    pub fn create(grade: &Self, conn: &PgConnection) -> QueryResult<Grade> {
        diesel::insert_into(grades::table)
            .values(grade)
            .get_result(conn)
    }
}
