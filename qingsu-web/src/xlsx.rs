use std::io::Cursor;

use calamine::{DataType, Reader, Xlsx};
use simple_excel_writer::{row, Row, Workbook};

use crate::error::AppError;
use crate::jobs::{split_tags, HoursRow, RosterRow};

/// 上传的 xlsx 原始字节 -> 字符串表格
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| AppError::BadRequest(format!("无法读取表格：{}", e)))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::BadRequest("表格没有工作表".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| AppError::BadRequest("表格没有工作表".to_string()))?
        .map_err(|e| AppError::BadRequest(format!("无法读取表格：{}", e)))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// 学号列经常被 Excel 存成数值，转回去掉小数点
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &[String], name: &str) -> Result<usize, AppError> {
    column(headers, name).ok_or_else(|| AppError::BadRequest(format!("缺少必需列：{}", name)))
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

/// 花名册：学号/姓名/初始密码 必有，性别/班级/志愿者时长/标签 可缺
pub fn roster_from_rows(rows: &[Vec<String>]) -> Result<Vec<RosterRow>, AppError> {
    let headers = rows
        .first()
        .ok_or_else(|| AppError::BadRequest("表格为空".to_string()))?;
    let id_col = require_column(headers, "学号")?;
    let name_col = require_column(headers, "姓名")?;
    let pwd_col = require_column(headers, "初始密码")?;
    let gender_col = column(headers, "性别");
    let class_col = column(headers, "班级");
    let hours_col = column(headers, "志愿者时长");
    let tags_col = column(headers, "标签");

    Ok(rows[1..]
        .iter()
        .map(|row| RosterRow {
            student_id: cell(row, id_col),
            name: cell(row, name_col),
            password: cell(row, pwd_col),
            gender: gender_col.map(|c| cell(row, c)).filter(|s| !s.is_empty()),
            class_name: class_col.map(|c| cell(row, c)).unwrap_or_default(),
            hours: hours_col
                .and_then(|c| cell(row, c).parse::<f64>().ok())
                .map(|h| h as i32),
            tag_names: tags_col
                .map(|c| split_tags(&cell(row, c)))
                .unwrap_or_default(),
        })
        .collect())
}

/// 时长表：学号/服务时长 都必有
pub fn hours_from_rows(rows: &[Vec<String>]) -> Result<Vec<HoursRow>, AppError> {
    let headers = rows
        .first()
        .ok_or_else(|| AppError::BadRequest("表格为空".to_string()))?;
    let id_col = require_column(headers, "学号")?;
    let hours_col = require_column(headers, "服务时长")?;

    Ok(rows[1..]
        .iter()
        .map(|row| HoursRow {
            student_id: cell(row, id_col),
            hours: cell(row, hours_col).parse::<f64>().unwrap_or(0.0) as i32,
        })
        .collect())
}

pub struct ExportRow {
    pub name: String,
    pub student_id: String,
    pub activity_title: String,
    pub session: String,
    pub grade: String,
    pub class_name: String,
    pub gender: String,
    pub phone: String,
    pub teacher_name: String,
    pub registered_at: String,
    pub status: String,
}

pub fn export_registrations(rows: &[ExportRow]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::create_in_memory();
    let mut sheet = workbook.create_sheet("报名记录");
    workbook
        .write_sheet(&mut sheet, |sw| {
            sw.append_row(row![
                "姓名", "学号", "活动名称", "时段", "年级", "班级", "性别", "手机号", "班主任",
                "报名时间", "状态"
            ])?;
            for r in rows {
                sw.append_row(row![
                    r.name.as_str(),
                    r.student_id.as_str(),
                    r.activity_title.as_str(),
                    r.session.as_str(),
                    r.grade.as_str(),
                    r.class_name.as_str(),
                    r.gender.as_str(),
                    r.phone.as_str(),
                    r.teacher_name.as_str(),
                    r.registered_at.as_str(),
                    r.status.as_str()
                ])?;
            }
            Ok(())
        })
        .map_err(|e| AppError::Internal(format!("导出失败：{}", e)))?;
    workbook
        .close()
        .map_err(|e| AppError::Internal(format!("导出失败：{}", e)))?
        .ok_or_else(|| AppError::Internal("导出结果为空".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn roster_mapping_with_optional_columns() {
        let rows = vec![
            row(&["学号", "姓名", "初始密码", "性别", "班级", "志愿者时长", "标签"]),
            row(&["20230001", "李明", "abc123", "男", "2023级3班", "5.0", "组长, 骨干"]),
            row(&["20230002", "王芳", "def456", "", "", "", ""]),
        ];
        let roster = roster_from_rows(&rows).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].student_id, "20230001");
        assert_eq!(roster[0].hours, Some(5));
        assert_eq!(roster[0].tag_names, vec!["组长", "骨干"]);
        assert_eq!(roster[1].gender, None);
        assert_eq!(roster[1].hours, None);
        assert!(roster[1].tag_names.is_empty());
    }

    #[test]
    fn roster_requires_id_column() {
        let rows = vec![row(&["姓名", "初始密码"])];
        assert!(roster_from_rows(&rows).is_err());
    }

    #[test]
    fn roster_without_optional_columns() {
        let rows = vec![
            row(&["学号", "姓名", "初始密码"]),
            row(&["20230003", "赵强", "pw"]),
        ];
        let roster = roster_from_rows(&rows).unwrap();
        assert_eq!(roster[0].class_name, "");
        assert_eq!(roster[0].hours, None);
    }

    #[test]
    fn hours_mapping() {
        let rows = vec![
            row(&["学号", "服务时长"]),
            row(&["20230001", "5"]),
            row(&["20230002", "3.0"]),
        ];
        let hours = hours_from_rows(&rows).unwrap();
        assert_eq!(hours[0].hours, 5);
        assert_eq!(hours[1].hours, 3);
    }

    #[test]
    fn hours_requires_both_columns() {
        let rows = vec![row(&["学号"])];
        assert!(hours_from_rows(&rows).is_err());
    }
}
