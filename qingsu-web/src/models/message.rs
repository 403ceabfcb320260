use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use qingsu_db::models::message::Message as MessageData;

/// 留言墙可选的底色，前端按此渲染便签
pub const MESSAGE_COLORS: [&str; 6] = [
    "#f8b500", "#ff7e67", "#7bc496", "#79a8d9", "#b59fd9", "#f2a6c2",
];

pub const MAX_MESSAGE_LEN: usize = 200;

#[derive(Serialize)]
pub struct Message {
    pub id: i32,
    pub body: String,
    pub color: String,
    pub author: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Message {
    /// 匿名留言不回显姓名
    pub fn published(m: &MessageData, author_name: &str) -> Self {
        Message {
            id: m.id,
            body: m.body.clone(),
            color: m.color.clone(),
            author: if m.is_anonymous {
                None
            } else {
                Some(author_name.to_string())
            },
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct MessageInput {
    pub body: String,
    pub color: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl MessageInput {
    pub fn validate(&self) -> Result<(), &'static str> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err("留言内容不能为空");
        }
        if body.chars().count() > MAX_MESSAGE_LEN {
            return Err("留言过长");
        }
        if !MESSAGE_COLORS.contains(&self.color.as_str()) {
            return Err("不支持的颜色");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_input_validation() {
        let ok = MessageInput {
            body: "今天的活动很开心".to_string(),
            color: MESSAGE_COLORS[0].to_string(),
            is_anonymous: false,
        };
        assert!(ok.validate().is_ok());

        let empty = MessageInput {
            body: "   ".to_string(),
            color: MESSAGE_COLORS[0].to_string(),
            is_anonymous: false,
        };
        assert!(empty.validate().is_err());

        let bad_color = MessageInput {
            body: "hi".to_string(),
            color: "#000000".to_string(),
            is_anonymous: false,
        };
        assert!(bad_color.validate().is_err());

        let too_long = MessageInput {
            body: "啊".repeat(MAX_MESSAGE_LEN + 1),
            color: MESSAGE_COLORS[1].to_string(),
            is_anonymous: true,
        };
        assert!(too_long.validate().is_err());
    }
}
