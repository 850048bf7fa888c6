//! 内容对象标识与归属

use serde::{Deserialize, Serialize};

/// 内容对象类型
///
/// 对象 ID 的格式为 `"1" + 三位类型码 + 序号`，如 `10010000000000001` 是一个问题。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ObjectType {
    Question,
    Answer,
    Tag,
    User,
    Comment,
}

impl ObjectType {
    pub fn code(&self) -> u16 {
        match self {
            Self::Question => 1,
            Self::Answer => 2,
            Self::Tag => 3,
            Self::User => 4,
            Self::Comment => 5,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Question),
            2 => Some(Self::Answer),
            3 => Some(Self::Tag),
            4 => Some(Self::User),
            5 => Some(Self::Comment),
            _ => None,
        }
    }

    /// 从对象 ID 中解析类型
    pub fn from_object_id(object_id: &str) -> Option<Self> {
        let rest = object_id.strip_prefix('1')?;
        let code = rest.get(..3)?;
        if rest.len() <= 3 || !object_id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::from_code(code.parse().ok()?)
    }

    /// 按类型和序号生成对象 ID
    pub fn object_id(&self, seq: i64) -> String {
        format!("1{:03}{:013}", self.code(), seq)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Tag => "tag",
            Self::User => "user",
            Self::Comment => "comment",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对象归属信息
///
/// 回答和评论会带上所属问题，评论还会带上被评论的回答（如有）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub object_id: String,
    pub object_type: ObjectType,
    /// 标签没有创建者，为空字符串
    pub object_creator_user_id: String,
    pub question_id: Option<String>,
    pub answer_id: Option<String>,
    pub comment_id: Option<String>,
    pub tag_id: Option<String>,
}

impl ObjectInfo {
    pub fn new(
        object_id: impl Into<String>,
        object_type: ObjectType,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            object_type,
            object_creator_user_id: creator.into(),
            question_id: None,
            answer_id: None,
            comment_id: None,
            tag_id: None,
        }
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.object_creator_user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_from_id() {
        let cases = [
            ("10010000000000001", Some(ObjectType::Question)),
            ("10020000000000042", Some(ObjectType::Answer)),
            ("10030000000000007", Some(ObjectType::Tag)),
            ("10040000000000001", Some(ObjectType::User)),
            ("10050000000000003", Some(ObjectType::Comment)),
            ("10090000000000003", None),
            ("20010000000000001", None),
            ("1001", None),
            ("1001abc", None),
            ("", None),
        ];
        for (id, expected) in cases {
            assert_eq!(ObjectType::from_object_id(id), expected, "{id}");
        }
    }

    #[test]
    fn test_object_id_generation_is_decodable() {
        let id = ObjectType::Comment.object_id(12);
        assert_eq!(id, "10050000000000012");
        assert_eq!(ObjectType::from_object_id(&id), Some(ObjectType::Comment));
    }

    #[test]
    fn test_is_created_by() {
        let info = ObjectInfo::new("10010000000000001", ObjectType::Question, "u1");
        assert!(info.is_created_by("u1"));
        assert!(!info.is_created_by("u2"));

        let tag = ObjectInfo::new("10030000000000001", ObjectType::Tag, "");
        assert!(!tag.is_created_by(""));
    }
}
