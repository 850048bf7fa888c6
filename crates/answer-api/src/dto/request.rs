//! 请求 DTO

use std::str::FromStr;

use answer_service::{Action, QuestionStatus, ServiceError};
use serde::Deserialize;
use validator::Validate;

/// 权限查询参数
///
/// `action` 为逗号分隔的操作列表，如 `question.edit,question.delete`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PermissionQuery {
    #[validate(length(min = 1, max = 1024, message = "action 不能为空"))]
    pub action: String,
    #[serde(default)]
    pub object_id: Option<String>,
}

impl PermissionQuery {
    /// 解析操作列表，任一操作无法识别即失败
    pub fn actions(&self) -> Result<Vec<Action>, ServiceError> {
        self.action
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Action::from_str)
            .collect()
    }

    pub fn object_id(&self) -> &str {
        self.object_id.as_deref().unwrap_or_default()
    }
}

/// 关闭 / 重新打开问题
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionStatusRequest {
    pub status: QuestionStatus,
}

/// 置顶 / 取消置顶
#[derive(Debug, Deserialize)]
pub struct PinQuestionRequest {
    pub pinned: bool,
}

/// 提问，编辑问题使用同样的字段
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 6, max = 150, message = "标题长度应为 6 到 150"))]
    pub title: String,
    #[validate(length(min = 6, max = 65535, message = "内容长度应为 6 到 65535"))]
    pub content: String,
}

/// 回答
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddAnswerRequest {
    #[validate(length(min = 5, max = 32, message = "questionId 格式错误"))]
    pub question_id: String,
    #[validate(length(min = 6, max = 65535, message = "内容长度应为 6 到 65535"))]
    pub content: String,
}

/// 编辑回答
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnswerRequest {
    #[validate(length(min = 6, max = 65535, message = "内容长度应为 6 到 65535"))]
    pub content: String,
}

/// 评论问题或回答
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[validate(length(min = 5, max = 32, message = "objectId 格式错误"))]
    pub object_id: String,
    #[validate(length(min = 2, max = 600, message = "评论长度应为 2 到 600"))]
    pub content: String,
}

/// 举报
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddReportRequest {
    #[validate(length(min = 5, max = 32, message = "objectId 格式错误"))]
    pub object_id: String,
    #[validate(length(min = 1, max = 512, message = "举报原因长度应为 1 到 512"))]
    pub reason: String,
}

/// 投票
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[validate(length(min = 5, max = 32, message = "objectId 格式错误"))]
    pub object_id: String,
}

/// 徽章授予记录查询，缺省为当前用户
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAwardsQuery {
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_query_actions() {
        let query = PermissionQuery {
            action: "question.edit, answer.accept,".to_string(),
            object_id: None,
        };
        assert_eq!(
            query.actions().unwrap(),
            vec![Action::QuestionEdit, Action::AnswerAccept]
        );
        assert_eq!(query.object_id(), "");

        let query = PermissionQuery {
            action: "question.edit,question.fly".to_string(),
            object_id: Some("10010000000000001".to_string()),
        };
        assert!(matches!(
            query.actions(),
            Err(ServiceError::UnknownAction(ref a)) if a == "question.fly"
        ));
    }

    #[test]
    fn test_question_request_validation() {
        let req = QuestionRequest {
            title: "short".to_string(),
            content: "long enough body".to_string(),
        };
        assert!(req.validate().is_err());

        let req: AddCommentRequest =
            serde_json::from_str(r#"{"objectId":"10010000000000001","content":"ok"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_vote_request_validation() {
        let req = VoteRequest {
            object_id: "".to_string(),
        };
        assert!(req.validate().is_err());

        let req = VoteRequest {
            object_id: "10020000000000001".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
