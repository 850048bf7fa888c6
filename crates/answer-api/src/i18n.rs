//! 响应消息翻译
//!
//! 启动时构建一次 `MessageRegistry`，通过 `AppState` 注入；运行期只读。
//! 错误和成功响应都只携带 reason 键，由 `localize` 按请求语言填入 `msg`。

use std::collections::HashMap;

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::dto::Envelope;

/// 支持的界面语言
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "zh_CN")]
    ZhCn,
}

impl Language {
    /// 解析 `Accept-Language`，取第一个可识别的语言
    ///
    /// 支持 `zh-CN`、`zh_CN`、`zh`、`en-US` 等写法，忽略 `q` 权重；都无法识别时为英文。
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| {
                if tag.starts_with("zh") {
                    Some(Self::ZhCn)
                } else if tag.starts_with("en") {
                    Some(Self::EnUs)
                } else {
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::ZhCn => "zh_CN",
        }
    }
}

const EN_US: &[(&str, &str)] = &[
    ("base.success", "Success."),
    ("base.unknown", "Sorry, an unknown error occurred."),
    ("base.forbidden", "Forbidden."),
    ("base.unauthorized_error", "Unauthorized."),
    ("base.request_format_error", "Request format is not valid."),
    ("base.object_not_found", "Object not found."),
    ("user.not_found", "User not found."),
    ("badge.object_not_found", "Badge not found."),
    (
        "rank_fail_to_meet_the_condition",
        "Reputation rank fail to meet the condition.",
    ),
];

const ZH_CN: &[(&str, &str)] = &[
    ("base.success", "成功。"),
    ("base.unknown", "抱歉，发生了未知错误。"),
    ("base.forbidden", "禁止访问。"),
    ("base.unauthorized_error", "未登录或登录已失效。"),
    ("base.request_format_error", "请求格式错误。"),
    ("base.object_not_found", "对象不存在。"),
    ("user.not_found", "用户不存在。"),
    ("badge.object_not_found", "徽章不存在。"),
    ("rank_fail_to_meet_the_condition", "声望值不满足操作要求。"),
];

/// 不可变的消息表
#[derive(Debug, Clone)]
pub struct MessageRegistry {
    messages: HashMap<Language, HashMap<&'static str, &'static str>>,
}

impl MessageRegistry {
    /// 内置的中英文消息
    pub fn builtin() -> Self {
        let messages = [(Language::EnUs, EN_US), (Language::ZhCn, ZH_CN)]
            .into_iter()
            .map(|(lang, table)| (lang, table.iter().copied().collect()))
            .collect();
        Self { messages }
    }

    /// 查找消息：指定语言 -> 英文 -> reason 本身
    pub fn message<'a>(&'a self, language: Language, reason: &'a str) -> &'a str {
        self.lookup(language, reason)
            .or_else(|| self.lookup(Language::EnUs, reason))
            .unwrap_or(reason)
    }

    fn lookup(&self, language: Language, reason: &str) -> Option<&'static str> {
        self.messages.get(&language)?.get(reason).copied()
    }

    /// 用本地化消息重写统一响应体
    ///
    /// 响应扩展中没有 `Envelope` 时原样返回。
    pub fn localize(&self, response: Response, language: Language) -> Response {
        let (mut parts, body) = response.into_parts();
        let Some(mut envelope) = parts.extensions.remove::<Envelope>() else {
            return Response::from_parts(parts, body);
        };

        envelope.msg = self.message(language, &envelope.reason).to_string();
        match serde_json::to_vec(&envelope) {
            Ok(bytes) => {
                parts.headers.remove(header::CONTENT_LENGTH);
                Response::from_parts(parts, Body::from(bytes))
            }
            Err(e) => {
                tracing::error!(error = %e, "响应体序列化失败");
                (parts.status, body).into_response()
            }
        }
    }
}

impl Default for MessageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
