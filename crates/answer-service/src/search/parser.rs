//! 搜索语法解析
//!
//! 每种语法只识别查询开头的一个前缀，匹配后剥离前缀，剩余部分作为全文关键字。
//! 语法之间不组合，按固定优先级取第一个匹配；都不匹配时整串作为关键字搜索。

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// 搜索语法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSyntax {
    /// `[tag] rest`
    Tag,
    /// `user:name rest`，`user:me` 表示当前用户
    Author,
    /// `score:N rest`
    Score,
    /// `answers:N rest`
    AnswerCount,
    /// `isaccepted:yes|no rest`，限定回答
    Accepted,
    /// `hasaccepted:yes|no rest`，限定问题
    HasAccepted,
    /// `is:question rest`
    IsQuestion,
    /// `is:answer rest`
    IsAnswer,
    /// `"phrase" rest`
    Quote,
    /// 兜底：全文搜索
    Object,
}

/// 一次解析的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub syntax: SearchSyntax,
    /// 语法参数，如标签名、用户名、分值
    pub exp: String,
    /// 剩余的全文关键字
    pub words: String,
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[([^\[\]\s]+)\]\s*(.*)$"));
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^user:(\S+)\s*(.*)$"));
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^score:(-?\d+)(?:\s+(.*))?$"));
static ANSWERS_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^answers:(\d+)(?:\s+(.*))?$"));
static ACCEPTED_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^isaccepted:(yes|no)(?:\s+(.*))?$"));
static HAS_ACCEPTED_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^hasaccepted:(yes|no)(?:\s+(.*))?$"));
static IS_QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^is:(question)(?:\s+(.*))?$"));
static IS_ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^is:(answer)(?:\s+(.*))?$"));
static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r#"^"([^"]+)"\s*(.*)$"#));

fn compile(pattern: &str) -> Regex {
    // 模式均为常量
    Regex::new(&format!("(?s){pattern}")).expect("invalid search pattern")
}

impl SearchSyntax {
    /// 按优先级排列的前缀语法（不含兜底的 `Object`）
    pub const PRIORITY: [SearchSyntax; 9] = [
        Self::Tag,
        Self::Author,
        Self::Score,
        Self::AnswerCount,
        Self::Accepted,
        Self::HasAccepted,
        Self::IsQuestion,
        Self::IsAnswer,
        Self::Quote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Author => "author",
            Self::Score => "score",
            Self::AnswerCount => "answer_count",
            Self::Accepted => "accepted",
            Self::HasAccepted => "has_accepted",
            Self::IsQuestion => "is_question",
            Self::IsAnswer => "is_answer",
            Self::Quote => "quote",
            Self::Object => "object",
        }
    }

    fn regex(&self) -> Option<&'static Regex> {
        let re: &'static LazyLock<Regex> = match self {
            Self::Tag => &TAG_RE,
            Self::Author => &AUTHOR_RE,
            Self::Score => &SCORE_RE,
            Self::AnswerCount => &ANSWERS_RE,
            Self::Accepted => &ACCEPTED_RE,
            Self::HasAccepted => &HAS_ACCEPTED_RE,
            Self::IsQuestion => &IS_QUESTION_RE,
            Self::IsAnswer => &IS_ANSWER_RE,
            Self::Quote => &QUOTE_RE,
            Self::Object => return None,
        };
        Some(LazyLock::force(re))
    }

    /// 尝试用本语法解析，返回 `(exp, 剩余关键字)`
    ///
    /// `Object` 总是匹配，exp 为空，整串作为关键字。
    pub fn try_parse(&self, query: &str) -> Option<(String, String)> {
        let query = query.trim();
        let Some(re) = self.regex() else {
            return Some((String::new(), query.to_string()));
        };

        let caps = re.captures(query)?;
        let exp = caps.get(1)?.as_str();
        let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

        let exp = match self {
            Self::Accepted | Self::HasAccepted | Self::IsQuestion | Self::IsAnswer => {
                exp.to_ascii_lowercase()
            }
            // 超出 i64 的分值视为不匹配
            Self::Score | Self::AnswerCount => exp.parse::<i64>().ok()?.to_string(),
            _ => exp.to_string(),
        };

        Some((exp, rest.to_string()))
    }

    /// 按优先级解析，都不匹配时退回全文搜索
    pub fn parse(query: &str) -> ParsedQuery {
        Self::PRIORITY
            .iter()
            .find_map(|syntax| {
                syntax.try_parse(query).map(|(exp, words)| ParsedQuery {
                    syntax: *syntax,
                    exp,
                    words,
                })
            })
            .unwrap_or_else(|| ParsedQuery {
                syntax: Self::Object,
                exp: String::new(),
                words: query.trim().to_string(),
            })
    }
}

impl std::fmt::Display for SearchSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(syntax: SearchSyntax, exp: &str, words: &str) -> ParsedQuery {
        ParsedQuery {
            syntax,
            exp: exp.to_string(),
            words: words.to_string(),
        }
    }

    #[test]
    fn test_parse_table() {
        use SearchSyntax::*;

        let cases = [
            ("[go] pointers", parsed(Tag, "go", "pointers")),
            ("[rust]", parsed(Tag, "rust", "")),
            ("user:alice bug", parsed(Author, "alice", "bug")),
            ("user:me", parsed(Author, "me", "")),
            ("score:10 async", parsed(Score, "10", "async")),
            ("score:-3", parsed(Score, "-3", "")),
            ("answers:2 lifetime", parsed(AnswerCount, "2", "lifetime")),
            ("isaccepted:yes borrow", parsed(Accepted, "yes", "borrow")),
            ("IsAccepted:NO", parsed(Accepted, "no", "")),
            ("hasaccepted:no tokio", parsed(HasAccepted, "no", "tokio")),
            ("is:question macros", parsed(IsQuestion, "question", "macros")),
            ("is:answer", parsed(IsAnswer, "answer", "")),
            ("\"exact phrase\" more", parsed(Quote, "exact phrase", "more")),
            ("  plain text search  ", parsed(Object, "", "plain text search")),
            ("", parsed(Object, "", "")),
        ];

        for (query, expected) in cases {
            assert_eq!(SearchSyntax::parse(query), expected, "query: {query:?}");
        }
    }

    #[test]
    fn test_malformed_prefixes_fall_back_to_object() {
        for query in [
            "score:abc",
            "answers:-1",
            "isaccepted:maybe",
            "is:tag",
            "[unclosed tag",
            "[two words] x",
            "\"unterminated",
            "scorecard:1",
            "score:99999999999999999999",
            "answers:99999999999999999999 rust",
        ] {
            let result = SearchSyntax::parse(query);
            assert_eq!(result.syntax, SearchSyntax::Object, "query: {query:?}");
            assert_eq!(result.words, query);
        }
    }

    #[test]
    fn test_prefix_must_lead() {
        // 前缀不在开头时不识别
        let result = SearchSyntax::parse("pointers [go]");
        assert_eq!(result.syntax, SearchSyntax::Object);
        assert_eq!(result.words, "pointers [go]");
    }

    #[test]
    fn test_only_first_syntax_applies() {
        // 标签之后的 user: 不会再被解析
        let result = SearchSyntax::parse("[go] user:alice");
        assert_eq!(result, parsed(SearchSyntax::Tag, "go", "user:alice"));
    }

    #[test]
    fn test_object_try_parse_always_matches() {
        assert_eq!(
            SearchSyntax::Object.try_parse(" anything "),
            Some((String::new(), "anything".to_string()))
        );
        assert_eq!(SearchSyntax::Tag.try_parse("no tag"), None);
    }
}
