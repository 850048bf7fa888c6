//! 请求与响应 DTO

pub mod request;
pub mod response;

pub use request::{
    AddAnswerRequest, AddCommentRequest, AddReportRequest, PermissionQuery, PinQuestionRequest,
    QuestionRequest, UpdateAnswerRequest, UpdateQuestionStatusRequest, UserAwardsQuery,
    VoteRequest,
};
pub use response::{ApiResponse, CreatedResponse, Envelope, SUCCESS_REASON};
