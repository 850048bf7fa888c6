//! 等级权限服务
//!
//! 判定规则：
//! 1. 匿名用户（空 user_id）一律拒绝
//! 2. 用户不存在拒绝
//! 3. 管理员直接放行
//! 4. 给定对象且用户是对象作者时放行；归属查询失败记录告警，按"非作者"继续
//! 5. 否则比较用户声望与 `rank.<action>` 配置的阈值，未配置的操作拒绝
//!
//! 服务本身无状态，不加锁；每次调用独立读取用户、对象和配置。

use std::sync::Arc;

use answer_shared::observability::metrics::record_permission_check;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::Action;
use crate::error::{Result, ServiceError};
use crate::models::ObjectInfo;
use crate::repository::{ConfigRepositoryTrait, ObjectInfoRepositoryTrait, UserRepositoryTrait};

/// 单个操作的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheck {
    pub action: Action,
    pub allowed: bool,
    /// 所需声望；因管理员、作者或匿名短路而未读取配置时为 None，操作未配置时也为 None
    pub required_rank: Option<i64>,
}

impl PermissionCheck {
    fn short_circuit(action: Action, allowed: bool) -> Self {
        Self {
            action,
            allowed,
            required_rank: None,
        }
    }
}

pub struct RankService {
    user_repo: Arc<dyn UserRepositoryTrait>,
    config_repo: Arc<dyn ConfigRepositoryTrait>,
    object_repo: Arc<dyn ObjectInfoRepositoryTrait>,
}

impl RankService {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryTrait>,
        config_repo: Arc<dyn ConfigRepositoryTrait>,
        object_repo: Arc<dyn ObjectInfoRepositoryTrait>,
    ) -> Self {
        Self {
            user_repo,
            config_repo,
            object_repo,
        }
    }

    /// 判定用户能否对对象执行操作，`object_id` 为空表示不涉及具体对象
    pub async fn check_operation_permission(
        &self,
        user_id: &str,
        action: Action,
        object_id: &str,
    ) -> Result<bool> {
        let checks = self
            .check_operation_permissions_for_ranks(user_id, &[action], object_id)
            .await?;
        Ok(checks.first().is_some_and(|c| c.allowed))
    }

    /// 批量判定，用户和对象只查询一次
    pub async fn check_operation_permissions(
        &self,
        user_id: &str,
        actions: &[Action],
        object_id: &str,
    ) -> Result<Vec<bool>> {
        let checks = self
            .check_operation_permissions_for_ranks(user_id, actions, object_id)
            .await?;
        Ok(checks.into_iter().map(|c| c.allowed).collect())
    }

    /// 批量判定并返回每个操作所需的声望，用于提示"需要 N 声望"
    pub async fn check_operation_permissions_for_ranks(
        &self,
        user_id: &str,
        actions: &[Action],
        object_id: &str,
    ) -> Result<Vec<PermissionCheck>> {
        let checks = self.evaluate(user_id, actions, object_id).await?;
        for check in &checks {
            record_permission_check(check.action.as_str(), check.allowed);
        }
        Ok(checks)
    }

    async fn evaluate(
        &self,
        user_id: &str,
        actions: &[Action],
        object_id: &str,
    ) -> Result<Vec<PermissionCheck>> {
        let uniform = |allowed: bool| -> Vec<PermissionCheck> {
            actions
                .iter()
                .map(|a| PermissionCheck::short_circuit(*a, allowed))
                .collect()
        };

        if user_id.is_empty() {
            debug!("匿名用户，拒绝全部操作");
            return Ok(uniform(false));
        }

        let Some(user) = self.user_repo.get_user_basic_info_by_id(user_id).await? else {
            debug!(user_id, "用户不存在，拒绝全部操作");
            return Ok(uniform(false));
        };

        if user.is_admin {
            return Ok(uniform(true));
        }

        if !object_id.is_empty() && self.check_operation_object_owner(user_id, object_id).await {
            debug!(user_id, object_id, "对象作者，放行全部操作");
            return Ok(uniform(true));
        }

        let mut checks = Vec::with_capacity(actions.len());
        for action in actions {
            let required_rank = self.required_rank(*action).await?;
            checks.push(PermissionCheck {
                action: *action,
                allowed: check_user_rank(user.rank, *action, required_rank),
                required_rank,
            });
        }

        Ok(checks)
    }

    /// 用户是否为对象作者
    ///
    /// 查询失败只记录告警并返回 false。
    pub async fn check_operation_object_owner(&self, user_id: &str, object_id: &str) -> bool {
        if user_id.is_empty() || object_id.is_empty() {
            return false;
        }

        match self.object_repo.get_info(object_id).await {
            Ok(info) => info.is_created_by(user_id),
            Err(e) => {
                warn!(user_id, object_id, error = %e, "查询对象归属失败，按非作者处理");
                false
            }
        }
    }

    /// 已知声望与操作阈值比较，不考虑管理员和作者
    pub async fn check_rank_permission(&self, user_rank: i64, action: Action) -> Result<bool> {
        let required_rank = self.required_rank(action).await?;
        Ok(check_user_rank(user_rank, action, required_rank))
    }

    /// 投票权限
    ///
    /// 不能给自己的内容投票（管理员也不行），其余按
    /// `{question|answer|comment}.vote_{up|down}` 阈值判定。对象由调用方加载。
    pub async fn check_vote_permission(
        &self,
        user_id: &str,
        object: &ObjectInfo,
        up: bool,
    ) -> Result<bool> {
        if user_id.is_empty() {
            return Ok(false);
        }

        if object.is_created_by(user_id) {
            info!(user_id, object_id = %object.object_id, "不能给自己的内容投票");
            return Ok(false);
        }

        let action = Action::vote_for(object.object_type, up).ok_or_else(|| {
            ServiceError::Validation(format!("{} 不支持投票", object.object_type))
        })?;

        let Some(user) = self.user_repo.get_user_basic_info_by_id(user_id).await? else {
            return Ok(false);
        };

        let allowed = if user.is_admin {
            true
        } else {
            self.check_rank_permission(user.rank, action).await?
        };
        record_permission_check(action.as_str(), allowed);
        Ok(allowed)
    }

    async fn required_rank(&self, action: Action) -> Result<Option<i64>> {
        self.config_repo.get_int(&action.config_key()).await
    }
}

/// 声望是否达到阈值；未配置阈值的操作拒绝
fn check_user_rank(user_rank: i64, action: Action, required_rank: Option<i64>) -> bool {
    match required_rank {
        Some(required) => {
            let allowed = user_rank >= required;
            if !allowed {
                debug!(user_rank, required, action = %action, "声望不足");
            }
            allowed
        }
        None => {
            warn!(action = %action, key = %action.config_key(), "操作未配置声望阈值，拒绝");
            false
        }
    }
}
