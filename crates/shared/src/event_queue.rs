//! 进程内事件队列
//!
//! 有界 FIFO 通道 + 单个消费 worker。生产者在请求路径上入队后立即返回，
//! worker 按入队顺序把事件依次交给已注册的处理器。
//!
//! ## 溢出策略
//!
//! - `Block`：队列满时 `send` 等待空位（背压）
//! - `DropNewest`：队列满时丢弃新事件，记录告警和指标
//!
//! 处理器失败只记录日志和指标，不重试，也不影响后续事件。

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{EventQueueConfig, OverflowPolicy};
use crate::events::{EventHandler, EventMsg};

/// 事件队列生产端
///
/// 可廉价克隆，所有克隆共享同一个通道；最后一个克隆被 drop 后 worker 退出。
#[derive(Clone)]
pub struct EventQueue {
    sender: mpsc::Sender<EventMsg>,
    policy: OverflowPolicy,
}

impl EventQueue {
    /// 创建队列并启动唯一的消费 worker
    pub fn start(
        config: &EventQueueConfig,
        handlers: Vec<Arc<dyn EventHandler>>,
    ) -> (Self, JoinHandle<()>) {
        let capacity = config.capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);

        info!(
            capacity,
            policy = ?config.overflow_policy,
            handlers = handlers.len(),
            "事件队列已启动"
        );

        let worker = EventWorker { receiver, handlers };
        let handle = tokio::spawn(worker.run());

        (
            Self {
                sender,
                policy: config.overflow_policy,
            },
            handle,
        )
    }

    /// 投递事件，返回事件是否被接收
    ///
    /// worker 已退出时返回 false。
    pub async fn send(&self, msg: EventMsg) -> bool {
        let event_type = msg.event_type.as_str();

        let accepted = match self.policy {
            OverflowPolicy::Block => self.sender.send(msg).await.is_ok(),
            OverflowPolicy::DropNewest => match self.sender.try_send(msg) {
                Ok(()) => true,
                Err(TrySendError::Full(dropped)) => {
                    warn!(
                        event_type,
                        user_id = %dropped.user_id,
                        "事件队列已满，丢弃事件"
                    );
                    metrics::counter!("events_dropped_total", "event_type" => event_type)
                        .increment(1);
                    return false;
                }
                Err(TrySendError::Closed(_)) => false,
            },
        };

        if accepted {
            metrics::counter!("events_enqueued_total", "event_type" => event_type).increment(1);
        } else {
            warn!(event_type, "事件队列已关闭，事件未投递");
        }

        accepted
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// 单消费者 worker
struct EventWorker {
    receiver: mpsc::Receiver<EventMsg>,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventWorker {
    async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            self.dispatch(&msg).await;
        }
        info!("事件队列 worker 退出");
    }

    async fn dispatch(&self, msg: &EventMsg) {
        for handler in &self.handlers {
            if !handler.supports(&msg.event_type) {
                continue;
            }

            match handler.handle(msg).await {
                Ok(()) => debug!(
                    handler = handler.name(),
                    event_type = %msg.event_type,
                    "事件处理完成"
                ),
                Err(e) => {
                    error!(
                        handler = handler.name(),
                        event_type = %msg.event_type,
                        user_id = %msg.user_id,
                        error = %e,
                        "事件处理失败，事件被丢弃"
                    );
                    metrics::counter!("event_handler_failures_total", "handler" => handler.name())
                        .increment(1);
                }
            }
        }
    }
}
