use tokio::signal;
use tokio::task::JoinHandle;
use tracing::warn;

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
    warn!("Shutdown signal received, initiating graceful shutdown...");
}

/// 停止发件箱分发任务，未分发的事件保留在表中，下次启动继续处理
pub async fn stop_dispatcher(dispatcher: JoinHandle<()>) {
    dispatcher.abort();
    if let Err(e) = dispatcher.await
        && !e.is_cancelled()
    {
        warn!("Outbox dispatcher exited abnormally: {}", e);
    }
}
