use log::debug;
use tokio::runtime::Runtime;
use tokio::sync::OnceCell;

static BINDINGS_RUNTIME: OnceCell<Runtime> = OnceCell::const_new();

/// Completion work is SQLite bound, so a few workers are plenty.
const MAX_WORKERS: usize = 4;

fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .clamp(2, MAX_WORKERS)
}

/// Runtime backing the foreign-language bindings, built on first use.
pub async fn bindings_runtime() -> anyhow::Result<&'static Runtime> {
    BINDINGS_RUNTIME
        .get_or_try_init(async || {
            let workers = worker_count();
            debug!("Starting bindings runtime with {} workers", workers);
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(workers)
                .thread_name("liftgrade-worker")
                .enable_all()
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build tokio runtime: {}", e))
        })
        .await
}
