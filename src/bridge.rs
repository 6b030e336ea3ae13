//! Sync/async bridge
//!
//! Blocking entry point for synchronous hosts. The execution context is
//! probed once per call and mapped to a strategy; the extraction future then
//! always runs on the bridge's own engine runtime.

use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, warn};

use crate::Error;

/// Name of the worker thread used from inside a running runtime
const WORKER_THREAD_NAME: &str = "xpost-bridge-worker";

/// What the calling thread looks like at call entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No engine runtime yet, caller outside any runtime
    Absent,
    /// Engine runtime exists, caller outside any runtime
    Idle,
    /// Caller is already inside a Tokio runtime
    Busy,
}

/// How the bridge runs a future
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Build the engine runtime and block on it
    RunInline,
    /// Block on the existing engine runtime
    RunBlocking,
    /// Drive the future from a worker thread and join it
    DispatchToWorker,
}

impl ExecutionStrategy {
    pub fn select(state: SchedulerState) -> Self {
        match state {
            SchedulerState::Absent => ExecutionStrategy::RunInline,
            SchedulerState::Idle => ExecutionStrategy::RunBlocking,
            SchedulerState::Busy => ExecutionStrategy::DispatchToWorker,
        }
    }
}

/// Sync/async bridge owning the engine runtime
#[derive(Debug, Default)]
pub struct Bridge {
    runtime: Mutex<Option<Arc<Runtime>>>,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe the calling context
    pub fn probe(&self) -> SchedulerState {
        if Handle::try_current().is_ok() {
            return SchedulerState::Busy;
        }

        match self.runtime.lock() {
            Ok(guard) if guard.is_some() => SchedulerState::Idle,
            Ok(_) => SchedulerState::Absent,
            Err(poisoned) if poisoned.get_ref().is_some() => SchedulerState::Idle,
            Err(_) => SchedulerState::Absent,
        }
    }

    fn runtime(&self) -> Result<Arc<Runtime>, Error> {
        let mut guard = self.runtime.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(runtime) = guard.as_ref() {
            return Ok(Arc::clone(runtime));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("xpost-engine")
            .enable_all()
            .build()
            .map_err(|e| Error::bridge_dispatch(format!("engine runtime build failed: {}", e)))?;

        debug!("Bridge: engine runtime started");
        let runtime = Arc::new(runtime);
        *guard = Some(Arc::clone(&runtime));
        Ok(runtime)
    }

    /// Run `future` to completion from synchronous code
    pub fn run<F, T>(&self, future: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>> + Send,
        T: Send,
    {
        let strategy = ExecutionStrategy::select(self.probe());
        debug!(?strategy, "Bridge::run");

        match strategy {
            ExecutionStrategy::RunInline | ExecutionStrategy::RunBlocking => {
                let runtime = self.runtime()?;
                runtime.block_on(future)
            }
            ExecutionStrategy::DispatchToWorker => {
                let runtime = self.runtime()?;

                std::thread::scope(|scope| {
                    let worker = std::thread::Builder::new()
                        .name(WORKER_THREAD_NAME.to_string())
                        .spawn_scoped(scope, move || runtime.block_on(future))
                        .map_err(|e| Error::bridge_dispatch(format!("worker spawn failed: {}", e)))?;

                    worker
                        .join()
                        .map_err(|_| Error::bridge_dispatch("worker thread panicked"))?
                })
            }
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        let runtime = match self.runtime.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(runtime) = runtime {
            match Arc::try_unwrap(runtime) {
                // Safe to call from inside another runtime
                Ok(runtime) => runtime.shutdown_background(),
                Err(_) => warn!("Bridge dropped while its runtime is still in use"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        assert_eq!(ExecutionStrategy::select(SchedulerState::Absent), ExecutionStrategy::RunInline);
        assert_eq!(ExecutionStrategy::select(SchedulerState::Idle), ExecutionStrategy::RunBlocking);
        assert_eq!(ExecutionStrategy::select(SchedulerState::Busy), ExecutionStrategy::DispatchToWorker);
    }

    #[test]
    fn test_run_from_plain_thread() {
        let bridge = Bridge::new();
        assert_eq!(bridge.probe(), SchedulerState::Absent);

        let value = bridge.run(async { Ok::<_, Error>(21 * 2) }).unwrap();
        assert_eq!(value, 42);
        assert_eq!(bridge.probe(), SchedulerState::Idle);

        let name = bridge
            .run(async {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                Ok::<_, Error>(std::thread::current().name().map(str::to_string))
            })
            .unwrap();
        assert_ne!(name.as_deref(), Some(WORKER_THREAD_NAME));
    }

    #[tokio::test]
    async fn test_run_inside_runtime_uses_worker() {
        let bridge = Bridge::new();
        assert_eq!(bridge.probe(), SchedulerState::Busy);

        let name = bridge
            .run(async { Ok::<_, Error>(std::thread::current().name().map(str::to_string)) })
            .unwrap();
        assert_eq!(name.as_deref(), Some(WORKER_THREAD_NAME));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_errors_pass_through() {
        let bridge = Bridge::new();

        let result: Result<(), Error> = bridge.run(async { Err(Error::timeout("slow")) });
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_worker_panic_is_reported() {
        let bridge = Bridge::new();

        let result: Result<(), Error> = bridge.run(async {
            if bridge_should_panic() {
                panic!("extraction blew up");
            }
            Ok(())
        });
        assert!(matches!(result, Err(Error::BridgeDispatch(_))));
    }

    fn bridge_should_panic() -> bool {
        true
    }

    #[test]
    fn test_borrowed_input() {
        let bridge = Bridge::new();
        let url = String::from("https://x.com/a/status/1");

        let len = bridge.run(async { Ok::<_, Error>(url.len()) }).unwrap();
        assert_eq!(len, url.len());
    }
}
