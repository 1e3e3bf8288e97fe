//! Fixed-period background tasks.
//!
//! Each task gets its own timer. The first run happens one full period after
//! `start`; a run that overlaps the next tick delays it rather than bursting.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::Result;

#[async_trait]
pub trait PeriodicTask: Send + Sync {
    async fn run(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct TaskDescriptor {
    pub name: &'static str,
    pub period: Duration,
    pub task: Arc<dyn PeriodicTask>,
}

pub struct Scheduler {
    tasks: Vec<TaskDescriptor>,
    cancel: CancellationToken,
    started: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(tasks: Vec<TaskDescriptor>) -> Self {
        Self {
            tasks,
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn one timer per task. Returns `false` if the scheduler was already started.
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let spawned: Vec<JoinHandle<()>> = self
            .tasks
            .iter()
            .cloned()
            .map(|desc| tokio::spawn(task_loop(desc, self.cancel.clone())))
            .collect();

        info!(tasks = spawned.len(), "scheduler started");
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(spawned);
        true
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Cancel all timers and wait for in-flight runs to finish.
    ///
    /// Returns how many task loops ended abnormally (panicked or aborted).
    pub async fn stop(&self) -> usize {
        self.cancel.cancel();
        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );

        let mut failed = 0;
        for h in handles {
            if let Err(e) = h.await {
                error!(error = %e, "task loop ended abnormally");
                failed += 1;
            }
        }
        info!(failed, "scheduler stopped");
        failed
    }
}

async fn task_loop(desc: TaskDescriptor, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + desc.period, desc.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        debug!(task = desc.name, "running scheduled task");
        if let Err(e) = desc.task.run().await {
            error!(task = desc.name, error = %e, "scheduled task failed");
        }
    }
    debug!(task = desc.name, "task loop exited");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::errors::Error;

    #[derive(Default)]
    struct Counter {
        runs: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PeriodicTask for Counter {
        async fn run(&self) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::External("boom".to_string()));
            }
            Ok(())
        }
    }

    fn descriptor(name: &'static str, secs: u64, task: Arc<Counter>) -> TaskDescriptor {
        TaskDescriptor {
            name,
            period: Duration::from_secs(secs),
            task,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_on_period_after_first_interval() {
        let counter = Arc::new(Counter::default());
        let scheduler = Scheduler::new(vec![descriptor("count", 10, counter.clone())]);
        assert!(scheduler.start());

        tokio::time::sleep(Duration::from_millis(9_999)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(20_002)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), 3);

        scheduler.stop().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_timer() {
        let failing = Arc::new(Counter {
            fail: true,
            ..Default::default()
        });
        let other = Arc::new(Counter::default());
        let scheduler = Scheduler::new(vec![
            descriptor("failing", 5, failing.clone()),
            descriptor("other", 7, other.clone()),
        ]);
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(15_001)).await;
        assert_eq!(failing.runs.load(Ordering::SeqCst), 3);
        assert_eq!(other.runs.load(Ordering::SeqCst), 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let counter = Arc::new(Counter::default());
        let scheduler = Scheduler::new(vec![descriptor("count", 10, counter.clone())]);
        assert!(!scheduler.is_started());
        assert!(scheduler.start());
        assert!(!scheduler.start());
        assert!(scheduler.is_started());

        tokio::time::sleep(Duration::from_millis(10_001)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), 1);
        scheduler.stop().await;
    }

    struct Panicking;

    #[async_trait]
    impl PeriodicTask for Panicking {
        async fn run(&self) -> Result<()> {
            panic!("task blew up");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_reports_panicked_loops() {
        let counter = Arc::new(Counter::default());
        let scheduler = Scheduler::new(vec![
            TaskDescriptor {
                name: "panicking",
                period: Duration::from_secs(5),
                task: Arc::new(Panicking),
            },
            descriptor("count", 5, counter.clone()),
        ]);
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.stop().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poisoned_handle_list_is_still_joined() {
        let counter = Arc::new(Counter::default());
        let scheduler = Scheduler::new(vec![descriptor("count", 10, counter.clone())]);

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = scheduler.handles.lock().unwrap();
            panic!("poison");
        }));
        assert!(poisoned.is_err());
        assert!(scheduler.handles.is_poisoned());

        assert!(scheduler.start());
        assert_eq!(
            scheduler
                .handles
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            1
        );

        assert_eq!(scheduler.stop().await, 0);
        assert!(scheduler
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty());
    }
}
