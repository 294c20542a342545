//! Tokio-backed timer driver

use standup_core::{ScheduleName, TimerDriver, TimerSpec};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// One tokio task per armed schedule. Fired schedule names are delivered over
/// the channel returned by [`TokioTimers::new`].
pub struct TokioTimers {
    runtime: Handle,
    fired_tx: mpsc::UnboundedSender<ScheduleName>,
    tasks: Mutex<HashMap<ScheduleName, JoinHandle<()>>>,
}

impl TokioTimers {
    pub fn new(runtime: Handle) -> (Self, mpsc::UnboundedReceiver<ScheduleName>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let timers = Self {
            runtime,
            fired_tx,
            tasks: Mutex::new(HashMap::new()),
        };
        (timers, fired_rx)
    }

    fn replace(&self, name: ScheduleName, handle: Option<JoinHandle<()>>) {
        let mut tasks = match self.tasks.lock() {
            Ok(tasks) => tasks,
            Err(poisoned) => {
                warn!("Timer table lock poisoned");
                poisoned.into_inner()
            }
        };

        let previous = match handle {
            Some(handle) => tasks.insert(name, handle),
            None => tasks.remove(&name),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl TimerDriver for TokioTimers {
    fn arm(&self, spec: TimerSpec) {
        let tx = self.fired_tx.clone();

        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(spec.initial_delay).await;
            if tx.send(spec.name).is_err() || spec.period.is_zero() {
                return;
            }

            let mut ticker = tokio::time::interval_at(Instant::now() + spec.period, spec.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(spec.name).is_err() {
                    break;
                }
            }
        });

        debug!(
            schedule = %spec.name,
            initial_delay_secs = spec.initial_delay.as_secs(),
            period_secs = spec.period.as_secs(),
            "Schedule armed"
        );
        self.replace(spec.name, Some(handle));
    }

    fn cancel(&self, name: ScheduleName) {
        self.replace(name, None);
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.get_mut() {
            for (_, handle) in tasks.drain() {
                handle.abort();
            }
        }
    }
}
