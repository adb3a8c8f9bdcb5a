use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Messages a worker sends back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// A line of output from the external command.
    Line(String),
    /// Progress bar position in `0.0..=1.0` with an optional caption.
    Progress { fraction: f64, text: String },
    /// Terminal event; `Err` carries a user-facing message.
    Finished(Result<String, String>),
}

/// One operation at a time per window. Acquiring hands out a guard that
/// frees the slot when dropped, including when the worker panics.
#[derive(Clone, Default)]
pub struct TaskSlot {
    busy: Arc<AtomicBool>,
}

pub struct TaskGuard {
    busy: Arc<AtomicBool>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<TaskGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TaskGuard {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Advisory cancellation, checked by workers between stages.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Run `work` on a named thread holding `guard`. Events go out through the
/// returned receiver; the channel closes when the worker returns.
pub fn spawn_worker<F>(name: &str, guard: TaskGuard, work: F) -> Result<flume::Receiver<TaskEvent>, String>
where
    F: FnOnce(&flume::Sender<TaskEvent>) + Send + 'static,
{
    let (tx, rx) = flume::unbounded();
    thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let _guard = guard;
            work(&tx);
        })
        .map_err(|e| format!("Failed to spawn {} thread: {}", name, e))?;
    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_admits_one_holder() {
        let slot = TaskSlot::new();
        let guard = slot.try_acquire().expect("slot starts free");
        assert!(slot.is_busy());
        assert!(slot.try_acquire().is_none());
        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn worker_releases_slot_and_closes_channel() {
        let slot = TaskSlot::new();
        let guard = slot.try_acquire().unwrap();
        let rx = spawn_worker("test-worker", guard, |tx| {
            let _ = tx.send(TaskEvent::Line("hello".into()));
            let _ = tx.send(TaskEvent::Finished(Ok("done".into())));
        })
        .unwrap();

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            [
                TaskEvent::Line("hello".into()),
                TaskEvent::Finished(Ok("done".into())),
            ]
        );
        while slot.is_busy() {
            thread::yield_now();
        }
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn panicking_worker_frees_slot() {
        let slot = TaskSlot::new();
        let guard = slot.try_acquire().unwrap();
        let rx = spawn_worker("panicky", guard, |_| panic!("boom")).unwrap();
        assert!(rx.recv().is_err());
        while slot.is_busy() {
            thread::yield_now();
        }
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!other.is_cancelled());
    }
}
