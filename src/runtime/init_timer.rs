//! Scoped timing of runtime initialization steps.

use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

/// Logs `START: <label>` on creation and `FINISH: <label> [<ms> ms]` on drop,
/// indented by nesting depth. Does nothing when disabled.
#[must_use = "the timer stops when dropped"]
pub struct InitTimer {
    label: Option<String>,
    start: Instant,
}

impl InitTimer {
    pub fn start(enabled: bool, label: impl Into<String>) -> Self {
        let label = enabled.then(|| label.into());
        if let Some(label) = &label {
            let depth = NESTING.with(|n| {
                let depth = n.get();
                n.set(depth + 1);
                depth
            });
            log::info!("{:indent$}START: {}", "", label, indent = depth * 2);
        }
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.label.is_some()
    }
}

impl Drop for InitTimer {
    fn drop(&mut self) {
        if let Some(label) = &self.label {
            let depth = NESTING.with(|n| {
                let depth = n.get().saturating_sub(1);
                n.set(depth);
                depth
            });
            log::info!(
                "{:indent$}FINISH: {} [{} ms]",
                "",
                label,
                self.start.elapsed().as_millis(),
                indent = depth * 2
            );
        }
    }
}
