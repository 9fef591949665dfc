use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use molab::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Frame progress bar driven by the core's tick events.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        let handler = Self::new();
        if let Ok(pb) = handler.pb.lock() {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        handler
    }

    /// Resets the bar for a run of `total_ticks` frames.
    pub fn begin(&self, total_ticks: u64, message: &str) {
        let Ok(pb) = self.pb.lock() else {
            warn!("Progress bar mutex was poisoned. Cannot start progress.");
            return;
        };
        pb.reset();
        pb.set_style(Self::bar_style());
        pb.set_length(total_ticks);
        pb.set_position(0);
        pb.set_message(message.to_string());
    }

    pub fn finish(&self) {
        let Ok(pb) = self.pb.lock() else {
            return;
        };
        if let Some(len) = pb.length() {
            pb.set_position(len);
        }
        pb.finish_with_message("✓ Done");
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::TickFinish => pb_guard.inc(1),
                Progress::Message(msg) => {
                    if pb_guard.is_finished() {
                        pb_guard.set_message(msg);
                    } else {
                        pb_guard.println(format!("  {}", msg));
                    }
                }
                Progress::TickStart { .. }
                | Progress::MoleculeStepped { .. }
                | Progress::MoleculeSkipped { .. } => {}
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
