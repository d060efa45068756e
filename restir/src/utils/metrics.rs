#[cfg(feature = "metrics")]
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use log::debug;

/// Wall-clock timings of the passes of a single frame.
///
/// Without the `metrics` feature this is a no-op.
#[derive(Debug, Default)]
pub struct Metrics {
    #[cfg(feature = "metrics")]
    entries: Vec<(&'static str, Duration)>,
}

impl Metrics {
    pub fn measure<T>(
        &mut self,
        label: &'static str,
        f: impl FnOnce() -> T,
    ) -> T {
        #[cfg(feature = "metrics")]
        {
            let tt = Instant::now();
            let result = f();

            self.entries.push((label, tt.elapsed()));

            result
        }

        #[cfg(not(feature = "metrics"))]
        {
            let _ = label;

            f()
        }
    }

    #[cfg(feature = "metrics")]
    pub fn entries(&self) -> &[(&'static str, Duration)] {
        &self.entries
    }

    /// Logs timings collected so far and starts over.
    pub fn flush(&mut self, frame: u32) {
        #[cfg(feature = "metrics")]
        {
            let total: Duration =
                self.entries.iter().map(|(_, took)| *took).sum();

            for (label, took) in self.entries.drain(..) {
                debug!(
                    "frame {}: {} took {}",
                    frame,
                    label,
                    humantime::format_duration(took)
                );
            }

            debug!(
                "frame {}: total {}",
                frame,
                humantime::format_duration(total)
            );
        }

        #[cfg(not(feature = "metrics"))]
        {
            let _ = frame;
        }
    }
}
