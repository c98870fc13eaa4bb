//! Live lattice rendering, fed by deep-copied snapshots.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colored::Colorize;
use parking_lot::Mutex;
use tracing::warn;

use crate::geometry::{Lattice, Position};
use crate::simulation::LivenessProbe;

/// Produces a fresh copy of a run's lattice.
pub type SnapshotFn = Box<dyn Fn() -> Lattice + Send>;

/// Consumer of periodic lattice snapshots.
///
/// `attach` must return promptly; rendering happens on the visualizer's own
/// thread and stops once `probe` reports the run finished. Stopping the
/// visualizer never stops the run.
pub trait Visualizer: Send + Sync {
    fn attach(&self, title: String, snapshot: SnapshotFn, interval: Duration, probe: LivenessProbe);
}

/// Latest lattice published by a run, readable from any thread.
#[derive(Debug, Clone)]
pub struct SnapshotSlot(Arc<Mutex<Lattice>>);

impl SnapshotSlot {
    pub fn new(lattice: Lattice) -> Self {
        Self(Arc::new(Mutex::new(lattice)))
    }

    pub fn publish(&self, lattice: Lattice) {
        *self.0.lock() = lattice;
    }

    pub fn latest(&self) -> Lattice {
        self.0.lock().clone()
    }
}

const CELL: &str = "██";

/// Which run currently owns the terminal. Only the owner draws; the screen
/// passes to another live run once the owner finishes.
#[derive(Debug, Clone, Default)]
struct Screen(Arc<Mutex<Option<String>>>);

impl Screen {
    /// Take the screen for `title` unless another run holds it.
    fn claim(&self, title: &str) -> bool {
        let mut owner = self.0.lock();
        match owner.as_deref() {
            Some(current) if current != title => false,
            Some(_) => true,
            None => {
                *owner = Some(title.to_string());
                true
            }
        }
    }

    fn release(&self, title: &str) {
        let mut owner = self.0.lock();
        if owner.as_deref() == Some(title) {
            *owner = None;
        }
    }

    fn owner(&self) -> Option<String> {
        self.0.lock().clone()
    }
}

/// Draws lattices to stdout, up spins yellow and down spins blue.
///
/// Concurrent runs share one terminal: a single run is drawn at a time, and
/// when it finishes the next live run takes over.
#[derive(Default)]
pub struct TerminalVisualizer {
    handles: Mutex<Vec<JoinHandle<()>>>,
    screen: Screen,
}

impl TerminalVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One frame: row `y` lists the cells `(0, y) .. (width - 1, y)`.
    pub fn render(lattice: &Lattice) -> String {
        let extent = lattice.extent();
        let mut frame = String::new();
        for y in 0..extent.y() {
            for x in 0..extent.x() {
                let cell = if lattice.get(Position::new(x, y)) {
                    CELL.yellow()
                } else {
                    CELL.blue()
                };
                frame.push_str(&cell.to_string());
            }
            frame.push('\n');
        }
        frame
    }

    /// Title of the run currently being drawn, if any.
    pub fn on_screen(&self) -> Option<String> {
        self.screen.owner()
    }

    /// Wait for every render thread to observe its run finishing.
    pub fn join(&self) {
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                warn!("visualizer thread panicked");
            }
        }
    }
}

impl Visualizer for TerminalVisualizer {
    fn attach(&self, title: String, snapshot: SnapshotFn, interval: Duration, probe: LivenessProbe) {
        let name = format!("viz-{title}");
        let screen = self.screen.clone();
        let spawned = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                while !probe.is_finished() {
                    if probe.is_alive() && screen.claim(&title) {
                        let frame = TerminalVisualizer::render(&snapshot());
                        let mut out = std::io::stdout().lock();
                        if writeln!(out, "\x1b[2J\x1b[H{title}\n{frame}").is_err() {
                            break;
                        }
                    }
                    thread::sleep(interval);
                }
                screen.release(&title);
            });
        match spawned {
            Ok(handle) => self.handles.lock().push(handle),
            Err(e) => warn!(thread = %name, error = %e, "could not start visualizer thread"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_two_glyph_kinds() {
        colored::control::set_override(false);
        let lattice = Lattice::new(Position::new(3, 2), |p| p.x() == 0).unwrap();
        let frame = TerminalVisualizer::render(&lattice);
        let rows: Vec<&str> = frame.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.chars().count() == 6));

        colored::control::set_override(true);
        let colored_frame = TerminalVisualizer::render(&lattice);
        assert_ne!(colored_frame, frame);
        colored::control::unset_override();
    }

    #[test]
    fn test_snapshot_slot_is_a_copy() {
        let slot = SnapshotSlot::new(Lattice::uniform(Position::new(2, 2), false).unwrap());
        let mut seen = slot.latest();
        seen.assign(Position::new(0, 0), true);
        assert_eq!(slot.latest().positive_spin_count(), 0);

        slot.publish(Lattice::uniform(Position::new(2, 2), true).unwrap());
        assert_eq!(slot.latest().positive_spin_count(), 4);
    }

    #[test]
    fn test_screen_has_one_owner_at_a_time() {
        let screen = Screen::default();
        assert!(screen.claim("run 0"));
        assert!(screen.claim("run 0"));
        assert!(!screen.claim("run 1"));

        // Only the owner can hand the screen back.
        screen.release("run 1");
        assert_eq!(screen.owner().as_deref(), Some("run 0"));
        screen.release("run 0");
        assert_eq!(screen.owner(), None);
        assert!(screen.claim("run 1"));
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..2000 {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn test_screen_passes_to_next_live_run() {
        let viz = TerminalVisualizer::new();
        let probes = [LivenessProbe::new(), LivenessProbe::new()];
        for (i, probe) in probes.iter().enumerate() {
            probe.mark_running();
            viz.attach(
                format!("run {i}"),
                Box::new(|| Lattice::uniform(Position::new(2, 2), false).unwrap()),
                Duration::from_millis(1),
                probe.clone(),
            );
        }

        assert!(wait_for(|| viz.on_screen().is_some()));
        let first = viz.on_screen().unwrap();
        let (done, other) = if first == "run 0" { (0, "run 1") } else { (1, "run 0") };
        probes[done].mark_finished();
        assert!(wait_for(|| viz.on_screen().as_deref() == Some(other)));

        probes[1 - done].mark_finished();
        viz.join();
        assert_eq!(viz.on_screen(), None);
    }

    #[test]
    fn test_render_thread_stops_when_run_finishes() {
        let viz = TerminalVisualizer::new();
        let probe = LivenessProbe::new();
        viz.attach(
            "idle".into(),
            Box::new(|| Lattice::uniform(Position::new(2, 2), true).unwrap()),
            Duration::from_millis(1),
            probe.clone(),
        );
        probe.mark_finished();
        viz.join();
        assert!(viz.handles.lock().is_empty());
        assert_eq!(viz.on_screen(), None);
    }
}
