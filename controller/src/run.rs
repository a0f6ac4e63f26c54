//! Frame loop with graceful shutdown and periodic status logging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

use crate::controller::Controller;
use crate::dispatch::{Clock, KeySink};
use crate::replay::FrameSource;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, handler_address());
        libc::signal(libc::SIGINT, handler_address());
    }
}

fn handler_address() -> libc::sighandler_t {
    signal_handler as extern "C" fn(libc::c_int) as *const () as libc::sighandler_t
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Why the frame loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Signal,
}

/// Feed every frame from `source` through `controller` until the stream
/// ends or a shutdown is requested, then release held keys.
pub fn run<S, C, F>(
    controller: &mut Controller<S, C>,
    source: &mut F,
    status_interval: Duration,
) -> anyhow::Result<StopReason>
where
    S: KeySink,
    C: Clock,
    F: FrameSource,
{
    run_until(controller, source, status_interval, &SHUTDOWN_REQUESTED)
}

fn run_until<S, C, F>(
    controller: &mut Controller<S, C>,
    source: &mut F,
    status_interval: Duration,
    shutdown: &AtomicBool,
) -> anyhow::Result<StopReason>
where
    S: KeySink,
    C: Clock,
    F: FrameSource,
{
    let mut last_status_log = Instant::now();
    let mut reason = StopReason::EndOfStream;

    loop {
        // Checked between frames only; a playing sequence always completes.
        if shutdown.load(Ordering::SeqCst) {
            info!("Shutdown signal received, stopping");
            reason = StopReason::Signal;
            break;
        }

        let Some(frame) = source.next_frame()? else {
            info!("End of frame stream");
            break;
        };
        controller.process_frame(&frame);

        if last_status_log.elapsed() >= status_interval {
            info!("Status: {}", controller.status_sexp());
            last_status_log = Instant::now();
        }
    }

    controller.release_all();
    info!("Final status: {}", controller.status_sexp());
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{RecordingSink, VirtualClock};
    use crate::gesture::{make_frame, set_joint, GestureClassifier, GestureConfig, Mode};
    use crate::keys::KeyBindings;
    use crate::keys::KeyDirection::Up;
    use crate::skeleton::{Joint, SensorFrame, Skeleton, SkeletonTracking};

    struct VecSource {
        frames: std::vec::IntoIter<SensorFrame>,
        pulled: usize,
        stop_after: Option<(usize, &'static AtomicBool)>,
    }

    impl FrameSource for VecSource {
        fn next_frame(&mut self) -> anyhow::Result<Option<SensorFrame>> {
            self.pulled += 1;
            if let Some((n, flag)) = self.stop_after {
                if self.pulled > n {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            Ok(self.frames.next())
        }
    }

    fn controller() -> Controller<RecordingSink, VirtualClock> {
        Controller::new(
            GestureClassifier::new(GestureConfig::default()),
            KeyBindings::default(),
            Mode::FacingRight,
            RecordingSink::default(),
            VirtualClock::new(),
        )
    }

    fn crouching(t: u64) -> SensorFrame {
        let mut f = make_frame();
        set_joint(&mut f, Joint::ShoulderCenter, 0.0, 0.25);
        set_joint(&mut f, Joint::Head, 0.0, 0.45);
        SensorFrame {
            timestamp_ms: t,
            skeletons: vec![Skeleton {
                tracking: SkeletonTracking::Tracked,
                frame: f,
            }],
        }
    }

    #[test]
    fn test_run_to_end_releases_keys() {
        let mut c = controller();
        let mut src = VecSource {
            frames: vec![crouching(0), crouching(33)].into_iter(),
            pulled: 0,
            stop_after: None,
        };
        let flag = AtomicBool::new(false);
        let reason = run_until(&mut c, &mut src, Duration::from_secs(60), &flag).unwrap();
        assert_eq!(reason, StopReason::EndOfStream);
        assert_eq!(c.stats.frames_seen, 2);
        assert_eq!(c.sink.events.last(), Some(&(0x53, Up)));
        assert!(c.held_keys().is_empty());
    }

    #[test]
    fn test_shutdown_between_frames() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let mut c = controller();
        let mut src = VecSource {
            frames: vec![crouching(0), crouching(33), crouching(66)].into_iter(),
            pulled: 0,
            stop_after: Some((1, &FLAG)),
        };
        let reason = run_until(&mut c, &mut src, Duration::from_secs(60), &FLAG).unwrap();
        assert_eq!(reason, StopReason::Signal);
        // Second frame was pulled and processed before the flag was seen.
        assert_eq!(c.stats.frames_seen, 2);
        assert!(c.held_keys().is_empty());
    }

    #[test]
    fn test_signal_handlers_installed_and_set_flag() {
        install_signal_handlers();
        // Swapping in the default returns what was installed.
        let previous = unsafe { libc::signal(libc::SIGTERM, libc::SIG_DFL) };
        assert_eq!(previous, handler_address());
        let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_DFL) };
        assert_eq!(previous, handler_address());

        signal_handler(libc::SIGTERM);
        assert!(SHUTDOWN_REQUESTED.swap(false, Ordering::SeqCst));
    }
}
