use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::game_input_handler::Signal;

/// Background thread emitting [`Signal::Frame`] at a fixed rate.
///
/// Frames carry the time elapsed since the ticker started along with its
/// generation, so the receiver can discard frames a cancelled ticker left
/// queued in the channel.
///
/// At most one frame is in flight: the ticker skips a deadline while the
/// previous frame has not been taken with [`FrameTicker::frame_taken`].
/// A slow receiver therefore sees fewer frames, never a backlog.
#[derive(Debug)]
pub struct FrameTicker {
    generation: u64,
    frame_pending: Arc<AtomicBool>,
    handles: Option<(JoinHandle<()>, Arc<AtomicBool>)>,
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl FrameTicker {
    pub const MIN_FPS: u32 = 1;
    pub const MAX_FPS: u32 = 240;

    pub fn start(sender: &Sender<Signal>, fps: u32, generation: u64) -> Self {
        let fps = fps.clamp(Self::MIN_FPS, Self::MAX_FPS);
        let flag = Arc::new(AtomicBool::new(true));
        let frame_pending = Arc::new(AtomicBool::new(false));
        let frame_len = Duration::from_secs_f64(1.0 / f64::from(fps));
        let handle = Self::spawn(
            sender.clone(),
            flag.clone(),
            frame_pending.clone(),
            frame_len,
            generation,
        );
        log::debug!("frame ticker #{generation} started at {fps} fps");
        FrameTicker {
            generation,
            frame_pending,
            handles: Some((handle, flag)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tells the ticker its last frame left the channel, allowing the next one.
    pub fn frame_taken(&self) {
        self.frame_pending.store(false, Ordering::Release);
    }

    /// Stops the thread and waits for it to exit. No frames are sent afterwards.
    pub fn cancel(&mut self) {
        if let Some((handle, running_flag)) = self.handles.take() {
            running_flag.store(false, Ordering::Release);
            if handle.join().is_err() {
                log::warn!("frame ticker #{} panicked", self.generation);
            }
            log::debug!("frame ticker #{} cancelled", self.generation);
        }
    }

    fn spawn(
        sender: Sender<Signal>,
        flag: Arc<AtomicBool>,
        frame_pending: Arc<AtomicBool>,
        frame_len: Duration,
        generation: u64,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let time_started = Instant::now();
            for n_frame in 1u32.. {
                // Deadlines are absolute so frames don't drift.
                let next_frame = time_started + frame_len * n_frame;
                if let Some(remaining) = next_frame.checked_duration_since(Instant::now()) {
                    thread::sleep(remaining);
                }
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                // Receiver still busy with the previous frame: skip this one.
                if frame_pending.swap(true, Ordering::AcqRel) {
                    continue;
                }
                let signal = Signal::Frame {
                    generation,
                    elapsed: time_started.elapsed(),
                };
                if sender.send(signal).is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, RecvTimeoutError};

    use super::*;

    #[test]
    fn frames_carry_generation_and_increasing_time() {
        let (sender, receiver) = mpsc::channel();
        let ticker = FrameTicker::start(&sender, 200, 7);
        assert_eq!(ticker.generation(), 7);
        let mut last = Duration::ZERO;
        for _ in 0..5 {
            match receiver.recv_timeout(Duration::from_secs(2)) {
                Ok(Signal::Frame { generation, elapsed }) => {
                    assert_eq!(generation, 7);
                    assert!(elapsed > last);
                    last = elapsed;
                    ticker.frame_taken();
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn slow_receiver_gets_no_backlog() {
        let (sender, receiver) = mpsc::channel();
        let ticker = FrameTicker::start(&sender, 60, 0);
        let time_started = Instant::now();
        let mut handled = 0;
        while time_started.elapsed() < Duration::from_secs(1) {
            let signal = receiver.recv_timeout(Duration::from_secs(2));
            assert!(matches!(signal, Ok(Signal::Frame { .. })), "{signal:?}");
            ticker.frame_taken();
            // Much slower than one frame at 60 fps.
            thread::sleep(Duration::from_millis(40));
            handled += 1;
        }
        assert!(handled > 5);

        // A key arriving now only waits behind the one pending frame.
        sender.send(Signal::Redraw).unwrap();
        let mut frames_ahead = 0;
        loop {
            match receiver.recv_timeout(Duration::from_secs(2)) {
                Ok(Signal::Redraw) => break,
                Ok(Signal::Frame { .. }) => frames_ahead += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(frames_ahead <= 1, "{frames_ahead} frames queued ahead of input");
    }

    #[test]
    fn skipped_frames_still_report_current_time() {
        let (sender, receiver) = mpsc::channel();
        let ticker = FrameTicker::start(&sender, 100, 0);
        assert!(receiver.recv_timeout(Duration::from_secs(2)).is_ok());
        thread::sleep(Duration::from_millis(200));
        // Nothing piles up while the first frame is outstanding.
        assert_eq!(
            receiver.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        );
        ticker.frame_taken();
        match receiver.recv_timeout(Duration::from_secs(2)) {
            Ok(Signal::Frame { elapsed, .. }) => assert!(elapsed >= Duration::from_millis(200)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cancel_stops_frames() {
        let (sender, receiver) = mpsc::channel();
        let mut ticker = FrameTicker::start(&sender, 500, 0);
        drop(sender);
        assert!(receiver.recv_timeout(Duration::from_secs(2)).is_ok());
        ticker.cancel();
        // Whatever was queued drains, then the thread's sender is gone.
        loop {
            match receiver.recv_timeout(Duration::from_secs(2)) {
                Ok(_) => continue,
                Err(err) => {
                    assert_eq!(err, RecvTimeoutError::Disconnected);
                    break;
                }
            }
        }
        // Cancelling twice is harmless.
        ticker.cancel();
    }

    #[test]
    fn dropping_stops_frames() {
        let (sender, receiver) = mpsc::channel();
        drop(FrameTicker::start(&sender, 500, 0));
        drop(sender);
        while receiver.recv_timeout(Duration::from_secs(2)).is_ok() {}
        assert_eq!(
            receiver.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
