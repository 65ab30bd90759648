use crate::constants::CAPTURE_RETRY_DELAY_MS;
use crate::error::UrgError;
use crate::time::sleep_ms;
use crate::transport::Transport;
use crate::UrgDevice;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, error};
use std::thread::JoinHandle;
use std::time::Duration;
use urg_data::ScanFrame;

/// Which capture call the capture thread repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    /// `capture(start, stop)` on every iteration.
    Cold {
        start: Option<u32>,
        stop: Option<u32>,
    },
    /// `prep_fast_capture(start, stop)` once, then `fast_capture()`.
    Fast {
        start: Option<u32>,
        stop: Option<u32>,
    },
}

/// Struct that contains the capture thread.
pub struct DriverThreads {
    pub(crate) capture_terminator_tx: Sender<bool>,
    pub(crate) capture_thread: Option<JoinHandle<()>>,
}

/// Publishing end of a single-slot frame channel.
///
/// Holds a receiver of its own so that an unread frame can be dropped
/// in favor of a newer one.
pub(crate) struct FrameSlot {
    tx: Sender<ScanFrame>,
    stale_rx: Receiver<ScanFrame>,
}

/// Consumer end of the latest-frame hand-off.
///
/// At most one frame is pending. Frames the consumer did not pick up in
/// time are replaced by newer ones.
pub struct FrameReceiver {
    rx: Receiver<ScanFrame>,
}

pub(crate) fn frame_slot() -> (FrameSlot, FrameReceiver) {
    let (tx, rx) = bounded(1);
    let slot = FrameSlot {
        tx,
        stale_rx: rx.clone(),
    };
    (slot, FrameReceiver { rx })
}

impl FrameSlot {
    pub(crate) fn publish(&self, frame: ScanFrame) {
        let frame = match self.tx.try_send(frame) {
            Ok(()) => return,
            Err(TrySendError::Full(frame)) => frame,
            Err(TrySendError::Disconnected(_)) => return,
        };
        if self.stale_rx.try_recv().is_ok() {
            debug!("replacing an unread frame");
        }
        // The capture thread is the only sender, so the slot is free now.
        let _ = self.tx.try_send(frame);
    }
}

impl FrameReceiver {
    /// Take the pending frame without blocking.
    pub fn latest(&self) -> Option<ScanFrame> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a frame.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ScanFrame> {
        self.rx.recv_timeout(timeout).ok()
    }
}

pub(crate) fn capture_frames<T: Transport>(
    device: &mut UrgDevice<T>,
    mode: CaptureMode,
    slot: &FrameSlot,
    capture_terminator_rx: &Receiver<bool>,
) {
    while !do_terminate(capture_terminator_rx) {
        let frame = match mode {
            CaptureMode::Cold { start, stop } => device.capture(start, stop),
            CaptureMode::Fast { .. } => device.fast_capture(),
        };
        if frame.is_empty() {
            sleep_ms(CAPTURE_RETRY_DELAY_MS);
            continue;
        }
        slot.publish(frame);
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

/// Function to launch the capture thread.
///
/// The device moves onto the thread and is disconnected when the thread
/// ends. In `CaptureMode::Fast` the fast path is prepared before the thread
/// starts, so a laser failure is returned here.
pub fn run_driver<T: Transport + Send + 'static>(
    mut device: UrgDevice<T>,
    mode: CaptureMode,
) -> Result<(DriverThreads, FrameReceiver), UrgError> {
    if let CaptureMode::Fast { start, stop } = mode {
        device.prep_fast_capture(start, stop)?;
    }

    let (capture_terminator_tx, capture_terminator_rx) = bounded(10);
    let (slot, frame_rx) = frame_slot();

    let capture_thread = Some(std::thread::spawn(move || {
        capture_frames(&mut device, mode, &slot, &capture_terminator_rx);
        device.disconnect();
    }));

    let driver_threads = DriverThreads {
        capture_thread,
        capture_terminator_tx,
    };
    Ok((driver_threads, frame_rx))
}

/// Function to stop and join the capture thread.
/// This function is automatically called when `driver_threads` is dropped.
pub fn join(driver_threads: &mut DriverThreads) {
    // Fails only when the thread is already gone.
    let _ = driver_threads.capture_terminator_tx.send(true);

    if let Some(thread) = driver_threads.capture_thread.take() {
        if thread.join().is_err() {
            error!("capture thread panicked");
        }
    }
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        join(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChecksumPolicy;
    use crate::mock::{payload_lines, timestamp_line, MockTransport};

    fn frame(timestamp: i64) -> ScanFrame {
        ScanFrame {
            distances: vec![1, 2, 3],
            timestamp,
        }
    }

    fn device() -> UrgDevice<MockTransport> {
        let ts = timestamp_line(42);
        let payload = payload_lines(&[5; 11], 3);
        let mock = MockTransport::urg_04lx().reply(
            b"GD0200021001\n",
            &[b"GD0200021001\n", b"00P\n", &ts, &payload[0]],
        );
        UrgDevice::with_transport(mock, ChecksumPolicy::Verify).unwrap()
    }

    #[test]
    fn test_frame_slot_keeps_latest() {
        let (slot, receiver) = frame_slot();
        assert!(receiver.latest().is_none());

        slot.publish(frame(1));
        slot.publish(frame(2));
        slot.publish(frame(3));
        assert_eq!(receiver.latest(), Some(frame(3)));
        assert!(receiver.latest().is_none());

        slot.publish(frame(4));
        assert_eq!(receiver.latest(), Some(frame(4)));
    }

    #[test]
    fn test_frame_slot_across_threads() {
        let (slot, receiver) = frame_slot();
        let publisher = std::thread::spawn(move || {
            for i in 0..1000 {
                slot.publish(ScanFrame {
                    distances: vec![i; 100],
                    timestamp: i.into(),
                });
            }
        });

        let mut last = -1;
        while let Some(frame) = receiver.recv_timeout(Duration::from_millis(500)) {
            // Every frame arrives whole and in order.
            assert!(frame.distances.iter().all(|&d| i64::from(d) == frame.timestamp));
            assert!(frame.timestamp > last);
            last = frame.timestamp;
        }
        publisher.join().unwrap();
        assert_eq!(last, 999);
    }

    #[test]
    fn test_run_driver_fast() {
        let mode = CaptureMode::Fast {
            start: Some(200),
            stop: Some(210),
        };
        let (threads, receiver) = run_driver(device(), mode).unwrap();

        let frame = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(frame.timestamp, 42);
        assert_eq!(frame.distances.len(), 726);
        assert_eq!(frame.distances[200], 5);
        assert_eq!(frame.distances[199], -1);

        drop(threads);
    }

    #[test]
    fn test_run_driver_cold() {
        let mode = CaptureMode::Cold {
            start: Some(200),
            stop: Some(210),
        };
        let (threads, receiver) = run_driver(device(), mode).unwrap();

        let frame = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(frame.distances[210], 5);

        drop(threads);
    }

    #[test]
    fn test_run_driver_fast_reports_laser_failure() {
        let mock = MockTransport::urg_04lx().reply(b"BM\n", &[b"BM\n", b"01Q\n"]);
        let device = UrgDevice::with_transport(mock, ChecksumPolicy::Verify).unwrap();
        let mode = CaptureMode::Fast {
            start: None,
            stop: None,
        };
        assert!(matches!(
            run_driver(device, mode),
            Err(UrgError::ProtocolMismatch(_, _))
        ));
    }
}
