//! Scripted `Transport` for exercising the protocol without hardware.

use crate::codec::{checksum, encode_value};
use crate::error::UrgError;
use crate::transport::Transport;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// What the driver did to a `MockTransport`, readable after the transport moved.
#[derive(Debug, Default)]
pub(crate) struct MockRecord {
    pub(crate) sent: Vec<Vec<u8>>,
    pub(crate) n_flushes: usize,
    pub(crate) closed: bool,
}

impl MockRecord {
    pub(crate) fn count_sent(&self, request: &[u8]) -> usize {
        self.sent.iter().filter(|s| s.as_slice() == request).count()
    }
}

/// Replies to each known request with a fixed list of lines.
///
/// Every reply is followed by the empty terminator line. A request without
/// a scripted reply gets no answer, so the next `read_line` times out.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    replies: HashMap<Vec<u8>, Vec<Vec<u8>>>,
    once: HashMap<Vec<u8>, VecDeque<Vec<Vec<u8>>>>,
    pending: VecDeque<Vec<u8>>,
    record: Arc<Mutex<MockRecord>>,
}

impl MockTransport {
    pub(crate) fn new() -> MockTransport {
        MockTransport::default()
    }

    pub(crate) fn reply(mut self, request: &[u8], lines: &[&[u8]]) -> MockTransport {
        self.replies.insert(request.to_vec(), terminated(lines));
        self
    }

    /// A reply used once, ahead of the one set by `reply`.
    pub(crate) fn reply_once(mut self, request: &[u8], lines: &[&[u8]]) -> MockTransport {
        self.once
            .entry(request.to_vec())
            .or_default()
            .push_back(terminated(lines));
        self
    }

    /// A device answering the connect handshake like an URG-04LX.
    pub(crate) fn urg_04lx() -> MockTransport {
        MockTransport::new()
            .reply(b"SCIP2.0\n", &[b"SCIP2.0\n", b"0Ee\n"])
            .reply(
                b"PP\n",
                &[
                    b"PP\n",
                    b"00P\n",
                    b"MODL:URG-04LX(Hokuyo Automatic Co.,Ltd.);?\n",
                    b"DMIN:20;4\n",
                    b"DMAX:5600;_\n",
                    b"ARES:1024;\\\n",
                    b"AMIN:44;7\n",
                    b"AMAX:725;o\n",
                    b"AFRT:384;6\n",
                    b"SCAN:600;e\n",
                ],
            )
            .reply(b"BM\n", &[b"BM\n", b"00P\n"])
            .reply(b"QT\n", &[b"QT\n", b"00P\n"])
    }

    pub(crate) fn record(&self) -> Arc<Mutex<MockRecord>> {
        Arc::clone(&self.record)
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    pub(crate) fn count_sent(&self, request: &[u8]) -> usize {
        self.lock().count_sent(request)
    }

    pub(crate) fn n_flushes(&self) -> usize {
        self.lock().n_flushes
    }

    fn lock(&self) -> MutexGuard<'_, MockRecord> {
        self.record.lock().unwrap()
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), UrgError> {
        let mut record = self.lock();
        if record.closed {
            return Err(UrgError::NotConnected());
        }
        record.sent.push(bytes.to_vec());
        drop(record);
        if let Some(block) = self.once.get_mut(bytes).and_then(VecDeque::pop_front) {
            self.pending.extend(block);
        } else if let Some(block) = self.replies.get(bytes) {
            self.pending.extend(block.iter().cloned());
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Vec<u8>, UrgError> {
        Ok(self.pending.pop_front().unwrap_or_default())
    }

    fn flush_input(&mut self) -> Result<(), UrgError> {
        self.lock().n_flushes += 1;
        self.pending.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<(), UrgError> {
        self.lock().closed = true;
        Ok(())
    }
}

fn terminated(lines: &[&[u8]]) -> Vec<Vec<u8>> {
    let mut block: Vec<Vec<u8>> = lines.iter().map(|l| l.to_vec()).collect();
    block.push(b"\n".to_vec());
    block
}

/// `payload` followed by its checksum character and the terminator.
pub(crate) fn data_line(payload: &[u8]) -> Vec<u8> {
    let mut line = payload.to_vec();
    line.push(checksum(payload));
    line.push(b'\n');
    line
}

pub(crate) fn timestamp_line(timestamp: u32) -> Vec<u8> {
    data_line(&encode_value(timestamp, 4))
}

/// Payload lines of 64 characters, as the device splits them.
pub(crate) fn payload_lines(values: &[u32], width: usize) -> Vec<Vec<u8>> {
    let encoded: Vec<u8> = values
        .iter()
        .flat_map(|&v| encode_value(v, width))
        .collect();
    encoded.chunks(64).map(data_line).collect()
}
