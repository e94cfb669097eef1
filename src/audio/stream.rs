// Sample stream - bounded buffer between the emulation and playback threads
//
// The producer side (`StreamBuffer`) lives inside the APU and appends one
// sample at a time. The consumer side (`StreamReader`) is handed to the
// playback backend and drains everything available in one call.
//
// Drop policy: when the buffer is full and the consumer has not advanced
// since the last compaction, `append` fails and the sample is discarded.
// The producer never waits on the consumer and the consumer never waits on
// the producer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// State guarded by the stream mutex
#[derive(Debug)]
struct Shared {
    /// Samples in arrival order; everything before `offset` has been read
    samples: Vec<i16>,
    /// Read offset (offset <= samples.len() <= capacity)
    offset: usize,
    /// Maximum number of samples held
    capacity: usize,
    /// Samples rejected because the buffer was full
    dropped: u64,
    /// Whether the last append was rejected
    dropping: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A panicking consumer must not take the producer down with it
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Producer side of the sample stream
#[derive(Debug)]
pub struct StreamBuffer {
    shared: Arc<Mutex<Shared>>,
    sample_rate: u32,
    channels: u16,
}

impl StreamBuffer {
    /// Create a new stream buffer
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of buffered samples
    /// * `sample_rate` - Sample rate of the stream in Hz
    /// * `channels` - Interleaved channel count of the stream
    pub fn new(capacity: usize, sample_rate: u32, channels: u16) -> Self {
        let shared = Shared {
            samples: Vec::with_capacity(capacity),
            offset: 0,
            capacity,
            dropped: 0,
            dropping: false,
        };

        Self {
            shared: Arc::new(Mutex::new(shared)),
            sample_rate,
            channels,
        }
    }

    /// Append one sample
    ///
    /// Returns false (and counts a dropped sample) when the buffer is full
    /// and nothing has been consumed since the last compaction.
    pub fn append(&self, sample: i16) -> bool {
        let mut shared = lock(&self.shared);

        if shared.samples.len() >= shared.capacity {
            if shared.offset == 0 {
                shared.dropped += 1;
                if !shared.dropping {
                    shared.dropping = true;
                    log::debug!("Stream buffer full, dropping samples");
                }
                return false;
            }

            let consumed = shared.offset;
            shared.samples.drain(..consumed);
            shared.offset = 0;
            log::debug!(
                "Stream buffer compacted ({} consumed samples reclaimed)",
                consumed
            );
        }

        if shared.dropping {
            shared.dropping = false;
            log::debug!("Stream buffer accepting samples again");
        }

        shared.samples.push(sample);
        true
    }

    /// Create a consumer handle for this stream
    pub fn reader(&self) -> StreamReader {
        StreamReader {
            shared: Arc::clone(&self.shared),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Number of samples not yet pulled by the consumer
    pub fn available(&self) -> usize {
        let shared = lock(&self.shared);
        shared.samples.len() - shared.offset
    }

    /// Total number of samples rejected so far
    pub fn dropped(&self) -> u64 {
        lock(&self.shared).dropped
    }

    pub fn capacity(&self) -> usize {
        lock(&self.shared).capacity
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

/// Consumer side of the sample stream
///
/// Cheap to clone; all clones share the same read offset.
#[derive(Debug, Clone)]
pub struct StreamReader {
    shared: Arc<Mutex<Shared>>,
    sample_rate: u32,
    channels: u16,
}

impl StreamReader {
    /// Take every sample that has not been read yet
    ///
    /// Returns `None` when the consumer has caught up with the producer.
    pub fn pull(&self) -> Option<Vec<i16>> {
        let mut shared = lock(&self.shared);

        if shared.offset >= shared.samples.len() {
            log::trace!("Stream pull found no data");
            return None;
        }

        let samples = shared.samples[shared.offset..].to_vec();
        shared.offset += samples.len();
        Some(samples)
    }

    /// Move the read cursor to a time position within the buffered samples
    ///
    /// The position is clamped to the samples currently held.
    pub fn seek(&self, position: Duration) {
        let mut shared = lock(&self.shared);

        let offset = position.as_millis() * self.sample_rate as u128 * self.channels as u128 / 1000;
        let offset = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(shared.samples.len());

        log::debug!("Stream seek to {:?} (offset {})", position, offset);
        shared.offset = offset;
    }

    /// Number of samples not yet pulled
    pub fn available(&self) -> usize {
        let shared = lock(&self.shared);
        shared.samples.len() - shared.offset
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
