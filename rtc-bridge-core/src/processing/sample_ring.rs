/// Circular buffer of interleaved f32 samples.
///
/// Overflow overwrites the oldest samples; the write reports how many were
/// lost so the owner can flag an overrun. Wrap in `parking_lot::Mutex` for
/// cross-thread access.
#[derive(Debug)]
pub struct SampleRing {
    buffer: Vec<f32>,
    write_index: usize,
    read_index: usize,
    available: usize,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            write_index: 0,
            read_index: 0,
            available: 0,
            capacity,
        }
    }

    /// Append samples, overwriting oldest-first on overflow.
    ///
    /// Returns the number of samples lost (overwritten or skipped). If
    /// `samples` exceeds capacity outright, only the tail is kept.
    pub fn write(&mut self, samples: &[f32]) -> usize {
        if samples.is_empty() {
            return 0;
        }
        if self.capacity == 0 {
            return samples.len();
        }

        let mut lost = 0;
        let samples = if samples.len() > self.capacity {
            lost += samples.len() - self.capacity;
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        let overflow = (self.available + samples.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % self.capacity;
            self.available -= overflow;
            lost += overflow;
        }

        for &sample in samples {
            self.buffer[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % self.capacity;
        }
        self.available += samples.len();
        lost
    }

    /// Read and remove up to `count` samples, oldest first.
    pub fn read(&mut self, count: usize) -> Vec<f32> {
        let to_read = count.min(self.available);
        if to_read == 0 {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(to_read);
        for i in 0..to_read {
            result.push(self.buffer[(self.read_index + i) % self.capacity]);
        }
        self.read_index = (self.read_index + to_read) % self.capacity;
        self.available -= to_read;
        result
    }

    /// Samples currently available for reading.
    pub fn count(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard contents and resize the buffer. Used when the native audio
    /// format changes.
    pub fn reset_with_capacity(&mut self, capacity: usize) {
        self.buffer = vec![0.0; capacity];
        self.capacity = capacity;
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
    }
}
