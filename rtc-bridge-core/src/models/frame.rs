/// One plane of a raw video frame as delivered by the native engine.
///
/// `stride` is the byte distance between the starts of consecutive rows and
/// may exceed `row_bytes` when the engine pads rows for alignment. Consumers
/// must walk rows by `stride`; a flat copy of `data` is incorrect.
#[derive(Debug, Clone, Copy)]
pub struct FramePlane<'a> {
    pub data: &'a [u8],
    pub stride: usize,
    /// Tightly-packed bytes per row.
    pub row_bytes: usize,
    pub rows: usize,
}

/// Borrowed descriptor of a raw video frame (Y/U/V planes, optional alpha,
/// or a single interleaved plane). Valid only for the duration of the
/// native callback that delivered it.
#[derive(Debug, Clone)]
pub struct VideoFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub planes: Vec<FramePlane<'a>>,
}

impl VideoFrame<'_> {
    /// Bytes required to hold this frame tightly packed (no row padding).
    pub fn packed_size(&self) -> usize {
        self.planes.iter().map(|p| p.row_bytes * p.rows).sum()
    }
}

/// Location of one plane inside a `FrameStorage` buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub offset: usize,
    pub row_bytes: usize,
    pub rows: usize,
}

/// Reusable owned buffer holding one video frame's pixel data.
///
/// Capacity only grows across reuse, never shrinks, so a storage recycled
/// through the pool can absorb any frame no larger than the biggest one it
/// has held. At any instant a storage belongs to exactly one of: the
/// pending-delivery queue, the recycle pool, or the application.
#[derive(Debug, Default)]
pub struct FrameStorage {
    data: Vec<u8>,
    len: usize,
    width: u32,
    height: u32,
    planes: Vec<PlaneLayout>,
}

impl FrameStorage {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
            width: 0,
            height: 0,
            planes: Vec::new(),
        }
    }

    /// Grow the backing buffer to at least `capacity` bytes. Never shrinks.
    pub(crate) fn ensure_capacity(&mut self, capacity: usize) {
        if self.data.len() < capacity {
            self.data.resize(capacity, 0);
        }
    }

    /// Copy a frame's planes row by row, honoring the source stride.
    /// The stored layout is tightly packed.
    pub(crate) fn copy_from(&mut self, frame: &VideoFrame<'_>) {
        let size = frame.packed_size();
        self.ensure_capacity(size);
        self.width = frame.width;
        self.height = frame.height;
        self.len = size;
        self.planes.clear();

        let mut offset = 0;
        for plane in &frame.planes {
            self.planes.push(PlaneLayout {
                offset,
                row_bytes: plane.row_bytes,
                rows: plane.rows,
            });
            for row in 0..plane.rows {
                let src_start = row * plane.stride;
                let src = &plane.data[src_start..src_start + plane.row_bytes];
                self.data[offset..offset + plane.row_bytes].copy_from_slice(src);
                offset += plane.row_bytes;
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed frame bytes, all planes concatenated.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn plane_layout(&self, index: usize) -> Option<PlaneLayout> {
        self.planes.get(index).copied()
    }

    /// Bytes of one plane, tightly packed.
    pub fn plane_bytes(&self, index: usize) -> Option<&[u8]> {
        let layout = self.planes.get(index)?;
        Some(&self.data[layout.offset..layout.offset + layout.row_bytes * layout.rows])
    }

    /// Current backing-buffer size in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}
