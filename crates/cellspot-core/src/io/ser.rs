use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::{CellspotError, Result};
use crate::frame::{Frame, FrameMetadata, SourceInfo, SourceKind};

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

const COLOR_ID_RGB: i32 = 100;
const COLOR_ID_BGR: i32 = 101;

/// Fields of the 178-byte SER header this reader uses.
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
}

impl SerHeader {
    fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    fn planes(&self) -> usize {
        match self.color_id {
            COLOR_ID_RGB | COLOR_ID_BGR => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, `None` on overflow.
    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_sample() * self.planes())
    }
}

/// Memory-mapped reader for SER videos, decoding frames to 8-bit gray.
///
/// Mono and raw Bayer data are read as a single plane; RGB/BGR frames are
/// reduced to BT.601 luminance. Samples deeper than 8 bits are shifted down
/// by `pixel_depth - 8`.
pub struct SerReader {
    mmap: Mmap,
    frame_size: usize,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and the file is not expected to
        // be truncated while the reader is alive.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(CellspotError::InvalidSer("File too small for SER header".into()));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(CellspotError::InvalidSer("Missing LUCAM-RECORDER magic".into()));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        if header.pixel_depth == 0 || header.pixel_depth > 16 {
            return Err(CellspotError::InvalidSer(format!(
                "Unsupported pixel depth {}",
                header.pixel_depth
            )));
        }

        let frame_size = header
            .frame_byte_size()
            .ok_or_else(|| CellspotError::InvalidSer("Frame size overflows".into()))?;
        let expected = frame_size
            .checked_mul(header.frame_count as usize)
            .and_then(|v| v.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| CellspotError::InvalidSer("File size overflows".into()))?;
        if mmap.len() < expected {
            return Err(CellspotError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            frame_size,
            header,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let total = self.frame_count();
        if index >= total {
            return Err(CellspotError::FrameIndexOutOfRange { index, total });
        }
        let offset = SER_HEADER_SIZE + index * self.frame_size;
        Ok(&self.mmap[offset..offset + self.frame_size])
    }

    /// Read and decode one frame.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;

        let data = match self.header.color_id {
            COLOR_ID_RGB => self.decode_luminance(raw, h, w, [0, 1, 2]),
            COLOR_ID_BGR => self.decode_luminance(raw, h, w, [2, 1, 0]),
            _ => Array2::from_shape_fn((h, w), |(row, col)| self.sample(raw, row * w + col)),
        };

        Ok(Frame {
            data,
            metadata: FrameMetadata {
                frame_index: index,
                timestamp_us: self.read_timestamp(index),
            },
        })
    }

    /// 8-bit value of the sample at position `i` of the raw buffer.
    fn sample(&self, raw: &[u8], i: usize) -> u8 {
        if self.header.bytes_per_sample() == 1 {
            return raw[i];
        }
        let pair = [raw[2 * i], raw[2 * i + 1]];
        let value = if self.header.little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        };
        (value >> (self.header.pixel_depth - 8)).min(255) as u8
    }

    /// `order` gives the plane index of red, green and blue.
    fn decode_luminance(&self, raw: &[u8], h: usize, w: usize, order: [usize; 3]) -> Array2<u8> {
        Array2::from_shape_fn((h, w), |(row, col)| {
            let base = (row * w + col) * 3;
            let r = self.sample(raw, base + order[0]) as f32;
            let g = self.sample(raw, base + order[1]) as f32;
            let b = self.sample(raw, base + order[2]) as f32;
            (LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b)
                .round()
                .clamp(0.0, 255.0) as u8
        })
    }

    /// Per-frame timestamp from the optional trailer.
    fn read_timestamp(&self, index: usize) -> Option<u64> {
        let trailer = SER_HEADER_SIZE + self.frame_size * self.frame_count();
        let offset = trailer + index * 8;
        let bytes = self.mmap.get(offset..offset + 8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            path: path.to_path_buf(),
            kind: SourceKind::Ser {
                color_id: self.header.color_id,
                bit_depth: self.header.pixel_depth as u8,
            },
            total_frames: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
        }
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]);

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    if width == 0 || height == 0 {
        return Err(CellspotError::InvalidDimensions { width, height });
    }

    // Most capture software writes 0 here for little-endian data.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
    })
}
