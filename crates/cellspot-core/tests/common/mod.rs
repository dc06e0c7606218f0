#![allow(dead_code)]

use ndarray::Array2;

use cellspot_core::frame::{Frame, Mask};
use cellspot_core::io::ser::SER_HEADER_SIZE;

/// Mask with filled disks `(center_row, center_col, radius)`; a pixel is
/// inside when `dr^2 + dc^2 <= radius^2`.
pub fn disk_mask(h: usize, w: usize, disks: &[(usize, usize, usize)]) -> Array2<bool> {
    Array2::from_shape_fn((h, w), |(row, col)| {
        disks.iter().any(|&(cr, cc, r)| {
            let dr = row.abs_diff(cr);
            let dc = col.abs_diff(cc);
            dr * dr + dc * dc <= r * r
        })
    })
}

/// Full-resolution mask wrapper.
pub fn mask(data: Array2<bool>) -> Mask {
    Mask::new(data)
}

/// Gray frame with `foreground` disks on a uniform `background`.
pub fn disk_frame(
    h: usize,
    w: usize,
    disks: &[(usize, usize, usize)],
    background: u8,
    foreground: u8,
) -> Frame {
    let shape = disk_mask(h, w, disks);
    Frame::new(shape.mapv(|fg| if fg { foreground } else { background }))
}

/// Distance-like field of cones `(row, col, height)`: each cone falls off by
/// one per pixel of Euclidean distance and is clipped at zero.
pub fn cone_field(h: usize, w: usize, apexes: &[(usize, usize, f32)]) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(row, col)| {
        apexes
            .iter()
            .map(|&(r, c, height)| {
                let dr = row as f32 - r as f32;
                let dc = col as f32 - c as f32;
                (height - (dr * dr + dc * dc).sqrt()).max(0.0)
            })
            .fold(0.0f32, f32::max)
    })
}

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 100=RGB, 101=BGR
pub fn build_ser_header(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    buf.extend_from_slice(b"LUCAM-RECORDER");
    buf.extend_from_slice(&0i32.to_le_bytes()); // LuID
    buf.extend_from_slice(&color_id.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes()); // LittleEndian
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    buf.extend_from_slice(&[0u8; 40]); // Observer
    buf.extend_from_slice(&[0u8; 40]); // Instrument
    buf.extend_from_slice(&[0u8; 40]); // Telescope
    buf.extend_from_slice(&0u64.to_le_bytes()); // DateTime
    buf.extend_from_slice(&0u64.to_le_bytes()); // DateTimeUTC

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete mono 8-bit SER file with the given frames.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, 8, frames.len(), 0);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Write bytes to a temporary file that lives as long as the handle.
pub fn write_temp_file(data: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}
