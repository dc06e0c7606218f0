mod common;

use std::fs;

use ndarray::Array2;

use cellspot_core::detection::{BoundingBox, FrameResult};
use cellspot_core::error::CellspotError;
use cellspot_core::frame::{Frame, Mask, SourceKind};
use cellspot_core::io::image_io::{load_frame, save_gray, save_mask};
use cellspot_core::io::overlay::draw_detections;
use cellspot_core::io::report::{format_boxes, write_frame_outputs, write_mask_output};
use cellspot_core::io::ser::SerReader;
use cellspot_core::io::{BoxFormat, FrameSource, OutputLayout};

use common::{build_ser_header, build_ser_with_frames, disk_mask, mask, write_temp_file};

fn sample_result() -> FrameResult {
    FrameResult {
        boxes: vec![BoundingBox {
            x: 20,
            y: 15,
            width: 8,
            height: 6,
        }],
    }
}

// ---------------------------------------------------------------------------
// SER
// ---------------------------------------------------------------------------

#[test]
fn test_ser_mono_8bit() {
    let frames = vec![vec![10u8; 12], (0..12).collect::<Vec<u8>>()];
    let data = build_ser_with_frames(4, 3, &frames);
    let file = write_temp_file(&data, ".ser");

    let reader = SerReader::open(file.path()).unwrap();
    assert_eq!(reader.frame_count(), 2);
    let frame = reader.read_frame(1).unwrap();
    assert_eq!(frame.data.dim(), (3, 4));
    assert_eq!(frame.data[[1, 2]], 6);
    assert_eq!(frame.metadata.frame_index, 1);
    assert_eq!(frame.metadata.timestamp_us, None);
}

#[test]
fn test_ser_16bit_is_scaled_down() {
    let mut data = build_ser_header(2, 1, 12, 1, 0);
    for value in [4095u16, 256] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    let file = write_temp_file(&data, ".ser");
    let frame = SerReader::open(file.path()).unwrap().read_frame(0).unwrap();
    assert_eq!(frame.data[[0, 0]], 255);
    assert_eq!(frame.data[[0, 1]], 16);
}

#[test]
fn test_ser_rgb_to_luminance() {
    let mut data = build_ser_header(2, 1, 8, 1, 100);
    data.extend_from_slice(&[200, 200, 200, 0, 0, 0]);
    let file = write_temp_file(&data, ".ser");
    let frame = SerReader::open(file.path()).unwrap().read_frame(0).unwrap();
    assert_eq!(frame.data[[0, 0]], 200);
    assert_eq!(frame.data[[0, 1]], 0);
}

#[test]
fn test_ser_rejects_bad_files() {
    let file = write_temp_file(b"not a ser file", ".ser");
    assert!(matches!(
        SerReader::open(file.path()),
        Err(CellspotError::InvalidSer(_))
    ));

    // Header promises two frames, data holds one.
    let mut data = build_ser_header(4, 4, 8, 2, 0);
    data.extend_from_slice(&[0u8; 16]);
    let file = write_temp_file(&data, ".ser");
    assert!(matches!(
        SerReader::open(file.path()),
        Err(CellspotError::InvalidSer(_))
    ));

    let data = build_ser_with_frames(2, 2, &[vec![0u8; 4]]);
    let file = write_temp_file(&data, ".ser");
    let reader = SerReader::open(file.path()).unwrap();
    assert!(matches!(
        reader.read_frame(1),
        Err(CellspotError::FrameIndexOutOfRange { index: 1, total: 1 })
    ));
}

// ---------------------------------------------------------------------------
// Frame sources
// ---------------------------------------------------------------------------

#[test]
fn test_frame_source_ser_range() {
    let frames: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i * 10; 6]).collect();
    let data = build_ser_with_frames(3, 2, &frames);
    let file = write_temp_file(&data, ".ser");

    let source = FrameSource::open(file.path()).unwrap();
    assert_eq!(source.frame_count(), 5);
    let info = source.info().unwrap();
    assert_eq!((info.width, info.height, info.total_frames), (3, 2, 5));
    assert!(matches!(info.kind, SourceKind::Ser { bit_depth: 8, .. }));

    let range = source.read_range(1, Some(3)).unwrap();
    assert_eq!(range.len(), 2);
    assert_eq!(range[0].data[[0, 0]], 10);
    assert_eq!(range[1].metadata.frame_index, 2);

    assert_eq!(source.read_range(3, None).unwrap().len(), 2);
    assert_eq!(source.read_range(4, Some(100)).unwrap().len(), 1);
    assert!(matches!(
        source.read_range(5, None),
        Err(CellspotError::FrameIndexOutOfRange { index: 5, total: 5 })
    ));
    assert!(matches!(
        source.read_range(2, Some(2)),
        Err(CellspotError::EmptySequence)
    ));
}

#[test]
fn test_frame_source_image_directory() {
    let dir = tempfile::tempdir().unwrap();
    for (name, value) in [("b.png", 20u8), ("a.png", 10), ("c.png", 30)] {
        save_gray(&Array2::from_elem((4, 6), value), &dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let source = FrameSource::open(dir.path()).unwrap();
    assert_eq!(source.frame_count(), 3);
    let info = source.info().unwrap();
    assert_eq!(info.kind, SourceKind::ImageSequence);
    assert_eq!((info.width, info.height), (6, 4));

    let frames = source.read_range(0, None).unwrap();
    let firsts: Vec<u8> = frames.iter().map(|f| f.data[[0, 0]]).collect();
    assert_eq!(firsts, vec![10, 20, 30]);
}

#[test]
fn test_frame_source_rejects_unknown_inputs() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        FrameSource::open(dir.path()),
        Err(CellspotError::EmptySequence)
    ));

    let file = write_temp_file(b"data", ".xyz");
    assert!(matches!(
        FrameSource::open(file.path()),
        Err(CellspotError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_image_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.tif");
    let data = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as u8);
    save_gray(&data, &path).unwrap();
    let frame = load_frame(&path, 3).unwrap();
    assert_eq!(frame.data, data);
    assert_eq!(frame.metadata.frame_index, 3);
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[test]
fn test_output_layout_names() {
    let layout = OutputLayout::new(std::path::Path::new("out/run.avi"));
    assert_eq!(
        layout.annotated_path(12),
        std::path::Path::new("out/run_frame_12.tif")
    );
    assert_eq!(
        layout.boxes_path(12, BoxFormat::Text),
        std::path::Path::new("out/run_frame_12.txt")
    );
    assert_eq!(
        layout.boxes_path(0, BoxFormat::Json),
        std::path::Path::new("out/run_frame_0.json")
    );
    assert_eq!(layout.mask_path(3), std::path::Path::new("out/run_mask_3.png"));
}

#[test]
fn test_write_frame_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(&dir.path().join("nested/cells.avi"));
    layout.prepare().unwrap();

    let frame = Frame::new(Array2::zeros((40, 50)));
    let result = sample_result();
    write_frame_outputs(&layout, 7, &frame, &result, 1, BoxFormat::Text).unwrap();

    let text = fs::read_to_string(layout.boxes_path(7, BoxFormat::Text)).unwrap();
    assert_eq!(text, "{0: {'x': 20, 'y': 15, 'width': 8, 'height': 6}}\n");

    let annotated = load_frame(&layout.annotated_path(7), 7).unwrap();
    assert_eq!(annotated.data.dim(), (40, 50));
    assert_eq!(annotated.data[[15, 20]], 255);
    assert_eq!(annotated.data[[18, 24]], 0);
}

#[test]
fn test_overlay_of_downsampled_boxes_uses_frame_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(&dir.path().join("cells"));
    let frame = Frame::new(Array2::zeros((40, 50)));
    let result = FrameResult {
        boxes: vec![BoundingBox {
            x: 10,
            y: 8,
            width: 4,
            height: 3,
        }],
    };
    write_frame_outputs(&layout, 0, &frame, &result, 2, BoxFormat::Text).unwrap();

    // The box file stays on the mask grid.
    let text = fs::read_to_string(layout.boxes_path(0, BoxFormat::Text)).unwrap();
    assert_eq!(text, "{0: {'x': 10, 'y': 8, 'width': 4, 'height': 3}}\n");

    let annotated = load_frame(&layout.annotated_path(0), 0).unwrap();
    assert_eq!(annotated.data[[16, 20]], 255);
    assert_eq!(annotated.data[[22, 28]], 255);
    assert_eq!(annotated.data[[8, 10]], 0);
}

#[test]
fn test_json_box_file() {
    let text = format_boxes(&sample_result(), BoxFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["0"]["x"], 20);
    assert_eq!(value["0"]["height"], 6);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_write_mask_output() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(&dir.path().join("cells"));
    let m = mask(disk_mask(12, 12, &[(6, 6, 3)]));
    write_mask_output(&layout, 2, &m).unwrap();

    let saved = load_frame(&layout.mask_path(2), 0).unwrap();
    assert_eq!(saved.data[[6, 6]], 255);
    assert_eq!(saved.data[[0, 0]], 0);

    save_mask(&m, &dir.path().join("direct.png")).unwrap();
    let direct = load_frame(&dir.path().join("direct.png"), 0).unwrap();
    assert_eq!(direct.data, saved.data);
}

#[test]
fn test_downsampled_mask_written_at_frame_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(&dir.path().join("cells"));
    let mut data = Array2::from_elem((3, 4), false);
    data[[1, 2]] = true;
    let m = Mask {
        data,
        scale: 2,
        source_dim: (5, 7),
    };
    write_mask_output(&layout, 0, &m).unwrap();

    let saved = load_frame(&layout.mask_path(0), 0).unwrap();
    assert_eq!(saved.data.dim(), (5, 7));
    assert_eq!(saved.data[[2, 4]], 255);
    assert_eq!(saved.data[[3, 5]], 255);
    assert_eq!(saved.data[[2, 3]], 0);
}

#[test]
fn test_overlay_draws_outline_and_label() {
    let frame = Array2::<u8>::zeros((40, 50));
    let out = draw_detections(&frame, &sample_result());

    // Two-pixel outline from (20, 15) to (28, 21).
    assert_eq!(out[[15, 20]], 255);
    assert_eq!(out[[16, 24]], 255);
    assert_eq!(out[[21, 28]], 255);
    assert_eq!(out[[18, 23]], 0);
    // Digit "0" sits above the box, bottom row at y - 10.
    assert_eq!(out[[5, 20]], 255);
    assert_eq!(out[[4, 21]], 0);
    // Input untouched.
    assert!(frame.iter().all(|&v| v == 0));
}
