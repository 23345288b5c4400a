//! Tests for archive and synthetic patch sources.

use chrono::{TimeZone, Utc};
use patch_source::{
    decode_tile, encode_tile, read_tile, write_tile, ArchiveSource, Georef, PatchSource,
    SyntheticSource, Tile,
};
use test_utils::{create_input_patch, create_label_patch, create_test_grid, temp_dir};
use wx_common::layout::{ELEVATION, INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::{GeoPoint, Patch, WxError};

/// A 10x10 single-channel tile covering lon -81..-80, lat 28..29 at 0.1 deg.
/// Cell value is `col * 1000 + row`.
fn grid_tile() -> Tile {
    let patch = Patch::new(10, 10, 1, create_test_grid(10, 10)).unwrap();
    Tile::new(
        Georef {
            west: -81.0,
            north: 29.0,
            resolution: 0.1,
        },
        patch,
    )
    .unwrap()
}

// ============================================================================
// Window extraction
// ============================================================================

#[test]
fn test_window_centered_on_point() {
    let tile = grid_tile();
    // (-80.45, 28.65) lies in col 5, row 3
    let window = tile.extract_window(GeoPoint::new(-80.45, 28.65), 4).unwrap();
    assert_eq!(window.shape(), (4, 4, 1));
    // Window starts 2 up and 2 left of the center pixel
    assert_eq!(window.get(0, 0, 0), 3001.0);
    assert_eq!(window.get(2, 2, 0), 5003.0);
    assert_eq!(window.get(3, 3, 0), 6004.0);
}

#[test]
fn test_window_odd_size() {
    let tile = grid_tile();
    let window = tile.extract_window(GeoPoint::new(-80.45, 28.65), 3).unwrap();
    // Odd sizes put the point pixel exactly in the middle
    assert_eq!(window.get(1, 1, 0), 5003.0);
}

#[test]
fn test_window_out_of_bounds() {
    let tile = grid_tile();
    // Point near the west edge: the window would start at col -3
    let err = tile.extract_window(GeoPoint::new(-80.95, 28.5), 6).unwrap_err();
    assert!(matches!(err, WxError::OutOfBounds { .. }));
    assert_eq!(err.http_status_code(), 400);

    // Point outside the tile entirely
    assert!(tile.extract_window(GeoPoint::new(-70.0, 28.5), 2).is_err());
    // Window larger than the tile
    assert!(tile.extract_window(GeoPoint::new(-80.5, 28.5), 11).is_err());
}

#[test]
fn test_window_whole_tile() {
    let tile = grid_tile();
    let window = tile.extract_window(GeoPoint::new(-80.45, 28.45), 10).unwrap();
    assert_eq!(window.data(), tile.patch().data());
}

// ============================================================================
// Tile files
// ============================================================================

#[test]
fn test_tile_file_preserves_contents() {
    let dir = temp_dir();
    let path = dir.path().join("nested").join("tile.wxp");
    let tile = Tile::new(
        Georef {
            west: -85.0,
            north: 32.0,
            resolution: 0.05,
        },
        create_label_patch(8, 3),
    )
    .unwrap();

    write_tile(&path, &tile).unwrap();
    assert_eq!(read_tile(&path).unwrap(), tile);
    assert_eq!(decode_tile(&encode_tile(&tile)).unwrap(), tile);
}

#[test]
fn test_read_missing_tile() {
    let dir = temp_dir();
    assert!(matches!(
        read_tile(&dir.path().join("absent.wxp")),
        Err(WxError::DataNotAvailable(_))
    ));
}

// ============================================================================
// Archive source
// ============================================================================

fn write_slot(root: &std::path::Path, slot: &str, inputs: Patch, labels: Patch) {
    let georef = Georef {
        west: -81.2,
        north: 29.5,
        resolution: 0.1,
    };
    write_tile(
        &root.join(slot).join("inputs.wxp"),
        &Tile::new(georef, inputs).unwrap(),
    )
    .unwrap();
    write_tile(
        &root.join(slot).join("labels.wxp"),
        &Tile::new(georef, labels).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_archive_reads_truncated_slot() {
    let dir = temp_dir();
    write_slot(
        dir.path(),
        "20200930T1800",
        create_input_patch(16),
        create_label_patch(16, 9),
    );
    let archive = ArchiveSource::new(dir.path());
    let point = GeoPoint::CAPE_CANAVERAL;
    let time = Utc.with_ymd_and_hms(2020, 9, 30, 19, 30, 0).unwrap();

    let inputs = archive.get_inputs_patch(time, point, 8).unwrap();
    assert_eq!(inputs.shape(), (8, 8, INPUT_CHANNELS));
    let labels = archive.get_labels_patch(time, point, 8).unwrap();
    assert_eq!(labels.shape(), (8, 8, LABEL_CHANNELS));
}

#[test]
fn test_archive_missing_slot() {
    let dir = temp_dir();
    let archive = ArchiveSource::new(dir.path());
    let time = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let err = archive
        .get_inputs_patch(time, GeoPoint::CAPE_CANAVERAL, 8)
        .unwrap_err();
    assert!(matches!(err, WxError::DataNotAvailable(_)));
    assert_eq!(err.http_status_code(), 404);
}

#[test]
fn test_archive_channel_mismatch() {
    let dir = temp_dir();
    // Labels tile stored with the inputs' channel count
    write_slot(
        dir.path(),
        "20200930T1800",
        create_input_patch(16),
        create_input_patch(16),
    );
    let archive = ArchiveSource::new(dir.path());
    let time = Utc.with_ymd_and_hms(2020, 9, 30, 18, 0, 0).unwrap();
    assert!(matches!(
        archive.get_labels_patch(time, GeoPoint::CAPE_CANAVERAL, 8),
        Err(WxError::ChannelMismatch { expected: 2, actual: 52 })
    ));
}

#[test]
fn test_archive_zero_patch_size() {
    let archive = ArchiveSource::new("/nonexistent");
    let time = Utc.with_ymd_and_hms(2020, 9, 30, 18, 0, 0).unwrap();
    assert!(matches!(
        archive.get_inputs_patch(time, GeoPoint::CAPE_CANAVERAL, 0),
        Err(WxError::InvalidParameter { .. })
    ));
}

// ============================================================================
// Synthetic source
// ============================================================================

#[test]
fn test_synthetic_is_deterministic() {
    let src = SyntheticSource::default();
    let time = Utc.with_ymd_and_hms(2020, 9, 30, 18, 0, 0).unwrap();
    let point = GeoPoint::CAPE_CANAVERAL;
    assert_eq!(
        src.get_inputs_patch(time, point, 12).unwrap(),
        src.get_inputs_patch(time, point, 12).unwrap()
    );
}

#[test]
fn test_synthetic_value_ranges() {
    let src = SyntheticSource::new(7);
    let time = Utc.with_ymd_and_hms(2020, 5, 10, 6, 0, 0).unwrap();
    let inputs = src.get_inputs_patch(time, GeoPoint::CAPE_CANAVERAL, 16).unwrap();
    assert_eq!(inputs.shape(), (16, 16, INPUT_CHANNELS));

    for ch in 0..3 {
        assert!(inputs.channel(ch).unwrap().iter().all(|v| (0.0..=20.0).contains(v)));
    }
    for ch in 3..51 {
        assert!(inputs.channel(ch).unwrap().iter().all(|v| (0.0..=3000.0).contains(v)));
    }
    assert!(inputs
        .channel(ELEVATION)
        .unwrap()
        .iter()
        .all(|v| (0.0..=100.0).contains(v)));

    let labels = src.get_labels_patch(time, GeoPoint::CAPE_CANAVERAL, 16).unwrap();
    assert_eq!(labels.shape(), (16, 16, LABEL_CHANNELS));
    assert!(labels.data().iter().any(|v| *v > 0.0));
}
