//! `.wxp` tile files.
//!
//! Layout (all little-endian):
//!
//! ```text
//! offset  size  field
//! 0       8     magic "WXPATCH1"
//! 8       4     width (u32)
//! 12      4     height (u32)
//! 16      4     channels (u32)
//! 20      8     west longitude of the left pixel edge (f64)
//! 28      8     north latitude of the top pixel edge (f64)
//! 36      8     degrees per pixel (f64)
//! 44      ...   width * height * channels f32 values, channel-last
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use wx_common::{GeoPoint, Patch, WxError, WxResult};

/// File magic.
pub const MAGIC: &[u8; 8] = b"WXPATCH1";

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 44;

/// Position of a tile on a regular lon/lat grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Georef {
    pub west: f64,
    pub north: f64,
    pub resolution: f64,
}

impl Georef {
    fn validate(&self) -> WxResult<()> {
        if !self.west.is_finite() || !self.north.is_finite() {
            return Err(WxError::PatchFormat(format!(
                "non-finite tile origin ({}, {})",
                self.west, self.north
            )));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(WxError::PatchFormat(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

/// A georeferenced multi-channel raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    georef: Georef,
    patch: Patch,
}

impl Tile {
    pub fn new(georef: Georef, patch: Patch) -> WxResult<Self> {
        georef.validate()?;
        Ok(Self { georef, patch })
    }

    pub fn georef(&self) -> &Georef {
        &self.georef
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Cut a `size x size` window centered on `point`.
    ///
    /// The center pixel is the one containing the point; the window starts
    /// `size / 2` pixels up and left of it. Windows that do not fit inside
    /// the tile are rejected rather than padded.
    pub fn extract_window(&self, point: GeoPoint, size: usize) -> WxResult<Patch> {
        let point = point.validated()?;
        let Georef {
            west,
            north,
            resolution,
        } = self.georef;
        let (width, height, channels) = self.patch.shape();

        let half = (size / 2) as i64;
        let col0 = ((point.lon - west) / resolution).floor() as i64 - half;
        let row0 = ((north - point.lat) / resolution).floor() as i64 - half;

        let fits = col0 >= 0
            && row0 >= 0
            && col0 as usize + size <= width
            && row0 as usize + size <= height;
        if !fits {
            return Err(WxError::out_of_bounds(
                format!("{}x{} at row {}, col {} around {}", size, size, row0, col0, point),
                format!("{}x{} from ({}, {})", width, height, west, north),
            ));
        }

        let (col0, row0) = (col0 as usize, row0 as usize);
        let row_len = size * channels;
        let src = self.patch.data();
        let mut data = Vec::with_capacity(size * row_len);
        for row in row0..row0 + size {
            let start = (row * width + col0) * channels;
            data.extend_from_slice(&src[start..start + row_len]);
        }
        Patch::new(size, size, channels, data)
    }
}

/// Serialize a tile.
pub fn encode_tile(tile: &Tile) -> Bytes {
    let (width, height, channels) = tile.patch.shape();
    let values = tile.patch.data();
    let mut buf = BytesMut::with_capacity(HEADER_LEN + values.len() * 4);
    buf.put_slice(MAGIC);
    buf.put_u32_le(width as u32);
    buf.put_u32_le(height as u32);
    buf.put_u32_le(channels as u32);
    buf.put_f64_le(tile.georef.west);
    buf.put_f64_le(tile.georef.north);
    buf.put_f64_le(tile.georef.resolution);
    for &v in values {
        buf.put_f32_le(v);
    }
    buf.freeze()
}

/// Parse a tile, validating magic, header and payload length.
pub fn decode_tile(data: &[u8]) -> WxResult<Tile> {
    if data.len() < HEADER_LEN {
        return Err(WxError::PatchFormat(format!(
            "file is {} bytes, shorter than the {} byte header",
            data.len(),
            HEADER_LEN
        )));
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(WxError::PatchFormat("bad magic".to_string()));
    }

    let mut buf = &data[MAGIC.len()..];
    let width = buf.get_u32_le() as usize;
    let height = buf.get_u32_le() as usize;
    let channels = buf.get_u32_le() as usize;
    let georef = Georef {
        west: buf.get_f64_le(),
        north: buf.get_f64_le(),
        resolution: buf.get_f64_le(),
    };

    let count = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| WxError::PatchFormat("dimensions overflow".to_string()))?;
    let byte_len = count
        .checked_mul(4)
        .ok_or_else(|| WxError::PatchFormat("dimensions overflow".to_string()))?;
    if buf.remaining() != byte_len {
        return Err(WxError::PatchFormat(format!(
            "expected {} bytes of data for {}x{}x{}, found {}",
            byte_len,
            width,
            height,
            channels,
            buf.remaining()
        )));
    }

    let mut values = Vec::with_capacity(count);
    while buf.has_remaining() {
        values.push(buf.get_f32_le());
    }
    Tile::new(georef, Patch::new(width, height, channels, values)?)
}

/// Read a tile file. A missing file is DataNotAvailable.
pub fn read_tile(path: &Path) -> WxResult<Tile> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => WxError::DataNotAvailable(path.display().to_string()),
        _ => WxError::Internal(format!("cannot read {}: {}", path.display(), e)),
    })?;
    decode_tile(&data)
}

/// Write a tile file, creating parent directories.
pub fn write_tile(path: &Path, tile: &Tile) -> WxResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encode_tile(tile))?;
    Ok(())
}
