//! GeoTIFF tile decoding.

use std::io::Cursor;

use caudata_geo::transform::TileId;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::{Result, SourceError};

/// GDAL_NODATA private tag
const GDAL_NODATA_TAG: u16 = 42113;

/// Values at or below this are voids in the terrain tiles
const VOID_FLOOR: f32 = -32_767.0;

/// Elevation samples of one tile, row-major from the north-west
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTile {
    pub width: usize,
    pub height: usize,
    pub values: Vec<Option<f32>>,
}

fn tile_label(tile: &TileId) -> String {
    format!("{}/{}/{}", tile.z, tile.x, tile.y)
}

/// Decode a single-band GeoTIFF
pub fn decode_tile(bytes: &[u8], tile: &TileId) -> Result<DecodedTile> {
    let tiff_err = |e: tiff::TiffError| SourceError::Tiff { tile: tile_label(tile), reason: e.to_string() };

    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(tiff_err)?;
    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    let nodata: Option<f32> = decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG))
        .ok()
        .and_then(|s| s.trim().trim_end_matches('\0').parse().ok());

    let samples: Vec<f32> = match decoder.read_image().map_err(tiff_err)? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    };

    let (width, height) = (width as usize, height as usize);
    if samples.len() != width * height {
        return Err(SourceError::Tiff {
            tile: tile_label(tile),
            reason: format!("expected one band of {} samples, found {}", width * height, samples.len()),
        });
    }

    let values = samples
        .into_iter()
        .map(|v| {
            let void = !v.is_finite() || v <= VOID_FLOOR || Some(v) == nodata;
            (!void).then_some(v)
        })
        .collect();

    Ok(DecodedTile { width, height, values })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_decode_float_tile() {
        let data: Vec<f32> = (0..16).map(|v| v as f32 * 10.0).collect();
        let tile = decode_tile(&encode_f32(4, 4, &data), &TileId::new(6, 10, 24)).unwrap();

        assert_eq!((tile.width, tile.height), (4, 4));
        assert_eq!(tile.values[0], Some(0.0));
        assert_eq!(tile.values[15], Some(150.0));
    }

    #[test]
    fn test_voids_become_nodata() {
        let data = [100i16, -32768, 250, 3];
        let tile = decode_tile(&encode_i16(2, 2, &data), &TileId::new(6, 10, 24)).unwrap();
        assert_eq!(tile.values, vec![Some(100.0), None, Some(250.0), Some(3.0)]);
    }

    #[test]
    fn test_garbage_is_an_error() {
        let result = decode_tile(b"<html>not a tiff</html>", &TileId::new(6, 10, 24));
        match result {
            Err(SourceError::Tiff { tile, .. }) => assert_eq!(tile, "6/10/24"),
            other => panic!("Expected Tiff error, got {:?}", other),
        }
    }
}
