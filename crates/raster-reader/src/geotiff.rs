//! GeoTIFF reader for single-band rasters.
//!
//! Georeferencing comes from either the `ModelPixelScale` + `ModelTiepoint`
//! pair or a `ModelTransformation` matrix without rotation terms. The no-data
//! value, when present, is read from GDAL's private `GDAL_NODATA` ASCII tag.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use globe_common::{BoundingBox, Resolution};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

use crate::error::{RasterError, RasterResult};
use crate::source::RasterSource;
use crate::RasterReader;

/// Reads band 1 of a GeoTIFF file.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoTiffReader;

impl GeoTiffReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode a GeoTIFF from any seekable reader.
    pub fn read_from<R: Read + Seek>(&self, reader: R, name: &str) -> RasterResult<RasterSource> {
        let mut decoder = Decoder::new(reader)?;

        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);

        match decoder.colortype()? {
            ColorType::Gray(_) => {}
            other => {
                return Err(RasterError::MissingBand(format!(
                    "{} is not single-band (color type {:?})",
                    name, other
                )))
            }
        }

        let georef = read_georeference(&mut decoder, name)?;
        let nodata = read_nodata(&mut decoder)?;
        let band = decoding_result_to_f32(decoder.read_image()?);

        let source = RasterSource {
            path: name.to_string(),
            bounds: BoundingBox::new(
                georef.left,
                georef.top - height as f64 * georef.dy,
                georef.left + width as f64 * georef.dx,
                georef.top,
            ),
            resolution: Resolution::new(georef.dx, georef.dy),
            width,
            height,
            band,
            nodata,
        };
        source.validate()?;

        debug!(
            path = %name,
            width,
            height,
            dx = georef.dx,
            dy = georef.dy,
            nodata = ?nodata,
            "Decoded GeoTIFF"
        );

        Ok(source)
    }
}

impl RasterReader for GeoTiffReader {
    fn read(&self, path: &Path) -> RasterResult<RasterSource> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file), &path.display().to_string())
    }
}

/// Upper-left corner and cell size.
#[derive(Debug, Clone, Copy)]
struct Georeference {
    left: f64,
    top: f64,
    dx: f64,
    dy: f64,
}

fn read_georeference<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    name: &str,
) -> RasterResult<Georeference> {
    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)?
        .map(|v| v.into_f64_vec())
        .transpose()?;
    let tiepoint = decoder
        .find_tag(Tag::ModelTiepointTag)?
        .map(|v| v.into_f64_vec())
        .transpose()?;

    if let (Some(scale), Some(tie)) = (scale, tiepoint) {
        if scale.len() < 2 || tie.len() < 6 {
            return Err(RasterError::MalformedBounds(format!(
                "{}: pixel scale ({} values) or tiepoint ({} values) too short",
                name,
                scale.len(),
                tie.len()
            )));
        }
        // Tiepoint maps raster (i, j) to model (x, y)
        let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
        let (dx, dy) = (scale[0], scale[1]);
        return Ok(Georeference {
            left: x - i * dx,
            top: y + j * dy,
            dx,
            dy,
        });
    }

    let transform = decoder
        .find_tag(Tag::ModelTransformationTag)?
        .map(|v| v.into_f64_vec())
        .transpose()?;

    match transform {
        Some(m) if m.len() >= 16 => {
            if m[1] != 0.0 || m[4] != 0.0 {
                return Err(RasterError::Unsupported(format!(
                    "{}: rotated model transformation",
                    name
                )));
            }
            Ok(Georeference {
                left: m[3],
                top: m[7],
                dx: m[0],
                dy: -m[5],
            })
        }
        Some(m) => Err(RasterError::MalformedBounds(format!(
            "{}: model transformation has {} values, expected 16",
            name,
            m.len()
        ))),
        None => Err(RasterError::MissingGeoreference(format!(
            "{} has neither pixel scale/tiepoint nor a model transformation",
            name
        ))),
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> RasterResult<Option<f64>> {
    let text = decoder
        .find_tag(Tag::GdalNodata)?
        .map(|v| v.into_string())
        .transpose()?;

    Ok(text.and_then(|s| {
        let trimmed = s.trim_matches(char::from(0)).trim();
        match trimmed.to_lowercase().as_str() {
            "nan" => Some(f64::NAN),
            _ => trimmed.parse::<f64>().ok(),
        }
    }))
}

fn decoding_result_to_f32(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
    }
}
