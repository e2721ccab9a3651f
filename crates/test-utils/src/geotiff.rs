//! GeoTIFF fixture writer.
//!
//! Writes single-band `f32` GeoTIFFs with pixel scale and tiepoint tags, and
//! optionally a `GDAL_NODATA` tag, so loader tests can exercise real files.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::TiffResult;

/// Description of a single-band GeoTIFF to write.
#[derive(Debug, Clone)]
pub struct GeoTiffFixture {
    pub width: usize,
    pub height: usize,
    /// Left edge (X of the upper-left corner)
    pub left: f64,
    /// Top edge (Y of the upper-left corner)
    pub top: f64,
    pub dx: f64,
    pub dy: f64,
    /// Row-major samples, row 0 at the top
    pub values: Vec<f32>,
    /// Text stored in the GDAL_NODATA tag
    pub nodata: Option<String>,
}

impl GeoTiffFixture {
    /// Write the fixture to `path`.
    pub fn write_to(&self, path: &Path) -> TiffResult<()> {
        let file = File::create(path)?;
        let mut encoder = TiffEncoder::new(file)?;
        let mut image =
            encoder.new_image::<colortype::Gray32Float>(self.width as u32, self.height as u32)?;

        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[self.dx, self.dy, 0.0][..])?;
        image.encoder().write_tag(
            Tag::ModelTiepointTag,
            &[0.0, 0.0, 0.0, self.left, self.top, 0.0][..],
        )?;
        if let Some(nodata) = &self.nodata {
            image.encoder().write_tag(Tag::GdalNodata, nodata.as_str())?;
        }

        image.write_data(&self.values)?;
        Ok(())
    }
}

/// A directory of fixture rasters that is removed on drop.
pub struct TempRasterDir {
    dir: TempDir,
}

impl TempRasterDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `fixture` as `name` inside the directory and return its path.
    pub fn write(&self, name: &str, fixture: &GeoTiffFixture) -> TiffResult<PathBuf> {
        let path = self.dir.path().join(name);
        fixture.write_to(&path)?;
        Ok(path)
    }

    /// Write an arbitrary (non-TIFF) file, for error-path tests.
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::rasters;

    #[test]
    fn test_write_creates_file() {
        let dir = TempRasterDir::new().unwrap();
        let path = dir.write("unit.tif", &rasters::unit_4x4_with_sentinel()).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        // 16 f32 samples plus header and tags
        assert!(meta.len() > 64);
    }
}
