//! GeoTIFF decoding tests against fixture files written to a temp directory.

use raster_reader::{GeoTiffReader, RasterError, RasterReader};
use test_utils::{rasters, GeoTiffFixture, TempRasterDir};

#[test]
fn test_read_unit_raster_georeference() {
    let dir = TempRasterDir::new().unwrap();
    let path = dir.write("unit.tif", &rasters::unit_4x4_with_sentinel()).unwrap();

    let source = GeoTiffReader::new().read(&path).unwrap();

    assert_eq!(source.width, 4);
    assert_eq!(source.height, 4);
    assert_eq!(source.bounds.left(), 0.0);
    assert_eq!(source.bounds.bottom(), 0.0);
    assert_eq!(source.bounds.right(), 4.0);
    assert_eq!(source.bounds.top(), 4.0);
    assert_eq!(source.resolution.dx, 1.0);
    assert_eq!(source.resolution.dy, 1.0);
    assert_eq!(source.nodata, None);
}

#[test]
fn test_read_band_values_row_major() {
    let dir = TempRasterDir::new().unwrap();
    let path = dir.write("unit.tif", &rasters::unit_4x4_with_sentinel()).unwrap();

    let source = GeoTiffReader::new().read(&path).unwrap();

    assert_eq!(source.band.len(), 16);
    assert_eq!(source.sample(0, 0), Some(0.0));
    assert_eq!(source.sample(0, 1), Some(5.0));
    assert_eq!(source.sample(3, 3), Some(5.0));
}

#[test]
fn test_read_gdal_nodata() {
    let dir = TempRasterDir::new().unwrap();
    let path = dir.write("conus.tif", &rasters::conus_temperature(0.5)).unwrap();

    let source = GeoTiffReader::new().read(&path).unwrap();

    assert_eq!(source.nodata, Some(0.0));
    assert_eq!(source.width, 70);
    assert_eq!(source.height, 35);
    assert_eq!(source.bounds.bottom(), 20.0);
    assert_eq!(source.bounds.right(), -60.0);
}

#[test]
fn test_read_nan_nodata() {
    let dir = TempRasterDir::new().unwrap();
    let fixture = GeoTiffFixture {
        nodata: Some("nan".to_string()),
        ..rasters::unit_4x4_with_sentinel()
    };
    let path = dir.write("nan.tif", &fixture).unwrap();

    let source = GeoTiffReader::new().read(&path).unwrap();
    assert!(source.nodata.unwrap().is_nan());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempRasterDir::new().unwrap();
    let err = GeoTiffReader::new()
        .read(&dir.path().join("does-not-exist.tif"))
        .unwrap_err();
    assert!(matches!(err, RasterError::IoError(_)));
}

#[test]
fn test_non_tiff_is_decode_error() {
    let dir = TempRasterDir::new().unwrap();
    let path = dir
        .write_bytes("bogus.tif", b"this is not a tiff file at all")
        .unwrap();

    let err = GeoTiffReader::new().read(&path).unwrap_err();
    assert!(matches!(err, RasterError::Decode(_)));
}

#[test]
fn test_read_from_memory() {
    let dir = TempRasterDir::new().unwrap();
    let path = dir.write("unit.tif", &rasters::unit_4x4_with_sentinel()).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    let source = GeoTiffReader::new()
        .read_from(std::io::Cursor::new(bytes), "in-memory")
        .unwrap();
    assert_eq!(source.path, "in-memory");
    assert_eq!(source.band.len(), 16);
}
