//! PNG export with embedded view metadata (tEXt chunks).

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use zmand_core::ViewState;

use crate::buffer::PixelBuffer;
use crate::error::RenderError;

/// Metadata to embed in an exported PNG as tEXt chunks.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub view: ViewState,
    pub scheme_name: String,
    pub max_iterations: u32,
    pub precision: f64,
    pub blurred: bool,
}

/// Write a pixel buffer as a PNG file with the view it shows.
///
/// Uses the `png` crate directly so custom tEXt chunks can be added.
pub fn export_png(buffer: &PixelBuffer, path: &Path, metadata: &ExportMetadata) -> Result<(), RenderError> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let (width, height) = (buffer.width(), buffer.height());
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "zmand".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata, width, height) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.to_rgba_bytes())?;

    debug!("Exported PNG {}x{} to {}", width, height, path.display());
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    let v = &meta.view;
    format!(
        "Mandelbrot ({:+.16}, {:+.16}) to ({:+.16}, {:+.16}), Zoom: {:e}, Iterations: {}",
        v.min_x,
        v.min_y,
        v.max_x(),
        v.max_y(),
        v.zoom(),
        meta.max_iterations,
    )
}

fn build_metadata_pairs(meta: &ExportMetadata, width: u32, height: u32) -> Vec<(String, String)> {
    vec![
        ("zmand.MinX".into(), meta.view.min_x.to_string()),
        ("zmand.MinY".into(), meta.view.min_y.to_string()),
        ("zmand.Span".into(), meta.view.span.to_string()),
        ("zmand.MaxIterations".into(), meta.max_iterations.to_string()),
        ("zmand.Precision".into(), meta.precision.to_string()),
        ("zmand.Scheme".into(), meta.scheme_name.clone()),
        ("zmand.Blur".into(), meta.blurred.to_string()),
        ("zmand.Resolution".into(), format!("{width}x{height}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn meta() -> ExportMetadata {
        ExportMetadata {
            view: ViewState::default(),
            scheme_name: "Glacier".into(),
            max_iterations: 256,
            precision: 1.0,
            blurred: true,
        }
    }

    #[test]
    fn export_creates_valid_png() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        buf.fill([128, 64, 32]);
        let dir = std::env::temp_dir().join("zmand_test_export");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("test_export.png");
        export_png(&buf, &path, &meta()).expect("export should succeed");

        let mut file = std::fs::File::open(&path).expect("file should exist");
        let mut header = [0u8; 8];
        file.read_exact(&mut header).expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n", "valid PNG signature");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_embeds_text_chunks_and_drops_padding() {
        let mut buf = PixelBuffer::with_pitch(2, 2, 16).unwrap();
        buf.fill([9, 8, 7]);
        let dir = std::env::temp_dir().join("zmand_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("test_meta.png");
        export_png(&buf, &path, &meta()).expect("export should succeed");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("file should exist"));
        let mut reader = decoder.read_info().expect("should read info");
        let texts: Vec<_> = reader.info().uncompressed_latin1_text.clone();
        assert!(texts.iter().any(|t| t.keyword == "Software" && t.text == "zmand"));
        assert!(texts.iter().any(|t| t.keyword == "zmand.Scheme" && t.text == "Glacier"));
        assert!(texts.iter().any(|t| t.keyword == "zmand.Resolution" && t.text == "2x2"));

        let mut data = vec![0u8; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut data).expect("should decode");
        assert_eq!(frame.width, 2);
        assert_eq!(&data[..4], &[9, 8, 7, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
