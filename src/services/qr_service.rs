// src/services/qr_service.rs
use crate::error::AppResult;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

/// Tamanho da pré-visualização depois de guardar um aluno.
pub const PREVIEW_SIZE: u32 = 120;
/// Tamanho usado na tabela de alunos.
pub const TABLE_SIZE: u32 = 64;
const MAX_SIZE: u32 = 1024;

/// Nome do ficheiro para download: `QR_<rollNo>.png`.
pub fn qr_file_name(roll_no: &str) -> String {
    format!("QR_{}.png", roll_no)
}

/// Gera o PNG do QR cujo conteúdo é exatamente o número do aluno.
pub fn render_qr_png(roll_no: &str, size: u32) -> AppResult<Vec<u8>> {
    let size = size.clamp(TABLE_SIZE / 2, MAX_SIZE);
    let code = QrCode::new(roll_no.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    tracing::debug!("QR gerado para '{}' ({} bytes)", roll_no, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_convention() {
        assert_eq!(qr_file_name("101"), "QR_101.png");
    }

    #[test]
    fn png_has_signature_and_min_size() {
        let bytes = render_qr_png("101", PREVIEW_SIZE).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.width() >= PREVIEW_SIZE);
        assert_eq!(decoded.width(), decoded.height());
    }
}
