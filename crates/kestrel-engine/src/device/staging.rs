/// Re-lays tightly packed rows so each row starts on a
/// `COPY_BYTES_PER_ROW_ALIGNMENT` boundary.
///
/// Returns the padded bytes and the padded row pitch. Buffer-to-texture copies
/// require the aligned pitch.
pub(crate) fn pad_rows(data: &[u8], width: u32, height: u32, bytes_per_pixel: u32) -> (Vec<u8>, u32) {
    let unpadded = width * bytes_per_pixel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;

    if padded == unpadded {
        return (data.to_vec(), padded);
    }

    let mut out = vec![0u8; padded as usize * height as usize];
    for (row, src) in data.chunks_exact(unpadded as usize).take(height as usize).enumerate() {
        let start = row * padded as usize;
        out[start..start + unpadded as usize].copy_from_slice(src);
    }
    (out, padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_rows_untouched() {
        // 64 px * 4 B = 256 B per row, already aligned.
        let data = vec![7u8; 64 * 4 * 2];
        let (out, pitch) = pad_rows(&data, 64, 2, 4);
        assert_eq!(pitch, 256);
        assert_eq!(out, data);
    }

    #[test]
    fn narrow_rows_padded() {
        let data: Vec<u8> = (0..16u8).collect(); // 2x2 RGBA
        let (out, pitch) = pad_rows(&data, 2, 2, 4);
        assert_eq!(pitch, 256);
        assert_eq!(out.len(), 512);
        assert_eq!(&out[0..8], &data[0..8]);
        assert!(out[8..256].iter().all(|b| *b == 0));
        assert_eq!(&out[256..264], &data[8..16]);
    }
}
