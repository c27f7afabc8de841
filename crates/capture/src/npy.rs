//! Minimal NumPy `.npy` v1.0 writer for packed f32 row arrays.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Write `data` (packed little-endian f32 values) as an `(rows, cols)` array.
pub fn write_f32_rows(path: &Path, data: &[u8], rows: u32, cols: u32) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&header(rows, cols))?;
    file.write_all(data)?;
    Ok(())
}

/// Serialize the v1.0 preamble: magic, version, header length, padded dict.
///
/// The total preamble length must be a multiple of 64 and the dict must end
/// with a newline; consumers memory-map the data section at that alignment.
fn header(rows: u32, cols: u32) -> Vec<u8> {
    let dict = format!("{{'descr': '<f4', 'fortran_order': False, 'shape': ({rows}, {cols}), }}");

    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;

    let mut out = Vec::with_capacity(unpadded + padding);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[0x01, 0x00]);
    let dict_len = (dict.len() + padding + 1) as u16;
    out.extend_from_slice(&dict_len.to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend(std::iter::repeat_n(b' ', padding));
    out.push(b'\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_aligned_and_terminated() {
        let h = header(1000, 4);
        assert_eq!(&h[..6], MAGIC);
        assert_eq!(&h[6..8], &[1, 0]);
        assert_eq!(h.len() % 64, 0);
        assert_eq!(*h.last().unwrap(), b'\n');

        let dict_len = u16::from_le_bytes([h[8], h[9]]) as usize;
        assert_eq!(10 + dict_len, h.len());

        let dict = std::str::from_utf8(&h[10..]).unwrap();
        assert!(dict.contains("'shape': (1000, 4)"));
        assert!(dict.contains("'descr': '<f4'"));
    }

    #[test]
    fn writes_header_then_raw_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.npy");

        let floats: Vec<f32> = vec![1.0, 2.0, 3.0, 0.5];
        let data: &[u8] = bytemuck::cast_slice(&floats);
        write_f32_rows(&path, data, 1, 4).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let dict_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!(&bytes[10 + dict_len..], data);
    }
}
