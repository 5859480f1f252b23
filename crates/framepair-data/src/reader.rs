// Binary frame files: headerless packed f32 frames
//
// One file holds one utterance:
//
//   frame_0[0..dim] | frame_1[0..dim] | ... | frame_{n-1}[0..dim]
//
// Every value is a 4-byte IEEE-754 float. There is no header, magic number
// or embedded dimension: the channel dimension is a corpus-wide convention
// supplied by the caller. Decoding reinterprets the bytes as f32, groups them
// into `[frames, dim]` and transposes to channel-major `[dim, frames]`.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use framepair_core::{Error, Result, Tensor};

const VALUE_BYTES: usize = std::mem::size_of::<f32>();

/// Byte order of the `f32` values in a frame file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Whatever the host uses (files written by the same machine).
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    fn decode(self, b: [u8; 4]) -> f32 {
        match self {
            ByteOrder::Native => f32::from_ne_bytes(b),
            ByteOrder::Little => f32::from_le_bytes(b),
            ByteOrder::Big => f32::from_be_bytes(b),
        }
    }

    fn encode(self, v: f32) -> [u8; 4] {
        match self {
            ByteOrder::Native => v.to_ne_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        }
    }
}

/// Reads frame files into channel-major matrices.
///
/// Each call opens, reads and closes the file; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameReader {
    byte_order: ByteOrder,
}

impl FrameReader {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self { byte_order }
    }

    /// Read `path` as frames of `dim` channels.
    ///
    /// Returns the `[dim, frames]` matrix together with `frames`.
    pub fn read(&self, path: &Path, dim: usize) -> Result<(Tensor, usize)> {
        check_dim(dim)?;
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        log::trace!("read {} bytes from {}", bytes.len(), path.display());
        let matrix = decode(&bytes, dim, self.byte_order, path)?;
        let frames = matrix.dims()[1];
        Ok((matrix, frames))
    }

    /// Frame count of `path` from its length alone, without reading content.
    ///
    /// Only regular files are accepted, so a path that probes cleanly is one
    /// `read` can open.
    pub fn probe(&self, path: &Path, dim: usize) -> Result<usize> {
        check_dim(dim)?;
        let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if !meta.is_file() {
            return Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        frame_count(meta.len() as usize, dim, path)
    }
}

/// Read `path` with native byte order.
pub fn read_frames(path: impl AsRef<Path>, dim: usize) -> Result<(Tensor, usize)> {
    FrameReader::default().read(path.as_ref(), dim)
}

/// Decode an in-memory frame buffer into a `[dim, frames]` matrix.
pub fn decode_frames(bytes: &[u8], dim: usize, order: ByteOrder) -> Result<Tensor> {
    check_dim(dim)?;
    decode(bytes, dim, order, Path::new("<memory>"))
}

/// Encode a `[dim, frames]` matrix back into frame-major bytes.
pub fn encode_frames(matrix: &Tensor, order: ByteOrder) -> Result<Vec<u8>> {
    let frame_major = matrix.t()?;
    let mut buf = Vec::with_capacity(frame_major.elem_count() * VALUE_BYTES);
    for &v in frame_major.as_slice() {
        buf.extend_from_slice(&order.encode(v));
    }
    Ok(buf)
}

/// Write a `[dim, frames]` matrix to `path` as a frame file.
pub fn write_frames(path: impl AsRef<Path>, matrix: &Tensor, order: ByteOrder) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_frames(matrix, order)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

fn check_dim(dim: usize) -> Result<()> {
    if dim == 0 {
        return Err(Error::Config("frame dimension must be positive".into()));
    }
    Ok(())
}

/// Number of frames in a buffer of `bytes` bytes.
fn frame_count(bytes: usize, dim: usize, path: &Path) -> Result<usize> {
    if bytes % VALUE_BYTES != 0 {
        return Err(Error::TruncatedValue {
            path: path.to_path_buf(),
            bytes,
        });
    }
    let values = bytes / VALUE_BYTES;
    if values % dim != 0 {
        return Err(Error::FrameAlignment {
            path: path.to_path_buf(),
            values,
            dim,
        });
    }
    Ok(values / dim)
}

fn decode(bytes: &[u8], dim: usize, order: ByteOrder, path: &Path) -> Result<Tensor> {
    let frames = frame_count(bytes.len(), dim, path)?;
    let values: Vec<f32> = bytes
        .chunks_exact(VALUE_BYTES)
        .map(|c| order.decode([c[0], c[1], c[2], c[3]]))
        .collect();
    Tensor::from_vec(values, (frames, dim))?.t()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("framepair_reader_{}_{name}", std::process::id()))
    }

    fn le_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_transposes_to_channel_major() {
        // 2 frames of dim 3
        let bytes = le_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let m = decode_frames(&bytes, 3, ByteOrder::Little).unwrap();
        assert_eq!(m.dims(), &[3, 2]);
        assert_eq!(m.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_decode_big_endian() {
        let bytes: Vec<u8> = [0.5f32, -2.0].iter().flat_map(|v| v.to_be_bytes()).collect();
        let m = decode_frames(&bytes, 1, ByteOrder::Big).unwrap();
        assert_eq!(m.as_slice(), &[0.5, -2.0]);
    }

    #[test]
    fn test_decode_empty_buffer() {
        let m = decode_frames(&[], 60, ByteOrder::Native).unwrap();
        assert_eq!(m.dims(), &[60, 0]);
    }

    #[test]
    fn test_value_count_not_divisible() {
        let bytes = le_bytes(&[0.0; 7]);
        let err = decode_frames(&bytes, 3, ByteOrder::Little).unwrap_err();
        assert!(err.is_format());
        assert!(matches!(
            err,
            Error::FrameAlignment {
                values: 7,
                dim: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_partial_value() {
        let err = decode_frames(&[0u8; 10], 1, ByteOrder::Little).unwrap_err();
        assert!(matches!(err, Error::TruncatedValue { bytes: 10, .. }));
    }

    #[test]
    fn test_zero_dimension() {
        let err = decode_frames(&[0u8; 8], 0, ByteOrder::Little).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_encode_roundtrip() {
        let bytes = le_bytes(&(0..24).map(|i| i as f32 * 0.25).collect::<Vec<_>>());
        let m = decode_frames(&bytes, 4, ByteOrder::Little).unwrap();
        assert_eq!(m.dims(), &[4, 6]);
        assert_eq!(encode_frames(&m, ByteOrder::Little).unwrap(), bytes);
    }

    #[test]
    fn test_read_missing_file() {
        let path = scratch_path("missing.bin");
        let _ = fs::remove_file(&path);
        let err = read_frames(&path, 60).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_probe_matches_read() {
        let path = scratch_path("probe.bin");
        let m = Tensor::from_vec((0..120).map(|i| i as f32).collect(), (12, 10)).unwrap();
        write_frames(&path, &m, ByteOrder::Native).unwrap();

        let reader = FrameReader::default();
        assert_eq!(reader.probe(&path, 12).unwrap(), 10);
        let (back, frames) = reader.read(&path, 12).unwrap();
        assert_eq!(frames, 10);
        assert_eq!(back, m);
        assert!(reader.probe(&path, 7).unwrap_err().is_format());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_probe_rejects_directory() {
        let dir = scratch_path("dir");
        fs::create_dir_all(&dir).unwrap();

        let reader = FrameReader::default();
        assert!(matches!(reader.probe(&dir, 1).unwrap_err(), Error::Io { .. }));
        assert!(matches!(reader.read(&dir, 1).unwrap_err(), Error::Io { .. }));

        fs::remove_dir_all(&dir).unwrap();
    }
}
