//! Gzip inflation with pass-through fallback.

use std::io::Read as _;

use flate2::read::GzDecoder;

/// Inflate a gzip body. Anything that is not a complete, valid gzip stream is
/// returned unchanged; failing to inflate is never an error.
pub fn inflate(body: Vec<u8>) -> Vec<u8> {
  let mut out = Vec::new();
  match GzDecoder::new(body.as_slice()).read_to_end(&mut out) {
    Ok(_) => out,
    Err(_) => body,
  }
}
