//! Binary stream helpers for the model persistence format: fixed field
//! order, no padding, native byte order, IEEE-754 doubles. Premature end of
//! stream surfaces as `CorruptStream` naming the field being read.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Upper bound on length-prefixed names ("Dense", "sigmoid", ...). Anything
/// larger means the length prefix was read from garbage.
const MAX_NAME_LEN: usize = 256;

pub(crate) fn write_i32<W: Write>(out: &mut W, value: i32) -> io::Result<()> {
    out.write_all(&value.to_ne_bytes())
}

pub(crate) fn write_u32<W: Write>(out: &mut W, value: u32) -> io::Result<()> {
    out.write_all(&value.to_ne_bytes())
}

pub(crate) fn write_f64<W: Write>(out: &mut W, value: f64) -> io::Result<()> {
    out.write_all(&value.to_ne_bytes())
}

pub(crate) fn write_bool<W: Write>(out: &mut W, value: bool) -> io::Result<()> {
    out.write_all(&[value as u8])
}

/// Length-prefixed string: u32 byte count followed by the bytes.
pub(crate) fn write_str<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    write_u32(out, value.len() as u32)?;
    out.write_all(value.as_bytes())
}

/// Writes every element in row-major order; shape metadata is the caller's
/// responsibility (shape-driven decode on the way back).
pub(crate) fn write_matrix_values<W: Write>(out: &mut W, matrix: &Matrix) -> io::Result<()> {
    for row in &matrix.data {
        for &value in row {
            write_f64(out, value)?;
        }
    }
    Ok(())
}

fn read_bytes<R: Read>(input: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    input.read_exact(buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::CorruptStream(format!("unexpected end of stream while reading {what}"))
        } else {
            Error::Io(err)
        }
    })
}

pub(crate) fn read_i32<R: Read>(input: &mut R, what: &str) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_bytes(input, &mut buf, what)?;
    Ok(i32::from_ne_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(input: &mut R, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_bytes(input, &mut buf, what)?;
    Ok(u32::from_ne_bytes(buf))
}

pub(crate) fn read_f64<R: Read>(input: &mut R, what: &str) -> Result<f64> {
    let mut buf = [0u8; 8];
    read_bytes(input, &mut buf, what)?;
    Ok(f64::from_ne_bytes(buf))
}

pub(crate) fn read_bool<R: Read>(input: &mut R, what: &str) -> Result<bool> {
    let mut buf = [0u8; 1];
    read_bytes(input, &mut buf, what)?;
    Ok(buf[0] != 0)
}

pub(crate) fn read_str<R: Read>(input: &mut R, what: &str) -> Result<String> {
    let len = read_u32(input, what)? as usize;
    if len > MAX_NAME_LEN {
        return Err(Error::CorruptStream(format!(
            "implausible length {len} while reading {what}"
        )));
    }
    let mut buf = vec![0u8; len];
    read_bytes(input, &mut buf, what)?;
    String::from_utf8(buf)
        .map_err(|_| Error::CorruptStream(format!("non-UTF-8 bytes while reading {what}")))
}

/// Fills an already-shaped matrix in row-major order.
pub(crate) fn read_matrix_values<R: Read>(
    input: &mut R,
    matrix: &mut Matrix,
    what: &str,
) -> Result<()> {
    for i in 0..matrix.rows {
        for j in 0..matrix.cols {
            matrix.data[i][j] = read_f64(input, what)?;
        }
    }
    Ok(())
}
