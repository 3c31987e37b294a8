//! Conversion between IBM System/360 hexadecimal floating point and IEEE-754.
//!
//! An IBM single is a sign bit, a 7-bit excess-64 exponent of 16, and a
//! 24-bit fraction; an IBM double widens the fraction to 56 bits. Words are
//! stored big-endian on disk. The functions taking or returning integers
//! operate on the word's value, already converted to host order.
//!
//! IBM singles carry up to three fewer significant bits than IEEE singles
//! (the leading hex digit may have up to three leading zero bits), so
//! `ibm_to_ieee_f32(ieee_to_ibm_f32(x))` is exact only when those bits of `x`
//! are zero.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io;

const SIGN_32: u32 = 0x8000_0000;
const SIGN_64: u64 = 0x8000_0000_0000_0000;

/// Converts the value of a 32-bit IBM float word to an IEEE single.
///
/// Exponents too large for IEEE saturate to the largest finite magnitude
/// with the IBM sign; exponents too small flush to zero. A zero fraction
/// decodes to zero whatever the exponent.
pub fn ibm_to_ieee_f32(ibm: u32) -> f32 {
    let mut fmant = ibm & 0x00ff_ffff;
    if fmant == 0 {
        return 0.0;
    }
    let sign = ibm & SIGN_32;
    let mut t = ((ibm & 0x7f00_0000) >> 22) as i32 - 130;
    while fmant & 0x0080_0000 == 0 {
        t -= 1;
        fmant <<= 1;
    }
    if t > 254 {
        f32::from_bits(sign | 0x7f7f_ffff)
    } else if t <= 0 {
        0.0
    } else {
        f32::from_bits(sign | ((t as u32) << 23) | (fmant & 0x007f_ffff))
    }
}

/// Converts an IEEE single to the value of a 32-bit IBM float word.
///
/// Both zeros map to the IBM true zero.
pub fn ieee_to_ibm_f32(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & !SIGN_32 == 0 {
        return 0;
    }
    let sign = bits & SIGN_32;
    let mut fmant = (bits & 0x007f_ffff) | 0x0080_0000;
    let mut t = ((bits & 0x7f80_0000) >> 23) as i32 - 126;
    // Align the binary exponent to a hex digit.
    while t & 0x3 != 0 {
        t += 1;
        fmant >>= 1;
    }
    sign | ((((t >> 2) + 64) as u32) << 24) | fmant
}

/// Converts the value of a 64-bit IBM float word to an IEEE double.
///
/// The 56-bit IBM fraction is truncated to the 53 bits an IEEE double holds.
pub fn ibm_to_ieee_f64(ibm: u64) -> f64 {
    let mut fmant = ibm & 0x00ff_ffff_ffff_ffff;
    if fmant == 0 {
        return 0.0;
    }
    let sign = ibm & SIGN_64;
    let mut t = ((ibm & 0x7f00_0000_0000_0000) >> 54) as i64 + 766;
    while fmant & 0x0080_0000_0000_0000 == 0 {
        t -= 1;
        fmant <<= 1;
    }
    if t > 2046 {
        f64::from_bits(sign | 0x7fef_ffff_ffff_ffff)
    } else if t <= 0 {
        0.0
    } else {
        f64::from_bits(sign | ((t as u64) << 52) | ((fmant >> 3) & 0x000f_ffff_ffff_ffff))
    }
}

/// Converts an IEEE double to the value of a 64-bit IBM float word.
///
/// IBM doubles span roughly `5.4e-79..7.2e75`; larger magnitudes (including
/// infinities and NaN) saturate to the largest IBM magnitude and smaller ones
/// flush to zero.
pub fn ieee_to_ibm_f64(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits & !SIGN_64 == 0 {
        return 0;
    }
    let sign = bits & SIGN_64;
    let mut fmant = ((bits & 0x000f_ffff_ffff_ffff) | 0x0010_0000_0000_0000) << 3;
    let mut t = ((bits & 0x7ff0_0000_0000_0000) >> 52) as i64 - 1022;
    while t & 0x3 != 0 {
        t += 1;
        fmant >>= 1;
    }
    let exponent = (t >> 2) + 64;
    if exponent > 0x7f {
        sign | 0x7fff_ffff_ffff_ffff
    } else if exponent < 0 {
        0
    } else {
        sign | ((exponent as u64) << 56) | fmant
    }
}

/// Reads one big-endian IBM single and converts it to IEEE.
pub fn read_ibm_f32<R: io::Read>(mut reader: R) -> io::Result<f32> {
    Ok(ibm_to_ieee_f32(reader.read_u32::<BigEndian>()?))
}

/// Reads `out.len()` big-endian IBM singles, converting them to IEEE.
pub fn read_ibm_f32_into<R: io::Read>(mut reader: R, out: &mut [f32]) -> io::Result<()> {
    let mut words = vec![0u32; out.len()];
    reader.read_u32_into::<BigEndian>(&mut words)?;
    for (out, word) in out.iter_mut().zip(words) {
        *out = ibm_to_ieee_f32(word);
    }
    Ok(())
}

/// Writes IEEE singles as big-endian IBM singles.
pub fn write_ibm_f32<W: io::Write>(mut writer: W, values: &[f32]) -> io::Result<()> {
    let mut buf = vec![0u8; values.len() * 4];
    for (chunk, &value) in buf.chunks_exact_mut(4).zip(values) {
        BigEndian::write_u32(chunk, ieee_to_ibm_f32(value));
    }
    writer.write_all(&buf)
}

/// Reads one big-endian IBM double and converts it to IEEE.
pub fn read_ibm_f64<R: io::Read>(mut reader: R) -> io::Result<f64> {
    Ok(ibm_to_ieee_f64(reader.read_u64::<BigEndian>()?))
}

/// Reads `out.len()` big-endian IBM doubles, converting them to IEEE.
pub fn read_ibm_f64_into<R: io::Read>(mut reader: R, out: &mut [f64]) -> io::Result<()> {
    let mut words = vec![0u64; out.len()];
    reader.read_u64_into::<BigEndian>(&mut words)?;
    for (out, word) in out.iter_mut().zip(words) {
        *out = ibm_to_ieee_f64(word);
    }
    Ok(())
}

/// Writes IEEE doubles as big-endian IBM doubles.
pub fn write_ibm_f64<W: io::Write>(mut writer: W, values: &[f64]) -> io::Result<()> {
    let mut buf = vec![0u8; values.len() * 8];
    for (chunk, &value) in buf.chunks_exact_mut(8).zip(values) {
        BigEndian::write_u64(chunk, ieee_to_ibm_f64(value));
    }
    writer.write_all(&buf)
}
