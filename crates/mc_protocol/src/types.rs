//! Wire-level primitive codecs.
//!
//! Every primitive decodes from anything implementing [`std::io::Read`] and
//! encodes to anything implementing [`std::io::Write`]. A full packet
//! payload is always fully buffered before any primitive in it is decoded
//! (see `mc_net::buffer`), so nothing here needs to be async -- the only
//! genuinely suspending reads are the framer's socket reads that assemble
//! that buffer in the first place.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use uuid::Uuid as UuidValue;

use crate::error::{Error, Result};

/// The protocol's cap on string length, in UTF-16 code units.
pub const MAX_STRING_LENGTH: usize = 32767;

/// Decodes a value from a byte-oriented reader.
pub trait Decode: Sized {
    fn decode(reader: &mut impl Read) -> Result<Self>;
}

/// Encodes a value to a byte-oriented writer.
pub trait Encode {
    fn encode(&self, writer: &mut impl Write) -> Result<()>;
}

fn read_exact_or_eof(reader: &mut impl Read, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::ShortRead {
                expected: len,
                actual: 0,
            }
        } else {
            Error::Io(err)
        }
    })?;
    Ok(buf)
}

/// A variable-length signed 32-bit integer (LEB128-style, up to five bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarInt(pub i32);

impl VarInt {
    const MAX_BYTES: usize = 5;
    const SEGMENT_BITS: u8 = 0x7F;
    const CONTINUE_BIT: u8 = 0x80;
}

impl Decode for VarInt {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let mut value: i32 = 0;
        for i in 0..Self::MAX_BYTES {
            let byte = reader.read_u8().map_err(|err| {
                if err.kind() == io::ErrorKind::UnexpectedEof {
                    Error::ShortRead {
                        expected: 1,
                        actual: 0,
                    }
                } else {
                    Error::Io(err)
                }
            })?;
            value |= ((byte & Self::SEGMENT_BITS) as i32) << (7 * i);
            if byte & Self::CONTINUE_BIT == 0 {
                return Ok(VarInt(value));
            }
        }
        Err(Error::MalformedVarInt)
    }
}

impl Encode for VarInt {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        let mut value = self.0 as u32;
        loop {
            let mut byte = (value & Self::SEGMENT_BITS as u32) as u8;
            value >>= 7;
            if value != 0 {
                byte |= Self::CONTINUE_BIT;
            }
            writer.write_u8(byte)?;
            if value == 0 {
                break;
            }
        }
        Ok(())
    }
}

/// A variable-length signed 64-bit integer, same encoding as [`VarInt`] but
/// over a wider accumulator and a ten-byte cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarLong(pub i64);

impl VarLong {
    const MAX_BYTES: usize = 10;
    const SEGMENT_BITS: u8 = 0x7F;
    const CONTINUE_BIT: u8 = 0x80;
}

impl Decode for VarLong {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let mut value: i64 = 0;
        for i in 0..Self::MAX_BYTES {
            let byte = reader.read_u8().map_err(|err| {
                if err.kind() == io::ErrorKind::UnexpectedEof {
                    Error::ShortRead {
                        expected: 1,
                        actual: 0,
                    }
                } else {
                    Error::Io(err)
                }
            })?;
            value |= ((byte & Self::SEGMENT_BITS) as i64) << (7 * i);
            if byte & Self::CONTINUE_BIT == 0 {
                return Ok(VarLong(value));
            }
        }
        Err(Error::MalformedVarLong)
    }
}

impl Encode for VarLong {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        let mut value = self.0 as u64;
        loop {
            let mut byte = (value & Self::SEGMENT_BITS as u64) as u8;
            value >>= 7;
            if value != 0 {
                byte |= Self::CONTINUE_BIT;
            }
            writer.write_u8(byte)?;
            if value == 0 {
                break;
            }
        }
        Ok(())
    }
}

/// A rotation expressed as 1/256ths of a full turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Angle(pub u8);

impl Decode for Angle {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        Ok(Angle(reader.read_u8()?))
    }
}

impl Encode for Angle {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        Ok(writer.write_u8(self.0)?)
    }
}

macro_rules! impl_fixed_width {
    ($ty:ty, $read:ident, $write:ident) => {
        impl Decode for $ty {
            fn decode(reader: &mut impl Read) -> Result<Self> {
                Ok(ReadBytesExt::$read::<BigEndian>(reader)?)
            }
        }

        impl Encode for $ty {
            fn encode(&self, writer: &mut impl Write) -> Result<()> {
                Ok(WriteBytesExt::$write::<BigEndian>(writer, *self)?)
            }
        }
    };
}

impl_fixed_width!(i16, read_i16, write_i16);
impl_fixed_width!(u16, read_u16, write_u16);
impl_fixed_width!(i32, read_i32, write_i32);
impl_fixed_width!(u32, read_u32, write_u32);
impl_fixed_width!(i64, read_i64, write_i64);
impl_fixed_width!(u64, read_u64, write_u64);
impl_fixed_width!(f32, read_f32, write_f32);
impl_fixed_width!(f64, read_f64, write_f64);

impl Decode for i8 {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        Ok(reader.read_i8()?)
    }
}

impl Encode for i8 {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        Ok(writer.write_i8(*self)?)
    }
}

impl Decode for u8 {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        Ok(reader.read_u8()?)
    }
}

impl Encode for u8 {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        Ok(writer.write_u8(*self)?)
    }
}

/// `Boolean` decode is permissive: any nonzero byte reads as `true`, rather
/// than rejecting anything but `0`/`1` outright (see DESIGN.md). Use
/// [`decode_boolean_strict`] where a server's `0`/`1` discipline must be
/// enforced.
impl Decode for bool {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        Ok(reader.read_u8()? != 0)
    }
}

impl Encode for bool {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        Ok(writer.write_u8(if *self { 1 } else { 0 })?)
    }
}

/// Strict `Boolean` decode: rejects any byte other than `0`/`1`.
pub fn decode_boolean_strict(reader: &mut impl Read) -> Result<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::InvalidBoolean(other)),
    }
}

impl Decode for UuidValue {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let bytes = read_exact_or_eof(reader, 16)?;
        let mut array = [0u8; 16];
        array.copy_from_slice(&bytes);
        Ok(UuidValue::from_bytes(array))
    }
}

impl Encode for UuidValue {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        Ok(writer.write_all(self.as_bytes())?)
    }
}

impl Decode for String {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let len = VarInt::decode(reader)?.0;
        if len < 0 {
            return Err(Error::ShortRead {
                expected: 0,
                actual: 0,
            });
        }
        let bytes = read_exact_or_eof(reader, len as usize)?;
        let s = String::from_utf8(bytes)?;
        let code_units = s.encode_utf16().count();
        if code_units > MAX_STRING_LENGTH {
            return Err(Error::StringTooLong(code_units, MAX_STRING_LENGTH));
        }
        Ok(s)
    }
}

impl Encode for String {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        self.as_str().encode(writer)
    }
}

impl Encode for str {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        let bytes = self.as_bytes();
        VarInt(bytes.len() as i32).encode(writer)?;
        Ok(writer.write_all(bytes)?)
    }
}

/// A block position packed into a single 64-bit word: X (26 bits), Z (26
/// bits), Y (12 bits), each two's-complement sign-extended on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    fn sign_extend(value: i64, width: u32) -> i32 {
        let shift = 64 - width;
        ((value << shift) >> shift) as i32
    }
}

impl Decode for Position {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let packed = u64::decode(reader)? as i64;
        let x = Self::sign_extend(packed >> 38, 26);
        let z = Self::sign_extend(packed << 26 >> 38, 26);
        let y = Self::sign_extend(packed << 52 >> 52, 12);
        Ok(Position { x, y, z })
    }
}

impl Encode for Position {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        let x = (self.x as i64) & 0x3FF_FFFF;
        let z = (self.z as i64) & 0x3FF_FFFF;
        let y = (self.y as i64) & 0xFFF;
        let packed = (x << 38) | (z << 12) | y;
        (packed as u64).encode(writer)
    }
}

/// Reads a `VarInt`-prefixed sequence of `T`.
pub fn decode_prefixed_array<T: Decode>(reader: &mut impl Read) -> Result<Vec<T>> {
    let count = VarInt::decode(reader)?.0;
    if count < 0 {
        return Err(Error::ShortRead {
            expected: 0,
            actual: 0,
        });
    }
    decode_array_with_count(reader, count as usize)
}

/// Reads exactly `count` elements of `T`, with no length prefix of its own;
/// the count comes from elsewhere in the enclosing packet.
pub fn decode_array_with_count<T: Decode>(reader: &mut impl Read, count: usize) -> Result<Vec<T>> {
    (0..count).map(|_| T::decode(reader)).collect()
}

/// Writes a `VarInt` count followed by each element of `items`.
pub fn encode_prefixed_array<T: Encode>(items: &[T], writer: &mut impl Write) -> Result<()> {
    VarInt(items.len() as i32).encode(writer)?;
    encode_array(items, writer)
}

/// Writes each element of `items` with no length prefix.
pub fn encode_array<T: Encode>(items: &[T], writer: &mut impl Write) -> Result<()> {
    for item in items {
        item.encode(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn roundtrip<T: Decode + Encode + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = Vec::new();
        value.encode(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded = T::decode(&mut cursor).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn varint_known_encodings() {
        let cases: &[(i32, &[u8])] = &[
            (0, &[0x00]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (2147483647, &[0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];
        for &(value, expected) in cases {
            let mut buf = Vec::new();
            VarInt(value).encode(&mut buf).unwrap();
            assert_eq!(buf, expected, "encoding {value}");

            let mut cursor = Cursor::new(expected);
            let decoded = VarInt::decode(&mut cursor).unwrap();
            assert_eq!(decoded.0, value, "decoding {expected:?}");
        }
    }

    #[test]
    fn varint_six_continuation_bytes_is_malformed() {
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80];
        let mut cursor = Cursor::new(bytes);
        let result = VarInt::decode(&mut cursor);
        assert_matches::assert_matches!(result, Err(Error::MalformedVarInt));
    }

    #[test]
    fn varint_roundtrip_extremes() {
        roundtrip(VarInt(0));
        roundtrip(VarInt(i32::MIN));
        roundtrip(VarInt(i32::MAX));
        roundtrip(VarInt(-12345));
    }

    #[test]
    fn varlong_roundtrip() {
        roundtrip(VarLong(0));
        roundtrip(VarLong(i64::MIN));
        roundtrip(VarLong(i64::MAX));
    }

    #[test]
    fn string_roundtrip() {
        roundtrip(String::from("hello, minecraft"));
        roundtrip(String::from(""));
    }

    #[test]
    fn position_roundtrip() {
        for (x, y, z) in [
            (0, 0, 0),
            (-33554432, -2048, -33554432),
            (33554431, 2047, 33554431),
            (18357644, 831, -20882616),
        ] {
            roundtrip(Position { x, y, z });
        }
    }

    #[test]
    fn position_sign_extension() {
        // 8 FF bytes -> x = z = -1, y = -1 (all bits set).
        let bytes: [u8; 8] = 0xFFFF_FFFF_FFFF_FFFFu64.to_be_bytes();
        let mut cursor = Cursor::new(bytes);
        let pos = Position::decode(&mut cursor).unwrap();
        assert_eq!(pos, Position { x: -1, y: -1, z: -1 });
    }

    #[test]
    fn uuid_roundtrip() {
        roundtrip(UuidValue::new_v4());
    }

    #[test]
    fn boolean_is_permissive() {
        let mut cursor = Cursor::new([0x02u8]);
        assert!(bool::decode(&mut cursor).unwrap());
    }

    #[test]
    fn boolean_strict_rejects_other_bytes() {
        let mut cursor = Cursor::new([0x02u8]);
        let result = decode_boolean_strict(&mut cursor);
        assert_matches::assert_matches!(result, Err(Error::InvalidBoolean(2)));
    }

    #[test]
    fn prefixed_array_roundtrip() {
        let items = vec![VarInt(1), VarInt(2), VarInt(3)];
        let mut buf = Vec::new();
        encode_prefixed_array(&items, &mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded: Vec<VarInt> = decode_prefixed_array(&mut cursor).unwrap();
        assert_eq!(decoded, items);
    }
}
