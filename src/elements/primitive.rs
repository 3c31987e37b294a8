//! Trait implementations for fixed-width integers and IEEE floats.

use super::{Element, ReadDataError};
use crate::codec::ByteOrder;
use crate::dtype::TypeKind;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io;
use std::mem;

macro_rules! impl_primitive_multi_byte {
    ($elem:ty, $kind:expr, $read:ident, $read_into:ident, $write:ident, $write_into:ident) => {
        impl Element for $elem {
            const KIND: TypeKind = $kind;
            const SIZE: usize = mem::size_of::<$elem>();

            fn read<R: io::Read>(mut reader: R, order: ByteOrder) -> Result<Self, ReadDataError> {
                Ok(with_byte_order!(order, E => reader.$read::<E>())?)
            }

            fn read_into<R: io::Read>(
                mut reader: R,
                order: ByteOrder,
                out: &mut [Self],
            ) -> Result<(), ReadDataError> {
                with_byte_order!(order, E => reader.$read_into::<E>(out))?;
                Ok(())
            }

            fn write<W: io::Write>(self, mut writer: W, order: ByteOrder) -> io::Result<()> {
                with_byte_order!(order, E => writer.$write::<E>(self))
            }

            fn write_slice<W: io::Write>(
                slice: &[Self],
                mut writer: W,
                order: ByteOrder,
            ) -> io::Result<()> {
                let mut buf = vec![0; slice.len() * Self::SIZE];
                with_byte_order!(order, E => <E as ::byteorder::ByteOrder>::$write_into(slice, &mut buf));
                writer.write_all(&buf)
            }

            fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self, ReadDataError> {
                let mut buf = [0; mem::size_of::<$elem>()];
                buf.copy_from_slice(&bytes[..Self::SIZE]);
                Ok(order.to_native(<$elem>::from_ne_bytes(buf)))
            }

            fn encode(self, bytes: &mut [u8], order: ByteOrder) {
                bytes[..Self::SIZE].copy_from_slice(&order.from_native(self).to_ne_bytes());
            }
        }
    };
}

impl_primitive_multi_byte!(i16, TypeKind::Int, read_i16, read_i16_into, write_i16, write_i16_into);
impl_primitive_multi_byte!(i32, TypeKind::Int, read_i32, read_i32_into, write_i32, write_i32_into);
impl_primitive_multi_byte!(i64, TypeKind::Int, read_i64, read_i64_into, write_i64, write_i64_into);

impl_primitive_multi_byte!(u16, TypeKind::UInt, read_u16, read_u16_into, write_u16, write_u16_into);
impl_primitive_multi_byte!(u32, TypeKind::UInt, read_u32, read_u32_into, write_u32, write_u32_into);
impl_primitive_multi_byte!(u64, TypeKind::UInt, read_u64, read_u64_into, write_u64, write_u64_into);

impl_primitive_multi_byte!(f32, TypeKind::Float, read_f32, read_f32_into, write_f32, write_f32_into);
impl_primitive_multi_byte!(f64, TypeKind::Float, read_f64, read_f64_into, write_f64, write_f64_into);

// One-byte types have no byte order.

impl Element for u8 {
    const KIND: TypeKind = TypeKind::UInt;
    const SIZE: usize = 1;

    fn read<R: io::Read>(mut reader: R, _order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(reader.read_u8()?)
    }

    fn read_into<R: io::Read>(
        mut reader: R,
        _order: ByteOrder,
        out: &mut [Self],
    ) -> Result<(), ReadDataError> {
        reader.read_exact(out)?;
        Ok(())
    }

    fn write<W: io::Write>(self, mut writer: W, _order: ByteOrder) -> io::Result<()> {
        writer.write_u8(self)
    }

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W, _order: ByteOrder) -> io::Result<()> {
        writer.write_all(slice)
    }

    fn decode(bytes: &[u8], _order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(bytes[0])
    }

    fn encode(self, bytes: &mut [u8], _order: ByteOrder) {
        bytes[0] = self;
    }
}

impl Element for i8 {
    const KIND: TypeKind = TypeKind::Int;
    const SIZE: usize = 1;

    fn read<R: io::Read>(mut reader: R, _order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(reader.read_i8()?)
    }

    fn read_into<R: io::Read>(
        mut reader: R,
        _order: ByteOrder,
        out: &mut [Self],
    ) -> Result<(), ReadDataError> {
        reader.read_i8_into(out)?;
        Ok(())
    }

    fn write<W: io::Write>(self, mut writer: W, _order: ByteOrder) -> io::Result<()> {
        writer.write_i8(self)
    }

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W, _order: ByteOrder) -> io::Result<()> {
        let bytes: Vec<u8> = slice.iter().map(|&v| v as u8).collect();
        writer.write_all(&bytes)
    }

    fn decode(bytes: &[u8], _order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(bytes[0] as i8)
    }

    fn encode(self, bytes: &mut [u8], _order: ByteOrder) {
        bytes[0] = self as u8;
    }
}
