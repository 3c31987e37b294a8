//! Trait implementation for IEEE half precision (`half::f16`).

use super::{Element, ReadDataError};
use crate::codec::ByteOrder;
use crate::dtype::TypeKind;
use byteorder::{ReadBytesExt, WriteBytesExt};
use half::slice::HalfFloatSliceExt;
use half::f16;
use std::io;

impl Element for f16 {
    const KIND: TypeKind = TypeKind::Float;
    const SIZE: usize = 2;

    fn read<R: io::Read>(mut reader: R, order: ByteOrder) -> Result<Self, ReadDataError> {
        let bits = with_byte_order!(order, E => reader.read_u16::<E>())?;
        Ok(f16::from_bits(bits))
    }

    fn read_into<R: io::Read>(
        mut reader: R,
        order: ByteOrder,
        out: &mut [Self],
    ) -> Result<(), ReadDataError> {
        let bits = out.reinterpret_cast_mut();
        with_byte_order!(order, E => reader.read_u16_into::<E>(bits))?;
        Ok(())
    }

    fn write<W: io::Write>(self, mut writer: W, order: ByteOrder) -> io::Result<()> {
        with_byte_order!(order, E => writer.write_u16::<E>(self.to_bits()))
    }

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W, order: ByteOrder) -> io::Result<()> {
        let mut buf = vec![0; slice.len() * Self::SIZE];
        let bits = slice.reinterpret_cast();
        with_byte_order!(order, E => <E as ::byteorder::ByteOrder>::write_u16_into(bits, &mut buf));
        writer.write_all(&buf)
    }

    fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(order.to_native(f16::from_ne_bytes([bytes[0], bytes[1]])))
    }

    fn encode(self, bytes: &mut [u8], order: ByteOrder) {
        bytes[..2].copy_from_slice(&order.from_native(self).to_ne_bytes());
    }
}
