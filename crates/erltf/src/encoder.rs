// Copyright (C) 2025-2026 Michael S. Klishin and Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::errors::EncodeError;
use crate::tags::{
    ATOM_UTF8_EXT, BINARY_EXT, BIT_BINARY_EXT, EXPORT_EXT, INTEGER_EXT, LARGE_BIG_EXT,
    LARGE_TUPLE_EXT, LIST_EXT, MAP_EXT, NEW_FLOAT_EXT, NEW_FUN_EXT, NEW_PID_EXT,
    NEWER_REFERENCE_EXT, NIL_EXT, SMALL_ATOM_UTF8_EXT, SMALL_BIG_EXT, SMALL_INTEGER_EXT,
    SMALL_TUPLE_EXT, V4_PORT_EXT, VERSION,
};
use crate::term::OwnedTerm;
use crate::types::{Atom, BigInt, ExternalFun, ExternalPid, ExternalPort, ExternalReference, InternalFun};
use bytes::{BufMut, BytesMut};
use std::collections::BTreeMap;
use std::io::Write;

pub fn encode(term: &OwnedTerm) -> Result<Vec<u8>, EncodeError> {
    let estimated_size = term.estimated_encoded_size() + 1;
    let capacity = estimated_size.max(64);
    let mut buf = BytesMut::with_capacity(capacity);
    buf.put_u8(VERSION);
    encode_term(&mut buf, term)?;
    Ok(buf.to_vec())
}

pub fn encode_to_writer<W: Write>(term: &OwnedTerm, writer: &mut W) -> Result<(), EncodeError> {
    let encoded = encode(term)?;
    writer.write_all(&encoded)?;
    Ok(())
}

fn encode_term(buf: &mut BytesMut, term: &OwnedTerm) -> Result<(), EncodeError> {
    match term {
        OwnedTerm::Atom(atom) => encode_atom_impl(buf, atom),
        OwnedTerm::Integer(i) => encode_integer(buf, *i),
        OwnedTerm::Float(f) => encode_float(buf, *f),
        OwnedTerm::Binary(b) => encode_binary(buf, b),
        OwnedTerm::BitBinary { bytes, bits } => encode_bit_binary(buf, bytes, *bits),
        OwnedTerm::String(s) => encode_string(buf, s),
        OwnedTerm::List(l) => encode_list_impl(buf, l),
        OwnedTerm::ImproperList { elements, tail } => {
            encode_improper_list_impl(buf, elements, tail)
        }
        OwnedTerm::Map(m) => encode_map_impl(buf, m),
        OwnedTerm::Tuple(t) => encode_tuple_impl(buf, t),
        OwnedTerm::Pid(pid) => encode_pid_impl(buf, pid),
        OwnedTerm::Port(port) => encode_port_impl(buf, port),
        OwnedTerm::Reference(ref_) => encode_reference_impl(buf, ref_),
        OwnedTerm::BigInt(big) => encode_bigint(buf, big),
        OwnedTerm::ExternalFun(fun) => encode_export_ext_impl(buf, fun),
        OwnedTerm::InternalFun(fun) => encode_new_fun_ext_impl(buf, fun),
        OwnedTerm::Nil => encode_nil(buf),
    }
}

fn encode_atom_impl(buf: &mut BytesMut, atom: &Atom) -> Result<(), EncodeError> {
    let bytes = atom.name.as_bytes();
    let len = bytes.len();

    if len > u16::MAX as usize {
        return Err(EncodeError::AtomTooLarge { size: len });
    }

    if len > 255 {
        buf.put_u8(ATOM_UTF8_EXT);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(SMALL_ATOM_UTF8_EXT);
        buf.put_u8(len as u8);
    }
    buf.put_slice(bytes);
    Ok(())
}

fn encode_integer(buf: &mut BytesMut, value: i64) -> Result<(), EncodeError> {
    if (0..=255).contains(&value) {
        buf.put_u8(SMALL_INTEGER_EXT);
        buf.put_u8(value as u8);
    } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
        buf.put_u8(INTEGER_EXT);
        buf.put_i32(value as i32);
    } else {
        let (sign, abs_value) = if value >= 0 {
            (0u8, value as u64)
        } else {
            (1u8, value.wrapping_neg() as u64)
        };

        let le_bytes = abs_value.to_le_bytes();
        let significant_len = le_bytes
            .iter()
            .rposition(|&b| b != 0)
            .map_or(1, |pos| pos + 1);

        if significant_len <= 255 {
            buf.put_u8(SMALL_BIG_EXT);
            buf.put_u8(significant_len as u8);
            buf.put_u8(sign);
            buf.put_slice(&le_bytes[..significant_len]);
        } else {
            buf.put_u8(LARGE_BIG_EXT);
            buf.put_u32(significant_len as u32);
            buf.put_u8(sign);
            buf.put_slice(&le_bytes[..significant_len]);
        }
    }
    Ok(())
}

fn encode_float(buf: &mut BytesMut, value: f64) -> Result<(), EncodeError> {
    buf.put_u8(NEW_FLOAT_EXT);
    buf.put_f64(value);
    Ok(())
}

fn encode_binary(buf: &mut BytesMut, data: &[u8]) -> Result<(), EncodeError> {
    let len =
        u32::try_from(data.len()).map_err(|_| EncodeError::BinaryTooLarge { size: data.len() })?;
    buf.put_u8(BINARY_EXT);
    buf.put_u32(len);
    buf.put_slice(data);
    Ok(())
}

fn encode_bit_binary(buf: &mut BytesMut, bytes: &[u8], bits: u8) -> Result<(), EncodeError> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| EncodeError::BinaryTooLarge { size: bytes.len() })?;
    buf.put_u8(BIT_BINARY_EXT);
    buf.put_u32(len);
    buf.put_u8(bits);
    buf.put_slice(bytes);
    Ok(())
}

fn encode_string(buf: &mut BytesMut, s: &str) -> Result<(), EncodeError> {
    encode_binary(buf, s.as_bytes())
}

fn encode_list_impl(buf: &mut BytesMut, elements: &[OwnedTerm]) -> Result<(), EncodeError> {
    if elements.is_empty() {
        return encode_nil(buf);
    }

    let len = u32::try_from(elements.len()).map_err(|_| EncodeError::ListTooLarge {
        size: elements.len(),
    })?;

    buf.put_u8(LIST_EXT);
    buf.put_u32(len);
    for elem in elements {
        encode_term(buf, elem)?;
    }
    encode_nil(buf)?;
    Ok(())
}

fn encode_improper_list_impl(
    buf: &mut BytesMut,
    elements: &[OwnedTerm],
    tail: &OwnedTerm,
) -> Result<(), EncodeError> {
    let len = u32::try_from(elements.len()).map_err(|_| EncodeError::ListTooLarge {
        size: elements.len(),
    })?;

    buf.put_u8(LIST_EXT);
    buf.put_u32(len);
    for elem in elements {
        encode_term(buf, elem)?;
    }
    encode_term(buf, tail)?;
    Ok(())
}

fn encode_map_impl(
    buf: &mut BytesMut,
    map: &BTreeMap<OwnedTerm, OwnedTerm>,
) -> Result<(), EncodeError> {
    let len = u32::try_from(map.len()).map_err(|_| EncodeError::MapTooLarge { size: map.len() })?;

    buf.put_u8(MAP_EXT);
    buf.put_u32(len);

    for (key, value) in map.iter() {
        encode_term(buf, key)?;
        encode_term(buf, value)?;
    }
    Ok(())
}

fn encode_tuple_impl(buf: &mut BytesMut, elements: &[OwnedTerm]) -> Result<(), EncodeError> {
    if elements.len() <= 255 {
        buf.put_u8(SMALL_TUPLE_EXT);
        buf.put_u8(elements.len() as u8);
    } else {
        let len = u32::try_from(elements.len()).map_err(|_| EncodeError::TupleTooLarge {
            size: elements.len(),
        })?;
        buf.put_u8(LARGE_TUPLE_EXT);
        buf.put_u32(len);
    }
    for elem in elements {
        encode_term(buf, elem)?;
    }
    Ok(())
}

fn encode_pid_impl(buf: &mut BytesMut, pid: &ExternalPid) -> Result<(), EncodeError> {
    buf.put_u8(NEW_PID_EXT);
    encode_atom_impl(buf, &pid.node)?;
    buf.put_u32(pid.id);
    buf.put_u32(pid.serial);
    buf.put_u32(pid.creation);
    Ok(())
}

fn encode_port_impl(buf: &mut BytesMut, port: &ExternalPort) -> Result<(), EncodeError> {
    buf.put_u8(V4_PORT_EXT);
    encode_atom_impl(buf, &port.node)?;
    buf.put_u64(port.id);
    buf.put_u32(port.creation);
    Ok(())
}

fn encode_reference_impl(buf: &mut BytesMut, ref_: &ExternalReference) -> Result<(), EncodeError> {
    let len = u16::try_from(ref_.ids.len()).map_err(|_| EncodeError::ReferenceTooLarge {
        size: ref_.ids.len(),
    })?;

    buf.put_u8(NEWER_REFERENCE_EXT);
    buf.put_u16(len);
    encode_atom_impl(buf, &ref_.node)?;
    buf.put_u32(ref_.creation);
    for id in &ref_.ids {
        buf.put_u32(*id);
    }
    Ok(())
}

fn encode_bigint(buf: &mut BytesMut, big: &BigInt) -> Result<(), EncodeError> {
    let len = big.digits.len();
    if len <= 255 {
        buf.put_u8(SMALL_BIG_EXT);
        buf.put_u8(len as u8);
    } else {
        buf.put_u8(LARGE_BIG_EXT);
        buf.put_u32(len as u32);
    }
    buf.put_u8(if big.sign.is_negative() { 1 } else { 0 });
    buf.put_slice(&big.digits);
    Ok(())
}

fn encode_nil(buf: &mut BytesMut) -> Result<(), EncodeError> {
    buf.put_u8(NIL_EXT);
    Ok(())
}

fn encode_export_ext_impl(buf: &mut BytesMut, fun: &ExternalFun) -> Result<(), EncodeError> {
    buf.put_u8(EXPORT_EXT);
    encode_atom_impl(buf, &fun.module)?;
    encode_atom_impl(buf, &fun.function)?;
    encode_integer(buf, fun.arity as i64)?;
    Ok(())
}

fn encode_new_fun_ext_impl(buf: &mut BytesMut, fun: &InternalFun) -> Result<(), EncodeError> {
    let mut temp_buf = BytesMut::new();

    temp_buf.put_u8(fun.arity);
    temp_buf.put_slice(&fun.uniq);
    temp_buf.put_u32(fun.index);
    temp_buf.put_u32(fun.num_free);

    encode_atom_impl(&mut temp_buf, &fun.module)?;
    encode_integer(&mut temp_buf, fun.old_index as i64)?;
    encode_integer(&mut temp_buf, fun.old_uniq as i64)?;
    encode_pid_impl(&mut temp_buf, &fun.pid)?;

    for var in &fun.free_vars {
        encode_term(&mut temp_buf, var)?;
    }

    buf.put_u8(NEW_FUN_EXT);
    buf.put_u32((temp_buf.len() + 4) as u32);
    buf.put_slice(&temp_buf);

    Ok(())
}
