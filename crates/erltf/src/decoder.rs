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

use crate::borrowed::BorrowedTerm;
use crate::errors::{ContextualDecodeError, DecodeError, ParsingContext, PathSegment};
use crate::tags::{
    ATOM_CACHE_REF, ATOM_EXT, ATOM_UTF8_EXT, BINARY_EXT, BIT_BINARY_EXT, COMPRESSED_EXT,
    DIST_HEADER, EXPORT_EXT, FLOAT_EXT, INTEGER_EXT, LARGE_BIG_EXT, LARGE_TUPLE_EXT, LIST_EXT,
    LOCAL_EXT, MAP_EXT, NEW_FLOAT_EXT, NEW_FUN_EXT, NEW_PID_EXT, NEW_REFERENCE_EXT,
    NEWER_REFERENCE_EXT, NIL_EXT, PID_EXT, PORT_EXT, REFERENCE_EXT, SMALL_ATOM_EXT,
    SMALL_ATOM_UTF8_EXT, SMALL_BIG_EXT, SMALL_INTEGER_EXT, SMALL_TUPLE_EXT, STRING_EXT,
    V4_PORT_EXT, VERSION,
};
use crate::term::OwnedTerm;
use crate::types::{
    Atom, BigInt, ExternalFun, ExternalPid, ExternalPort, ExternalReference, InternalFun,
};
use flate2::read::ZlibDecoder;
use nom::IResult;
use nom::bytes::complete::take;
use nom::error::{Error as NomError, ErrorKind};
use nom::number::complete::{be_f64, be_i32, be_u8, be_u16, be_u32, be_u64};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read;
use std::str;

const MAX_ATOM_SIZE: usize = 65535;
const MAX_LIST_SIZE: usize = 10_000_000;
const MAX_TUPLE_SIZE: usize = 10_000_000;
const MAX_MAP_SIZE: usize = 1_000_000;
const MAX_BINARY_SIZE: usize = 100_000_000;

type NomResult<'a, T> = IResult<&'a [u8], T, NomError<&'a [u8]>>;

/// Decode-time behavior flags. Unlike most of this codec, these have no
/// wire representation — they only affect which `OwnedTerm` variant a
/// decoded value is mapped into.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// When set, a `LIST_EXT` whose every element is an integer in
    /// `0..=255` decodes to `OwnedTerm::String` instead of `OwnedTerm::List`.
    /// Erlang charlists (`STRING_EXT` on the wire) are unaffected by this
    /// flag — they always decode as a list of integers, matching
    /// `erlang:binary_to_term/1`.
    pub decode_int_lists_as_strings: bool,
}

pub fn decode(data: &[u8]) -> Result<OwnedTerm, DecodeError> {
    decode_with_options(data, &DecodeOptions::default())
}

pub fn decode_with_options(data: &[u8], opts: &DecodeOptions) -> Result<OwnedTerm, DecodeError> {
    let (remaining, term) = parse_versioned_term(data, opts).map_err(from_nom_error)?;

    if !remaining.is_empty() {
        return Err(DecodeError::TrailingData(remaining.len()));
    }

    Ok(term)
}

pub fn decode_with_trailing(data: &[u8]) -> Result<(OwnedTerm, &[u8]), DecodeError> {
    let opts = DecodeOptions::default();
    let (remaining, term) = parse_versioned_term(data, &opts).map_err(from_nom_error)?;
    Ok((term, remaining))
}

pub fn decode_raw_term(data: &[u8]) -> Result<OwnedTerm, DecodeError> {
    let opts = DecodeOptions::default();
    let (remaining, term) = parse_term(data, &opts).map_err(from_nom_error)?;

    if !remaining.is_empty() {
        return Err(DecodeError::TrailingData(remaining.len()));
    }

    Ok(term)
}

fn from_nom_error(e: nom::Err<NomError<&[u8]>>) -> DecodeError {
    match e {
        nom::Err::Incomplete(_) => DecodeError::UnexpectedEof,
        nom::Err::Error(e) | nom::Err::Failure(e) => match e.code {
            ErrorKind::Tag => DecodeError::InvalidVersion {
                expected: VERSION,
                actual: 0,
            },
            ErrorKind::Eof => DecodeError::UnexpectedEof,
            ErrorKind::Verify => DecodeError::InvalidFormat("validation failed".to_string()),
            ErrorKind::TooLarge => DecodeError::InvalidFormat("size limit exceeded".to_string()),
            _ => DecodeError::InvalidFormat(format!("{:?}", e.code)),
        },
    }
}

fn parse_versioned_term<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, version) = be_u8(input)?;
    if version != VERSION {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    }
    parse_term(input, opts)
}

fn parse_term<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, tag) = be_u8(input)?;
    parse_term_from_tag(input, tag, opts)
}

fn parse_term_from_tag<'a>(
    input: &'a [u8],
    tag: u8,
    opts: &DecodeOptions,
) -> NomResult<'a, OwnedTerm> {
    match tag {
        SMALL_INTEGER_EXT => parse_small_integer(input),
        INTEGER_EXT => parse_integer(input),
        FLOAT_EXT => parse_old_float(input),
        NEW_FLOAT_EXT => parse_new_float(input),
        ATOM_EXT => parse_atom_latin1(input),
        ATOM_UTF8_EXT => parse_atom_utf8(input),
        SMALL_ATOM_UTF8_EXT => parse_small_atom_utf8(input),
        SMALL_ATOM_EXT => parse_small_atom_latin1(input),
        SMALL_TUPLE_EXT => parse_small_tuple(input, opts),
        LARGE_TUPLE_EXT => parse_large_tuple(input, opts),
        NIL_EXT => Ok((input, OwnedTerm::Nil)),
        STRING_EXT => parse_string_ext(input),
        LIST_EXT => parse_list(input, opts),
        BINARY_EXT => parse_binary(input),
        BIT_BINARY_EXT => parse_bit_binary(input),
        SMALL_BIG_EXT => parse_small_big(input),
        LARGE_BIG_EXT => parse_large_big(input),
        MAP_EXT => parse_map(input, opts),
        NEW_PID_EXT => parse_new_pid(input, opts),
        NEWER_REFERENCE_EXT => parse_newer_reference(input, opts),
        V4_PORT_EXT => parse_v4_port(input, opts),
        EXPORT_EXT => parse_export_ext(input, opts),
        NEW_FUN_EXT => parse_new_fun_ext(input, opts),
        COMPRESSED_EXT => parse_compressed(input, opts),
        REFERENCE_EXT => parse_reference_ext(input, opts),
        PORT_EXT => parse_port_ext(input, opts),
        PID_EXT => parse_pid_ext(input, opts),
        NEW_REFERENCE_EXT => parse_new_reference_ext(input, opts),
        DIST_HEADER => {
            log::error!("DIST_HEADER is not supported by this codec (no atom-cache compression)");
            Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)))
        }
        LOCAL_EXT => {
            log::error!("LOCAL_EXT (OTP 26 local-term optimization) is not supported");
            Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)))
        }
        ATOM_CACHE_REF => {
            log::error!(
                "ATOM_CACHE_REF cannot be resolved without a DIST_HEADER atom cache, which this codec does not implement"
            );
            Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)))
        }
        _ => {
            log::error!("Unknown term tag: {} (0x{:02x})", tag, tag);
            Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)))
        }
    }
}

fn parse_compressed<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (rest, uncompressed_size) = be_u32(input)?;

    if uncompressed_size as usize > MAX_BINARY_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }

    let mut decoder = ZlibDecoder::new(rest);
    let mut decompressed = Vec::with_capacity(uncompressed_size as usize);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Fail)))?;
    let consumed = decoder.total_in() as usize;

    let owned_term = match parse_term(&decompressed, opts) {
        Ok((_remaining, term)) => term,
        Err(_) => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Fail))),
    };

    Ok((&rest[consumed..], owned_term))
}

fn parse_reference_ext<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, node_term) = parse_term(input, opts)?;
    let node = if let OwnedTerm::Atom(atom) = node_term {
        atom
    } else {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    };
    let (input, id) = be_u32(input)?;
    let (input, creation) = be_u8(input)?;
    Ok((
        input,
        OwnedTerm::Reference(ExternalReference::new(node, creation as u32, vec![id])),
    ))
}

fn parse_port_ext<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, node_term) = parse_term(input, opts)?;
    let node = if let OwnedTerm::Atom(atom) = node_term {
        atom
    } else {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    };
    let (input, id) = be_u32(input)?;
    let (input, creation) = be_u8(input)?;
    Ok((
        input,
        OwnedTerm::Port(ExternalPort::new(node, id as u64, creation as u32)),
    ))
}

fn parse_pid_ext<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, node_term) = parse_term(input, opts)?;
    let node = if let OwnedTerm::Atom(atom) = node_term {
        atom
    } else {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    };
    let (input, id) = be_u32(input)?;
    let (input, serial) = be_u32(input)?;
    let (input, creation) = be_u8(input)?;
    Ok((
        input,
        OwnedTerm::Pid(ExternalPid::new(node, id, serial, creation as u32)),
    ))
}

fn parse_new_reference_ext<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, len) = be_u16(input)?;
    let (input, node_term) = parse_term(input, opts)?;
    let node = if let OwnedTerm::Atom(atom) = node_term {
        atom
    } else {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    };
    let (input, creation) = be_u8(input)?;
    let mut ids = Vec::with_capacity(len as usize);
    let mut remaining = input;
    for _ in 0..len {
        let (rest, id) = be_u32(remaining)?;
        ids.push(id);
        remaining = rest;
    }
    Ok((
        remaining,
        OwnedTerm::Reference(ExternalReference::new(node, creation as u32, ids)),
    ))
}

fn parse_small_integer(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, value) = be_u8(input)?;
    Ok((input, OwnedTerm::Integer(value as i64)))
}

fn parse_integer(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, value) = be_i32(input)?;
    Ok((input, OwnedTerm::Integer(value as i64)))
}

fn parse_old_float(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, bytes) = take(31usize)(input)?;
    let s = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    let value = s
        .trim_end_matches('\0')
        .parse::<f64>()
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Float)))?;
    Ok((input, OwnedTerm::Float(value)))
}

fn parse_new_float(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, value) = be_f64(input)?;
    Ok((input, OwnedTerm::Float(value)))
}

fn parse_atom_latin1(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u16(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, OwnedTerm::Atom(Atom::new(name))))
}

fn parse_atom_utf8(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u16(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, OwnedTerm::Atom(Atom::new(name))))
}

fn parse_small_atom_utf8(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u8(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, OwnedTerm::Atom(Atom::new(name))))
}

fn parse_small_atom_latin1(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u8(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, OwnedTerm::Atom(Atom::new(name))))
}

fn parse_small_tuple<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, arity) = be_u8(input)?;
    if arity as usize > MAX_TUPLE_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut elements = Vec::with_capacity(arity as usize);

    for _ in 0..arity {
        let (new_remaining, term) = parse_term(remaining, opts)?;
        elements.push(term);
        remaining = new_remaining;
    }

    Ok((remaining, OwnedTerm::Tuple(elements)))
}

fn parse_large_tuple<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, arity) = be_u32(input)?;
    if arity as usize > MAX_TUPLE_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut elements = Vec::with_capacity(arity as usize);

    for _ in 0..arity {
        let (new_remaining, term) = parse_term(remaining, opts)?;
        elements.push(term);
        remaining = new_remaining;
    }

    Ok((remaining, OwnedTerm::Tuple(elements)))
}

fn parse_string_ext(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u16(input)?;
    let (input, bytes) = take(len as usize)(input)?;
    let elements: Vec<OwnedTerm> = bytes
        .iter()
        .map(|&b| OwnedTerm::Integer(b as i64))
        .collect();
    Ok((input, OwnedTerm::List(elements)))
}

fn parse_list<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, len) = be_u32(input)?;
    if len as usize > MAX_LIST_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut elements = Vec::with_capacity(len as usize);

    for _ in 0..len {
        let (new_remaining, term) = parse_term(remaining, opts)?;
        elements.push(term);
        remaining = new_remaining;
    }

    let (remaining, tail) = parse_term(remaining, opts)?;

    if tail != OwnedTerm::Nil {
        return Ok((
            remaining,
            OwnedTerm::ImproperList {
                elements,
                tail: Box::new(tail),
            },
        ));
    }

    if opts.decode_int_lists_as_strings
        && !elements.is_empty()
        && elements
            .iter()
            .all(|e| matches!(e, OwnedTerm::Integer(n) if (0..=255).contains(n)))
    {
        let bytes: Vec<u8> = elements
            .iter()
            .map(|e| match e {
                OwnedTerm::Integer(n) => *n as u8,
                _ => unreachable!(),
            })
            .collect();
        if let Ok(s) = String::from_utf8(bytes) {
            return Ok((remaining, OwnedTerm::String(s)));
        }
    }

    Ok((remaining, OwnedTerm::List(elements)))
}

fn parse_binary(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u32(input)?;
    if len as usize > MAX_BINARY_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, data) = take(len as usize)(input)?;
    Ok((input, OwnedTerm::Binary(data.to_vec())))
}

fn parse_bit_binary(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, len) = be_u32(input)?;
    if len as usize > MAX_BINARY_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bits) = be_u8(input)?;
    if bits == 0 || bits > 8 {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify)));
    }
    if len == 0 && bits != 8 {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    Ok((
        input,
        OwnedTerm::BitBinary {
            bytes: bytes.to_vec(),
            bits,
        },
    ))
}

fn parse_small_big(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, n) = be_u8(input)?;
    let (input, sign) = be_u8(input)?;
    let (input, digits) = take(n as usize)(input)?;
    Ok((
        input,
        OwnedTerm::BigInt(BigInt::new(sign != 0, digits.to_vec())),
    ))
}

fn parse_large_big(input: &[u8]) -> NomResult<'_, OwnedTerm> {
    let (input, n) = be_u32(input)?;
    let (input, sign) = be_u8(input)?;
    let (input, digits) = take(n as usize)(input)?;
    Ok((
        input,
        OwnedTerm::BigInt(BigInt::new(sign != 0, digits.to_vec())),
    ))
}

fn parse_map<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, arity) = be_u32(input)?;
    if arity as usize > MAX_MAP_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut map = BTreeMap::new();

    for _ in 0..arity {
        let (new_remaining, key) = parse_term(remaining, opts)?;
        let (new_remaining, value) = parse_term(new_remaining, opts)?;
        map.insert(key, value);
        remaining = new_remaining;
    }

    Ok((remaining, OwnedTerm::Map(map)))
}

fn parse_new_pid<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, node_term) = parse_term(input, opts)?;
    let node = match node_term {
        OwnedTerm::Atom(a) => a,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, id) = be_u32(input)?;
    let (input, serial) = be_u32(input)?;
    let (input, creation) = be_u32(input)?;

    Ok((
        input,
        OwnedTerm::Pid(ExternalPid::new(node, id, serial, creation)),
    ))
}

fn parse_newer_reference<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, len) = be_u16(input)?;
    let (input, node_term) = parse_term(input, opts)?;
    let node = match node_term {
        OwnedTerm::Atom(a) => a,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, creation) = be_u32(input)?;

    let mut remaining = input;
    let mut ids = Vec::with_capacity(len as usize);
    for _ in 0..len {
        let (new_remaining, id) = be_u32(remaining)?;
        ids.push(id);
        remaining = new_remaining;
    }

    Ok((
        remaining,
        OwnedTerm::Reference(ExternalReference::new(node, creation, ids)),
    ))
}

fn parse_v4_port<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, node_term) = parse_term(input, opts)?;
    let node = match node_term {
        OwnedTerm::Atom(a) => a,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, id) = be_u64(input)?;
    let (input, creation) = be_u32(input)?;

    Ok((
        input,
        OwnedTerm::Port(ExternalPort::new(node, id, creation)),
    ))
}

fn parse_export_ext<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, module_term) = parse_term(input, opts)?;
    let module = match module_term {
        OwnedTerm::Atom(a) => a,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, function_term) = parse_term(input, opts)?;
    let function = match function_term {
        OwnedTerm::Atom(a) => a,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, arity_term) = parse_term(input, opts)?;
    let arity = match arity_term {
        OwnedTerm::Integer(i) if (0..=255).contains(&i) => i as u8,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    Ok((
        input,
        OwnedTerm::ExternalFun(ExternalFun::new(module, function, arity)),
    ))
}

fn parse_new_fun_ext<'a>(input: &'a [u8], opts: &DecodeOptions) -> NomResult<'a, OwnedTerm> {
    let (input, _size) = be_u32(input)?;
    let (input, arity) = be_u8(input)?;
    let (input, uniq) = take(16usize)(input)?;
    let (input, index) = be_u32(input)?;
    let (input, num_free) = be_u32(input)?;

    let (input, module_term) = parse_term(input, opts)?;
    let module = match module_term {
        OwnedTerm::Atom(a) => a,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, old_index_term) = parse_term(input, opts)?;
    let old_index = match old_index_term {
        OwnedTerm::Integer(i) if i >= 0 => i as u32,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, old_uniq_term) = parse_term(input, opts)?;
    let old_uniq = match old_uniq_term {
        OwnedTerm::Integer(i) if i >= 0 => i as u32,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, pid_term) = parse_term(input, opts)?;
    let pid = match pid_term {
        OwnedTerm::Pid(p) => p,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let mut remaining = input;
    let mut free_vars = Vec::with_capacity(num_free as usize);
    for _ in 0..num_free {
        let (new_remaining, term) = parse_term(remaining, opts)?;
        free_vars.push(term);
        remaining = new_remaining;
    }

    let mut uniq_array = [0u8; 16];
    uniq_array.copy_from_slice(uniq);

    Ok((
        remaining,
        OwnedTerm::InternalFun(Box::new(InternalFun::new(
            arity, uniq_array, index, num_free, module, old_index, old_uniq, pid, free_vars,
        ))),
    ))
}

pub fn decode_borrowed(data: &[u8]) -> Result<BorrowedTerm<'_>, ContextualDecodeError> {
    let original_len = data.len();
    let mut ctx = ParsingContext::new();

    let (remaining, term) = parse_versioned_term_borrowed(data, original_len, &mut ctx)
        .map_err(|e| ContextualDecodeError::new(from_nom_error(e), ctx.clone()))?;

    if !remaining.is_empty() {
        ctx.byte_offset = original_len - remaining.len();
        return Err(ContextualDecodeError::new(
            DecodeError::TrailingData(remaining.len()),
            ctx,
        ));
    }

    Ok(term)
}

fn parse_versioned_term_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, version) = be_u8(input)?;
    ctx.byte_offset = original_len - input.len() - 1;
    if version != VERSION {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    }
    parse_term_borrowed(input, original_len, ctx)
}

fn parse_term_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    ctx.byte_offset = original_len - input.len();
    let (input, tag) = be_u8(input)?;

    match tag {
        SMALL_INTEGER_EXT => parse_small_integer_borrowed(input),
        INTEGER_EXT => parse_integer_borrowed(input),
        FLOAT_EXT => parse_old_float_borrowed(input),
        NEW_FLOAT_EXT => parse_new_float_borrowed(input),
        ATOM_EXT => parse_atom_latin1_borrowed(input),
        ATOM_UTF8_EXT => parse_atom_utf8_borrowed(input),
        SMALL_ATOM_UTF8_EXT => parse_small_atom_utf8_borrowed(input),
        SMALL_TUPLE_EXT => parse_small_tuple_borrowed(input, original_len, ctx),
        LARGE_TUPLE_EXT => parse_large_tuple_borrowed(input, original_len, ctx),
        NIL_EXT => Ok((input, BorrowedTerm::Nil)),
        STRING_EXT => parse_string_ext_borrowed(input),
        LIST_EXT => parse_list_borrowed(input, original_len, ctx),
        BINARY_EXT => parse_binary_borrowed(input),
        BIT_BINARY_EXT => parse_bit_binary_borrowed(input),
        SMALL_BIG_EXT => parse_small_big_borrowed(input),
        LARGE_BIG_EXT => parse_large_big_borrowed(input),
        MAP_EXT => parse_map_borrowed(input, original_len, ctx),
        NEW_PID_EXT => parse_new_pid_borrowed(input, original_len, ctx),
        NEWER_REFERENCE_EXT => parse_newer_reference_borrowed(input, original_len, ctx),
        V4_PORT_EXT => parse_v4_port_borrowed(input, original_len, ctx),
        EXPORT_EXT => parse_export_ext_borrowed(input, original_len, ctx),
        NEW_FUN_EXT => parse_new_fun_ext_borrowed(input, original_len, ctx),
        _ => Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    }
}

fn parse_small_integer_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, value) = be_u8(input)?;
    Ok((input, BorrowedTerm::Integer(value as i64)))
}

fn parse_integer_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, value) = be_i32(input)?;
    Ok((input, BorrowedTerm::Integer(value as i64)))
}

fn parse_old_float_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, bytes) = take(31usize)(input)?;
    let s = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    let value = s
        .trim_end_matches('\0')
        .parse::<f64>()
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Float)))?;
    Ok((input, BorrowedTerm::Float(value)))
}

fn parse_new_float_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, value) = be_f64(input)?;
    Ok((input, BorrowedTerm::Float(value)))
}

fn parse_atom_latin1_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, len) = be_u16(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, BorrowedTerm::Atom(Cow::Borrowed(name))))
}

fn parse_atom_utf8_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, len) = be_u16(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, BorrowedTerm::Atom(Cow::Borrowed(name))))
}

fn parse_small_atom_utf8_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, len) = be_u8(input)?;
    if len as usize > MAX_ATOM_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    let name = str::from_utf8(bytes)
        .map_err(|_| nom::Err::Failure(NomError::new(input, ErrorKind::Char)))?;
    Ok((input, BorrowedTerm::Atom(Cow::Borrowed(name))))
}

fn parse_small_tuple_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, arity) = be_u8(input)?;
    if arity as usize > MAX_TUPLE_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut elements = Vec::with_capacity(arity as usize);

    for i in 0..arity {
        ctx.push(PathSegment::TupleElement(i as usize));
        let (new_remaining, term) = parse_term_borrowed(remaining, original_len, ctx)?;
        ctx.pop();
        elements.push(term);
        remaining = new_remaining;
    }

    Ok((remaining, BorrowedTerm::Tuple(elements)))
}

fn parse_large_tuple_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, arity) = be_u32(input)?;
    if arity as usize > MAX_TUPLE_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut elements = Vec::with_capacity(arity as usize);

    for i in 0..arity {
        ctx.push(PathSegment::TupleElement(i as usize));
        let (new_remaining, term) = parse_term_borrowed(remaining, original_len, ctx)?;
        ctx.pop();
        elements.push(term);
        remaining = new_remaining;
    }

    Ok((remaining, BorrowedTerm::Tuple(elements)))
}

fn parse_string_ext_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, len) = be_u16(input)?;
    let (input, bytes) = take(len as usize)(input)?;
    let elements: Vec<BorrowedTerm<'_>> = bytes
        .iter()
        .map(|&b| BorrowedTerm::Integer(b as i64))
        .collect();
    Ok((input, BorrowedTerm::List(elements)))
}

fn parse_list_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, len) = be_u32(input)?;
    if len as usize > MAX_LIST_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut elements = Vec::with_capacity(len as usize);

    for i in 0..len {
        ctx.push(PathSegment::ListElement(i as usize));
        let (new_remaining, term) = parse_term_borrowed(remaining, original_len, ctx)?;
        ctx.pop();
        elements.push(term);
        remaining = new_remaining;
    }

    ctx.push(PathSegment::ImproperListTail);
    let (remaining, tail) = parse_term_borrowed(remaining, original_len, ctx)?;
    ctx.pop();

    if tail == BorrowedTerm::Nil {
        Ok((remaining, BorrowedTerm::List(elements)))
    } else {
        Ok((
            remaining,
            BorrowedTerm::ImproperList {
                elements,
                tail: Box::new(tail),
            },
        ))
    }
}

fn parse_binary_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, len) = be_u32(input)?;
    if len as usize > MAX_BINARY_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, data) = take(len as usize)(input)?;
    Ok((input, BorrowedTerm::Binary(Cow::Borrowed(data))))
}

fn parse_bit_binary_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, len) = be_u32(input)?;
    if len as usize > MAX_BINARY_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, bits) = be_u8(input)?;
    if bits == 0 || bits > 8 {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify)));
    }
    if len == 0 && bits != 8 {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify)));
    }
    let (input, bytes) = take(len as usize)(input)?;
    Ok((
        input,
        BorrowedTerm::BitBinary {
            bytes: Cow::Borrowed(bytes),
            bits,
        },
    ))
}

fn parse_small_big_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, n) = be_u8(input)?;
    let (input, sign) = be_u8(input)?;
    let (input, digits) = take(n as usize)(input)?;
    Ok((
        input,
        BorrowedTerm::BigInt(BigInt::new(sign != 0, digits.to_vec())),
    ))
}

fn parse_large_big_borrowed(input: &[u8]) -> NomResult<'_, BorrowedTerm<'_>> {
    let (input, n) = be_u32(input)?;
    let (input, sign) = be_u8(input)?;
    let (input, digits) = take(n as usize)(input)?;
    Ok((
        input,
        BorrowedTerm::BigInt(BigInt::new(sign != 0, digits.to_vec())),
    ))
}

fn parse_map_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, arity) = be_u32(input)?;
    if arity as usize > MAX_MAP_SIZE {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let mut remaining = input;
    let mut map = BTreeMap::new();

    for _ in 0..arity {
        ctx.push(PathSegment::MapKey);
        let (new_remaining, key) = parse_term_borrowed(remaining, original_len, ctx)?;
        ctx.pop();

        let key_display = match &key {
            BorrowedTerm::Atom(a) => a.to_string(),
            BorrowedTerm::Integer(i) => i.to_string(),
            _ => "?".to_string(),
        };
        ctx.push(PathSegment::MapValue(key_display));
        let (new_remaining, value) = parse_term_borrowed(new_remaining, original_len, ctx)?;
        ctx.pop();

        map.insert(key, value);
        remaining = new_remaining;
    }

    Ok((remaining, BorrowedTerm::Map(map)))
}

fn parse_new_pid_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, node_term) = parse_term_borrowed(input, original_len, ctx)?;
    let node = match node_term {
        BorrowedTerm::Atom(a) => Atom::new(a.as_ref()),
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, id) = be_u32(input)?;
    let (input, serial) = be_u32(input)?;
    let (input, creation) = be_u32(input)?;

    Ok((
        input,
        BorrowedTerm::Pid(ExternalPid::new(node, id, serial, creation)),
    ))
}

fn parse_newer_reference_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, len) = be_u16(input)?;
    let (input, node_term) = parse_term_borrowed(input, original_len, ctx)?;
    let node = match node_term {
        BorrowedTerm::Atom(a) => Atom::new(a.as_ref()),
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, creation) = be_u32(input)?;

    let mut remaining = input;
    let mut ids = Vec::with_capacity(len as usize);
    for _ in 0..len {
        let (new_remaining, id) = be_u32(remaining)?;
        ids.push(id);
        remaining = new_remaining;
    }

    Ok((
        remaining,
        BorrowedTerm::Reference(ExternalReference::new(node, creation, ids)),
    ))
}

fn parse_v4_port_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, node_term) = parse_term_borrowed(input, original_len, ctx)?;
    let node = match node_term {
        BorrowedTerm::Atom(a) => Atom::new(a.as_ref()),
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, id) = be_u64(input)?;
    let (input, creation) = be_u32(input)?;

    Ok((
        input,
        BorrowedTerm::Port(ExternalPort::new(node, id, creation)),
    ))
}

fn parse_export_ext_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, module_term) = parse_term_borrowed(input, original_len, ctx)?;
    let module = match module_term {
        BorrowedTerm::Atom(a) => Atom::new(a.as_ref()),
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, function_term) = parse_term_borrowed(input, original_len, ctx)?;
    let function = match function_term {
        BorrowedTerm::Atom(a) => Atom::new(a.as_ref()),
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, arity_term) = parse_term_borrowed(input, original_len, ctx)?;
    let arity = match arity_term {
        BorrowedTerm::Integer(i) if (0..=255).contains(&i) => i as u8,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    Ok((
        input,
        BorrowedTerm::ExternalFun(ExternalFun::new(module, function, arity)),
    ))
}

fn parse_new_fun_ext_borrowed<'a>(
    input: &'a [u8],
    original_len: usize,
    ctx: &mut ParsingContext,
) -> NomResult<'a, BorrowedTerm<'a>> {
    let (input, _size) = be_u32(input)?;
    let (input, arity) = be_u8(input)?;
    let (input, uniq) = take(16usize)(input)?;
    let (input, index) = be_u32(input)?;
    let (input, num_free) = be_u32(input)?;

    let (input, module_term) = parse_term_borrowed(input, original_len, ctx)?;
    let module = match module_term {
        BorrowedTerm::Atom(a) => Atom::new(a.as_ref()),
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, old_index_term) = parse_term_borrowed(input, original_len, ctx)?;
    let old_index = match old_index_term {
        BorrowedTerm::Integer(i) if i >= 0 => i as u32,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, old_uniq_term) = parse_term_borrowed(input, original_len, ctx)?;
    let old_uniq = match old_uniq_term {
        BorrowedTerm::Integer(i) if i >= 0 => i as u32,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let (input, pid_term) = parse_term_borrowed(input, original_len, ctx)?;
    let pid = match pid_term {
        BorrowedTerm::Pid(p) => p,
        _ => return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag))),
    };

    let mut remaining = input;
    let mut free_vars = Vec::with_capacity(num_free as usize);
    for i in 0..num_free {
        ctx.push(PathSegment::FunFreeVar(i as usize));
        let (new_remaining, term) = parse_term_borrowed(remaining, original_len, ctx)?;
        ctx.pop();
        free_vars.push(term.to_owned());
        remaining = new_remaining;
    }

    let mut uniq_array = [0u8; 16];
    uniq_array.copy_from_slice(uniq);

    Ok((
        remaining,
        BorrowedTerm::InternalFun(Box::new(InternalFun::new(
            arity, uniq_array, index, num_free, module, old_index, old_uniq, pid, free_vars,
        ))),
    ))
}
