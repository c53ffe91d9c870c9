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

use crate::types::{Atom, BigInt, ExternalFun, ExternalPid, ExternalPort, ExternalReference, InternalFun};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An owned Erlang term, fully decoupled from any input buffer.
///
/// This is the type most callers build and pattern-match against.
/// `crate::borrowed::BorrowedTerm` mirrors this shape for zero-copy
/// decoding; the two convert into each other via `to_owned`/`From`.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedTerm {
    Atom(Atom),
    Integer(i64),
    Float(f64),
    Pid(ExternalPid),
    Port(ExternalPort),
    Reference(ExternalReference),
    Binary(Vec<u8>),
    BitBinary { bytes: Vec<u8>, bits: u8 },
    String(String),
    List(Vec<OwnedTerm>),
    ImproperList {
        elements: Vec<OwnedTerm>,
        tail: Box<OwnedTerm>,
    },
    Map(BTreeMap<OwnedTerm, OwnedTerm>),
    Tuple(Vec<OwnedTerm>),
    BigInt(BigInt),
    ExternalFun(ExternalFun),
    InternalFun(Box<InternalFun>),
    Nil,
}

// Term-ordering rank, mirroring Erlang's standard order of terms:
// number < atom < reference < fun < port < pid < tuple < map < nil/list < binary/bitstring
fn type_rank(term: &OwnedTerm) -> u8 {
    match term {
        OwnedTerm::Integer(_) | OwnedTerm::Float(_) | OwnedTerm::BigInt(_) => 0,
        OwnedTerm::Atom(_) => 1,
        OwnedTerm::Reference(_) => 2,
        OwnedTerm::ExternalFun(_) | OwnedTerm::InternalFun(_) => 3,
        OwnedTerm::Port(_) => 4,
        OwnedTerm::Pid(_) => 5,
        OwnedTerm::Tuple(_) => 6,
        OwnedTerm::Map(_) => 7,
        OwnedTerm::Nil | OwnedTerm::List(_) | OwnedTerm::ImproperList { .. } => 8,
        OwnedTerm::Binary(_) | OwnedTerm::BitBinary { .. } | OwnedTerm::String(_) => 9,
    }
}

fn numeric_value(term: &OwnedTerm) -> Option<f64> {
    match term {
        OwnedTerm::Integer(n) => Some(*n as f64),
        OwnedTerm::Float(f) => Some(*f),
        OwnedTerm::BigInt(b) => {
            let mag: f64 = b
                .digits
                .iter()
                .rev()
                .fold(0.0_f64, |acc, &d| acc * 256.0 + d as f64);
            Some(if b.sign.is_negative() { -mag } else { mag })
        }
        _ => None,
    }
}

fn list_elements(term: &OwnedTerm) -> Option<(&[OwnedTerm], Option<&OwnedTerm>)> {
    match term {
        OwnedTerm::Nil => Some((&[], None)),
        OwnedTerm::List(elems) => Some((elems, None)),
        OwnedTerm::ImproperList { elements, tail } => Some((elements, Some(tail.as_ref()))),
        _ => None,
    }
}

fn binary_bytes(term: &OwnedTerm) -> Option<&[u8]> {
    match term {
        OwnedTerm::Binary(b) => Some(b),
        OwnedTerm::BitBinary { bytes, .. } => Some(bytes),
        OwnedTerm::String(s) => Some(s.as_bytes()),
        _ => None,
    }
}

impl Eq for OwnedTerm {}

impl PartialOrd for OwnedTerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OwnedTerm {
    fn cmp(&self, other: &Self) -> Ordering {
        let (r1, r2) = (type_rank(self), type_rank(other));

        if r1 == 0 && r2 == 0 {
            let (v1, v2) = (numeric_value(self).unwrap(), numeric_value(other).unwrap());
            return match v1.partial_cmp(&v2) {
                Some(Ordering::Equal) | None => Ordering::Equal,
                Some(ord) => ord,
            };
        }

        if r1 != r2 {
            return r1.cmp(&r2);
        }

        match (self, other) {
            (OwnedTerm::Atom(a), OwnedTerm::Atom(b)) => a.as_str().cmp(b.as_str()),
            (OwnedTerm::Reference(a), OwnedTerm::Reference(b)) => a.cmp(b),
            (OwnedTerm::Port(a), OwnedTerm::Port(b)) => a.cmp(b),
            (OwnedTerm::Pid(a), OwnedTerm::Pid(b)) => a.cmp(b),
            (OwnedTerm::ExternalFun(a), OwnedTerm::ExternalFun(b)) => a.cmp(b),
            (OwnedTerm::Tuple(a), OwnedTerm::Tuple(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (OwnedTerm::Map(a), OwnedTerm::Map(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            _ if r1 == 8 => {
                let (e1, t1) = list_elements(self).unwrap();
                let (e2, t2) = list_elements(other).unwrap();
                let common = e1.len().min(e2.len());
                for i in 0..common {
                    match e1[i].cmp(&e2[i]) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                match e1.len().cmp(&e2.len()) {
                    Ordering::Equal => {
                        let tail1 = t1.cloned().unwrap_or(OwnedTerm::Nil);
                        let tail2 = t2.cloned().unwrap_or(OwnedTerm::Nil);
                        tail1.cmp(&tail2)
                    }
                    ord => ord,
                }
            }
            _ if r1 == 9 => {
                let b1 = binary_bytes(self).unwrap();
                let b2 = binary_bytes(other).unwrap();
                b1.cmp(b2).then_with(|| {
                    let bits = |t: &OwnedTerm| match t {
                        OwnedTerm::BitBinary { bits, .. } => *bits,
                        _ => 0,
                    };
                    bits(self).cmp(&bits(other))
                })
            }
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for OwnedTerm {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            OwnedTerm::Atom(a) => a.hash(state),
            OwnedTerm::Integer(n) => n.hash(state),
            OwnedTerm::Float(f) => f.to_bits().hash(state),
            OwnedTerm::Pid(p) => p.hash(state),
            OwnedTerm::Port(p) => p.hash(state),
            OwnedTerm::Reference(r) => r.hash(state),
            OwnedTerm::Binary(b) => b.hash(state),
            OwnedTerm::BitBinary { bytes, bits } => {
                bytes.hash(state);
                bits.hash(state);
            }
            OwnedTerm::String(s) => s.hash(state),
            OwnedTerm::List(elems) => elems.hash(state),
            OwnedTerm::ImproperList { elements, tail } => {
                elements.hash(state);
                tail.hash(state);
            }
            OwnedTerm::Map(m) => {
                for (k, v) in m {
                    k.hash(state);
                    v.hash(state);
                }
            }
            OwnedTerm::Tuple(elems) => elems.hash(state),
            OwnedTerm::BigInt(b) => b.hash(state),
            OwnedTerm::ExternalFun(f) => f.hash(state),
            OwnedTerm::InternalFun(f) => (f.module.as_str(), f.index, f.uniq).hash(state),
            OwnedTerm::Nil => 0u8.hash(state),
        }
    }
}

impl OwnedTerm {
    #[inline]
    pub fn atom<S: Into<Atom>>(name: S) -> Self {
        OwnedTerm::Atom(name.into())
    }

    #[inline]
    pub fn integer(n: i64) -> Self {
        OwnedTerm::Integer(n)
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        OwnedTerm::Float(f)
    }

    #[inline]
    pub fn binary(bytes: Vec<u8>) -> Self {
        OwnedTerm::Binary(bytes)
    }

    #[inline]
    pub fn string<S: Into<String>>(s: S) -> Self {
        OwnedTerm::String(s.into())
    }

    #[inline]
    pub fn list(elements: Vec<OwnedTerm>) -> Self {
        if elements.is_empty() {
            OwnedTerm::Nil
        } else {
            OwnedTerm::List(elements)
        }
    }

    #[inline]
    pub fn tuple(elements: Vec<OwnedTerm>) -> Self {
        OwnedTerm::Tuple(elements)
    }

    #[inline]
    pub fn nil() -> Self {
        OwnedTerm::Nil
    }

    #[inline]
    pub fn boolean(b: bool) -> Self {
        OwnedTerm::Atom(Atom::new(if b { "true" } else { "false" }))
    }

    #[inline]
    pub fn ok() -> Self {
        OwnedTerm::Atom(Atom::new("ok"))
    }

    #[inline]
    pub fn error() -> Self {
        OwnedTerm::Atom(Atom::new("error"))
    }

    #[inline]
    pub fn ok_tuple(term: OwnedTerm) -> Self {
        OwnedTerm::Tuple(vec![Self::ok(), term])
    }

    #[inline]
    pub fn error_tuple(term: OwnedTerm) -> Self {
        OwnedTerm::Tuple(vec![Self::error(), term])
    }

    pub fn improper_list(elements: Vec<OwnedTerm>, tail: OwnedTerm) -> Self {
        if elements.is_empty() {
            return tail;
        }
        match tail {
            OwnedTerm::Nil => OwnedTerm::List(elements),
            other => OwnedTerm::ImproperList {
                elements,
                tail: Box::new(other),
            },
        }
    }

    /// Builds an Erlang charlist (a proper list of codepoints) from a Rust string.
    pub fn charlist<S: AsRef<str>>(s: S) -> Self {
        let elements = s.as_ref().chars().map(|c| OwnedTerm::Integer(c as i64)).collect::<Vec<_>>();
        OwnedTerm::list(elements)
    }

    #[inline]
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            OwnedTerm::Atom(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OwnedTerm::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            OwnedTerm::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            OwnedTerm::Binary(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            OwnedTerm::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[OwnedTerm]> {
        match self {
            OwnedTerm::List(elems) => Some(elems),
            OwnedTerm::Nil => Some(&[]),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&BTreeMap<OwnedTerm, OwnedTerm>> {
        match self {
            OwnedTerm::Map(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn as_tuple(&self) -> Option<&[OwnedTerm]> {
        match self {
            OwnedTerm::Tuple(elems) => Some(elems),
            _ => None,
        }
    }

    #[inline]
    pub fn is_atom(&self) -> bool {
        matches!(self, OwnedTerm::Atom(_))
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, OwnedTerm::Integer(_))
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, OwnedTerm::List(_) | OwnedTerm::Nil)
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, OwnedTerm::Map(_))
    }

    #[inline]
    pub fn is_tuple(&self) -> bool {
        matches!(self, OwnedTerm::Tuple(_))
    }

    /// A rough byte-size estimate used to pre-size the encoder's output buffer.
    /// Deliberately approximate: it trades a little over-allocation for avoiding
    /// a second pass over the term tree.
    pub fn estimated_encoded_size(&self) -> usize {
        match self {
            OwnedTerm::Atom(a) => a.len() + 3,
            OwnedTerm::Integer(n) if *n >= 0 && *n <= 255 => 2,
            OwnedTerm::Integer(_) => 5,
            OwnedTerm::Float(_) => 9,
            OwnedTerm::Pid(_) => 16,
            OwnedTerm::Port(_) => 14,
            OwnedTerm::Reference(r) => 8 + r.ids.len() * 4,
            OwnedTerm::Binary(b) => b.len() + 5,
            OwnedTerm::BitBinary { bytes, .. } => bytes.len() + 6,
            OwnedTerm::String(s) => s.len() + 3,
            OwnedTerm::Nil => 1,
            OwnedTerm::List(elems) => {
                elems.iter().map(OwnedTerm::estimated_encoded_size).sum::<usize>() + 6
            }
            OwnedTerm::ImproperList { elements, tail } => {
                elements.iter().map(OwnedTerm::estimated_encoded_size).sum::<usize>()
                    + tail.estimated_encoded_size()
                    + 5
            }
            OwnedTerm::Map(m) => {
                m.iter()
                    .map(|(k, v)| k.estimated_encoded_size() + v.estimated_encoded_size())
                    .sum::<usize>()
                    + 5
            }
            OwnedTerm::Tuple(elems) => {
                elems.iter().map(OwnedTerm::estimated_encoded_size).sum::<usize>() + 5
            }
            OwnedTerm::BigInt(b) => b.digits.len() + 6,
            OwnedTerm::ExternalFun(_) => 16,
            OwnedTerm::InternalFun(f) => {
                f.free_vars.iter().map(OwnedTerm::estimated_encoded_size).sum::<usize>() + 40
            }
        }
    }

    /// True if every element is an integer in `0..=255`, i.e. this could
    /// represent an Erlang charlist / ASCII string.
    pub fn as_erlang_string(&self) -> Option<String> {
        match self {
            OwnedTerm::String(s) => Some(s.clone()),
            OwnedTerm::Binary(b) => {
                if b.iter().all(|byte| *byte <= 127) {
                    String::from_utf8(b.clone()).ok()
                } else {
                    None
                }
            }
            OwnedTerm::Nil => Some(String::new()),
            OwnedTerm::List(elems) => {
                let mut out = String::with_capacity(elems.len());
                for elem in elems {
                    match elem {
                        OwnedTerm::Integer(n) if *n >= 0 && *n <= 255 => {
                            out.push(*n as u8 as char);
                        }
                        _ => return None,
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }

    /// Whether a key in a proplist entry is a valid proplist key (atom or binary).
    fn is_valid_proplist_key(term: &OwnedTerm) -> bool {
        matches!(term, OwnedTerm::Atom(_) | OwnedTerm::Binary(_) | OwnedTerm::String(_))
    }

    /// True for `Nil`, an empty list, or a list whose every element is either
    /// a bare atom (shorthand for `{atom, true}`) or a 2-tuple with an
    /// atom/binary key.
    pub fn is_proplist(&self) -> bool {
        let elems = match self {
            OwnedTerm::Nil => return true,
            OwnedTerm::List(elems) => elems,
            _ => return false,
        };

        elems.iter().all(|elem| match elem {
            OwnedTerm::Atom(_) => true,
            OwnedTerm::Tuple(kv) if kv.len() == 2 => Self::is_valid_proplist_key(&kv[0]),
            _ => false,
        })
    }

    /// Expands bare-atom shorthand entries into `{atom, true}` 2-tuples and
    /// drops entries that aren't valid proplist entries.
    pub fn normalize_proplist(&self) -> OwnedTerm {
        let elems = match self {
            OwnedTerm::Nil => return OwnedTerm::Nil,
            OwnedTerm::List(elems) => elems,
            other => return other.clone(),
        };

        let normalized = elems
            .iter()
            .filter_map(|elem| match elem {
                OwnedTerm::Atom(a) => Some(OwnedTerm::Tuple(vec![
                    OwnedTerm::Atom(a.clone()),
                    OwnedTerm::boolean(true),
                ])),
                OwnedTerm::Tuple(kv) if kv.len() == 2 && Self::is_valid_proplist_key(&kv[0]) => {
                    Some(elem.clone())
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        OwnedTerm::list(normalized)
    }

    /// Converts a proplist to a `Map`. Duplicate keys: last write wins.
    /// Pass-through if already a map.
    pub fn proplist_to_map(&self) -> OwnedTerm {
        if let OwnedTerm::Map(_) = self {
            return self.clone();
        }

        let normalized = self.normalize_proplist();
        let elems = match &normalized {
            OwnedTerm::List(elems) => elems.as_slice(),
            OwnedTerm::Nil => &[],
            _ => return OwnedTerm::Map(BTreeMap::new()),
        };

        let mut map = BTreeMap::new();
        for elem in elems {
            if let OwnedTerm::Tuple(kv) = elem {
                if kv.len() == 2 {
                    map.insert(kv[0].clone(), kv[1].clone());
                }
            }
        }
        OwnedTerm::Map(map)
    }

    /// Converts a `Map` back into a proplist (list of 2-tuples), ordered by
    /// key per the map's `BTreeMap` iteration order. Pass-through if already
    /// a proplist.
    pub fn map_to_proplist(&self) -> OwnedTerm {
        match self {
            OwnedTerm::Map(m) => {
                let elems = m
                    .iter()
                    .map(|(k, v)| OwnedTerm::Tuple(vec![k.clone(), v.clone()]))
                    .collect::<Vec<_>>();
                OwnedTerm::list(elems)
            }
            other if other.is_proplist() => other.normalize_proplist(),
            other => other.clone(),
        }
    }

    /// Recursively converts nested proplists (inside a proplist's values)
    /// into nested maps. Non-proplist list values are left unchanged.
    pub fn to_map_recursive(&self) -> OwnedTerm {
        let as_map = self.proplist_to_map();
        match as_map {
            OwnedTerm::Map(m) => {
                let converted = m
                    .into_iter()
                    .map(|(k, v)| {
                        let new_v = if v.is_proplist() && !matches!(v, OwnedTerm::Nil) {
                            v.to_map_recursive()
                        } else {
                            v
                        };
                        (k, new_v)
                    })
                    .collect();
                OwnedTerm::Map(converted)
            }
            other => other,
        }
    }

    /// Converts `Binary`/`String` keys of a map or proplist to `Atom` keys,
    /// silently dropping entries whose key cannot convert (e.g. `Integer`).
    pub fn atomize_keys(&self) -> OwnedTerm {
        let atomize_key = |k: &OwnedTerm| -> Option<OwnedTerm> {
            match k {
                OwnedTerm::Atom(_) => Some(k.clone()),
                OwnedTerm::Binary(b) => {
                    std::str::from_utf8(b).ok().map(|s| OwnedTerm::atom(s))
                }
                OwnedTerm::String(s) => Some(OwnedTerm::atom(s.as_str())),
                _ => None,
            }
        };

        match self {
            OwnedTerm::Map(m) => {
                let converted = m
                    .iter()
                    .filter_map(|(k, v)| atomize_key(k).map(|k| (k, v.clone())))
                    .collect();
                OwnedTerm::Map(converted)
            }
            other if other.is_proplist() => {
                let normalized = other.normalize_proplist();
                let elems = match &normalized {
                    OwnedTerm::List(elems) => elems.as_slice(),
                    _ => &[],
                };
                let converted = elems
                    .iter()
                    .filter_map(|elem| match elem {
                        OwnedTerm::Tuple(kv) if kv.len() == 2 => {
                            atomize_key(&kv[0]).map(|k| OwnedTerm::Tuple(vec![k, kv[1].clone()]))
                        }
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                OwnedTerm::list(converted)
            }
            other => other.clone(),
        }
    }

    /// Wraps a non-list term in a singleton list. Passes existing lists
    /// through unchanged; `Nil` stays `Nil`.
    pub fn as_list_wrapped(&self) -> OwnedTerm {
        match self {
            OwnedTerm::Nil => OwnedTerm::Nil,
            OwnedTerm::List(_) => self.clone(),
            other => OwnedTerm::List(vec![other.clone()]),
        }
    }

    /// Returns an iterator over `(key, value)` pairs if this is a proplist,
    /// `None` otherwise. Invalid entries encountered mid-iteration are
    /// skipped.
    pub fn proplist_iter(&self) -> Option<impl Iterator<Item = (&OwnedTerm, &OwnedTerm)>> {
        let elems: &[OwnedTerm] = match self {
            OwnedTerm::Nil => &[],
            OwnedTerm::List(elems) => elems.as_slice(),
            _ => return None,
        };

        Some(elems.iter().filter_map(|elem| match elem {
            OwnedTerm::Tuple(kv) if kv.len() == 2 && Self::is_valid_proplist_key(&kv[0]) => {
                Some((&kv[0], &kv[1]))
            }
            _ => None,
        }))
    }

    /// Looks up a 2-tuple `{key, value}` entry by atom key name in a proplist.
    pub fn proplist_get_atom_key(&self, key: &str) -> Option<&OwnedTerm> {
        self.proplist_iter()?.find_map(|(k, v)| match k {
            OwnedTerm::Atom(a) if a.as_str() == key => Some(v),
            _ => None,
        })
    }

    /// Looks up a value by atom key in a `Map`.
    pub fn map_get_atom_key(&self, key: &str) -> Option<&OwnedTerm> {
        let map = self.as_map()?;
        map.iter().find_map(|(k, v)| match k {
            OwnedTerm::Atom(a) if a.as_str() == key => Some(v),
            _ => None,
        })
    }
}

impl From<&OwnedTerm> for OwnedTerm {
    fn from(term: &OwnedTerm) -> Self {
        term.clone()
    }
}
