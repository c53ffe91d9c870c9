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

//! Codec for the Erlang External Term Format (ETF), the wire format used
//! by the Erlang Distribution Protocol and by `term_to_binary/1` /
//! `binary_to_term/1`.
//!
//! [`OwnedTerm`] is the term representation most callers build and match
//! against. [`BorrowedTerm`] mirrors it for zero-copy decoding out of a
//! buffer that outlives the term.

pub mod borrowed;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod tags;
pub mod term;
pub mod types;

pub use borrowed::BorrowedTerm;
pub use decoder::{decode, decode_borrowed, decode_raw_term, decode_with_trailing, DecodeOptions};
pub use encoder::{encode, encode_to_writer};
pub use errors::{
    ContextualDecodeError, DecodeError, EncodeError, Error, ParsingContext, PathSegment,
    TermConversionError,
};
pub use term::OwnedTerm;
pub use types::{Atom, BigInt, ExternalFun, ExternalPid, ExternalPort, ExternalReference, InternalFun, Mfa, Sign};

/// Builds an [`OwnedTerm::Atom`] from a literal or expression.
///
/// ```
/// use erltf::erl_atom;
/// let t = erl_atom!("ok");
/// ```
#[macro_export]
macro_rules! erl_atom {
    ($name:expr) => {
        $crate::OwnedTerm::atom($name)
    };
}

/// Builds an [`OwnedTerm::Integer`].
#[macro_export]
macro_rules! erl_int {
    ($value:expr) => {
        $crate::OwnedTerm::integer($value as i64)
    };
}

/// Builds an [`OwnedTerm::List`] (or `Nil` for an empty list) from a
/// comma-separated sequence of terms.
///
/// ```
/// use erltf::{erl_list, erl_int};
/// let t = erl_list![erl_int!(1), erl_int!(2), erl_int!(3)];
/// ```
#[macro_export]
macro_rules! erl_list {
    () => {
        $crate::OwnedTerm::Nil
    };
    ($($elem:expr),+ $(,)?) => {
        $crate::OwnedTerm::list(vec![$($elem),+])
    };
}

/// Builds an [`OwnedTerm::Tuple`] from a comma-separated sequence of terms.
#[macro_export]
macro_rules! erl_tuple {
    ($($elem:expr),* $(,)?) => {
        $crate::OwnedTerm::tuple(vec![$($elem),*])
    };
}

/// Builds an [`OwnedTerm::Map`] from `key => value` pairs.
///
/// ```
/// use erltf::{erl_map, erl_atom, erl_int};
/// let t = erl_map!{erl_atom!("a") => erl_int!(1)};
/// ```
#[macro_export]
macro_rules! erl_map {
    () => {
        $crate::OwnedTerm::Map(std::collections::BTreeMap::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::BTreeMap::new();
        $(map.insert($key, $value);)+
        $crate::OwnedTerm::Map(map)
    }};
}
