// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column conversions for types SQLite has no native representation for.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

/// Read a TEXT column and parse it with `FromStr`.
///
/// Used for addresses, 256-bit integers, and enum tags.
pub(crate) fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
