// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Serde helpers for numeric option flags
//!
//! The reference configuration format stores boolean options as the numbers
//! `0` and `1` rather than as booleans. This module converts between the two
//! representations and is plugged into individual fields via
//! `#[serde(with = "serde_utils")]`.

use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8((*flag).into())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match u8::deserialize(deserializer)? {
        0 => Ok(false),
        1 => Ok(true),
        num => Err(D::Error::invalid_value(
            Unexpected::Unsigned(num.into()),
            &"a flag value of 0 or 1",
        )),
    }
}
