/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the firmware for error handling

--*/
#![cfg_attr(not(test), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Meridian Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeridianError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: MeridianError = MeridianError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl MeridianError {
    /// Create a meridian error; intended to only be used from const contexts, as
    /// we don't want runtime panics if val is zero. The preferred way to get a
    /// MeridianError from a u32 is to use `MeridianError::try_from()` from the
    /// `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("MeridianError cannot be 0"),
        }
    }

    // Use the macro to define all error constants
    define_error_constants![
        (
            DRIVER_MPU_INVALID_SLOT,
            0x00010001,
            "MPU region slot index out of range"
        ),
        (
            DRIVER_MPU_INVALID_SIZE,
            0x00010002,
            "MPU window size, alignment or decomposition constraint violated"
        ),
        (
            DRIVER_MPU_HARDWARE_ABSENT,
            0x00010003,
            "No MPU present on this part"
        ),
        (
            DRIVER_MPU_UNSUPPORTED,
            0x00010004,
            "MPU capability shape not handled by this firmware"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::MeridianError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::MeridianError(val)
    }
}

impl From<MeridianError> for core::num::NonZeroU32 {
    fn from(val: MeridianError) -> Self {
        val.0
    }
}

impl From<MeridianError> for u32 {
    fn from(val: MeridianError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for MeridianError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(MeridianError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type MeridianResult<T> = Result<T, MeridianError>;
