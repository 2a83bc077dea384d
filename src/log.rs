#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)+);
    };
}

macro_rules! info {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)+);
    };
}

macro_rules! warn_ {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)+);
    };
}

pub(crate) use debug;
pub(crate) use info;
pub(crate) use warn_ as warn;
