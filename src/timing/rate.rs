use std::num::NonZeroU32;

use super::Rate;

impl From<i32> for Rate {
    fn from(hz: i32) -> Self {
        if hz < 0 {
            return Rate::Stop;
        }
        NonZeroU32::new(hz.unsigned_abs()).map_or(Rate::Keep, Rate::Hz)
    }
}

impl From<u32> for Rate {
    fn from(hz: u32) -> Self {
        NonZeroU32::new(hz).map_or(Rate::Keep, Rate::Hz)
    }
}

impl From<NonZeroU32> for Rate {
    fn from(hz: NonZeroU32) -> Self {
        Rate::Hz(hz)
    }
}
