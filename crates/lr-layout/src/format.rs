use std::fmt;
use std::str::FromStr;

use crate::error::LayoutError;
use crate::scheme::{BlockedAxis, Scheme};

// Logical axis positions.
const N: usize = 0;
const C: usize = 1;
const O: usize = 0;
const I: usize = 1;
const H: usize = 2;
const W: usize = 3;

const NCHW: [usize; 4] = [N, C, H, W];
const OIHW: [usize; 4] = [O, I, H, W];
const IOHW: [usize; 4] = [I, O, H, W];
const OHWI: [usize; 4] = [O, H, W, I];

/// Named memory formats.
///
/// Lowercase letters are plain axes, uppercase letters are the block index of
/// a blocked axis, and a trailing `<size><axis>` group lists the in-block
/// offsets from outermost to innermost. For weights, `g` is the group axis,
/// `o` output channels and `i` input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    X,
    Nc,
    Oi,
    Io,
    Nchw,
    Nhwc,
    Chwn,
    NChw8c,
    NChw16c,
    Oihw,
    Ihwo,
    Hwio,
    Ohwi8o,
    Ohwi16o,
    Oihw16o,
    OIhw8i8o,
    OIhw8o8i,
    OIhw16i16o,
    OIhw16o16i,
    IOhw16o16i,
    OIhw8i16o2i,
    OIhw8o16i2o,
    OIhw4i16o4i,
    Goihw,
    Hwigo,
    GOIhw8i8o,
    GOIhw8o8i,
    GOIhw16i16o,
    GOIhw16o16i,
    GIOhw16o16i,
    GOihw16o,
    GOhwi16o,
    GOIhw8i16o2i,
    GOIhw8o16i2o,
    GOIhw4i16o4i,
    Goihw8g,
}

impl FormatTag {
    pub const ALL: [FormatTag; 36] = [
        FormatTag::X,
        FormatTag::Nc,
        FormatTag::Oi,
        FormatTag::Io,
        FormatTag::Nchw,
        FormatTag::Nhwc,
        FormatTag::Chwn,
        FormatTag::NChw8c,
        FormatTag::NChw16c,
        FormatTag::Oihw,
        FormatTag::Ihwo,
        FormatTag::Hwio,
        FormatTag::Ohwi8o,
        FormatTag::Ohwi16o,
        FormatTag::Oihw16o,
        FormatTag::OIhw8i8o,
        FormatTag::OIhw8o8i,
        FormatTag::OIhw16i16o,
        FormatTag::OIhw16o16i,
        FormatTag::IOhw16o16i,
        FormatTag::OIhw8i16o2i,
        FormatTag::OIhw8o16i2o,
        FormatTag::OIhw4i16o4i,
        FormatTag::Goihw,
        FormatTag::Hwigo,
        FormatTag::GOIhw8i8o,
        FormatTag::GOIhw8o8i,
        FormatTag::GOIhw16i16o,
        FormatTag::GOIhw16o16i,
        FormatTag::GIOhw16o16i,
        FormatTag::GOihw16o,
        FormatTag::GOhwi16o,
        FormatTag::GOIhw8i16o2i,
        FormatTag::GOIhw8o16i2o,
        FormatTag::GOIhw4i16o4i,
        FormatTag::Goihw8g,
    ];

    /// Conventional name of the format, e.g. `nChw8c` or `gOIhw8i16o2i`.
    pub fn name(&self) -> &'static str {
        match self {
            FormatTag::X => "x",
            FormatTag::Nc => "nc",
            FormatTag::Oi => "oi",
            FormatTag::Io => "io",
            FormatTag::Nchw => "nchw",
            FormatTag::Nhwc => "nhwc",
            FormatTag::Chwn => "chwn",
            FormatTag::NChw8c => "nChw8c",
            FormatTag::NChw16c => "nChw16c",
            FormatTag::Oihw => "oihw",
            FormatTag::Ihwo => "ihwo",
            FormatTag::Hwio => "hwio",
            FormatTag::Ohwi8o => "Ohwi8o",
            FormatTag::Ohwi16o => "Ohwi16o",
            FormatTag::Oihw16o => "Oihw16o",
            FormatTag::OIhw8i8o => "OIhw8i8o",
            FormatTag::OIhw8o8i => "OIhw8o8i",
            FormatTag::OIhw16i16o => "OIhw16i16o",
            FormatTag::OIhw16o16i => "OIhw16o16i",
            FormatTag::IOhw16o16i => "IOhw16o16i",
            FormatTag::OIhw8i16o2i => "OIhw8i16o2i",
            FormatTag::OIhw8o16i2o => "OIhw8o16i2o",
            FormatTag::OIhw4i16o4i => "OIhw4i16o4i",
            FormatTag::Goihw => "goihw",
            FormatTag::Hwigo => "hwigo",
            FormatTag::GOIhw8i8o => "gOIhw8i8o",
            FormatTag::GOIhw8o8i => "gOIhw8o8i",
            FormatTag::GOIhw16i16o => "gOIhw16i16o",
            FormatTag::GOIhw16o16i => "gOIhw16o16i",
            FormatTag::GIOhw16o16i => "gIOhw16o16i",
            FormatTag::GOihw16o => "gOihw16o",
            FormatTag::GOhwi16o => "gOhwi16o",
            FormatTag::GOIhw8i16o2i => "gOIhw8i16o2i",
            FormatTag::GOIhw8o16i2o => "gOIhw8o16i2o",
            FormatTag::GOIhw4i16o4i => "gOIhw4i16o4i",
            FormatTag::Goihw8g => "Goihw8g",
        }
    }

    /// Lowers the tag to its parametric storage scheme.
    pub fn scheme(&self) -> Scheme {
        match self {
            FormatTag::X => dense(&[0]),
            FormatTag::Nc | FormatTag::Oi => dense(&[0, 1]),
            FormatTag::Io => dense(&[1, 0]),
            FormatTag::Nchw | FormatTag::Oihw => dense(&NCHW),
            FormatTag::Nhwc => dense(&[N, H, W, C]),
            FormatTag::Chwn => dense(&[C, H, W, N]),
            FormatTag::Ihwo => dense(&[I, H, W, O]),
            FormatTag::Hwio => dense(&[H, W, I, O]),
            FormatTag::NChw8c => blocked(&NCHW, C, 8),
            FormatTag::NChw16c => blocked(&NCHW, C, 16),
            FormatTag::Ohwi8o => blocked(&OHWI, O, 8),
            FormatTag::Ohwi16o => blocked(&OHWI, O, 16),
            FormatTag::Oihw16o => blocked(&OIHW, O, 16),
            FormatTag::OIhw8i8o => dual(&OIHW, (I, 8), (O, 8)),
            FormatTag::OIhw8o8i => dual(&OIHW, (O, 8), (I, 8)),
            FormatTag::OIhw16i16o => dual(&OIHW, (I, 16), (O, 16)),
            FormatTag::OIhw16o16i => dual(&OIHW, (O, 16), (I, 16)),
            FormatTag::IOhw16o16i => dual(&IOHW, (O, 16), (I, 16)),
            FormatTag::OIhw8i16o2i => interleaved(&OIHW, (I, 16), (O, 16), 2),
            FormatTag::OIhw8o16i2o => interleaved(&OIHW, (O, 16), (I, 16), 2),
            FormatTag::OIhw4i16o4i => interleaved(&OIHW, (I, 16), (O, 16), 4),
            // g=0, then o, i, h, w shifted by one
            FormatTag::Goihw => dense(&[0, 1, 2, 3, 4]),
            FormatTag::Hwigo => dense(&[3, 4, 2, 0, 1]),
            FormatTag::GOIhw8i8o => grouped(FormatTag::OIhw8i8o),
            FormatTag::GOIhw8o8i => grouped(FormatTag::OIhw8o8i),
            FormatTag::GOIhw16i16o => grouped(FormatTag::OIhw16i16o),
            FormatTag::GOIhw16o16i => grouped(FormatTag::OIhw16o16i),
            FormatTag::GIOhw16o16i => grouped(FormatTag::IOhw16o16i),
            FormatTag::GOihw16o => grouped(FormatTag::Oihw16o),
            FormatTag::GOhwi16o => grouped(FormatTag::Ohwi16o),
            FormatTag::GOIhw8i16o2i => grouped(FormatTag::OIhw8i16o2i),
            FormatTag::GOIhw8o16i2o => grouped(FormatTag::OIhw8o16i2o),
            FormatTag::GOIhw4i16o4i => grouped(FormatTag::OIhw4i16o4i),
            FormatTag::Goihw8g => Scheme::Grouped {
                group_block: Some(8),
                inner: Box::new(dense(&OIHW)),
            },
        }
    }

    /// Number of logical dimensions a tensor in this format has.
    pub fn ndims(&self) -> usize {
        self.scheme().ndims()
    }
}

fn dense(order: &[usize]) -> Scheme {
    Scheme::Dense {
        order: order.to_vec(),
    }
}

fn blocked(order: &[usize], axis: usize, block: usize) -> Scheme {
    Scheme::Blocked {
        order: order.to_vec(),
        axis,
        block,
    }
}

fn dual(order: &[usize], first: (usize, usize), second: (usize, usize)) -> Scheme {
    Scheme::DualBlocked {
        order: order.to_vec(),
        first: BlockedAxis::new(first.0, first.1),
        second: BlockedAxis::new(second.0, second.1),
    }
}

fn interleaved(order: &[usize], split: (usize, usize), other: (usize, usize), k: usize) -> Scheme {
    Scheme::Interleaved {
        order: order.to_vec(),
        split: BlockedAxis::new(split.0, split.1),
        other: BlockedAxis::new(other.0, other.1),
        k,
    }
}

fn grouped(inner: FormatTag) -> Scheme {
    Scheme::Grouped {
        group_block: None,
        inner: Box::new(inner.scheme()),
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FormatTag {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatTag::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| LayoutError::UnknownFormat(s.to_string()))
    }
}

impl From<FormatTag> for Scheme {
    fn from(tag: FormatTag) -> Self {
        tag.scheme()
    }
}
