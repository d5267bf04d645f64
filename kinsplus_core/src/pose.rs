//! Named pose axes and the Cartesian/rotary pose.

/// One of the nine named pose axes: three translations, three rotations,
/// three auxiliary linear/rotary axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    A = 3,
    B = 4,
    C = 5,
    U = 6,
    V = 7,
    W = 8,
}

impl Axis {
    /// Number of named axes.
    pub const COUNT: usize = 9;

    /// Parse a coordinate letter, case-insensitive.
    #[inline]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'x' | 'X' => Some(Self::X),
            'y' | 'Y' => Some(Self::Y),
            'z' | 'Z' => Some(Self::Z),
            'a' | 'A' => Some(Self::A),
            'b' | 'B' => Some(Self::B),
            'c' | 'C' => Some(Self::C),
            'u' | 'U' => Some(Self::U),
            'v' | 'V' => Some(Self::V),
            'w' | 'W' => Some(Self::W),
            _ => None,
        }
    }

    /// Axis index (0..=8).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            3 => Some(Self::A),
            4 => Some(Self::B),
            5 => Some(Self::C),
            6 => Some(Self::U),
            7 => Some(Self::V),
            8 => Some(Self::W),
            _ => None,
        }
    }

    /// Upper-case coordinate letter for this axis.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::U => 'U',
            Self::V => 'V',
            Self::W => 'W',
        }
    }
}

/// A named set of up to nine axis values.
///
/// The mapper writes only the fields of assigned axes; the others stay
/// exactly as the caller supplied them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Pose {
    /// Read the value of a named axis.
    #[inline]
    pub const fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::A => self.a,
            Axis::B => self.b,
            Axis::C => self.c,
            Axis::U => self.u,
            Axis::V => self.v,
            Axis::W => self.w,
        }
    }

    /// Write the value of a named axis.
    #[inline]
    pub const fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
            Axis::A => self.a = value,
            Axis::B => self.b = value,
            Axis::C => self.c = value,
            Axis::U => self.u = value,
            Axis::V => self.v = value,
            Axis::W => self.w = value,
        }
    }
}
