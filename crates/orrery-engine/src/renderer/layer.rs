/// Logical render layer. A node can sit on several at once through a `LayerMask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RenderLayer {
    /// Everything that takes part in the fully lit pass.
    Entire = 0,
    /// Self-luminous geometry picked up by the emissive (bloom) pass.
    Bloom = 1,
}

impl RenderLayer {
    pub const COUNT: usize = 2;

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Entire),
            1 => Some(Self::Bloom),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn mask(self) -> LayerMask {
        LayerMask(1 << self.as_u8())
    }
}

/// Bit set of render layers, tested against a pass's camera mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ENTIRE: Self = Self(1 << RenderLayer::Entire as u8);
    pub const BLOOM: Self = Self(1 << RenderLayer::Bloom as u8);
    /// Lit and glowing: drawn by both passes.
    pub const EMISSIVE: Self = Self(Self::ENTIRE.0 | Self::BLOOM.0);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}
