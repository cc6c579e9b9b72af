use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A single way of flipping a tile when sampling its texture.
///
/// Semantics follow the TMX map format:
/// <http://docs.mapeditor.org/en/latest/reference/tmx-map-format/#tile-flipping>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flip {
    Horizontally,
    Vertically,
    /// Swap of the x and y axes (anti-diagonal flip), i.e. a rotation when
    /// combined with one of the other two.
    Diagonally,
}

impl Flip {
    pub const ALL: [Flip; 3] = [Flip::Horizontally, Flip::Vertically, Flip::Diagonally];

    const fn bit(self) -> u8 {
        match self {
            Flip::Horizontally => 0b001,
            Flip::Vertically => 0b010,
            Flip::Diagonally => 0b100,
        }
    }
}

/// Set of [`Flip`]s applied to a tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlipFlags(u8);

/// TMX global tile id bits.
const GID_FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
const GID_FLIPPED_VERTICALLY: u32 = 0x4000_0000;
const GID_FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
const GID_MASK: u32 =
    !(GID_FLIPPED_HORIZONTALLY | GID_FLIPPED_VERTICALLY | GID_FLIPPED_DIAGONALLY);

impl FlipFlags {
    pub const NONE: FlipFlags = FlipFlags(0);

    pub fn new(flips: &[Flip]) -> Self {
        flips.iter().fold(Self::NONE, |acc, &flip| acc | flip)
    }

    pub fn contains(self, flip: Flip) -> bool {
        self.0 & flip.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, flip: Flip) {
        self.0 |= flip.bit();
    }

    pub fn remove(&mut self, flip: Flip) {
        self.0 &= !flip.bit();
    }

    pub fn with(mut self, flip: Flip) -> Self {
        self.insert(flip);
        self
    }

    pub fn iter(self) -> impl Iterator<Item = Flip> {
        Flip::ALL.into_iter().filter(move |&flip| self.contains(flip))
    }

    /// Split a TMX global tile id into the tileset local tile and its flips.
    ///
    /// A gid of `0` (after masking) is the empty tile. Other gids are made local
    /// by subtracting `first_gid` of the tileset they belong to.
    pub fn from_gid(gid: u32, first_gid: u32) -> (Option<u32>, FlipFlags) {
        let mut flip = FlipFlags::NONE;
        if gid & GID_FLIPPED_HORIZONTALLY != 0 {
            flip.insert(Flip::Horizontally);
        }
        if gid & GID_FLIPPED_VERTICALLY != 0 {
            flip.insert(Flip::Vertically);
        }
        if gid & GID_FLIPPED_DIAGONALLY != 0 {
            flip.insert(Flip::Diagonally);
        }

        let id = gid & GID_MASK;
        if id == 0 || id < first_gid {
            return (None, flip);
        }
        (Some(id - first_gid), flip)
    }
}

impl From<Flip> for FlipFlags {
    fn from(flip: Flip) -> Self {
        FlipFlags(flip.bit())
    }
}

impl BitOr<Flip> for FlipFlags {
    type Output = FlipFlags;
    fn bitor(self, flip: Flip) -> FlipFlags {
        self.with(flip)
    }
}

impl BitOr for Flip {
    type Output = FlipFlags;
    fn bitor(self, other: Flip) -> FlipFlags {
        FlipFlags::from(self).with(other)
    }
}

impl BitOrAssign<Flip> for FlipFlags {
    fn bitor_assign(&mut self, flip: Flip) {
        self.insert(flip);
    }
}

impl fmt::Debug for FlipFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
