// Tagged leaf/child discrimination for the flattened CHT table.
//
// The source distinguishes a leaf position from a child-node index by the
// top bit of a 32-bit word. Per the Design Notes, the builder and lookup
// code operate on this `Slot` abstraction; only `pack`/`unpack` know about
// the bit layout.

const LEAF_FLAG: u32 = 1 << 31;
const VALUE_MASK: u32 = !LEAF_FLAG;

/// A single entry in a CHT node's bin array: either a leaf pointing at a
/// starting position in the sorted key array, or a pointer to a child node
/// in the flattened table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Leaf(u32),
    Child(u32),
}

impl Slot {
    #[inline]
    pub fn pack(self) -> u32 {
        match self {
            Slot::Leaf(pos) => {
                debug_assert!(pos & LEAF_FLAG == 0, "leaf position {pos} overflows 31 bits");
                pos | LEAF_FLAG
            }
            Slot::Child(idx) => {
                debug_assert!(idx & LEAF_FLAG == 0, "child index {idx} overflows 31 bits");
                idx
            }
        }
    }

    #[inline]
    pub fn unpack(word: u32) -> Slot {
        if word & LEAF_FLAG != 0 {
            Slot::Leaf(word & VALUE_MASK)
        } else {
            Slot::Child(word)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_leaf() {
        let slot = Slot::Leaf(123_456);
        assert_eq!(Slot::unpack(slot.pack()), slot);
    }

    #[test]
    fn round_trips_child() {
        let slot = Slot::Child(7);
        assert_eq!(Slot::unpack(slot.pack()), slot);
    }

    #[test]
    fn leaf_and_child_zero_are_distinguishable() {
        assert_eq!(Slot::unpack(Slot::Leaf(0).pack()), Slot::Leaf(0));
        assert_eq!(Slot::unpack(Slot::Child(0).pack()), Slot::Child(0));
        assert_ne!(Slot::Leaf(0).pack(), Slot::Child(0).pack());
    }
}
