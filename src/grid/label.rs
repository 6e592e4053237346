use crate::error::GridError;

/// Label of a cell outside the object.
pub const VOXEL_EMPTY: u16 = 0;

/// Label of an interior cell not yet assigned to any fragment.
pub const VOXEL_FREE: u16 = 1;

/// Bit of the packed label reserved for the boundary marker.
const MASK_POSITION: u32 = 15;
const BOUNDARY_BIT: u16 = 1 << MASK_POSITION;

/// Largest cluster id a cell can carry.
pub const MAX_CELL_ID: u16 = BOUNDARY_BIT - 1;

/// Content of one voxel: a cluster id plus the transient boundary marker.
///
/// `0` is empty, `1` is free interior and anything from `2` up is a
/// fragment. The marker is only packed into the high bit when the label
/// crosses the crate boundary ([`CellLabel::to_bits`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellLabel {
    id: u16,
    boundary: bool,
}

impl CellLabel {
    /// A cell outside the object.
    pub const EMPTY: Self = Self {
        id: VOXEL_EMPTY,
        boundary: false,
    };

    /// An interior cell with no fragment assigned.
    pub const FREE: Self = Self {
        id: VOXEL_FREE,
        boundary: false,
    };

    /// Creates an unmarked label with the given cluster id.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LabelOutOfRange`] if `id` collides with the
    /// boundary bit.
    pub fn new(id: u32) -> Result<Self, GridError> {
        u16::try_from(id)
            .ok()
            .filter(|&id| id <= MAX_CELL_ID)
            .map(|id| Self {
                id,
                boundary: false,
            })
            .ok_or(GridError::LabelOutOfRange(id))
    }

    /// Cluster id without the boundary marker.
    #[must_use]
    pub fn id(self) -> u16 {
        self.id
    }

    #[must_use]
    pub fn is_boundary(self) -> bool {
        self.boundary
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.id == VOXEL_EMPTY
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    /// Returns a copy with the boundary marker set to `boundary`.
    #[must_use]
    pub fn with_boundary(self, boundary: bool) -> Self {
        Self { boundary, ..self }
    }

    /// Returns the label with the boundary marker cleared.
    #[must_use]
    pub fn unmask(self) -> Self {
        self.with_boundary(false)
    }

    /// Packs the label into its 16-bit interchange form.
    #[must_use]
    pub fn to_bits(self) -> u16 {
        if self.boundary {
            self.id | BOUNDARY_BIT
        } else {
            self.id
        }
    }

    /// Unpacks a 16-bit interchange label.
    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        Self {
            id: bits & MAX_CELL_ID,
            boundary: bits & BOUNDARY_BIT != 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reserved_labels() {
        assert!(CellLabel::EMPTY.is_empty());
        assert!(CellLabel::FREE.is_occupied());
        assert_eq!(CellLabel::default(), CellLabel::EMPTY);
    }

    #[test]
    fn new_rejects_boundary_bit() {
        assert!(CellLabel::new(u32::from(MAX_CELL_ID)).is_ok());
        assert!(matches!(
            CellLabel::new(0x8000),
            Err(GridError::LabelOutOfRange(0x8000))
        ));
        assert!(CellLabel::new(70_000).is_err());
    }

    #[test]
    fn packed_form_uses_high_bit() {
        let label = CellLabel::new(42).unwrap().with_boundary(true);
        assert_eq!(label.to_bits(), 42 | 0x8000);
        assert_eq!(CellLabel::from_bits(label.to_bits()), label);
        assert_eq!(label.unmask().to_bits(), 42);
        assert_eq!(label.id(), 42);
    }
}
