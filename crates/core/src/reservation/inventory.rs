//! Seat inventory arithmetic and lock ordering.

use navette_shared::types::TripId;

/// Trip ids in the order their rows must be locked: ascending, deduplicated.
#[must_use]
pub fn lock_order(trip_ids: impl IntoIterator<Item = TripId>) -> Vec<TripId> {
    let mut ids: Vec<TripId> = trip_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Seats left after selling `count`, or `None` if not enough remain.
#[must_use]
pub const fn take_seats(available: u32, count: u32) -> Option<u32> {
    available.checked_sub(count)
}

/// Result of giving seats back to a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRestore {
    /// New `available_seats_pax`.
    pub available: u32,
    /// True if the restore hit the ship's capacity.
    pub clamped: bool,
}

/// Gives `count` seats back, never exceeding `capacity`.
#[must_use]
pub const fn restore_seats(available: u32, capacity: u32, count: u32) -> SeatRestore {
    let raw = available.saturating_add(count);
    if raw > capacity {
        SeatRestore {
            available: capacity,
            clamped: true,
        }
    } else {
        SeatRestore {
            available: raw,
            clamped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_order_sorts_and_dedups() {
        let a = TripId::from_uuid(uuid::Uuid::from_u128(1));
        let b = TripId::from_uuid(uuid::Uuid::from_u128(2));
        assert_eq!(lock_order([b, a, b]), vec![a, b]);
    }

    #[test]
    fn test_take_seats() {
        assert_eq!(take_seats(10, 1), Some(9));
        assert_eq!(take_seats(3, 3), Some(0));
        assert_eq!(take_seats(2, 3), None);
    }

    #[test]
    fn test_restore_clamps_at_capacity() {
        assert_eq!(
            restore_seats(8, 10, 2),
            SeatRestore {
                available: 10,
                clamped: false
            }
        );
        assert_eq!(
            restore_seats(9, 10, 3),
            SeatRestore {
                available: 10,
                clamped: true
            }
        );
    }
}
