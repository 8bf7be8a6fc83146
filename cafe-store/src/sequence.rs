use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::warn;

/// Reservations kept for UPI payments that may still be confirmed. Older
/// ones (abandoned QR codes) are forgotten first.
pub const MAX_OUTSTANDING_RESERVATIONS: usize = 512;

/// The single generator of order numbers.
///
/// Numbers are handed out in increasing order and never reused. A number
/// reserved for a UPI QR code is honoured once when that order is
/// submitted; anything else submitted gets a fresh number.
#[derive(Debug)]
pub struct OrderNumberAllocator {
    state: Mutex<AllocatorState>,
}

#[derive(Debug)]
struct AllocatorState {
    next: u64,
    reserved: BTreeSet<u64>,
}

impl OrderNumberAllocator {
    pub fn new(first: u64) -> Self {
        Self {
            state: Mutex::new(AllocatorState {
                next: first,
                reserved: BTreeSet::new(),
            }),
        }
    }

    /// Continue after the highest number already in history
    pub fn seeded(first: u64, used: impl IntoIterator<Item = u64>) -> Self {
        let next = used.into_iter().max().map_or(first, |max| first.max(max + 1));
        Self::new(next)
    }

    /// Hand out a number to show on a QR code before the order exists.
    /// `requested` is kept when it is still reserved (a regenerated QR).
    pub fn reserve(&self, requested: Option<u64>) -> u64 {
        let mut state = self.lock();

        if let Some(number) = requested {
            if state.reserved.contains(&number) {
                return number;
            }
            warn!("Order number {} is not reserved; reserving a new one", number);
        }

        let number = state.next;
        state.next += 1;
        state.reserved.insert(number);

        while state.reserved.len() > MAX_OUTSTANDING_RESERVATIONS {
            if let Some(stale) = state.reserved.pop_first() {
                warn!("Reservation for order number {} expired unused", stale);
            }
        }
        number
    }

    /// Final number for an order being persisted
    pub fn claim(&self, requested: Option<u64>) -> u64 {
        let mut state = self.lock();

        if let Some(number) = requested {
            if state.reserved.remove(&number) {
                return number;
            }
            warn!("Order number {} was not reserved here; assigning a new one", number);
        }

        let number = state.next;
        state.next += 1;
        number
    }

    pub fn peek_next(&self) -> u64 {
        self.lock().next
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AllocatorState> {
        // Plain counters: still consistent after a poisoning panic.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
