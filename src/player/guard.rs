use std::cell::Cell;
use std::rc::Rc;

/// Marks a stretch of work as internally driven.
///
/// While a [`ReentrancyGuard`] is alive, index changes are treated as the
/// result of a device-driven advance: the device is already positioned, so
/// they must not trigger another reconciliation or a user-seek reload.
///
/// The flag is shared with the guard rather than borrowed so the owner can
/// keep mutating itself inside the scope.
#[derive(Debug, Default, Clone)]
pub struct Reentrancy {
    active: Rc<Cell<bool>>,
}

impl Reentrancy {
    /// Enter the internal scope. Returns `None` if already inside one.
    pub fn enter(&self) -> Option<ReentrancyGuard> {
        if self.active.replace(true) {
            return None;
        }
        Some(ReentrancyGuard {
            active: Rc::clone(&self.active),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Releases the internal scope when dropped.
#[derive(Debug)]
pub struct ReentrancyGuard {
    active: Rc<Cell<bool>>,
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.active.set(false);
    }
}
