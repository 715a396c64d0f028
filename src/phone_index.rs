//! Phone-number duplicate detection.
//!
//! [`binary_search_phone`] expects its input sorted ascending by phone.
//! [`phone_exists`] builds that sorted view itself, so callers can pass the
//! store contents in whatever order they were loaded.

use crate::store::Contact;

/// Outcome of a phone lookup. `index` is the position in the searched slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub found: bool,
    pub index: Option<usize>,
}

impl Lookup {
    const MISSING: Lookup = Lookup {
        found: false,
        index: None,
    };
}

/// Binary search over contacts sorted ascending by `phone`.
pub fn binary_search_phone<C: AsRef<Contact>>(sorted: &[C], phone: u64) -> Lookup {
    let mut lo = 0;
    let mut hi = sorted.len();

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let current = sorted[mid].as_ref().phone;
        if current == phone {
            return Lookup {
                found: true,
                index: Some(mid),
            };
        } else if current < phone {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    Lookup::MISSING
}

/// Borrowed view of `contacts` ordered by phone.
pub fn sorted_by_phone(contacts: &[Contact]) -> Vec<&Contact> {
    let mut view: Vec<&Contact> = contacts.iter().collect();
    view.sort_by_key(|c| c.phone);
    view
}

/// Whether any of `contacts` uses `phone`, regardless of their order.
pub fn phone_exists(contacts: &[Contact], phone: u64) -> bool {
    binary_search_phone(&sorted_by_phone(contacts), phone).found
}

/// The contact holding `phone`, if any.
pub fn phone_owner(contacts: &[Contact], phone: u64) -> Option<&Contact> {
    let sorted = sorted_by_phone(contacts);
    binary_search_phone(&sorted, phone).index.map(|i| sorted[i])
}

impl AsRef<Contact> for Contact {
    fn as_ref(&self) -> &Contact {
        self
    }
}
