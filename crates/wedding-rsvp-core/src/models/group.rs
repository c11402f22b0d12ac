use super::guest::{Guest, GuestId};

/// Identifies a group in a search result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Named(String),
    /// A guest without a group label forms their own group.
    Individual(GuestId),
}

/// Guests confirmed together. Derived on every search, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum GuestGroup {
    Named { label: String, guests: Vec<Guest> },
    Individual(Guest),
}

impl GuestGroup {
    pub fn key(&self) -> GroupKey {
        match self {
            GuestGroup::Named { label, .. } => GroupKey::Named(label.clone()),
            GuestGroup::Individual(guest) => GroupKey::Individual(guest.id.clone()),
        }
    }

    /// Display title; for an individual, the guest's name.
    pub fn title(&self) -> &str {
        match self {
            GuestGroup::Named { label, .. } => label,
            GuestGroup::Individual(guest) => &guest.name,
        }
    }

    pub fn members(&self) -> &[Guest] {
        match self {
            GuestGroup::Named { guests, .. } => guests,
            GuestGroup::Individual(guest) => std::slice::from_ref(guest),
        }
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    pub fn is_individual(&self) -> bool {
        matches!(self, GuestGroup::Individual(_))
    }
}

/// Group an already-ordered guest list by label, keeping first-seen order.
/// Label-less guests each become an individual group.
pub fn group_by_label(guests: &[Guest]) -> Vec<GuestGroup> {
    let mut groups: Vec<GuestGroup> = Vec::new();
    for guest in guests {
        match guest.group_label() {
            Some(label) => {
                let existing = groups.iter_mut().find_map(|g| match g {
                    GuestGroup::Named { label: l, guests } if l == label => Some(guests),
                    _ => None,
                });
                match existing {
                    Some(members) => members.push(guest.clone()),
                    None => groups.push(GuestGroup::Named {
                        label: label.to_string(),
                        guests: vec![guest.clone()],
                    }),
                }
            }
            None => groups.push(GuestGroup::Individual(guest.clone())),
        }
    }
    groups
}
