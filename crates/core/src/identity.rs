//! Which person's chart is active.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::person::{FamilyMember, Person};
use crate::types::DbId;

/// Token selecting whose chart a page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// The signed-in account holder.
    #[default]
    Me,
    /// A family member by backend id.
    Member(DbId),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Me => f.write_str("me"),
            Self::Member(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for Selection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("me") {
            return Ok(Self::Me);
        }
        s.parse::<DbId>()
            .map(Self::Member)
            .map_err(|_| CoreError::InvalidSelection(s.to_string()))
    }
}

/// The people a selection can refer to: the account holder (once fetched)
/// and their family members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    pub current_user: Option<Person>,
    pub members: Vec<FamilyMember>,
}

impl Directory {
    pub fn new(current_user: Option<Person>, members: Vec<FamilyMember>) -> Self {
        Self {
            current_user,
            members,
        }
    }

    pub fn resolve(&self, selection: Selection) -> Option<&Person> {
        resolve(selection, self.current_user.as_ref(), &self.members)
    }

    /// Selector label: `"{name} (Result)"` for the account holder,
    /// the plain name for a family member.
    pub fn label(&self, selection: Selection) -> Option<String> {
        let person = self.resolve(selection)?;
        Some(match selection {
            Selection::Me => format!("{} (Result)", person.name),
            Selection::Member(_) => person.name.clone(),
        })
    }
}

/// Resolve a selection to a person.
///
/// `Me` yields the account person when it has been fetched. An unknown
/// member id yields `None`; callers render an empty state for it.
pub fn resolve<'a>(
    selection: Selection,
    current_user: Option<&'a Person>,
    members: &'a [FamilyMember],
) -> Option<&'a Person> {
    match selection {
        Selection::Me => current_user,
        Selection::Member(id) => members.iter().find(|m| m.id == id).map(|m| &m.person),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: DbId, name: &str) -> FamilyMember {
        FamilyMember {
            id,
            user_id: Some(1),
            relationship: Some("Sibling".into()),
            gender: None,
            person: Person {
                name: name.into(),
                ..Person::default()
            },
        }
    }

    fn directory() -> Directory {
        Directory::new(
            Some(Person {
                name: "Asha".into(),
                ..Person::default()
            }),
            vec![member(3, "Ravi"), member(5, "Mira")],
        )
    }

    #[test]
    fn me_resolves_to_current_user() {
        let dir = directory();
        assert_eq!(dir.resolve(Selection::Me).map(|p| p.name.as_str()), Some("Asha"));
    }

    #[test]
    fn member_resolves_by_id() {
        let dir = directory();
        assert_eq!(
            dir.resolve(Selection::Member(5)).map(|p| p.name.as_str()),
            Some("Mira")
        );
    }

    #[test]
    fn unknown_member_resolves_to_none() {
        assert!(directory().resolve(Selection::Member(42)).is_none());
    }

    #[test]
    fn me_without_fetched_user_resolves_to_none() {
        assert!(resolve(Selection::Me, None, &[]).is_none());
    }

    #[test]
    fn selection_parses_me_and_ids() {
        assert_eq!("me".parse::<Selection>().unwrap(), Selection::Me);
        assert_eq!("ME".parse::<Selection>().unwrap(), Selection::Me);
        assert_eq!("42".parse::<Selection>().unwrap(), Selection::Member(42));
        assert!("someone".parse::<Selection>().is_err());
        assert_eq!(Selection::Member(7).to_string(), "7");
    }

    #[test]
    fn labels_mark_the_account_holder() {
        let dir = directory();
        assert_eq!(dir.label(Selection::Me).as_deref(), Some("Asha (Result)"));
        assert_eq!(dir.label(Selection::Member(3)).as_deref(), Some("Ravi"));
        assert_eq!(dir.label(Selection::Member(9)), None);
    }
}
