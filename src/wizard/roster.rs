use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::Gender;
use super::photo::PhotoAttachment;

/// Stable identifier for a family member, assigned once and never reused,
/// even after the member is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    Child,
}

impl Relationship {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spouse => "Spouse",
            Self::Child => "Child",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: MemberId,
    pub relationship: Relationship,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: String,
    pub gender: Option<Gender>,
    pub country_of_birth: String,
    pub passport_number: String,
    pub passport_expiry: Option<NaiveDate>,
    pub photo: Option<PhotoAttachment>,
}

impl FamilyMember {
    fn blank(id: MemberId, relationship: Relationship) -> Self {
        Self {
            id,
            relationship,
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            place_of_birth: String::new(),
            gender: None,
            country_of_birth: String::new(),
            passport_number: String::new(),
            passport_expiry: None,
            photo: None,
        }
    }

    pub fn full_name(&self) -> String {
        let mut parts = Vec::new();
        for part in [&self.first_name, &self.middle_name, &self.last_name] {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("a spouse record already exists")]
    SpouseAlreadyPresent,
    #[error("no family member with id {0:?}")]
    MemberNotFound(MemberId),
}

/// Maximum size of the child sublist; `set_child_count` clamps to this.
pub const MAX_CHILDREN: usize = 10;

/// The dependent collection, partitioned so that the spouse slot and the
/// child sublist cannot interfere: resizing children never touches the
/// spouse, structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRoster {
    spouse: Option<FamilyMember>,
    children: Vec<FamilyMember>,
    next_id: u64,
}

impl Default for FamilyRoster {
    fn default() -> Self {
        Self {
            spouse: None,
            children: Vec::new(),
            next_id: 1,
        }
    }
}

impl FamilyRoster {
    fn fresh_id(&mut self) -> MemberId {
        let id = MemberId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a fresh spouse record; rejected if one already exists.
    pub fn add_spouse(&mut self) -> Result<&mut FamilyMember, RosterError> {
        if self.spouse.is_some() {
            return Err(RosterError::SpouseAlreadyPresent);
        }
        let id = self.fresh_id();
        Ok(self.spouse.insert(FamilyMember::blank(id, Relationship::Spouse)))
    }

    /// Append a fresh child record to the end of the child sublist.
    pub fn add_child(&mut self) -> &mut FamilyMember {
        let id = self.fresh_id();
        self.children
            .push(FamilyMember::blank(id, Relationship::Child));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Delete by identifier; remaining members keep their ids and order.
    pub fn remove_member(&mut self, id: MemberId) -> Result<FamilyMember, RosterError> {
        match self.spouse.take() {
            Some(spouse) if spouse.id == id => return Ok(spouse),
            other => self.spouse = other,
        }
        match self.children.iter().position(|child| child.id == id) {
            Some(index) => Ok(self.children.remove(index)),
            None => Err(RosterError::MemberNotFound(id)),
        }
    }

    /// Resize the child sublist to exactly `count` entries, clamped to
    /// `[0, MAX_CHILDREN]`. Growing preserves existing children by position
    /// and appends blanks; shrinking is a literal truncation from the end.
    pub fn set_child_count(&mut self, count: usize) {
        let target = count.min(MAX_CHILDREN);
        if target < self.children.len() {
            self.children.truncate(target);
        } else {
            while self.children.len() < target {
                self.add_child();
            }
        }
    }

    pub fn spouse(&self) -> Option<&FamilyMember> {
        self.spouse.as_ref()
    }

    pub fn children(&self) -> &[FamilyMember] {
        &self.children
    }

    pub fn number_of_children(&self) -> usize {
        self.children.len()
    }

    /// Total dependents: spouse (if any) plus children.
    pub fn member_count(&self) -> usize {
        usize::from(self.spouse.is_some()) + self.children.len()
    }

    /// Spouse first, then children in positional order.
    pub fn members(&self) -> impl Iterator<Item = &FamilyMember> {
        self.spouse.iter().chain(self.children.iter())
    }

    pub fn member(&self, id: MemberId) -> Option<&FamilyMember> {
        self.members().find(|member| member.id == id)
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut FamilyMember> {
        self.spouse
            .iter_mut()
            .chain(self.children.iter_mut())
            .find(|member| member.id == id)
    }
}
