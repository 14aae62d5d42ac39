//! Static reference data consumed by validation and chain routing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::Gender;

/// Leave types offered by the university. Serialized ids double as leave-balance keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
    Maternity,
    Paternity,
    Medical,
    Unpaid,
}

impl LeaveType {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Annual,
            Self::Sick,
            Self::Casual,
            Self::Maternity,
            Self::Paternity,
            Self::Medical,
            Self::Unpaid,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Sick => "sick",
            Self::Casual => "casual",
            Self::Maternity => "maternity",
            Self::Paternity => "paternity",
            Self::Medical => "medical",
            Self::Unpaid => "unpaid",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Annual => "Annual Leave",
            Self::Sick => "Sick Leave",
            Self::Casual => "Casual Leave",
            Self::Maternity => "Maternity Leave",
            Self::Paternity => "Paternity Leave",
            Self::Medical => "Medical Leave",
            Self::Unpaid => "Unpaid Leave",
        }
    }

    /// Yearly entitlement in days; `None` for types that are not balance-tracked.
    pub const fn default_allowance(self) -> Option<u32> {
        match self {
            Self::Annual => Some(20),
            Self::Sick => Some(12),
            Self::Casual => Some(10),
            Self::Maternity => Some(90),
            Self::Paternity => Some(7),
            Self::Medical => Some(30),
            Self::Unpaid => None,
        }
    }
}

/// Opening balance for a newly registered employee.
pub fn default_leave_balance(gender: Gender) -> BTreeMap<LeaveType, u32> {
    LeaveType::ordered()
        .into_iter()
        .filter(|kind| match kind {
            LeaveType::Maternity => gender == Gender::Female,
            LeaveType::Paternity => gender == Gender::Male,
            _ => true,
        })
        .filter_map(|kind| kind.default_allowance().map(|days| (kind, days)))
        .collect()
}

/// Academic designations in promotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Designation {
    #[serde(rename = "Lecturer")]
    Lecturer,
    #[serde(rename = "Senior Lecturer")]
    SeniorLecturer,
    #[serde(rename = "Assistant Professor")]
    AssistantProfessor,
    #[serde(rename = "Associate Professor")]
    AssociateProfessor,
    #[serde(rename = "Professor")]
    Professor,
}

impl Designation {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Lecturer,
            Self::SeniorLecturer,
            Self::AssistantProfessor,
            Self::AssociateProfessor,
            Self::Professor,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lecturer => "Lecturer",
            Self::SeniorLecturer => "Senior Lecturer",
            Self::AssistantProfessor => "Assistant Professor",
            Self::AssociateProfessor => "Associate Professor",
            Self::Professor => "Professor",
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::Lecturer => 0,
            Self::SeniorLecturer => 1,
            Self::AssistantProfessor => 2,
            Self::AssociateProfessor => 3,
            Self::Professor => 4,
        }
    }

    /// Next step on the promotion path, if any.
    pub fn next(self) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|candidate| candidate.rank() == self.rank() + 1)
    }

    pub fn outranks(self, other: Self) -> bool {
        self.rank() > other.rank()
    }
}

/// Faculty to department mapping.
pub const FACULTIES: &[(&str, &[&str])] = &[
    ("Computing", &["CS", "SE", "AI"]),
    ("Engineering", &["EE", "ME", "CE"]),
    ("Management Sciences", &["BBA", "Accounting & Finance"]),
    ("Health Sciences", &["Nursing", "Pharmacy"]),
];

pub fn faculty_of(department: &str) -> Option<&'static str> {
    FACULTIES
        .iter()
        .find(|(_, departments)| {
            departments
                .iter()
                .any(|name| name.eq_ignore_ascii_case(department))
        })
        .map(|(faculty, _)| *faculty)
}
