use std::fmt;

use serde::{Deserialize, Serialize};

/// The three CRM entity kinds handled by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityKind {
    /// An organization.
    Company,
    /// A person, usually affiliated with a company.
    Contact,
    /// A deal in the sales pipeline.
    Opportunity,
}

impl EntityKind {
    /// All kinds, in report order.
    pub const ALL: [Self; 3] = [Self::Company, Self::Contact, Self::Opportunity];

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Contact => "contact",
            Self::Opportunity => "opportunity",
        }
    }

    /// Prefix used for generated record ids.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Company => "comp",
            Self::Contact => "cont",
            Self::Opportunity => "opp",
        }
    }
}

impl TryFrom<String> for EntityKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("company") {
            Ok(Self::Company)
        } else if value.eq_ignore_ascii_case("contact") {
            Ok(Self::Contact)
        } else if value.eq_ignore_ascii_case("opportunity") {
            Ok(Self::Opportunity)
        } else {
            Err(format!(
                "unknown entity kind: {value}. Use one of company, contact, opportunity"
            ))
        }
    }
}

impl From<EntityKind> for String {
    fn from(value: EntityKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
