use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(CertificateStatus {
    Valid => "valid",
    DueIn12m => "due_in_12m",
    DueIn6m => "due_in_6m",
    Expired => "expired",
});

// Unlike certificate status, this one is chosen by the operator when the
// record is saved and is never recomputed from next_milestone_due.
str_enum!(ApprenticeshipStatus {
    Active => "active",
    Due => "due",
    Expired => "expired",
    Terminated => "terminated",
    Completed => "completed",
});

str_enum!(CourseType {
    WorkerTraining => "worker_training",
    Rls => "rls",
    RsppEmployer => "rspp_employer",
    FireSafety => "fire_safety",
    FirstAid => "first_aid",
    Supervisor => "supervisor",
    Manager => "manager",
    Other => "other",
});

impl CourseType {
    /// Human-readable label for exports and email bodies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::WorkerTraining => "Worker Training",
            Self::Rls => "Workers' Safety Representative",
            Self::RsppEmployer => "Employer Safety Officer",
            Self::FireSafety => "Fire Safety",
            Self::FirstAid => "First Aid",
            Self::Supervisor => "Supervisor",
            Self::Manager => "Manager",
            Self::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn certificate_status_round_trip() {
        for (variant, s) in [
            (CertificateStatus::Valid, "valid"),
            (CertificateStatus::DueIn12m, "due_in_12m"),
            (CertificateStatus::DueIn6m, "due_in_6m"),
            (CertificateStatus::Expired, "expired"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(CertificateStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn apprenticeship_status_round_trip() {
        for (variant, s) in [
            (ApprenticeshipStatus::Active, "active"),
            (ApprenticeshipStatus::Due, "due"),
            (ApprenticeshipStatus::Expired, "expired"),
            (ApprenticeshipStatus::Terminated, "terminated"),
            (ApprenticeshipStatus::Completed, "completed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ApprenticeshipStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn course_type_round_trip() {
        for (variant, s) in [
            (CourseType::WorkerTraining, "worker_training"),
            (CourseType::Rls, "rls"),
            (CourseType::RsppEmployer, "rspp_employer"),
            (CourseType::FireSafety, "fire_safety"),
            (CourseType::FirstAid, "first_aid"),
            (CourseType::Supervisor, "supervisor"),
            (CourseType::Manager, "manager"),
            (CourseType::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(CourseType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(CertificateStatus::from_str("invalid").is_err());
        assert!(ApprenticeshipStatus::from_str("unknown").is_err());
        assert!(CourseType::from_str("").is_err());
    }

    #[test]
    fn serialized_form_matches_storage_form() {
        let json = serde_json::to_string(&CertificateStatus::DueIn6m).unwrap();
        assert_eq!(json, "\"due_in_6m\"");
        let back: CertificateStatus = serde_json::from_str("\"due_in_12m\"").unwrap();
        assert_eq!(back, CertificateStatus::DueIn12m);
    }
}
