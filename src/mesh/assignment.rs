use std::fmt;
use std::str::FromStr;

use crate::error::MeshError;

/// Fold assignment of an edge (FOLD `edges_assignment`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assignment {
    /// Mountain fold.
    Mountain,
    /// Valley fold.
    Valley,
    /// Flat (unfolded) crease.
    Flat,
    /// Boundary of the sheet.
    Boundary,
    /// Crease whose sense is unknown.
    Unassigned,
    /// Cut through the sheet.
    Cut,
    /// Join of two sheets.
    Join,
}

impl Assignment {
    /// Returns the single-letter FOLD code.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Mountain => 'M',
            Self::Valley => 'V',
            Self::Flat => 'F',
            Self::Boundary => 'B',
            Self::Unassigned => 'U',
            Self::Cut => 'C',
            Self::Join => 'J',
        }
    }

    /// Resolves an unassigned crease from its fold angle (degrees, positive
    /// valley, negative mountain). Other assignments are returned unchanged.
    #[must_use]
    pub fn resolve(self, fold_angle: Option<f64>, epsilon: f64) -> Self {
        match (self, fold_angle) {
            (Self::Unassigned, Some(angle)) if angle > epsilon => Self::Valley,
            (Self::Unassigned, Some(angle)) if angle < -epsilon => Self::Mountain,
            _ => self,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Assignment {
    type Err = MeshError;

    /// Parses a FOLD letter or the full word, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "mountain" => Ok(Self::Mountain),
            "v" | "valley" => Ok(Self::Valley),
            "f" | "flat" => Ok(Self::Flat),
            "b" | "boundary" => Ok(Self::Boundary),
            "u" | "unassigned" => Ok(Self::Unassigned),
            "c" | "cut" => Ok(Self::Cut),
            "j" | "join" => Ok(Self::Join),
            _ => Err(MeshError::UnknownAssignment(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("M".parse::<Assignment>().unwrap(), Assignment::Mountain);
        assert_eq!("m".parse::<Assignment>().unwrap(), Assignment::Mountain);
        assert_eq!("Valley".parse::<Assignment>().unwrap(), Assignment::Valley);
        assert_eq!("b".parse::<Assignment>().unwrap(), Assignment::Boundary);
    }

    #[test]
    fn parse_unknown_letter() {
        assert!(matches!(
            "x".parse::<Assignment>(),
            Err(MeshError::UnknownAssignment(_))
        ));
    }

    #[test]
    fn letters_round_trip() {
        for a in [
            Assignment::Mountain,
            Assignment::Valley,
            Assignment::Flat,
            Assignment::Boundary,
            Assignment::Unassigned,
            Assignment::Cut,
            Assignment::Join,
        ] {
            assert_eq!(a.to_string().parse::<Assignment>().unwrap(), a);
        }
    }

    #[test]
    fn unassigned_resolves_by_angle_sign() {
        let eps = 1e-6;
        assert_eq!(
            Assignment::Unassigned.resolve(Some(-180.0), eps),
            Assignment::Mountain
        );
        assert_eq!(
            Assignment::Unassigned.resolve(Some(180.0), eps),
            Assignment::Valley
        );
        assert_eq!(
            Assignment::Unassigned.resolve(Some(0.0), eps),
            Assignment::Unassigned
        );
        assert_eq!(Assignment::Flat.resolve(Some(180.0), eps), Assignment::Flat);
        assert_eq!(Assignment::Unassigned.resolve(None, eps), Assignment::Unassigned);
    }
}
