//! User-chosen option values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OptionChoice, OptionKind, Variant};

/// The option values a shopper has picked so far.
///
/// Each attribute is independently optional. Transforms return a new
/// record and leave `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub size: Option<String>,
    pub color: Option<String>,
    pub measurement: Option<Decimal>,
    pub age: Option<String>,
}

impl Selection {
    /// An empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            size: None,
            color: None,
            measurement: None,
            age: None,
        }
    }

    /// Whether no attribute has been chosen.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.color.is_none()
            && self.measurement.is_none()
            && self.age.is_none()
    }

    /// The chosen value for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: OptionKind) -> Option<OptionChoice> {
        match kind {
            OptionKind::Size => self.size.clone().map(OptionChoice::Size),
            OptionKind::Color => self.color.clone().map(OptionChoice::Color),
            OptionKind::Measurement => self.measurement.map(OptionChoice::Measurement),
            OptionKind::Age => self.age.clone().map(OptionChoice::Age),
        }
    }

    /// Whether `choice` is the currently chosen value for its attribute.
    #[must_use]
    pub fn is_selected(&self, choice: &OptionChoice) -> bool {
        match choice {
            OptionChoice::Size(v) => self.size.as_ref() == Some(v),
            OptionChoice::Color(v) => self.color.as_ref() == Some(v),
            OptionChoice::Measurement(v) => self.measurement.as_ref() == Some(v),
            OptionChoice::Age(v) => self.age.as_ref() == Some(v),
        }
    }

    /// A copy with `choice` set for its attribute.
    #[must_use]
    pub fn with(&self, choice: OptionChoice) -> Self {
        let mut next = self.clone();
        match choice {
            OptionChoice::Size(v) => next.size = Some(v),
            OptionChoice::Color(v) => next.color = Some(v),
            OptionChoice::Measurement(v) => next.measurement = Some(v),
            OptionChoice::Age(v) => next.age = Some(v),
        }
        next
    }

    /// A copy with the attribute `kind` cleared.
    #[must_use]
    pub fn without(&self, kind: OptionKind) -> Self {
        let mut next = self.clone();
        match kind {
            OptionKind::Size => next.size = None,
            OptionKind::Color => next.color = None,
            OptionKind::Measurement => next.measurement = None,
            OptionKind::Age => next.age = None,
        }
        next
    }

    /// Clear the attribute if `choice` is already selected, set it otherwise.
    ///
    /// Only the targeted attribute changes. Applying the same toggle twice
    /// returns the original selection.
    #[must_use]
    pub fn toggle(&self, choice: &OptionChoice) -> Self {
        if self.is_selected(choice) {
            self.without(choice.kind())
        } else {
            self.with(choice.clone())
        }
    }

    /// Exact pairwise match on all four attributes (`None` matches `None`).
    #[must_use]
    pub fn matches(&self, variant: &Variant) -> bool {
        self.size == variant.size
            && self.color == variant.color
            && self.measurement == variant.measurement
            && self.age == variant.age
    }

    /// Whether `variant` agrees with every chosen attribute other than `skip`.
    ///
    /// Unchosen attributes impose no constraint.
    #[must_use]
    pub fn permits(&self, variant: &Variant, skip: OptionKind) -> bool {
        let size_ok = skip == OptionKind::Size
            || self.size.is_none()
            || self.size == variant.size;
        let color_ok = skip == OptionKind::Color
            || self.color.is_none()
            || self.color == variant.color;
        let measurement_ok = skip == OptionKind::Measurement
            || self.measurement.is_none()
            || self.measurement == variant.measurement;
        let age_ok = skip == OptionKind::Age || self.age.is_none() || self.age == variant.age;

        size_ok && color_ok && measurement_ok && age_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantId;

    fn size(v: &str) -> OptionChoice {
        OptionChoice::Size(v.to_string())
    }

    fn color(v: &str) -> OptionChoice {
        OptionChoice::Color(v.to_string())
    }

    #[test]
    fn test_toggle_sets_then_clears() {
        let empty = Selection::new();
        let picked = empty.toggle(&size("M"));
        assert_eq!(picked.size.as_deref(), Some("M"));

        let cleared = picked.toggle(&size("M"));
        assert_eq!(cleared, empty);
    }

    #[test]
    fn test_toggle_replaces_other_value() {
        let picked = Selection::new().with(size("M"));
        let switched = picked.toggle(&size("L"));
        assert_eq!(switched.size.as_deref(), Some("L"));
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let start = Selection::new().with(size("S")).with(color("Blue"));
        let choices = [
            size("S"),
            size("XL"),
            color("Blue"),
            color("Green"),
            OptionChoice::Measurement(Decimal::from(40)),
            OptionChoice::Age("3-4y".to_string()),
        ];

        for choice in &choices {
            assert_eq!(start.toggle(choice).toggle(choice), start, "{choice:?}");
        }
    }

    #[test]
    fn test_toggle_leaves_other_attributes() {
        let start = Selection::new()
            .with(size("S"))
            .with(color("Blue"))
            .with(OptionChoice::Age("adult".to_string()));
        let next = start.toggle(&color("Red"));

        assert_eq!(next.size, start.size);
        assert_eq!(next.age, start.age);
        assert_eq!(next.measurement, start.measurement);
        assert_eq!(next.color.as_deref(), Some("Red"));
    }

    #[test]
    fn test_matches_requires_null_equals_null() {
        let mut variant = Variant::new(VariantId::new(1), Decimal::ONE, 1);
        variant.size = Some("M".to_string());

        assert!(Selection::new().with(size("M")).matches(&variant));
        assert!(!Selection::new().matches(&variant));
        assert!(!Selection::new().with(size("M")).with(color("Red")).matches(&variant));
    }

    #[test]
    fn test_permits_ignores_skipped_and_unset() {
        let mut variant = Variant::new(VariantId::new(1), Decimal::ONE, 1);
        variant.size = Some("M".to_string());
        variant.color = Some("Red".to_string());

        let selection = Selection::new().with(size("L")).with(color("Red"));
        assert!(selection.permits(&variant, OptionKind::Size));
        assert!(!selection.permits(&variant, OptionKind::Color));
    }

    #[test]
    fn test_is_empty() {
        assert!(Selection::new().is_empty());
        assert!(!Selection::new().with(size("M")).is_empty());
        assert!(Selection::default().is_empty());
    }
}
