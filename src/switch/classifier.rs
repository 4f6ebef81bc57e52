//! Maps deCONZ light type tags to switch variants.

use strum::{AsRefStr, Display, EnumIter};

/// Switch variant a light is bridged as.
///
/// The string form doubles as the registration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SwitchKind {
    PowerPlug,
    Siren,
}

/// Light types bridged as power plugs.
pub const POWER_PLUGS: &[&str] = &["On/Off light", "On/Off plug-in unit", "Smart plug"];

/// Light types bridged as sirens.
pub const SIRENS: &[&str] = &["Warning device"];

const CLASSIFICATION: &[(SwitchKind, &[&str])] = &[
    (SwitchKind::PowerPlug, POWER_PLUGS),
    (SwitchKind::Siren, SIRENS),
];

/// Switch variant for `type_tag`, `None` for types that are not switches.
pub fn classify(type_tag: &str) -> Option<SwitchKind> {
    CLASSIFICATION
        .iter()
        .find(|(_, types)| types.contains(&type_tag))
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_power_plug_types() {
        for type_tag in POWER_PLUGS {
            assert_eq!(classify(type_tag), Some(SwitchKind::PowerPlug), "{type_tag}");
        }
    }

    #[test]
    fn test_siren_types() {
        for type_tag in SIRENS {
            assert_eq!(classify(type_tag), Some(SwitchKind::Siren), "{type_tag}");
        }
    }

    #[test]
    fn test_other_types_are_not_switches() {
        for type_tag in [
            "Dimmable light",
            "Extended color light",
            "Window covering device",
            "smart plug",
            "Smart plug ",
            "",
        ] {
            assert_eq!(classify(type_tag), None, "{type_tag:?}");
        }
    }

    #[test]
    fn test_type_sets_are_disjoint() {
        let plugs: HashSet<_> = POWER_PLUGS.iter().collect();
        assert!(SIRENS.iter().all(|t| !plugs.contains(t)));
    }

    #[test]
    fn test_every_kind_has_types() {
        for kind in SwitchKind::iter() {
            assert!(
                CLASSIFICATION
                    .iter()
                    .any(|(k, types)| *k == kind && !types.is_empty()),
                "{kind}"
            );
        }
    }

    #[test]
    fn test_category_names() {
        assert_eq!(SwitchKind::PowerPlug.as_ref(), "power_plug");
        assert_eq!(SwitchKind::Siren.to_string(), "siren");
    }
}
