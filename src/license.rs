use std::fmt;

/// A ROS license identifier resolved to its nixpkgs rendering.
///
/// ROS package manifests carry free-form license strings. nixpkgs instead
/// names licenses as attributes of `lib.licenses` (`mit`, `asl20`, ...).
/// A recognized spelling maps to the bare attribute name; anything else is
/// carried through as a quoted string literal, which Nix accepts in a
/// `license` list alongside the attribute forms.
///
/// Instances are built once per license string via [`NixLicense::resolve`]
/// and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NixLicense {
    /// The `lib.licenses` attribute name, or the literal to quote.
    pub name: String,
    /// `true` when `name` has no nixpkgs attribute and renders quoted.
    pub custom: bool,
}

/// Map a normalized license spelling to its `lib.licenses` attribute.
fn nixpkgs_attr(name: &str) -> Option<&'static str> {
    match name {
        "Apache-2.0" => Some("asl20"),
        "ASL 2.0" => Some("asl20"),
        "Boost-1.0" => Some("boost"),
        "BSD-2" => Some("bsd2"),
        "BSD-3-Clause" => Some("bsd3"),
        "BSD" => Some("bsdOriginal"),
        "CC-BY-NC-SA-4.0" => Some("cc-by-nc-sa-40"),
        "GPL-1" => Some("gpl1"),
        "GPL-2" => Some("gpl2"),
        "GPL-3.0-only" => Some("gpl3Only"),
        "GPL-3" => Some("gpl3"),
        "LGPL-2.1" => Some("lgpl21"),
        "LGPL-2" => Some("lgpl2"),
        "LGPL-3.0-only" => Some("lgpl3Only"),
        "LGPL-3" => Some("lgpl3"),
        "MIT" => Some("mit"),
        "MPL-1.0" => Some("mpl10"),
        "MPL-1.1" => Some("mpl11"),
        "MPL-2.0" => Some("mpl20"),
        "PD" => Some("publicDomain"),
        _ => None,
    }
}

impl NixLicense {
    /// Resolve a raw license string to its Nix rendering.
    ///
    /// `normalize` is the external normalization lookup that maps the many
    /// spellings found in package manifests onto canonical identifiers;
    /// `None` means the spelling is unknown, in which case the raw input
    /// is used as-is. Resolution itself never fails: an identifier outside
    /// the nixpkgs map simply becomes a custom (quoted) license.
    ///
    /// # Examples
    ///
    /// ```
    /// use ros_nix_expression::NixLicense;
    ///
    /// let mit = NixLicense::resolve("MIT", |s| Some(s.to_string()));
    /// assert_eq!(mit.name, "mit");
    /// assert!(!mit.custom);
    ///
    /// let other = NixLicense::resolve("LGPL", |_| None);
    /// assert_eq!(other.name, "LGPL");
    /// assert!(other.custom);
    /// ```
    pub fn resolve<F>(raw: &str, normalize: F) -> NixLicense
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let normalized = normalize(raw).unwrap_or_else(|| raw.to_string());
        match nixpkgs_attr(&normalized) {
            Some(attr) => NixLicense {
                name: attr.to_string(),
                custom: false,
            },
            None => NixLicense {
                name: normalized,
                custom: true,
            },
        }
    }
}

impl fmt::Display for NixLicense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.custom {
            write!(f, "\"{}\"", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn resolve_all_mapped_spellings() {
        for (raw, attr) in [
            ("Apache-2.0", "asl20"),
            ("ASL 2.0", "asl20"),
            ("Boost-1.0", "boost"),
            ("BSD-2", "bsd2"),
            ("BSD-3-Clause", "bsd3"),
            ("BSD", "bsdOriginal"),
            ("CC-BY-NC-SA-4.0", "cc-by-nc-sa-40"),
            ("GPL-1", "gpl1"),
            ("GPL-2", "gpl2"),
            ("GPL-3.0-only", "gpl3Only"),
            ("GPL-3", "gpl3"),
            ("LGPL-2.1", "lgpl21"),
            ("LGPL-2", "lgpl2"),
            ("LGPL-3.0-only", "lgpl3Only"),
            ("LGPL-3", "lgpl3"),
            ("MIT", "mit"),
            ("MPL-1.0", "mpl10"),
            ("MPL-1.1", "mpl11"),
            ("MPL-2.0", "mpl20"),
            ("PD", "publicDomain"),
        ] {
            let license = NixLicense::resolve(raw, identity);
            assert_eq!(license.name, attr, "for {raw}");
            assert!(!license.custom, "for {raw}");
        }
    }

    #[test]
    fn resolve_through_normalization() {
        // The collaborator rewrites the spelling before the map lookup.
        let license = NixLicense::resolve("Apache License 2.0", |_| Some("Apache-2.0".to_string()));
        assert_eq!(license.name, "asl20");
        assert!(!license.custom);
    }

    #[test]
    fn unknown_license_is_custom() {
        let license = NixLicense::resolve("Zlib-acknowledgement", identity);
        assert_eq!(license.name, "Zlib-acknowledgement");
        assert!(license.custom);
    }

    #[test]
    fn failed_normalization_keeps_raw_input() {
        let license = NixLicense::resolve("Historical Permission Notice", |_| None);
        assert_eq!(license.name, "Historical Permission Notice");
        assert!(license.custom);
    }

    #[test]
    fn display_bare_when_mapped() {
        let license = NixLicense::resolve("MIT", identity);
        assert_eq!(license.to_string(), "mit");
    }

    #[test]
    fn display_quoted_when_custom() {
        let license = NixLicense::resolve("LGPL", |_| None);
        assert_eq!(license.to_string(), "\"LGPL\"");
    }
}
