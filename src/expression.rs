use std::collections::BTreeSet;

use chrono::{Datelike, Utc};
use tracing::warn;

use crate::license::NixLicense;
use crate::prefetch::ChecksumResolver;
use crate::source::{source_file_name, GithubArchive};

/// nixpkgs revision imported by generated expressions for `fetchFromGitHub`.
///
/// Part of the output contract: regeneration runs diff their output against
/// the previous run, so this revision must not drift between releases.
const NIXPKGS_PIN: &str =
    "https://github.com/NixOS/nixpkgs/archive/aa0e8072a57e879073cee969a780e586dbe57997.tar.gz";

/// Header and license metadata for one rendering run.
///
/// The copyright year is an explicit field so tests can pin it;
/// [`RenderContext::new`] samples the system clock.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Name appearing in the copyright header line.
    pub distributor: &'a str,
    /// License name for the "Distributed under the terms of" line.
    pub license_name: &'a str,
    /// Copyright year.
    pub year: i32,
}

impl<'a> RenderContext<'a> {
    /// Context with the current year.
    pub fn new(distributor: &'a str, license_name: &'a str) -> RenderContext<'a> {
        RenderContext {
            distributor,
            license_name,
            year: Utc::now().year(),
        }
    }
}

/// A `buildRosPackage` Nix expression for one ROS package.
///
/// Collects the metadata discovered for a package — identity, source
/// tarball coordinates, licenses, and the five dependency sets that map to
/// `buildRosPackage` input attributes — and renders it as Nix text.
///
/// Dependency sets are `BTreeSet`s: members are deduplicated and iterate
/// in sorted order, which is what keeps the rendered output stable across
/// runs. Every instance gets freshly allocated sets. Populate the public
/// collections after [`NixExpression::new`], then call
/// [`render`](NixExpression::render) once.
#[derive(Debug, Clone)]
pub struct NixExpression {
    /// Package name within the distribution.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Source tarball URL.
    pub src_url: String,
    /// Checksum of the source tarball.
    pub src_sha256: String,
    /// Artifact filename pinned in the `fetchurl` block, derived from
    /// [`src_url`](NixExpression::src_url).
    pub src_name: String,
    /// Free-text package description.
    pub description: String,
    /// Resolved licenses, rendered in this order.
    pub licenses: Vec<NixLicense>,
    /// ROS distribution name (e.g. `noetic`).
    pub distro_name: String,
    /// ROS build type (e.g. `ament_cmake`).
    pub build_type: String,

    /// Members of `buildInputs`.
    pub build_inputs: BTreeSet<String>,
    /// Members of `propagatedBuildInputs`.
    pub propagated_build_inputs: BTreeSet<String>,
    /// Members of `checkInputs`.
    pub check_inputs: BTreeSet<String>,
    /// Members of `nativeBuildInputs`.
    pub native_build_inputs: BTreeSet<String>,
    /// Members of `propagatedNativeBuildInputs`.
    pub propagated_native_build_inputs: BTreeSet<String>,
}

/// The function parameter a dependency is imported through.
///
/// Dependencies may carry an attribute path suffix (`pythonPackages.numpy`);
/// only the first component is a parameter of the generated function, while
/// the full string appears in the input lists.
fn nix_parameter(dep: &str) -> &str {
    dep.split('.').next().unwrap_or(dep)
}

/// Render a space-joined, bracket-delimited Nix list.
fn nix_list(items: &[String]) -> String {
    if items.is_empty() {
        "[ ]".to_string()
    } else {
        format!("[ {} ]", items.join(" "))
    }
}

impl NixExpression {
    /// Build an expression from fully resolved package metadata.
    ///
    /// Derives the artifact filename from `src_url`. Licenses and
    /// dependency sets start empty and are populated through the public
    /// fields before rendering.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        src_url: impl Into<String>,
        src_sha256: impl Into<String>,
        description: impl Into<String>,
        distro_name: impl Into<String>,
        build_type: impl Into<String>,
    ) -> NixExpression {
        let src_url = src_url.into();
        let src_name = source_file_name(&src_url);
        NixExpression {
            name: name.into(),
            version: version.into(),
            src_url,
            src_sha256: src_sha256.into(),
            src_name,
            description: description.into(),
            licenses: Vec::new(),
            distro_name: distro_name.into(),
            build_type: build_type.into(),
            build_inputs: BTreeSet::new(),
            propagated_build_inputs: BTreeSet::new(),
            check_inputs: BTreeSet::new(),
            native_build_inputs: BTreeSet::new(),
            propagated_native_build_inputs: BTreeSet::new(),
        }
    }

    /// Input attributes in emission order.
    fn input_sets(&self) -> [(&'static str, &BTreeSet<String>); 5] {
        [
            ("buildInputs", &self.build_inputs),
            ("checkInputs", &self.check_inputs),
            ("propagatedBuildInputs", &self.propagated_build_inputs),
            ("nativeBuildInputs", &self.native_build_inputs),
            (
                "propagatedNativeBuildInputs",
                &self.propagated_native_build_inputs,
            ),
        ]
    }

    /// The generated function's parameter list: the fixed imports plus the
    /// sorted, deduplicated parameter of every dependency in any set.
    fn parameters(&self) -> Vec<&str> {
        let mut params = vec!["lib", "buildRosPackage", "fetchurl"];
        let deps: BTreeSet<&str> = self
            .input_sets()
            .iter()
            .flat_map(|(_, set)| set.iter())
            .map(|dep| nix_parameter(dep))
            .collect();
        params.extend(deps);
        params
    }

    /// Render the complete Nix expression.
    ///
    /// Deterministic for a fixed context and a fixed `checksums` response.
    /// When the source URL is a recognized GitHub archive the expression
    /// fetches from GitHub with a checksum obtained through `checksums`;
    /// if that lookup fails the tarball checksum is substituted after a
    /// logged advisory, and rendering continues — a batch run must not
    /// stop because the prefetch tool is missing or unreachable.
    ///
    /// # Examples
    ///
    /// ```
    /// use ros_nix_expression::{
    ///     GithubArchive, NixExpression, NixLicense, RenderContext, Result,
    /// };
    ///
    /// fn checksum(_: &GithubArchive) -> Result<String> {
    ///     Ok("cafef00d".to_string())
    /// }
    ///
    /// let mut expr = NixExpression::new(
    ///     "foo",
    ///     "1.0.0",
    ///     "https://github.com/me/foo/archive/1.0.0.tar.gz",
    ///     "deadbeef",
    ///     "An example package",
    ///     "noetic",
    ///     "ament_cmake",
    /// );
    /// expr.licenses
    ///     .push(NixLicense::resolve("MIT", |s| Some(s.to_string())));
    ///
    /// let ctx = RenderContext::new("Example Distributor", "MIT");
    /// let text = expr.render(&ctx, &checksum);
    /// assert!(text.contains("owner = \"me\";"));
    /// assert!(text.contains("sha256 = \"cafef00d\";"));
    /// ```
    pub fn render(&self, ctx: &RenderContext<'_>, checksums: &dyn ChecksumResolver) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "# Copyright {} {}\n# Distributed under the terms of the {} license\n\n",
            ctx.year, ctx.distributor, ctx.license_name
        ));

        out.push_str(&format!("{{ {} }}:\n", self.parameters().join(", ")));

        out.push_str("buildRosPackage {\n");
        out.push_str(&format!(
            "  pname = \"ros-{}-{}\";\n",
            self.distro_name, self.name
        ));
        out.push_str(&format!("  version = \"{}\";\n\n", self.version));

        match GithubArchive::from_url(&self.src_url) {
            Some(archive) => {
                let sha256 = match checksums.resolve(&archive) {
                    Ok(sum) => sum,
                    Err(err) => {
                        warn!(
                            "checksum prefetch for {}/{} at {} failed ({err}); \
                             falling back to the tarball checksum",
                            archive.owner, archive.repo, archive.rev
                        );
                        self.src_sha256.clone()
                    }
                };
                out.push_str("  src = let\n");
                out.push_str(&format!(
                    "      fetchFromGithub = (builtins.import (builtins.fetchTarball ({{ url = \"{NIXPKGS_PIN}\"; }})) ({{}})).fetchFromGitHub;\n"
                ));
                out.push_str("    in\n");
                out.push_str("      fetchFromGithub {\n");
                out.push_str(&format!("        owner = \"{}\";\n", archive.owner));
                out.push_str(&format!("        repo = \"{}\";\n", archive.repo));
                out.push_str(&format!("        rev = \"{}\";\n", archive.rev));
                out.push_str(&format!("        sha256 = \"{sha256}\";\n"));
                out.push_str("      };\n\n");
            }
            None => {
                out.push_str("  src = fetchurl {\n");
                out.push_str(&format!("    url = \"{}\";\n", self.src_url));
                out.push_str(&format!("    name = \"{}\";\n", self.src_name));
                out.push_str(&format!("    sha256 = \"{}\";\n", self.src_sha256));
                out.push_str("  };\n\n");
            }
        }

        out.push_str(&format!("  buildType = \"{}\";\n", self.build_type));

        for (attr, set) in self.input_sets() {
            if !set.is_empty() {
                let members: Vec<String> = set.iter().cloned().collect();
                out.push_str(&format!("  {attr} = {};\n", nix_list(&members)));
            }
        }

        let licenses: Vec<String> = self.licenses.iter().map(|l| l.to_string()).collect();
        out.push_str("\n  meta = {\n");
        out.push_str(&format!("    description = ''{}'';\n", self.description));
        out.push_str(&format!(
            "    license = with lib.licenses; {};\n",
            nix_list(&licenses)
        ));
        out.push_str("  };\n}\n");

        out
    }
}
