//! Nix expression generator for ROS packages.
//!
//! This crate turns the metadata collected for one ROS package — name,
//! version, source tarball, checksum, licenses, and dependency sets — into
//! a complete [`buildRosPackage`] Nix expression as a string. It is the
//! synthesis core used by a rosdistro crawler that decides *which*
//! packages to generate and where to write the results.
//!
//! [`buildRosPackage`]: https://github.com/lopsided98/nix-ros-overlay
//!
//! # Overview
//!
//! Rendering picks one of two fetch strategies. A source URL matching the
//! GitHub archive pattern (`https://github.com/<owner>/<repo>/archive/
//! <rev>.tar.gz`) becomes a `fetchFromGitHub` block, whose checksum is
//! obtained from an external prefetch tool behind the [`ChecksumResolver`]
//! trait; any other URL becomes a plain `fetchurl` block with the checksum
//! the metadata already supplies. A prefetch failure never aborts a
//! render — the tarball checksum is substituted after a logged advisory,
//! so a batch run over a whole distribution keeps going.
//!
//! Output is deterministic for fixed inputs: dependency sets render
//! sorted and deduplicated, and the copyright year in the header comes
//! from the [`RenderContext`] rather than straight from the clock.
//!
//! # Examples
//!
//! Render an expression for a package hosted on GitHub, with a stubbed
//! checksum lookup:
//!
//! ```
//! use ros_nix_expression::{
//!     GithubArchive, NixExpression, NixLicense, RenderContext, Result,
//! };
//!
//! fn checksum(_: &GithubArchive) -> Result<String> {
//!     Ok("0c0w2kvqjyxjvmkh2jwkkjmnqq0z2j4w6y5pn7kcs99s5x1iyfy3".to_string())
//! }
//!
//! let mut expr = NixExpression::new(
//!     "rclcpp",
//!     "16.0.8",
//!     "https://github.com/ros2-gbp/rclcpp-release/archive/release/rolling/rclcpp/16.0.8-1.tar.gz",
//!     "deadbeef",
//!     "The ROS client library in C++.",
//!     "rolling",
//!     "ament_cmake",
//! );
//! expr.licenses
//!     .push(NixLicense::resolve("Apache-2.0", |s| Some(s.to_string())));
//! expr.build_inputs.insert("ament-cmake".to_string());
//!
//! let text = expr.render(&RenderContext::new("Open Source Robotics Foundation", "BSD"), &checksum);
//! assert!(text.contains("pname = \"ros-rolling-rclcpp\";"));
//! assert!(text.contains("rev = \"release/rolling/rclcpp/16.0.8-1\";"));
//! ```

mod error;
mod expression;
mod license;
mod prefetch;
mod source;

// Re-export public types
pub use error::{Error, Result};
pub use expression::{NixExpression, RenderContext};
pub use license::NixLicense;
pub use prefetch::{ChecksumResolver, NixPrefetch};
pub use source::{source_file_name, GithubArchive};
