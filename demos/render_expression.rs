use ros_nix_expression::{NixExpression, NixLicense, NixPrefetch, RenderContext};

fn main() {
    // Show the prefetch-fallback advisory when nix-prefetch is missing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut expr = NixExpression::new(
        "turtlesim",
        "1.4.2",
        "https://github.com/ros2-gbp/ros_tutorials-release/archive/release/humble/turtlesim/1.4.2-1.tar.gz",
        "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
        "turtlesim is a tool made for teaching ROS and ROS packages.",
        "humble",
        "ament_cmake",
    );

    expr.licenses
        .push(NixLicense::resolve("Apache-2.0", |s| Some(s.to_string())));

    for dep in ["rclcpp", "geometry-msgs", "std-srvs", "qt5.qtbase"] {
        expr.build_inputs.insert(dep.to_string());
    }
    for dep in ["rclcpp", "geometry-msgs", "qt5.qtbase"] {
        expr.propagated_build_inputs.insert(dep.to_string());
    }
    expr.native_build_inputs.insert("ament-cmake".to_string());
    expr.check_inputs.insert("ament-lint-auto".to_string());

    // Uses the real nix-prefetch oracle; without it installed the render
    // warns and falls back to the tarball checksum above.
    let oracle = NixPrefetch::new();
    let ctx = RenderContext::new("Open Source Robotics Foundation", "BSD");

    print!("{}", expr.render(&ctx, &oracle));
}
