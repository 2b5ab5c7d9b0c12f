use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::source::GithubArchive;

/// Poll interval while waiting for the prefetch process.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default deadline for one prefetch invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolves the `fetchFromGitHub` checksum for a recognized archive.
///
/// The checksum of an unpacked GitHub tree differs from the checksum of
/// the tarball the metadata supplies, so switching fetch strategies needs
/// a fresh lookup. Production code uses [`NixPrefetch`]; tests stub the
/// lookup with a plain function, which satisfies this trait through the
/// blanket impl.
pub trait ChecksumResolver {
    /// Look up the checksum for `archive`.
    fn resolve(&self, archive: &GithubArchive) -> Result<String>;
}

impl<F> ChecksumResolver for F
where
    F: Fn(&GithubArchive) -> Result<String>,
{
    fn resolve(&self, archive: &GithubArchive) -> Result<String> {
        self(archive)
    }
}

/// Checksum oracle backed by the `nix-prefetch` executable.
///
/// Spawns `nix-prefetch fetchFromGitHub --quiet --repo <repo> --owner
/// <owner> --rev <rev>` and reads the hash from stdout. The call blocks;
/// a configurable deadline bounds it, and an expired deadline kills the
/// child and reports [`Error::PrefetchTimeout`]. Every failure mode maps
/// to an [`Error`] variant so the renderer can log what went wrong before
/// falling back.
#[derive(Debug, Clone)]
pub struct NixPrefetch {
    program: PathBuf,
    timeout: Duration,
}

impl NixPrefetch {
    /// Oracle using `nix-prefetch` from `PATH` with the default deadline.
    pub fn new() -> NixPrefetch {
        NixPrefetch {
            program: PathBuf::from("nix-prefetch"),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a specific prefetch executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> NixPrefetch {
        self.program = program.into();
        self
    }

    /// Override the invocation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> NixPrefetch {
        self.timeout = timeout;
        self
    }
}

impl Default for NixPrefetch {
    fn default() -> NixPrefetch {
        NixPrefetch::new()
    }
}

impl ChecksumResolver for NixPrefetch {
    fn resolve(&self, archive: &GithubArchive) -> Result<String> {
        let mut child = Command::new(&self.program)
            .arg("fetchFromGitHub")
            .arg("--quiet")
            .args(["--repo", &archive.repo])
            .args(["--owner", &archive.owner])
            .args(["--rev", &archive.rev])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::PrefetchSpawn(e.to_string()))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::PrefetchTimeout(self.timeout));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::PrefetchSpawn(e.to_string()));
                }
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(Error::PrefetchExit {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let mut raw = Vec::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_end(&mut raw)
                .map_err(|e| Error::PrefetchOutput(e.to_string()))?;
        }
        let output = String::from_utf8(raw)
            .map_err(|e| Error::PrefetchOutput(e.to_string()))?;

        let checksum = output.trim();
        if checksum.is_empty() || checksum.contains(char::is_whitespace) {
            return Err(Error::PrefetchOutput(format!("{checksum:?}")));
        }
        Ok(checksum.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive() -> GithubArchive {
        GithubArchive {
            owner: "me".to_string(),
            repo: "foo".to_string(),
            rev: "1.0.0".to_string(),
        }
    }

    #[test]
    fn function_stub_satisfies_trait() {
        fn fixed(_: &GithubArchive) -> Result<String> {
            Ok("cafef00d".to_string())
        }
        let resolver: &dyn ChecksumResolver = &fixed;
        assert_eq!(resolver.resolve(&archive()).unwrap(), "cafef00d");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let oracle = NixPrefetch::new().with_program("/nonexistent/nix-prefetch");
        match oracle.resolve(&archive()) {
            Err(Error::PrefetchSpawn(_)) => {}
            other => panic!("expected PrefetchSpawn, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        // `false` ignores its arguments and exits 1 without output.
        let oracle = NixPrefetch::new().with_program("false");
        match oracle.resolve(&archive()) {
            Err(Error::PrefetchExit { .. }) => {}
            other => panic!("expected PrefetchExit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn empty_output_is_rejected() {
        // `true` exits 0 without printing a checksum.
        let oracle = NixPrefetch::new().with_program("true");
        match oracle.resolve(&archive()) {
            Err(Error::PrefetchOutput(_)) => {}
            other => panic!("expected PrefetchOutput, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn deadline_kills_hung_process() {
        use std::os::unix::fs::PermissionsExt;

        // A stand-in prefetch tool that ignores its arguments and hangs.
        let path = std::env::temp_dir().join("ros-nix-expression-hang.sh");
        std::fs::write(&path, "#!/bin/sh\nsleep 60\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let oracle = NixPrefetch::new()
            .with_program(path.clone())
            .with_timeout(Duration::from_millis(100));
        let started = Instant::now();
        match oracle.resolve(&archive()) {
            Err(Error::PrefetchTimeout(_)) => {}
            other => panic!("expected PrefetchTimeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
        let _ = std::fs::remove_file(path);
    }
}
