use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::num::NonZeroUsize;
use primeshard::{DEFAULT_STACK_SIZE, DOMAIN_MAX, PrimalityRule, RemainderPolicy, RunConfig};
use std::path::PathBuf;

/// Smallest worker stack accepted, glibc's `PTHREAD_STACK_MIN`.
const MIN_STACK_SIZE: usize = 16 * 1024;

/// Runtime configuration for the `primeshard` binary.
///
/// Every setting is optional: a bare invocation searches the whole word-sized
/// domain on every detected core and writes into the current directory. All
/// values can also come from environment variables or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "primeshard",
    version,
    about = "Search for primes on every core, one pinned thread per core"
)]
pub struct CliArgs {
    /// Number of workers, each pinned to its own core.
    ///
    /// Defaults to the number of cores available to the process. Worker `n`
    /// runs on CPU `n - 1`.
    ///
    /// Environment variable: `PRIMES_WORKERS`
    #[arg(long, env = "PRIMES_WORKERS")]
    pub workers: Option<usize>,

    /// Exclusive upper bound of the searched domain.
    ///
    /// Environment variable: `PRIMES_DOMAIN_MAX`
    #[arg(long, env = "PRIMES_DOMAIN_MAX", default_value_t = DOMAIN_MAX)]
    pub domain_max: usize,

    /// Directory receiving the `PRIMES_THREAD_<index>.TXT` files.
    ///
    /// Defaults to the current working directory.
    ///
    /// Environment variable: `PRIMES_OUTPUT_DIR`
    #[arg(long, env = "PRIMES_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Stack size of each worker thread, in bytes.
    ///
    /// Environment variable: `PRIMES_STACK_SIZE`
    #[arg(long, env = "PRIMES_STACK_SIZE", default_value_t = DEFAULT_STACK_SIZE)]
    pub stack_size: usize,

    /// What happens to the values left over when the domain does not divide
    /// evenly between workers.
    ///
    /// `drop` leaves them unsearched, `extend-last` hands them to the last
    /// worker.
    ///
    /// Environment variable: `PRIMES_REMAINDER`
    #[arg(long, env = "PRIMES_REMAINDER", value_enum, default_value_t = RemainderArg::ExtendLast)]
    pub remainder: RemainderArg,

    /// Whether 0 and 1 are written as primes.
    ///
    /// `strict` excludes them, `lenient` reports them prime like unguarded
    /// trial division does.
    ///
    /// Environment variable: `PRIMES_PRIMALITY`
    #[arg(long, env = "PRIMES_PRIMALITY", value_enum, default_value_t = PrimalityArg::Strict)]
    pub primality: PrimalityArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderArg {
    Drop,
    ExtendLast,
}

impl From<RemainderArg> for RemainderPolicy {
    fn from(arg: RemainderArg) -> Self {
        match arg {
            RemainderArg::Drop => Self::Drop,
            RemainderArg::ExtendLast => Self::ExtendLast,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimalityArg {
    Strict,
    Lenient,
}

impl From<PrimalityArg> for PrimalityRule {
    fn from(arg: PrimalityArg) -> Self {
        match arg {
            PrimalityArg::Strict => Self::Strict,
            PrimalityArg::Lenient => Self::Lenient,
        }
    }
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let workers = match args.workers {
            Some(0) => bail!("PRIMES_WORKERS must be greater than 0"),
            Some(n) => NonZeroUsize::new(n),
            None => None,
        };

        if args.domain_max == 0 {
            bail!("PRIMES_DOMAIN_MAX must be greater than 0");
        }

        if args.stack_size < MIN_STACK_SIZE {
            bail!(
                "PRIMES_STACK_SIZE ({}) is below the minimum of {} bytes",
                args.stack_size,
                MIN_STACK_SIZE
            );
        }

        Ok(Self {
            workers,
            domain_max: args.domain_max,
            output_dir: args.output_dir,
            stack_size: args.stack_size,
            remainder: args.remainder.into(),
            primality: args.primality.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<RunConfig> {
        let argv = std::iter::once("primeshard").chain(args.iter().copied());
        RunConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn bare_invocation_uses_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--workers",
            "4",
            "--domain-max",
            "1000",
            "--output-dir",
            "/tmp/primes",
            "--stack-size",
            "65536",
            "--remainder",
            "drop",
            "--primality",
            "lenient",
        ])
        .unwrap();

        assert_eq!(config.workers, NonZeroUsize::new(4));
        assert_eq!(config.domain_max, 1000);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/primes")));
        assert_eq!(config.stack_size, 65536);
        assert_eq!(config.remainder, RemainderPolicy::Drop);
        assert_eq!(config.primality, PrimalityRule::Lenient);
    }

    #[test]
    fn rejects_zero_workers() {
        let err = parse(&["--workers", "0"]).unwrap_err();
        assert!(err.to_string().contains("PRIMES_WORKERS"));
    }

    #[test]
    fn rejects_empty_domain() {
        assert!(parse(&["--domain-max", "0"]).is_err());
    }

    #[test]
    fn rejects_tiny_stack() {
        assert!(parse(&["--stack-size", "1024"]).is_err());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(parse(&["--remainder", "spread"]).is_err());
    }
}
