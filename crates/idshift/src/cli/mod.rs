//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};

use crate::config::ShiftConfig;
use crate::idmap::{Direction, IdMapSet};
use crate::shift::{TreeShifter, UnmappedPolicy};

/// idshift - shift file ownership between host and user-namespace IDs
#[derive(Parser)]
#[command(name = "idshift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "IDSHIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Helper commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Shift a tree from namespace IDs to host IDs
    Into {
        /// Root of the tree to shift
        dir: PathBuf,

        #[command(flatten)]
        opts: ShiftOpts,
    },

    /// Shift a tree from host IDs back to namespace IDs
    From {
        /// Root of the tree to shift
        dir: PathBuf,

        #[command(flatten)]
        opts: ShiftOpts,
    },

    /// Print the uid_map and gid_map for the configured ranges
    Show {
        #[command(flatten)]
        maps: MapOpts,
    },
}

/// Where the ID ranges come from.
#[derive(Args, Debug, Default)]
pub struct MapOpts {
    /// ID range <u|g|b>:<namespace-start>:<host-start>:<length> (repeatable)
    #[arg(short = 'm', long = "map", value_name = "SPEC")]
    pub maps: Vec<String>,

    /// Also use this user's /etc/subuid and /etc/subgid ranges
    #[arg(long, value_name = "USER")]
    pub subid: Option<String>,
}

/// Options shared by `into` and `from`.
#[derive(Args, Debug, Default)]
pub struct ShiftOpts {
    #[command(flatten)]
    pub maps: MapOpts,

    /// Print what would change without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Fail on IDs no range covers instead of leaving them unchanged
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Execute the CLI command.
    pub fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ShiftConfig::load(path)?,
            None => ShiftConfig::load_default()?,
        };

        match self.command {
            Commands::Into { dir, opts } => shift(config, dir, Direction::IntoNamespace, opts),
            Commands::From { dir, opts } => shift(config, dir, Direction::FromNamespace, opts),
            Commands::Show { maps } => {
                let set = build_set(config, maps)?;
                println!("uid_map:\n{}", set.uid_map());
                println!("gid_map:\n{}", set.gid_map());
                Ok(())
            }
        }
    }
}

/// Config ranges first, then `--map`s in order, then subid ranges.
fn build_set(mut config: ShiftConfig, opts: MapOpts) -> Result<IdMapSet> {
    config.mappings.extend(opts.maps);
    if opts.subid.is_some() {
        config.subid_user = opts.subid;
    }

    let set = config.build_set()?;
    if set.is_empty() {
        return Err(eyre!("No ID ranges given; pass --map or set mappings in the config file"));
    }
    Ok(set)
}

fn shift(config: ShiftConfig, dir: PathBuf, direction: Direction, opts: ShiftOpts) -> Result<()> {
    let unmapped = if opts.strict {
        UnmappedPolicy::Reject
    } else {
        config.unmapped
    };
    let set = build_set(config, opts.maps)?;

    if !opts.dry_run && !rustix::process::geteuid().is_root() {
        tracing::warn!("Not running as root; changing ownership will likely fail");
    }

    let shifter = TreeShifter::new(&set, dir, direction)
        .with_dry_run(opts.dry_run)
        .with_unmapped(unmapped);

    let summary = if opts.dry_run {
        shifter.run_with(|record| println!("{record}"))
    } else {
        shifter.run()
    }
    .map_err(|e| eyre!("Failed to shift {}: {}", shifter.root().display(), e))?;

    if summary.mode_restore_failures > 0 {
        tracing::warn!(
            count = summary.mode_restore_failures,
            "Some permission modes could not be restored"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_shift_args() {
        let cli = Cli::try_parse_from([
            "idshift",
            "into",
            "/srv/rootfs",
            "-m",
            "u:0:100000:65536",
            "--map",
            "g:0:100000:65536",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Into { dir, opts } = cli.command else {
            panic!("expected into");
        };
        assert_eq!(dir, PathBuf::from("/srv/rootfs"));
        assert_eq!(opts.maps.maps.len(), 2);
        assert!(opts.dry_run);
        assert!(!opts.strict);
    }

    #[test]
    fn cli_maps_follow_config_maps() {
        let config = ShiftConfig::default().with_mapping("u:0:100000:10");
        let opts = MapOpts {
            maps: vec!["u:10:200000:10".to_string()],
            subid: None,
        };
        let set = build_set(config, opts).unwrap();
        let specs: Vec<_> = set.iter().map(ToString::to_string).collect();
        assert_eq!(specs, ["u:0:100000:10", "u:10:200000:10"]);
    }

    #[test]
    fn empty_map_rejected() {
        assert!(build_set(ShiftConfig::default(), MapOpts::default()).is_err());
    }
}
