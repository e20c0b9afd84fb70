//! Init Command - generate a committee and write a configuration

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;
use umbra_committee::{CommitteeKeys, CommitteeMember};

use crate::config::{CommitteeSeeds, UmbraConfig};

/// Generate committee keys and write a ledger configuration
#[derive(Args)]
pub struct InitCommand {
    /// Number of committee members
    #[arg(short, long, default_value_t = 3)]
    members: u16,

    /// Attestations required for a disclosure
    #[arg(short, long, default_value_t = 2)]
    threshold: usize,

    /// Where to write the configuration
    #[arg(short, long, default_value = "umbra.toml")]
    out: PathBuf,

    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        if self.out.exists() && !self.force {
            anyhow::bail!(
                "Configuration already exists at {}. Use --force to overwrite.",
                self.out.display()
            );
        }

        let members: Vec<CommitteeMember> = (0..self.members).map(CommitteeMember::generate).collect();
        let keys = CommitteeKeys::new(
            members.iter().map(|m| m.verifying_key()).collect(),
            self.threshold,
        )?;

        let seeds_path = seeds_path_for(&self.out);
        let mut config = UmbraConfig::default();
        config.committee.size = self.members;
        config.committee.threshold = self.threshold;
        config.committee.seeds_file = Some(seeds_path.clone());
        config.committee.keys = Some(keys);
        config.validate()?;

        CommitteeSeeds::from_members(&members, self.threshold).save(&seeds_path)?;
        config.save(&self.out)?;

        info!(
            members = self.members,
            threshold = self.threshold,
            config = %self.out.display(),
            "committee initialized"
        );

        println!("Configuration: {}", self.out.display());
        println!("Committee seeds: {} (keep secret)", seeds_path.display());
        println!();
        println!("To run the disclosure protocol:");
        println!(
            "  umbra --config {} simulate --id loan-1 --amount 1000 --rate 12 --term 24",
            self.out.display()
        );

        Ok(())
    }
}

/// `<config stem>.seeds.json` next to the configuration
fn seeds_path_for(config: &Path) -> PathBuf {
    let stem = config
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "umbra".to_string());
    config.with_file_name(format!("{}.seeds.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_seeds_path() {
        assert_eq!(
            seeds_path_for(Path::new("/etc/umbra/ledger.toml")),
            PathBuf::from("/etc/umbra/ledger.seeds.json")
        );
    }

    #[test]
    fn test_init_writes_config_and_seeds() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("umbra.toml");
        let cmd = InitCommand { members: 4, threshold: 3, out: out.clone(), force: false };
        cmd.execute().unwrap();

        let config = UmbraConfig::load(&out).unwrap();
        let keys = config.committee.keys.unwrap();
        assert_eq!(keys.member_count(), 4);
        assert_eq!(keys.threshold(), 3);

        let seeds = CommitteeSeeds::load(&dir.path().join("umbra.seeds.json")).unwrap();
        let members = seeds.members().unwrap();
        for member in &members {
            assert_eq!(keys.member(member.index()), Some(&member.verifying_key()));
        }
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("umbra.toml");
        std::fs::write(&out, "").unwrap();

        let cmd = InitCommand { members: 3, threshold: 2, out, force: false };
        assert!(cmd.execute().is_err());
    }

    #[test]
    fn test_init_rejects_bad_threshold() {
        let dir = tempdir().unwrap();
        let cmd = InitCommand {
            members: 2,
            threshold: 3,
            out: dir.path().join("umbra.toml"),
            force: false,
        };
        assert!(cmd.execute().is_err());
    }
}
