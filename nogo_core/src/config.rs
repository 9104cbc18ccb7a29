//! Agent configuration.
//!
//! Agents are configured from whitespace separated `key=value` tokens, e.g.
//! `"name=mcts role=black seed=7 T=2000 exp=0.3"`. Later tokens override
//! earlier ones. The text is validated once, here, into an [`AgentConfig`].

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::interface::Player;
use crate::mcts::algorithm::MCTSOptions;

/// Characters that would break the tournament protocol if used in a name.
const RESERVED: &[char] = &['[', ']', '(', ')', ':', ';', ' '];

#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub role: Player,
    pub seed: Option<u64>,
    /// `T` in the textual form.
    pub cycles: u32,
    /// `exp` in the textual form.
    pub exploration_constant: f64,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, role: Player) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        let defaults = MCTSOptions::default();
        Ok(Self {
            name,
            role,
            seed: None,
            cycles: defaults.cycles(),
            exploration_constant: defaults.exploration_constant(),
        })
    }

    /// Parse `args` on top of `name=<default_name>`.
    ///
    /// A bad name or a missing or unknown role is fatal. Unparsable
    /// numbers are dropped with a warning and the default is kept.
    pub fn parse(default_name: &str, args: &str) -> Result<Self> {
        let mut meta = HashMap::from([("name", default_name), ("role", "unknown")]);
        for pair in args.split_whitespace() {
            let (key, value) = pair.split_once('=').unwrap_or((pair, pair));
            meta.insert(key, value);
        }

        let name = meta["name"];
        validate_name(name)?;
        let defaults = MCTSOptions::default();
        let seed = tunable::<u64>(&meta, "seed");
        let cycles = tunable::<u32>(&meta, "T").unwrap_or(defaults.cycles());
        let exploration_constant = match tunable::<f64>(&meta, "exp") {
            Some(c) if c.is_finite() => c,
            Some(c) => {
                warn!("ignoring exp={}: not finite", c);
                defaults.exploration_constant()
            }
            None => defaults.exploration_constant(),
        };
        let role = meta["role"].parse::<Player>()?;

        for key in meta.keys() {
            if !matches!(*key, "name" | "role" | "seed" | "T" | "exp") {
                debug!("{}: ignoring unrecognized option {}", name, key);
            }
        }

        Ok(Self {
            name: name.to_string(),
            role,
            seed,
            cycles,
            exploration_constant,
        })
    }

    /// Search options carrying this configuration, with the default time budget.
    pub fn options(&self) -> MCTSOptions {
        let options = MCTSOptions::default()
            .with_cycles(self.cycles)
            .with_exploration_constant(self.exploration_constant);
        match self.seed {
            Some(seed) => options.with_seed(seed),
            None => options,
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(RESERVED) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

fn tunable<T>(meta: &HashMap<&str, &str>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = meta.get(key)?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("ignoring {}={}: {}", key, value, e);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::parse("mcts", "role=black").unwrap();
        assert_eq!(
            config,
            AgentConfig {
                name: "mcts".to_string(),
                role: Player::Black,
                seed: None,
                cycles: 1000,
                exploration_constant: 0.25,
            }
        );
        assert_eq!(config, AgentConfig::new("mcts", Player::Black).unwrap());
    }

    #[test]
    fn test_overrides() {
        let config =
            AgentConfig::parse("mcts", "role=black name=deep seed=42 T=200 exp=0.7 role=white")
                .unwrap();
        assert_eq!(config.name, "deep");
        assert_eq!(config.role, Player::White);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.cycles, 200);
        assert_eq!(config.exploration_constant, 0.7);

        let options = config.options();
        assert_eq!(options.cycles(), 200);
        assert_eq!(options.exploration_constant(), 0.7);
        assert_eq!(options.seed(), Some(42));
        assert_eq!(options.time_budget(), Duration::from_secs(1));
    }

    #[test_log::test]
    fn test_malformed_tunables_keep_defaults() {
        let config =
            AgentConfig::parse("mcts", "role=white T=lots exp=high seed=-1 T=-3 exp=nan speed=9")
                .unwrap();
        assert_eq!(config.cycles, 1000);
        assert_eq!(config.exploration_constant, 0.25);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_missing_or_invalid_role() {
        assert!(matches!(
            AgentConfig::parse("mcts", "T=10"),
            Err(Error::InvalidRole(role)) if role == "unknown"
        ));
        assert!(matches!(
            AgentConfig::parse("mcts", "role=red"),
            Err(Error::InvalidRole(role)) if role == "red"
        ));
        // A bare token is read as key=value with both set to the token.
        assert!(AgentConfig::parse("mcts", "role").is_err());
    }

    #[test]
    fn test_reserved_name() {
        for name in ["a(b", "x;y", "[m]", "p:q", ""] {
            let args = format!("name={} role=black", name);
            assert!(
                matches!(AgentConfig::parse("mcts", &args), Err(Error::InvalidName(_))),
                "{:?} should be rejected",
                name
            );
        }
        assert!(AgentConfig::new("a b", Player::Black).is_err());
        assert!(AgentConfig::new("mcts-2", Player::Black).is_ok());
    }

    #[test]
    fn test_name_checked_before_role() {
        assert!(matches!(
            AgentConfig::parse("bad;name", ""),
            Err(Error::InvalidName(_))
        ));
    }
}
