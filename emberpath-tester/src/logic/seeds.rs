use anyhow::{Result, bail};
use emberpath_game::{decode_world_code, encode_world_code};
use serde::Serialize;
use std::collections::HashSet;

/// Seed metadata for one simulated world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: String,
}

impl SeedInfo {
    #[must_use]
    pub fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: encode_world_code(seed),
        }
    }

    #[must_use]
    pub fn from_world_code(seed: u64, code: &str) -> Self {
        Self {
            seed,
            code: code.trim().to_uppercase(),
        }
    }
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve CLI seed tokens: literal integers or world codes.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved: Vec<SeedInfo> = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let info = if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else if let Some(seed) = decode_world_code(token) {
            SeedInfo::from_world_code(seed, token)
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(1337));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn resolves_numeric_and_world_codes() {
        let raw = vec![
            "42".to_string(),
            "-7".to_string(),
            "ember42-1f0c".to_string(),
            "42".to_string(),
        ];
        let infos = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(infos.len(), 3, "duplicates collapse");
        assert_eq!(infos[0].seed, 42);
        assert_eq!(infos[1].seed, 7);
        assert_eq!(infos[2].code, "EMBER42-1F0C");
        assert_eq!(Some(infos[2].seed), decode_world_code("EMBER42-1F0C"));
    }

    #[test]
    fn rejects_garbage_and_defaults_when_empty() {
        assert!(resolve_seed_inputs(&["nope".to_string()]).is_err());
        assert!(resolve_seed_inputs(&["ASH\u{20AC}-0000".to_string()]).is_err());
        assert!(resolve_seed_inputs(&["EMBER+4-0000".to_string()]).is_err());
        let infos = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(infos, vec![SeedInfo::from_numeric(1337)]);
    }
}
