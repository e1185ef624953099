//! Manual alias curation, used to settle names reported as ambiguous.

use std::collections::{BTreeMap, BTreeSet};

use super::common::{load_settings, open_database, ConfigOverrides};
use crate::{cli::types::PlayerId, reconcile::UpsertEngine, Result};

/// Record `alias` for `player_id`. Returns false when the alias was already
/// known for that player.
pub fn handle_alias_add(
    overrides: &ConfigOverrides,
    player_id: PlayerId,
    alias: &str,
) -> Result<bool> {
    let config = load_settings(overrides)?;
    let db = open_database(&config)?;
    let added = db.in_transaction(|tx| {
        let mut engine = UpsertEngine::new(tx, config.names.clone())?;
        engine.add_alias(player_id, alias)
    })?;

    if added {
        println!("Added alias '{}' for player #{}", alias.trim(), player_id); // tarpaulin::skip
    } else {
        println!("Player #{} already answers to '{}'", player_id, alias.trim()); // tarpaulin::skip
    }
    Ok(added)
}

/// List recorded aliases, for one player or all of them.
pub fn handle_alias_list(
    overrides: &ConfigOverrides,
    player_id: Option<PlayerId>,
    as_json: bool,
) -> Result<BTreeMap<PlayerId, BTreeSet<String>>> {
    let config = load_settings(overrides)?;
    let db = open_database(&config)?;

    let aliases = match player_id {
        Some(id) => {
            let set = db.get_aliases(id)?;
            let mut map = BTreeMap::new();
            if !set.is_empty() {
                map.insert(id, set);
            }
            map
        }
        None => db.all_aliases()?,
    };

    // tarpaulin::skip - console output
    if as_json {
        println!("{}", serde_json::to_string_pretty(&aliases)?);
    } else if aliases.is_empty() {
        println!("No aliases recorded");
    } else {
        for (id, names) in &aliases {
            let name = db
                .get_player(*id)?
                .map(|p| p.name)
                .unwrap_or_else(|| "?".to_string());
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            println!("#{:<8} {:<28} {}", id, name, names.join(", "));
        }
    }
    Ok(aliases)
}
