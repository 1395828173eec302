//! Subcommand implementations
//!
//! Each command takes already-loaded inputs and returns a serializable
//! record; `main` handles files, the catalog and printing.

use std::path::Path;

use anyhow::{Context, Result};
use chrysalis_catalog::{CatalogIndex, MAX_LEVEL};
use chrysalis_engine::rng::{breeding_seed, hatch_seed};
use chrysalis_engine::{
    Creature, CreatureId, EggMetadata, EngineRng, EngineSettings, EvolutionResult, HatchProposal,
    make_rng, select_sprite,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Ron,
    Json,
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .context("Failed to serialize RON output")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?
        }
    };
    Ok(text)
}

/// Read a creature, egg or other record from a `.json` or `.ron` file
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
    } else {
        ron::from_str(&contents).with_context(|| format!("Invalid RON in {}", path.display()))
    }
}

/// Seconds since the Unix epoch, for lineage timestamps
pub fn now_timestamp() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

// ============================================================================
// inspect
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub sprites: usize,
    pub skipped_entries: usize,
    pub levels: Vec<LevelSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: u8,
    pub families: Vec<FamilySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilySummary {
    pub family: String,
    pub sprites: usize,
    pub color_profiles: usize,
}

pub fn inspect(catalog: &CatalogIndex) -> CatalogSummary {
    let levels = catalog
        .levels()
        .filter_map(|level| {
            let families = catalog.families_by_level(level)?;
            Some(LevelSummary {
                level,
                families: families
                    .iter()
                    .map(|(family, entries)| FamilySummary {
                        family: family.clone(),
                        sprites: entries.len(),
                        color_profiles: catalog.color_profiles(family).len(),
                    })
                    .collect(),
            })
        })
        .collect();

    CatalogSummary {
        sprites: catalog.sprite_count(),
        skipped_entries: catalog.skipped_entries(),
        levels,
    }
}

// ============================================================================
// evolve
// ============================================================================

/// One evolution step; `target` defaults to the next level
pub fn evolve(
    settings: &EngineSettings,
    catalog: &CatalogIndex,
    creature: &Creature,
    wallet: &str,
    target: Option<u8>,
) -> Result<EvolutionResult> {
    let target = target.unwrap_or_else(|| creature.level.saturating_add(1));
    let result = settings
        .evolution_engine(catalog)
        .evolve(creature, target, wallet)
        .with_context(|| format!("Failed to evolve creature {}", creature.id))?;
    Ok(result)
}

// ============================================================================
// breed
// ============================================================================

pub fn breed(
    settings: &EngineSettings,
    parent_a: &Creature,
    parent_b: &Creature,
    wallet: &str,
    nonce: u64,
) -> Result<EggMetadata> {
    let seed = breeding_seed(wallet, &parent_a.id, &parent_b.id, nonce);
    let mut rng = make_rng(&seed);
    let egg = settings
        .breeding_engine()
        .breed(parent_a, parent_b, settings.egg_asset_pool, &mut rng)
        .with_context(|| format!("Failed to breed {} x {}", parent_a.id, parent_b.id))?;
    Ok(egg)
}

// ============================================================================
// hatch
// ============================================================================

pub fn propose_hatch(
    settings: &EngineSettings,
    catalog: &CatalogIndex,
    egg: &Creature,
    wallet: &str,
    nonce: u64,
    count: Option<usize>,
) -> Result<HatchProposal> {
    let mut rng = make_rng(&hatch_seed(wallet, &egg.id, nonce));
    let proposal = settings
        .hatching_engine(catalog)
        .propose_hatch_options(egg, count.unwrap_or(settings.hatch_options), &mut rng)
        .with_context(|| format!("Failed to propose hatch options for egg {}", egg.id))?;
    Ok(proposal)
}

/// Hatch the egg into the proposal's `pick`-th candidate
pub fn hatch(
    settings: &EngineSettings,
    catalog: &CatalogIndex,
    egg: &Creature,
    proposal: &HatchProposal,
    pick: usize,
) -> Result<Creature> {
    let candidate = proposal.candidates.get(pick).with_context(|| {
        format!(
            "Hatch option {} out of range ({} offered)",
            pick,
            proposal.candidates.len()
        )
    })?;
    let creature = settings.hatching_engine(catalog).hatch(egg, candidate)?;
    Ok(creature)
}

// ============================================================================
// simulate
// ============================================================================

/// A hatchling driven to the terminal level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub hatchling: Creature,
    pub steps: Vec<EvolutionResult>,
    pub creature: Creature,
}

/// Hatch a fresh level-0 creature and evolve it to the terminal level.
///
/// Without `family`, the level-0 family is drawn uniformly.
pub fn simulate(
    settings: &EngineSettings,
    catalog: &CatalogIndex,
    wallet: &str,
    id: &str,
    family: Option<&str>,
) -> Result<SimulationReport> {
    let id = CreatureId::new(id);
    let hatchling = spawn_hatchling(settings, catalog, wallet, &id, family)?;
    let engine = settings.evolution_engine(catalog);

    let mut creature = hatchling.clone();
    let mut steps = Vec::new();
    for target in 1..=MAX_LEVEL {
        let result = engine
            .evolve(&creature, target, wallet)
            .with_context(|| format!("Simulation stopped at level {}", creature.level))?;
        creature.apply_evolution(&result, now_timestamp())?;
        log::info!(
            "Level {}: {} ({})",
            target,
            result.sprite.display_name,
            result.family
        );
        steps.push(result);
    }

    Ok(SimulationReport {
        hatchling,
        steps,
        creature,
    })
}

fn spawn_hatchling(
    settings: &EngineSettings,
    catalog: &CatalogIndex,
    wallet: &str,
    id: &CreatureId,
    family: Option<&str>,
) -> Result<Creature> {
    let level_zero = catalog
        .families_by_level(0)
        .context("Catalog has no level-0 families")?;
    let mut rng = make_rng(&hatch_seed(wallet, id, 0));

    let (family, entries) = match family {
        Some(name) => level_zero
            .get_key_value(name)
            .with_context(|| format!("Unknown level-0 family '{name}'"))?,
        None => level_zero
            .get_index(rng.next_index(level_zero.len()))
            .context("Catalog has no level-0 families")?,
    };
    let sprite = select_sprite(entries, &mut rng)
        .with_context(|| format!("Family '{family}' has no level-0 sprites"))?;

    let attributes = settings
        .keys
        .stamp(&sprite.attributes, family, &sprite.sprite_id, 0);
    let mut creature = Creature::hatched(id.clone(), family.as_str(), sprite.sprite_id.as_str(), attributes);
    let color = settings
        .color_matcher()
        .resolve(catalog.color_profiles(family), sprite);
    creature.color_profile = color.profile;
    Ok(creature)
}
