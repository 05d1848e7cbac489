//! Deterministic name generation.
//!
//! A new name for `original` is derived in two stages:
//!
//! 1. **Borrow**: names already generated in other categories of the same
//!    coupling group, and not yet used in this category, are reused. This
//!    makes identifiers from different domains indistinguishable.
//! 2. **Synthesize**: otherwise a string is drawn from the category's
//!    character pools. The length grows with the size of the table and with
//!    the number of rejected candidates. A candidate already handed out by a
//!    category outside the coupling group is rejected, so unrelated
//!    categories never share a name.
//!
//! Every random choice comes from a generator seeded by `original`, so a run
//! over the same inputs in the same order always produces the same tables.

use crate::{Category, CouplingGroup, RenameError, RenameTables};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Shortest synthesized name
pub const MIN_LENGTH: usize = 2;

/// Largest table size the length schedule plans for.
const SIZE_CEILING: f64 = i32::MAX as f64;

// ============================================================================
// Configuration
// ============================================================================

/// Character pools, each a group of glyphs sampled together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Look-alike glyph groups for categories outside the asset group.
    pub glyph_pools: Vec<String>,
    /// Plain pools for asset categories, whose names end up in Molang.
    pub ascii_pools: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            glyph_pools: vec!["IlＩｌ｜".to_string(), "0Oo°Οο⁰₀○。〇︒０Ｏｏ".to_string()],
            ascii_pools: vec!["abcdefghijklmnopqrstuvwxyz".to_string()],
        }
    }
}

impl GeneratorConfig {
    pub fn pools_for(&self, category: Category) -> &[String] {
        if category.prefers_ascii() {
            &self.ascii_pools
        } else {
            &self.glyph_pools
        }
    }
}

// ============================================================================
// Length schedule
// ============================================================================

/// How candidate lengths grow for a pool of `pool_size` characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthSchedule {
    /// Table growth tolerated per extra character, always above 1.
    pub factor: f64,
    /// Exclusive upper bound on candidate length.
    pub ceiling: usize,
}

impl LengthSchedule {
    pub fn for_pool_size(pool_size: usize) -> Self {
        let size = (pool_size.max(1) as f64).min(SIZE_CEILING);
        let magnitude = 10f64.powi(size.log10().floor() as i32 + 1).min(SIZE_CEILING);
        let factor = magnitude / size;
        let ceiling = (SIZE_CEILING.ln() / factor.ln()).floor() as usize;
        Self { factor, ceiling }
    }

    /// Smallest length `>= from` whose capacity exceeds `assigned` names.
    pub fn length_for(&self, assigned: usize, from: usize) -> Option<usize> {
        (from..self.ceiling).find(|&len| (assigned as f64) < self.factor.powi(len as i32))
    }
}

// ============================================================================
// Generator
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    config: GeneratorConfig,
}

impl NameGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Name for `original` in `category`, binding it on first use.
    ///
    /// `link` borrows from an explicit coupling group instead of the
    /// category's own.
    pub fn generate(
        &self,
        tables: &mut RenameTables,
        original: &str,
        category: Category,
        link: Option<CouplingGroup>,
    ) -> Result<String, RenameError> {
        if let Some(existing) = tables.get(category, original) {
            return Ok(existing.to_string());
        }

        let mut rng = seeded(original);

        if let Some(borrowed) = borrow_candidate(tables, category, link, &mut rng) {
            tables.table_mut(category).set(original, &borrowed)?;
            tracing::debug!(%category, original, name = %borrowed, "borrowed coupled name");
            return Ok(borrowed);
        }

        let name = self.synthesize(tables, original, category, link, rng)?;
        tables.table_mut(category).set(original, &name)?;
        tracing::debug!(%category, original, name = %name, "synthesized name");
        Ok(name)
    }

    fn synthesize(
        &self,
        tables: &RenameTables,
        original: &str,
        category: Category,
        link: Option<CouplingGroup>,
        mut rng: ChaCha8Rng,
    ) -> Result<String, RenameError> {
        let pools: Vec<Vec<char>> = self
            .config
            .pools_for(category)
            .iter()
            .map(|p| p.chars().collect::<Vec<_>>())
            .filter(|p| !p.is_empty())
            .collect();
        if pools.is_empty() {
            return Err(RenameError::EmptyPool { category });
        }

        let table = tables.table(category);
        let shared = shared_categories(category, link);
        let schedule = LengthSchedule::for_pool_size(pools.iter().map(Vec::len).sum());
        let mut length = MIN_LENGTH;
        let mut rejected = 0usize;

        loop {
            if rejected as f64 > schedule.factor - 1.0 {
                length += 1;
                rejected = 0;
            }
            length = match schedule.length_for(table.len(), length) {
                Some(len) => len,
                None => {
                    tracing::warn!(%category, original, length, "character pool exhausted");
                    return Err(RenameError::ExhaustedPool {
                        category,
                        original: original.to_string(),
                        length,
                        assigned: table.len(),
                    });
                }
            };

            let candidate = draw(&pools, length, &mut rng);
            let starts_with_digit = candidate.starts_with(|c: char| c.is_ascii_digit());
            if !starts_with_digit
                && !table.contains_value(&candidate)
                && !tables.value_taken_outside(&candidate, &shared)
            {
                return Ok(candidate);
            }

            rejected += 1;
            rng = perturbed(original, &mut rng);
        }
    }
}

/// Categories allowed to hold the same name as `category`: itself, its
/// coupling group and the linked group.
fn shared_categories(category: Category, link: Option<CouplingGroup>) -> Vec<Category> {
    let mut shared = vec![category];
    for group in [category.coupling_group(), link].into_iter().flatten() {
        shared.extend_from_slice(group.members());
    }
    shared
}

/// Unused names from the coupling group, in table order. A name used in
/// several member categories appears once per use.
fn borrow_candidate(
    tables: &RenameTables,
    category: Category,
    link: Option<CouplingGroup>,
    rng: &mut ChaCha8Rng,
) -> Option<String> {
    let group = link.or_else(|| category.coupling_group())?;
    let own = tables.table(category);
    let pool: Vec<&str> = group
        .members()
        .iter()
        .flat_map(|member| tables.table(*member).values())
        .filter(|value| !own.contains_value(value))
        .collect();
    pool.choose(rng).map(|v| v.to_string())
}

/// One glyph group, `length` characters from it, repeated one to three times.
fn draw(pools: &[Vec<char>], length: usize, rng: &mut ChaCha8Rng) -> String {
    let Some(group) = pools.choose(rng) else {
        return String::new();
    };
    let unit: String = (0..length)
        .filter_map(|_| group.choose(rng).copied())
        .collect();
    unit.repeat(rng.gen_range(1..=3))
}

fn seeded(material: &str) -> ChaCha8Rng {
    let digest = Sha256::digest(material.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    ChaCha8Rng::from_seed(seed)
}

/// Reseed after a rejected candidate: shuffle the original's characters, or
/// repeat it when shuffling could not change it.
fn perturbed(original: &str, rng: &mut ChaCha8Rng) -> ChaCha8Rng {
    let mut chars: Vec<char> = original.chars().collect();
    let uniform = chars.windows(2).all(|w| w[0] == w[1]);
    let material = if uniform {
        original.repeat(rng.gen_range(1..=3))
    } else {
        chars.shuffle(rng);
        chars.into_iter().collect()
    };
    seeded(&material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_for_default_pools() {
        let ascii = LengthSchedule::for_pool_size(26);
        assert!((ascii.factor - 100.0 / 26.0).abs() < 1e-9);
        assert_eq!(ascii.ceiling, 15);

        let glyphs = LengthSchedule::for_pool_size(20);
        assert!((glyphs.factor - 5.0).abs() < 1e-9);
        assert_eq!(glyphs.ceiling, 13);
    }

    #[test]
    fn schedule_factor_stays_above_one_for_powers_of_ten() {
        let s = LengthSchedule::for_pool_size(10);
        assert_eq!(s.factor, 10.0);
        assert!(s.ceiling > MIN_LENGTH);
    }

    #[test]
    fn length_grows_with_table_size() {
        let s = LengthSchedule::for_pool_size(26);
        assert_eq!(s.length_for(0, MIN_LENGTH), Some(2));
        // 100/26 squared is about 14.8
        assert_eq!(s.length_for(15, MIN_LENGTH), Some(3));
        assert_eq!(s.length_for(usize::MAX, MIN_LENGTH), None);
    }

    #[test]
    fn seeding_is_stable() {
        let mut a = seeded("leg");
        let mut b = seeded("leg");
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn shared_categories_follow_groups() {
        assert_eq!(shared_categories(Category::Filename, None), vec![Category::Filename]);
        let linked = shared_categories(Category::Filename, Some(CouplingGroup::Ui));
        assert!(linked.contains(&Category::Localization));
        assert!(!linked.contains(&Category::Bone));
        assert!(shared_categories(Category::Bone, None).contains(&Category::Model));
    }

    #[test]
    fn draw_uses_one_group() {
        let pools: Vec<Vec<char>> = vec!["ab".chars().collect(), "xy".chars().collect()];
        let mut rng = seeded("bone");
        for _ in 0..32 {
            let s = draw(&pools, 3, &mut rng);
            let from_first = s.chars().all(|c| "ab".contains(c));
            let from_second = s.chars().all(|c| "xy".contains(c));
            assert!(from_first ^ from_second, "{s}");
            assert!(s.chars().count() % 3 == 0);
        }
    }
}
