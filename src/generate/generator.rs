//! Prompt Generator: enumerates combinations over the resolved placeholder
//! spaces and assigns seeds (`SPEC_FULL.md` §4.7).

use crate::generate::normalizer;
use crate::generate::rng::SplitMix64;
use crate::model::document::Parameters;
use crate::model::{GenerationConfig, Mode, SeedMode};
use crate::resolve::template;
use crate::resolve::ResolvedContext;
use indexmap::IndexMap;
use std::collections::HashSet;

/// One concrete generation unit: a fully substituted, normalized prompt
/// pair plus the seed and variation choices that produced it.
#[derive(Debug, Clone)]
pub struct ResolvedPrompt {
    /// The final positive prompt string.
    pub positive: String,
    /// The final negative prompt string, if the document had one.
    pub negative: Option<String>,
    /// The seed to submit to the synthesis API (`-1` means "API chooses").
    pub seed: i64,
    /// Placeholder name -> the key chosen for this prompt.
    pub variations: IndexMap<String, String>,
    /// A snapshot of the document's merged parameters.
    pub parameters: Parameters,
}

/// Enumerates every resolved prompt for one document's resolved context
/// under its generation configuration.
#[must_use]
pub fn generate(ctx: &ResolvedContext, gen: &GenerationConfig, rng: &mut SplitMix64) -> Vec<ResolvedPrompt> {
    let names: Vec<String> = ctx.placeholders.keys().cloned().collect();
    let sizes: Vec<usize> = names.iter().map(|n| ctx.placeholders[n].len()).collect();

    let combos = enumerate(&sizes, gen.mode, gen.seed_mode, gen.max_images, rng);

    let positive_tokens = template::scan_tokens(&ctx.template);
    let negative_tokens = ctx.negative_template.as_deref().map(template::scan_tokens);

    combos
        .into_iter()
        .enumerate()
        .map(|(i, combo)| {
            let mut keys = IndexMap::new();
            let mut values = IndexMap::new();
            for (pos, name) in names.iter().enumerate() {
                let map = &ctx.placeholders[name];
                if let Some((k, v)) = map.get_index(combo[pos]) {
                    keys.insert(name.clone(), k.clone());
                    values.insert(name.clone(), v.clone());
                }
            }

            let positive = normalizer::normalize(&template::substitute(&ctx.template, &positive_tokens, &values));
            let negative = ctx.negative_template.as_ref().map(|neg| {
                let tokens = negative_tokens.as_deref().unwrap_or_default();
                normalizer::normalize(&template::substitute(neg, tokens, &values))
            });

            ResolvedPrompt {
                positive,
                negative,
                seed: assign_seed(gen.seed_mode, gen.base_seed, i),
                variations: keys,
                parameters: ctx.parameters.clone(),
            }
        })
        .collect()
}

fn assign_seed(seed_mode: SeedMode, base_seed: i64, index: usize) -> i64 {
    match seed_mode {
        SeedMode::Fixed => base_seed,
        SeedMode::Progressive => base_seed.wrapping_add(index as i64),
        SeedMode::Random => -1,
    }
}

fn enumerate(sizes: &[usize], mode: Mode, seed_mode: SeedMode, max_images: usize, rng: &mut SplitMix64) -> Vec<Vec<usize>> {
    if sizes.is_empty() {
        return match seed_mode {
            SeedMode::Fixed => vec![Vec::new()],
            SeedMode::Progressive | SeedMode::Random => (0..max_images).map(|_| Vec::new()).collect(),
        };
    }
    if sizes.iter().any(|&s| s == 0) {
        return Vec::new();
    }

    match mode {
        Mode::Combinatorial => {
            let total: usize = sizes.iter().product();
            let take = if max_images == 0 { total } else { max_images.min(total) };
            (0..take).map(|i| decode(i, sizes)).collect()
        }
        Mode::Random => {
            if max_images == 0 {
                return Vec::new();
            }
            let total: usize = sizes.iter().product();
            let allow_duplicates = seed_mode != SeedMode::Fixed && max_images > total;
            if allow_duplicates {
                (0..max_images).map(|_| decode(rng.next_below(total), sizes)).collect()
            } else {
                sample_distinct_indices(total, max_images.min(total), rng)
                    .into_iter()
                    .map(|i| decode(i, sizes))
                    .collect()
            }
        }
    }
}

/// Decodes a flat combination index into per-placeholder indices, with the
/// last placeholder varying fastest (matching nested-loop declaration
/// order: outer placeholders first).
fn decode(mut index: usize, sizes: &[usize]) -> Vec<usize> {
    let mut combo = vec![0; sizes.len()];
    for pos in (0..sizes.len()).rev() {
        let size = sizes[pos];
        combo[pos] = index % size;
        index /= size;
    }
    combo
}

fn sample_distinct_indices(total: usize, count: usize, rng: &mut SplitMix64) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let idx = rng.next_below(total);
        if seen.insert(idx) {
            out.push(idx);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VariationMap;

    fn map(entries: &[(&str, &str)]) -> VariationMap {
        entries.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_scenario_a_fixed_combinatorial() {
        let mut placeholders = IndexMap::new();
        placeholders.insert("Expression".to_string(), map(&[("happy", "smiling"), ("sad", "crying")]));
        placeholders.insert("Angle".to_string(), map(&[("front", "front view"), ("side", "side view")]));
        let ctx = ResolvedContext {
            template: "masterpiece, {Expression}, {Angle}".to_string(),
            negative_template: None,
            placeholders,
            parameters: Parameters::new(),
        };
        let gen = GenerationConfig {
            mode: Mode::Combinatorial,
            seed_mode: SeedMode::Fixed,
            base_seed: 42,
            max_images: 0,
        };
        let mut rng = SplitMix64::from_base_seed(42);
        let prompts = generate(&ctx, &gen, &mut rng);

        assert_eq!(prompts.len(), 4);
        assert!(prompts.iter().all(|p| p.seed == 42));
        assert_eq!(prompts[0].positive, "masterpiece, smiling, front view");
        assert_eq!(prompts[1].positive, "masterpiece, smiling, side view");
        assert_eq!(prompts[2].positive, "masterpiece, crying, front view");
        assert_eq!(prompts[3].positive, "masterpiece, crying, side view");
    }

    #[test]
    fn test_scenario_b_progressive_selector_duplicates_allowed() {
        let mut placeholders = IndexMap::new();
        placeholders.insert("Expression".to_string(), map(&[("happy", "smiling"), ("angry", "angry look")]));
        let ctx = ResolvedContext {
            template: "{Expression}".to_string(),
            negative_template: None,
            placeholders,
            parameters: Parameters::new(),
        };
        let gen = GenerationConfig {
            mode: Mode::Random,
            seed_mode: SeedMode::Progressive,
            base_seed: 100,
            max_images: 3,
        };
        let mut rng = SplitMix64::from_base_seed(100);
        let prompts = generate(&ctx, &gen, &mut rng);

        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts.iter().map(|p| p.seed).collect::<Vec<_>>(), vec![100, 101, 102]);
        for p in &prompts {
            assert!(p.positive == "smiling" || p.positive == "angry look");
        }
    }

    #[test]
    fn test_empty_space_fixed_emits_one() {
        let ctx = ResolvedContext {
            template: "masterpiece".to_string(),
            negative_template: None,
            placeholders: IndexMap::new(),
            parameters: Parameters::new(),
        };
        let gen = GenerationConfig {
            mode: Mode::Combinatorial,
            seed_mode: SeedMode::Fixed,
            base_seed: 7,
            max_images: 5,
        };
        let mut rng = SplitMix64::from_base_seed(7);
        let prompts = generate(&ctx, &gen, &mut rng);
        assert_eq!(prompts.len(), 1);
    }

    #[test]
    fn test_empty_space_random_emits_max_images() {
        let ctx = ResolvedContext {
            template: "masterpiece".to_string(),
            negative_template: None,
            placeholders: IndexMap::new(),
            parameters: Parameters::new(),
        };
        let gen = GenerationConfig {
            mode: Mode::Random,
            seed_mode: SeedMode::Random,
            base_seed: 7,
            max_images: 5,
        };
        let mut rng = SplitMix64::from_base_seed(7);
        let prompts = generate(&ctx, &gen, &mut rng);
        assert_eq!(prompts.len(), 5);
        assert!(prompts.iter().all(|p| p.seed == -1));
    }

    #[test]
    fn test_placeholder_consistency_across_occurrences() {
        let mut placeholders = IndexMap::new();
        placeholders.insert("Style".to_string(), map(&[("anime", "anime style")]));
        let ctx = ResolvedContext {
            template: "{Style}, background matches {Style}".to_string(),
            negative_template: None,
            placeholders,
            parameters: Parameters::new(),
        };
        let gen = GenerationConfig {
            mode: Mode::Combinatorial,
            seed_mode: SeedMode::Fixed,
            base_seed: 1,
            max_images: 0,
        };
        let mut rng = SplitMix64::from_base_seed(1);
        let prompts = generate(&ctx, &gen, &mut rng);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].positive, "anime style, background matches anime style");
    }

    #[test]
    fn test_progressive_seed_sequence() {
        let mut placeholders = IndexMap::new();
        placeholders.insert("X".to_string(), map(&[("a", "a"), ("b", "b"), ("c", "c")]));
        let ctx = ResolvedContext {
            template: "{X}".to_string(),
            negative_template: None,
            placeholders,
            parameters: Parameters::new(),
        };
        let gen = GenerationConfig {
            mode: Mode::Combinatorial,
            seed_mode: SeedMode::Progressive,
            base_seed: 10,
            max_images: 0,
        };
        let mut rng = SplitMix64::from_base_seed(10);
        let prompts = generate(&ctx, &gen, &mut rng);
        assert_eq!(prompts.iter().map(|p| p.seed).collect::<Vec<_>>(), vec![10, 11, 12]);
    }
}
