//! Loading the in-memory model the CLI generates against.

use anyhow::{Context, bail};
use coupongen::{DrawType, ExclusionSet, InclusionPools, Number, StaticModel};
use serde::Deserialize;
use std::{collections::BTreeSet, path::Path};

/// On-disk model: inclusion pools per position plus excluded numbers.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    pub inclusion: Vec<Vec<Number>>,
    #[serde(default)]
    pub exclusion: Vec<Number>,
}

impl ModelFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid model file {}", path.display()))
    }

    /// Checks the file against `draw_type` and returns its pools and
    /// exclusions.
    pub fn into_parts(self, draw_type: DrawType) -> anyhow::Result<(InclusionPools, ExclusionSet)> {
        let positions = draw_type.valid_numbers_count();
        if self.inclusion.len() != positions {
            bail!(
                "{} needs {} inclusion pools, model file has {}",
                draw_type,
                positions,
                self.inclusion.len()
            );
        }

        let max_number = draw_type.max_number();
        let out_of_range = self
            .inclusion
            .iter()
            .flatten()
            .chain(&self.exclusion)
            .find(|&&number| number == 0 || number > max_number);
        if let Some(number) = out_of_range {
            bail!("Number {number} is outside 1..={max_number} for {draw_type}");
        }

        let pools = self
            .inclusion
            .into_iter()
            .map(|pool| pool.into_iter().collect::<BTreeSet<_>>())
            .collect();
        Ok((pools, self.exclusion.into_iter().collect()))
    }
}

/// Builds the model for a run: the model file if given, otherwise the whole
/// number range of the game, with `extra_exclusions` added either way.
pub fn build_model(
    draw_type: DrawType,
    model_file: Option<&Path>,
    extra_exclusions: &ExclusionSet,
) -> anyhow::Result<StaticModel> {
    match model_file {
        Some(path) => {
            let (pools, mut exclusion) = ModelFile::load(path)?.into_parts(draw_type)?;
            exclusion.extend(extra_exclusions);
            Ok(StaticModel::new(pools, exclusion))
        }
        None => Ok(StaticModel::full_range(draw_type).with_exclusion(extra_exclusions.clone())),
    }
}
