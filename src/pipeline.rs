use fastrand::Rng;
use log::{debug, trace};

use crate::cases::{Case, MutationSet, SEED};
use crate::mutators::{self, Mutator};

/// Applies every registered mutator once to a seed.
///
/// The random generator is injected so callers can pin it with
/// `Rng::with_seed` and get reproducible content.
pub struct Pipeline {
    rng: Rng,
    catalog: Vec<Mutator>,
}

impl Pipeline {
    pub fn new(rng: Rng, catalog: Vec<Mutator>) -> Self {
        Pipeline { rng, catalog }
    }

    pub fn with_default_catalog(rng: Rng) -> Self {
        Self::new(rng, mutators::default_catalog())
    }

    pub fn catalog(&self) -> &[Mutator] {
        &self.catalog
    }

    pub fn generate(&mut self, seed: &str) -> MutationSet {
        let mut cases = Vec::with_capacity(self.catalog.len() + 1);
        cases.push(Case {
            mutator: SEED.to_string(),
            input: seed.to_string(),
        });

        for mutator in &self.catalog {
            let input = mutator.apply(seed, &mut self.rng);
            debug!("{}: {} -> {} bytes", mutator.name, seed.len(), input.len());
            trace!("{}: {:?}", mutator.name, input);
            cases.push(Case {
                mutator: mutator.name.to_string(),
                input,
            });
        }

        MutationSet { cases }
    }
}
