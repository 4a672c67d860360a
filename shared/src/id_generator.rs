use std::marker::PhantomData;

use fastrand::Rng;

use crate::config::{IdGeneratorConfig, IdPolicy};

/// Issues and retires small positive integer ids of one category.
///
/// Ids start at 1 and are never zero. An id is unique while live and may be
/// handed out again only after it has been passed to [`IdGenerator::release`].
pub struct IdGenerator<K: From<u32> + Into<u32> + Copy> {
    policy: IdPolicy,
    // next never-issued id
    counter: u32,
    // linear: LIFO free list. randomized: released and skipped ids
    pool: Vec<u32>,
    rng: Rng,
    phantom_k: PhantomData<K>,
}

impl<K: From<u32> + Into<u32> + Copy> IdGenerator<K> {
    pub fn new(config: &IdGeneratorConfig) -> Self {
        Self::with_rng(config.policy, Rng::new())
    }

    pub fn linear() -> Self {
        Self::with_rng(IdPolicy::Linear, Rng::new())
    }

    pub fn randomized() -> Self {
        Self::with_rng(IdPolicy::randomized(), Rng::new())
    }

    /// Deterministic generator, used to make randomized numbering reproducible
    pub fn with_seed(policy: IdPolicy, seed: u64) -> Self {
        Self::with_rng(policy, Rng::with_seed(seed))
    }

    fn with_rng(policy: IdPolicy, rng: Rng) -> Self {
        if let IdPolicy::Randomized { window } = policy {
            assert!(window > 0, "randomized id window must be at least 1");
        }
        Self {
            policy,
            counter: 1,
            pool: Vec::new(),
            rng,
            phantom_k: PhantomData,
        }
    }

    /// Get a new, unused id
    pub fn gen(&mut self) -> K {
        let value = match self.policy {
            IdPolicy::Linear => self.gen_linear(),
            IdPolicy::Randomized { window } => self.gen_randomized(window),
        };
        K::from(value)
    }

    /// Return an id to the pool. The caller guarantees the id is no longer
    /// referenced by anything on this side.
    pub fn release(&mut self, id: K) {
        let value: u32 = id.into();
        debug_assert!(value != 0 && value < self.counter);
        self.pool.push(value);
    }

    /// One past the highest id ever issued
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Number of ids currently eligible for reuse
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    fn gen_linear(&mut self) -> u32 {
        if let Some(value) = self.pool.pop() {
            return value;
        }
        self.advance()
    }

    fn gen_randomized(&mut self, window: u32) -> u32 {
        let offset = self.rng.u32(0..window) as usize;
        if offset < self.pool.len() {
            return self.pool.remove(offset);
        }

        // every id between the counter and the target becomes a future candidate
        let skip = (offset - self.pool.len()) as u32;
        for _ in 0..skip {
            let skipped = self.advance();
            self.pool.push(skipped);
        }
        self.advance()
    }

    fn advance(&mut self) -> u32 {
        let value = self.counter;
        self.counter = self
            .counter
            .checked_add(1)
            .unwrap_or_else(|| panic!("id space exhausted"));
        value
    }
}

impl<K: From<u32> + Into<u32> + Copy> Default for IdGenerator<K> {
    fn default() -> Self {
        Self::linear()
    }
}
