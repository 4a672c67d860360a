/// Numbering policy of an [`IdGenerator`](crate::IdGenerator)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdPolicy {
    /// Released ids are reused most-recent-first, otherwise the counter
    /// advances by one.
    Linear,
    /// Each id is drawn from a window of `window` candidates starting at the
    /// oldest skipped id, so that creation order cannot be read back from the
    /// numbering alone.
    Randomized { window: u32 },
}

impl IdPolicy {
    pub const DEFAULT_RANDOM_WINDOW: u32 = 16;

    pub fn randomized() -> Self {
        IdPolicy::Randomized {
            window: Self::DEFAULT_RANDOM_WINDOW,
        }
    }
}

impl Default for IdPolicy {
    fn default() -> Self {
        IdPolicy::Linear
    }
}

/// Contains config properties for id allocation on one side of a channel
#[derive(Clone, Debug, Default)]
pub struct IdGeneratorConfig {
    pub policy: IdPolicy,
}

/// Contains config properties which will be used by either side of a
/// channel
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Policy used for every id category allocated by this side
    pub id_generator: IdGeneratorConfig,
    /// Callback ids have no timeout. When more than this many callbacks are
    /// outstanding at once a warning is logged on every new registration.
    pub callback_warn_threshold: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id_generator: IdGeneratorConfig::default(),
            callback_warn_threshold: 1024,
        }
    }
}

/// Contains config properties for subtree replay
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// A node with at least this many children gets them spliced in through
    /// a single fragment instead of one append per child
    pub batch_threshold: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { batch_threshold: 5 }
    }
}
