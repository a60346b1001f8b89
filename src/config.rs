use serde::Deserialize;

/// What happens when an entity carries the same tag key twice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTags {
    #[default]
    FirstWins,
    LastWins,
    Reject,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Decode XZ when the file name ends in `.xz`. Standard input is read as is.
    #[default]
    Auto,
    None,
    Xz,
}

/// Options resolved once before a load starts.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub node_tags: bool,
    pub relation_tags: bool,
    /// Treat `tag` inside `relation` as a grammar error instead of skipping it.
    pub reject_relation_tags: bool,
    pub duplicate_tags: DuplicateTags,
    pub compression: Compression,
}
