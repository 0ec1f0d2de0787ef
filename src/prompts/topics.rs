//! Default topic table
//!
//! Each entry completes the sentence "tell me a long story about ...".

/// Topics chosen from when the config does not supply its own table
pub const DEFAULT_TOPICS: &[&str] = &[
    "a cat",
    "a lighthouse keeper who befriends a storm",
    "a dragon who is afraid of heights",
    "a robot learning to bake bread",
    "a city that moves every night",
    "two rival clockmakers",
    "a library where the books rewrite themselves",
    "a fox who runs a small train station",
    "a sailor lost on a sea of glass",
    "a village that forgot how to sleep",
    "an astronaut who finds a garden on the moon",
    "a detective who can hear lies as music",
    "a tree that remembers every traveller",
    "an orchestra of mechanical birds",
    "a girl who trades her shadow for a map",
    "the last bookshop at the end of the world",
];
