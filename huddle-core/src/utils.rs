use crate::model::{IceServerConfig, Nickname};
use rand::Rng;
use rand::seq::SliceRandom;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Public STUN servers used when nothing else is configured.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    [DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2]
        .into_iter()
        .map(|url| IceServerConfig {
            urls: vec![url.to_owned()],
            username: None,
            credential: None,
        })
        .collect()
}

const ADJECTIVES: &[&str] = &[
    "Happy", "Clever", "Swift", "Bright", "Calm", "Bold", "Witty", "Keen", "Lively", "Eager",
    "Gentle", "Mighty", "Noble", "Quick", "Rare", "Sleek", "Sunny", "Tidy", "Vivid", "Wise",
    "Zesty", "Alert", "Bouncy", "Crafty", "Daring", "Fierce", "Graceful", "Honest", "Jolly",
    "Kind", "Loyal",
];

const ANIMALS: &[&str] = &[
    "Panda", "Tiger", "Eagle", "Dolphin", "Fox", "Wolf", "Bear", "Lion", "Penguin", "Rabbit",
    "Squirrel", "Deer", "Otter", "Hawk", "Owl", "Raven", "Shark", "Whale", "Phoenix", "Dragon",
    "Unicorn", "Cheetah", "Lynx", "Badger", "Emu", "Koala", "Lemur", "Meerkat", "Narwhal",
    "Ocelot", "Puma", "Quail",
];

/// Nickname of the form `<Adjective><Animal><0..1000>`, e.g. `CalmOtter512`.
pub fn random_nickname() -> Nickname {
    random_nickname_with(&mut rand::thread_rng())
}

pub fn random_nickname_with<R: Rng + ?Sized>(rng: &mut R) -> Nickname {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Happy");
    let animal = ANIMALS.choose(rng).copied().unwrap_or("Panda");
    let number: u16 = rng.gen_range(0..1000);

    Nickname::generated(format!("{adjective}{animal}{number}"))
}
