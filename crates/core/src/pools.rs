//! Fixed local card pools.
//!
//! These pools follow the same rarity mapping as the external source but
//! never fail: there is no network call behind them. Both roll battle stats
//! from per-rarity ranges.

use async_trait::async_trait;
use rand::{Rng, RngCore};

use crate::rarity::{Rarity, RarityTier};
use crate::source::{CharacterSource, SourceCharacter, StatRanges};

// ---------------------------------------------------------------------------
// Duel monsters
// ---------------------------------------------------------------------------

/// Group label for the duel pool.
pub const DUEL_GROUP: &str = "Yu-Gi-Oh!";

const DUEL_CARDS: &[&str] = &[
    "Dark Magician",
    "Blue-Eyes White Dragon",
    "Red-Eyes Black Dragon",
    "Summoned Skull",
    "Jinzo",
    "Buster Blader",
    "Celtic Guardian",
    "Gaia the Fierce Knight",
    "Kuriboh",
    "La Jinn the Mystical Genie",
    "Beta The Magnet Warrior",
    "Alpha The Magnet Warrior",
    "Gamma The Magnet Warrior",
    "Harpie Lady",
    "Time Wizard",
    "Relinquished",
    "Obnoxious Celtic Guardian",
    "Axe Raider",
    "Vorcerader",
    "Man-Eater Bug",
];

/// Monster card pool: every card is available at every rarity, only the
/// stat ranges scale.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuelPool;

#[async_trait]
impl CharacterSource for DuelPool {
    fn name(&self) -> &'static str {
        "duel"
    }

    async fn fetch(
        &self,
        _tier: &RarityTier,
        _rng: &mut (dyn RngCore + Send),
    ) -> Vec<SourceCharacter> {
        DUEL_CARDS
            .iter()
            .map(|name| SourceCharacter::new(*name, DUEL_GROUP, None))
            .collect()
    }

    fn stat_ranges(&self, rarity: Rarity) -> Option<StatRanges> {
        let (hp, dmg) = match rarity {
            Rarity::Common => ((1200, 1800), (300, 600)),
            Rarity::Rare => ((1800, 2400), (600, 1000)),
            Rarity::Epic => ((2400, 3000), (1000, 1400)),
            Rarity::Legendary => ((3000, 3800), (1400, 1800)),
            Rarity::Mythic => ((3800, 4500), (1800, 2400)),
        };
        Some(StatRanges { hp, dmg })
    }
}

// ---------------------------------------------------------------------------
// Pocket monsters
// ---------------------------------------------------------------------------

/// Group label for the pocket pool.
pub const POCKET_GROUP: &str = "Pokémon";

/// Creature form. Rarer tiers lean toward mega and ex forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocketForm {
    Normal,
    Mega,
    Ex,
}

impl PocketForm {
    pub fn as_str(self) -> &'static str {
        match self {
            PocketForm::Normal => "normal",
            PocketForm::Mega => "mega",
            PocketForm::Ex => "ex",
        }
    }

    /// Form weights `[normal, mega, ex]` for a rarity; each row sums to 1.
    fn weights(rarity: Rarity) -> [(PocketForm, f64); 3] {
        let [n, m, e] = match rarity {
            Rarity::Common => [1.0, 0.0, 0.0],
            Rarity::Rare => [0.95, 0.04, 0.01],
            Rarity::Epic => [0.80, 0.15, 0.05],
            Rarity::Legendary => [0.40, 0.40, 0.20],
            Rarity::Mythic => [0.10, 0.55, 0.35],
        };
        [
            (PocketForm::Normal, n),
            (PocketForm::Mega, m),
            (PocketForm::Ex, e),
        ]
    }

    /// Pick a form for `rarity` by cumulative weight.
    pub fn pick<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> PocketForm {
        let x: f64 = rng.random();
        let mut acc = 0.0;
        for (form, weight) in Self::weights(rarity) {
            acc += weight;
            if weight > 0.0 && x < acc {
                return form;
            }
        }
        PocketForm::Normal
    }
}

const SPRITES: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";
const BULBAGARDEN: &str = "https://archives.bulbagarden.net/media/upload";
const TCG: &str = "https://images.pokemontcg.io";

struct PocketEntry {
    name: &'static str,
    form: PocketForm,
    image_base: &'static str,
    image_path: &'static str,
}

impl PocketEntry {
    fn image_url(&self) -> String {
        format!("{}/{}", self.image_base, self.image_path)
    }
}

const fn entry(
    name: &'static str,
    form: PocketForm,
    image_base: &'static str,
    image_path: &'static str,
) -> PocketEntry {
    PocketEntry {
        name,
        form,
        image_base,
        image_path,
    }
}

const POCKET_CARDS: &[PocketEntry] = &[
    entry("Pikachu", PocketForm::Normal, SPRITES, "25.png"),
    entry("Charizard", PocketForm::Normal, SPRITES, "6.png"),
    entry("Blastoise", PocketForm::Normal, SPRITES, "9.png"),
    entry("Venusaur", PocketForm::Normal, SPRITES, "3.png"),
    entry("Gengar", PocketForm::Normal, SPRITES, "94.png"),
    entry("Lucario", PocketForm::Normal, SPRITES, "448.png"),
    entry("Greninja", PocketForm::Normal, SPRITES, "658.png"),
    entry("Dragonite", PocketForm::Normal, SPRITES, "149.png"),
    entry("Tyranitar", PocketForm::Normal, SPRITES, "248.png"),
    entry("Gardevoir", PocketForm::Normal, SPRITES, "282.png"),
    entry("Mega Charizard X", PocketForm::Mega, BULBAGARDEN, "0/05/006Charizard-Mega_X.png"),
    entry("Mega Charizard Y", PocketForm::Mega, BULBAGARDEN, "9/95/006Charizard-Mega_Y.png"),
    entry("Mega Blastoise", PocketForm::Mega, BULBAGARDEN, "0/02/009Blastoise-Mega.png"),
    entry("Mega Venusaur", PocketForm::Mega, BULBAGARDEN, "3/3d/003Venusaur-Mega.png"),
    entry("Mega Gengar", PocketForm::Mega, BULBAGARDEN, "e/e5/094Gengar-Mega.png"),
    entry("Mega Lucario", PocketForm::Mega, BULBAGARDEN, "4/41/448Lucario-Mega.png"),
    entry("Mega Gardevoir", PocketForm::Mega, BULBAGARDEN, "8/87/282Gardevoir-Mega.png"),
    entry("Mega Salamence", PocketForm::Mega, BULBAGARDEN, "0/0a/373Salamence-Mega.png"),
    entry("Mega Metagross", PocketForm::Mega, BULBAGARDEN, "5/5f/376Metagross-Mega.png"),
    entry("Mega Rayquaza", PocketForm::Mega, BULBAGARDEN, "8/8e/384Rayquaza-Mega.png"),
    entry("Mewtwo EX", PocketForm::Ex, TCG, "bw3/54_hires.png"),
    entry("Rayquaza EX", PocketForm::Ex, TCG, "xy6/60_hires.png"),
    entry("Groudon EX", PocketForm::Ex, TCG, "xy5/85_hires.png"),
    entry("Kyogre EX", PocketForm::Ex, TCG, "xy5/26_hires.png"),
    entry("Garchomp EX", PocketForm::Ex, TCG, "bw8/45_hires.png"),
    entry("Charizard EX", PocketForm::Ex, TCG, "xy2/12_hires.png"),
];

/// Creature pool with normal, mega and ex forms.
#[derive(Debug, Default, Clone, Copy)]
pub struct PocketPool;

#[async_trait]
impl CharacterSource for PocketPool {
    fn name(&self) -> &'static str {
        "pocket"
    }

    async fn fetch(
        &self,
        tier: &RarityTier,
        rng: &mut (dyn RngCore + Send),
    ) -> Vec<SourceCharacter> {
        let form = PocketForm::pick(tier.rarity, rng);
        POCKET_CARDS
            .iter()
            .filter(|entry| entry.form == form)
            .map(|entry| SourceCharacter {
                name: entry.name.to_string(),
                group: POCKET_GROUP.to_string(),
                image_url: Some(entry.image_url()),
                form: Some(form.as_str().to_string()),
            })
            .collect()
    }

    fn stat_ranges(&self, rarity: Rarity) -> Option<StatRanges> {
        let (hp, dmg) = match rarity {
            Rarity::Common => ((50, 80), (10, 40)),
            Rarity::Rare => ((80, 120), (40, 80)),
            Rarity::Epic => ((120, 180), (80, 130)),
            Rarity::Legendary => ((180, 230), (130, 180)),
            Rarity::Mythic => ((230, 300), (180, 240)),
        };
        Some(StatRanges { hp, dmg })
    }
}
