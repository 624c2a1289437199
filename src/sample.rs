use rand::seq::SliceRandom;

/// Produces note text for seeding demo data.
pub trait SampleGenerator {
    fn sample(&mut self, rng: &mut dyn rand::RngCore) -> String;
}

const CHORES: &[&str] = &[
    "Water the tomato beds.",
    "Call the plumber about the kitchen tap.",
    "Renew the library books.",
    "Defrost the chest freezer.",
    "Oil the bike chain.",
    "Sort the recycling.",
    "Book the dentist check-up.",
    "Sweep the back porch.",
    "Pay the quarterly water bill.",
    "Descale the kettle.",
    "Swap the winter tyres.",
    "Choir rehearsal.",
];

/// Picks uniformly from a fixed list of chores.
#[derive(Debug, Clone)]
pub struct ChoreList {
    items: Vec<String>,
}

impl Default for ChoreList {
    fn default() -> Self {
        ChoreList {
            items: CHORES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ChoreList {
    /// Blank entries are dropped; an empty list falls back to the defaults.
    pub fn new(items: Vec<String>) -> Self {
        let items: Vec<String> = items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            return Self::default();
        }
        ChoreList { items }
    }
}

impl SampleGenerator for ChoreList {
    fn sample(&mut self, rng: &mut dyn rand::RngCore) -> String {
        self.items.choose(rng).cloned().unwrap_or_default()
    }
}
