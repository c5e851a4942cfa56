//! Muscle taxonomy - canonical body parts and top-level categories
//!
//! Two tables, many-to-one:
//! free-text muscle name -> `BodyPart` (readiness tracking) -> `Category` (balance advice)

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Canonical body part slugs used for readiness tracking
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BodyPart {
    Chest,
    UpperBack,
    LowerBack,
    Lats,
    Deltoids,
    FrontDeltoids,
    BackDeltoids,
    Neck,
    Biceps,
    Triceps,
    Forearms,
    Abs,
    Obliques,
    Quadriceps,
    Hamstring,
    Gluteal,
    Calves,
    Ankles,
    /// Slugified name that matched nothing in the tables
    Custom(String),
}

impl BodyPart {
    /// All canonical body parts for iteration
    pub fn all() -> &'static [BodyPart] {
        &[
            BodyPart::Chest,
            BodyPart::UpperBack,
            BodyPart::LowerBack,
            BodyPart::Lats,
            BodyPart::Deltoids,
            BodyPart::FrontDeltoids,
            BodyPart::BackDeltoids,
            BodyPart::Neck,
            BodyPart::Biceps,
            BodyPart::Triceps,
            BodyPart::Forearms,
            BodyPart::Abs,
            BodyPart::Obliques,
            BodyPart::Quadriceps,
            BodyPart::Hamstring,
            BodyPart::Gluteal,
            BodyPart::Calves,
            BodyPart::Ankles,
        ]
    }

    pub fn slug(&self) -> &str {
        match self {
            BodyPart::Chest => "chest",
            BodyPart::UpperBack => "upper-back",
            BodyPart::LowerBack => "lower-back",
            BodyPart::Lats => "lats",
            BodyPart::Deltoids => "deltoids",
            BodyPart::FrontDeltoids => "front-deltoids",
            BodyPart::BackDeltoids => "back-deltoids",
            BodyPart::Neck => "neck",
            BodyPart::Biceps => "biceps",
            BodyPart::Triceps => "triceps",
            BodyPart::Forearms => "forearms",
            BodyPart::Abs => "abs",
            BodyPart::Obliques => "obliques",
            BodyPart::Quadriceps => "quadriceps",
            BodyPart::Hamstring => "hamstring",
            BodyPart::Gluteal => "gluteal",
            BodyPart::Calves => "calves",
            BodyPart::Ankles => "ankles",
            BodyPart::Custom(slug) => slug,
        }
    }

    fn from_slug(slug: &str) -> Option<BodyPart> {
        BodyPart::all().iter().find(|p| p.slug() == slug).cloned()
    }

    pub fn category(&self) -> Option<Category> {
        category_of(self)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl From<String> for BodyPart {
    fn from(value: String) -> Self {
        BodyPart::from_slug(&value).unwrap_or(BodyPart::Custom(value))
    }
}

impl From<BodyPart> for String {
    fn from(value: BodyPart) -> Self {
        value.slug().to_string()
    }
}

/// Top-level muscle groups for balance recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Chest,
            Category::Back,
            Category::Shoulders,
            Category::Arms,
            Category::Legs,
            Category::Core,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Chest => "Chest",
            Category::Back => "Back",
            Category::Shoulders => "Shoulders",
            Category::Arms => "Arms",
            Category::Legs => "Legs",
            Category::Core => "Core",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact aliases, checked after slugify
const BODY_PART_ALIASES: &[(&str, BodyPart)] = &[
    ("glutes", BodyPart::Gluteal),
    ("glute", BodyPart::Gluteal),
    ("butt", BodyPart::Gluteal),
    ("calf", BodyPart::Calves),
    ("wrist", BodyPart::Forearms),
    ("wrists", BodyPart::Forearms),
    ("quads", BodyPart::Quadriceps),
    ("hams", BodyPart::Hamstring),
    ("hamstrings", BodyPart::Hamstring),
    ("pecs", BodyPart::Chest),
    ("lat", BodyPart::Lats),
    ("traps", BodyPart::UpperBack),
    ("shoulders", BodyPart::Deltoids),
    ("delts", BodyPart::Deltoids),
    ("core", BodyPart::Abs),
    ("six-pack", BodyPart::Abs),
];

/// Ordered keyword table: first substring hit wins, so specific names go first
const BODY_PART_KEYWORDS: &[(&str, BodyPart)] = &[
    ("biceps femoris", BodyPart::Hamstring),
    ("hamstring", BodyPart::Hamstring),
    ("anterior delt", BodyPart::FrontDeltoids),
    ("front delt", BodyPart::FrontDeltoids),
    ("posterior delt", BodyPart::BackDeltoids),
    ("rear delt", BodyPart::BackDeltoids),
    ("back delt", BodyPart::BackDeltoids),
    ("delt", BodyPart::Deltoids),
    ("shoulder", BodyPart::Deltoids),
    ("latissimus", BodyPart::Lats),
    ("lats", BodyPart::Lats),
    ("lower back", BodyPart::LowerBack),
    ("erector", BodyPart::LowerBack),
    ("lumbar", BodyPart::LowerBack),
    ("quadratus", BodyPart::LowerBack),
    ("upper back", BodyPart::UpperBack),
    ("middle back", BodyPart::UpperBack),
    ("trapez", BodyPart::UpperBack),
    ("rhomboid", BodyPart::UpperBack),
    ("back", BodyPart::UpperBack),
    ("neck", BodyPart::Neck),
    ("pector", BodyPart::Chest),
    ("chest", BodyPart::Chest),
    ("tricep", BodyPart::Triceps),
    ("bicep", BodyPart::Biceps),
    ("brachialis", BodyPart::Biceps),
    ("brachioradialis", BodyPart::Forearms),
    ("forearm", BodyPart::Forearms),
    ("wrist", BodyPart::Forearms),
    ("grip", BodyPart::Forearms),
    ("oblique", BodyPart::Obliques),
    ("abdominal", BodyPart::Abs),
    ("abdominis", BodyPart::Abs),
    ("abs", BodyPart::Abs),
    ("quad", BodyPart::Quadriceps),
    ("glute", BodyPart::Gluteal),
    ("calf", BodyPart::Calves),
    ("calves", BodyPart::Calves),
    ("gastrocnemius", BodyPart::Calves),
    ("soleus", BodyPart::Calves),
    ("ankle", BodyPart::Ankles),
    ("tibialis", BodyPart::Ankles),
];

/// Body part -> category
const CATEGORY_TABLE: &[(BodyPart, Category)] = &[
    (BodyPart::Chest, Category::Chest),
    (BodyPart::UpperBack, Category::Back),
    (BodyPart::LowerBack, Category::Back),
    (BodyPart::Lats, Category::Back),
    (BodyPart::Deltoids, Category::Shoulders),
    (BodyPart::FrontDeltoids, Category::Shoulders),
    (BodyPart::BackDeltoids, Category::Shoulders),
    (BodyPart::Neck, Category::Shoulders),
    (BodyPart::Biceps, Category::Arms),
    (BodyPart::Triceps, Category::Arms),
    (BodyPart::Forearms, Category::Arms),
    (BodyPart::Abs, Category::Core),
    (BodyPart::Obliques, Category::Core),
    (BodyPart::Quadriceps, Category::Legs),
    (BodyPart::Hamstring, Category::Legs),
    (BodyPart::Gluteal, Category::Legs),
    (BodyPart::Calves, Category::Legs),
    (BodyPart::Ankles, Category::Legs),
];

/// Lowercase, every run of non-alphanumerics becomes one '-'
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Map a free-text muscle name to its canonical body part
pub fn normalize(raw: &str) -> BodyPart {
    let slug = slugify(raw);

    if let Some(part) = BodyPart::from_slug(&slug) {
        return part;
    }

    if let Some((_, part)) = BODY_PART_ALIASES.iter().find(|(alias, _)| *alias == slug) {
        return part.clone();
    }

    // Keywords are written with spaces, match against a spaced form
    let spaced = slug.replace('-', " ");
    if let Some((_, part)) = BODY_PART_KEYWORDS
        .iter()
        .find(|(keyword, _)| spaced.contains(keyword))
    {
        return part.clone();
    }

    debug!("Unmapped muscle name {:?}, falling back to slug {:?}", raw, slug);
    BodyPart::Custom(slug)
}

/// Category for a body part; custom slugs belong to none
pub fn category_of(part: &BodyPart) -> Option<Category> {
    CATEGORY_TABLE
        .iter()
        .find(|(p, _)| p == part)
        .map(|(_, category)| *category)
}

/// Body parts folded into a category
pub fn body_parts_in(category: Category) -> Vec<BodyPart> {
    CATEGORY_TABLE
        .iter()
        .filter(|(_, c)| *c == category)
        .map(|(p, _)| p.clone())
        .collect()
}
