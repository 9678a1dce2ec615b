use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Key of the one homepage document that exists per deployment.
pub const CONTENT_KEY: &str = "main";

/// Number of demo item slots the homepage renders.
pub const DEMO_SLOTS: usize = 3;

// ── Hero ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroContent {
    pub headline: String,
    pub subheadline: String,
    /// Either a `data:` URI or a `/uploads/...` path.
    pub hero_image_base64: Option<String>,
    pub primary_cta_text: String,
    pub primary_cta_url: String,
    pub secondary_cta_text: String,
    pub secondary_cta_url: String,
}

impl Default for HeroContent {
    fn default() -> Self {
        HeroContent {
            headline: "Bring Your Menu to Life in 3D".to_string(),
            subheadline: "Let customers explore your dishes with immersive, real food scans."
                .to_string(),
            hero_image_base64: None,
            primary_cta_text: "View Sample Menu".to_string(),
            primary_cta_url: "/menu".to_string(),
            secondary_cta_text: "Contact Us".to_string(),
            secondary_cta_url: "#contact".to_string(),
        }
    }
}

// ── Features / testimonials / demo items ────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default = "default_icon")]
    pub icon: String,
    pub title: String,
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: i64,
    pub quote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoItem {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default = "default_menu_link")]
    pub menu_link: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
}

fn default_icon() -> String {
    "camera".to_string()
}

fn default_color() -> String {
    "blue".to_string()
}

fn default_rating() -> i64 {
    5
}

fn default_menu_link() -> String {
    "/menu".to_string()
}

fn default_emoji() -> String {
    "🍔".to_string()
}

impl Feature {
    fn new(icon: &str, title: &str, description: &str, color: &str) -> Self {
        Feature {
            icon: icon.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            color: color.to_string(),
        }
    }
}

impl Testimonial {
    fn new(name: &str, title: &str, quote: &str) -> Self {
        Testimonial {
            name: name.to_string(),
            title: title.to_string(),
            avatar_url: None,
            rating: default_rating(),
            quote: quote.to_string(),
        }
    }
}

impl DemoItem {
    fn new(name: &str, description: &str, emoji: &str) -> Self {
        DemoItem {
            name: name.to_string(),
            description: description.to_string(),
            image_base64: None,
            menu_link: default_menu_link(),
            emoji: emoji.to_string(),
        }
    }
}

pub fn default_features() -> Vec<Feature> {
    vec![
        Feature::new(
            "camera",
            "Real Food Scans",
            "Authentic 3D models from real dishes",
            "blue",
        ),
        Feature::new(
            "smartphone",
            "No App Needed",
            "Works directly in web browsers",
            "green",
        ),
        Feature::new(
            "refresh-cw",
            "Live Menu Updates",
            "Real-time menu modifications",
            "orange",
        ),
    ]
}

pub fn default_testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial::new(
            "Jane Doe",
            "Restaurant Manager",
            "Our customers love the 3D menu—it sets us apart!",
        ),
        Testimonial::new(
            "Mike Smith",
            "Head Chef",
            "TAST3D has been a game changer for our business.",
        ),
    ]
}

pub fn default_demo_items() -> Vec<DemoItem> {
    vec![
        DemoItem::new("Cheeseburger", "Classic beef burger with cheese", "🍔"),
        DemoItem::new("Caesar Salad", "Fresh romaine with parmesan", "🥗"),
        DemoItem::new("Chocolate Donut", "Glazed chocolate donut", "🍩"),
    ]
}

// ── The document ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomepageContent {
    #[serde(default = "content_key")]
    pub id: String,
    pub hero: HeroContent,
    pub features: Vec<Feature>,
    pub testimonials: Vec<Testimonial>,
    pub demo_items: Vec<DemoItem>,
    pub updated_at: DateTime<Utc>,
}

fn content_key() -> String {
    CONTENT_KEY.to_string()
}

impl HomepageContent {
    /// Build the default document stamped with `now`. Every call returns
    /// freshly allocated lists.
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        HomepageContent {
            id: content_key(),
            hero: HeroContent::default(),
            features: default_features(),
            testimonials: default_testimonials(),
            demo_items: default_demo_items(),
            updated_at: now,
        }
    }

    pub fn defaults() -> Self {
        Self::defaults_at(Utc::now())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ── Partial updates ─────────────────────────────────────

/// A field of a partial update: left out of the request, sent as `null`, or sent
/// with a value. Use with `#[serde(default)]` so a missing key becomes `Absent`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

#[cfg(test)]
impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|v| v.map_or(Patch::Null, Patch::Value))
    }
}

/// Body of `PUT /content`. Fields replace the stored ones wholesale.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HomepageUpdate {
    #[serde(default)]
    pub hero: Patch<HeroContent>,
    #[serde(default)]
    pub features: Patch<Vec<Feature>>,
    #[serde(default)]
    pub testimonials: Patch<Vec<Testimonial>>,
    #[serde(default)]
    pub demo_items: Patch<Vec<DemoItem>>,
}

impl HomepageUpdate {
    /// Check field-level invariants. Returns one message per violation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Patch::Value(testimonials) = &self.testimonials {
            for (i, t) in testimonials.iter().enumerate() {
                if !(1..=5).contains(&t.rating) {
                    errors.push(format!(
                        "testimonials[{}].rating must be between 1 and 5 (got {})",
                        i, t.rating
                    ));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Apply present fields onto `content`. `null` clears a field: the hero goes
    /// back to its default and lists become empty.
    pub fn apply_to(self, content: &mut HomepageContent) {
        match self.hero {
            Patch::Absent => {}
            Patch::Null => content.hero = HeroContent::default(),
            Patch::Value(hero) => content.hero = hero,
        }
        apply_list(self.features, &mut content.features);
        apply_list(self.testimonials, &mut content.testimonials);
        apply_list(self.demo_items, &mut content.demo_items);
    }
}

fn apply_list<T>(patch: Patch<Vec<T>>, target: &mut Vec<T>) {
    match patch {
        Patch::Absent => {}
        Patch::Null => target.clear(),
        Patch::Value(items) => *target = items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_have_expected_shape() {
        let c = HomepageContent::defaults();
        assert_eq!(c.id, "main");
        let titles: Vec<&str> = c.features.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Real Food Scans", "No App Needed", "Live Menu Updates"]
        );
        assert_eq!(c.testimonials.len(), 2);
        assert_eq!(c.demo_items.len(), DEMO_SLOTS);
        assert!(c.hero.hero_image_base64.is_none());
        assert!(c.testimonials.iter().all(|t| t.rating == 5));
    }

    #[test]
    fn defaults_are_fresh_each_call() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut a = HomepageContent::defaults_at(at);
        let b = HomepageContent::defaults_at(at);
        a.features.clear();
        assert_eq!(b.features.len(), 3);
        assert_eq!(
            serde_json::to_string(&HomepageContent::defaults_at(at)).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn patch_distinguishes_absent_null_and_value() {
        let u: HomepageUpdate = serde_json::from_str("{}").unwrap();
        assert!(u.hero.is_absent());
        assert!(u.features.is_absent());

        let u: HomepageUpdate = serde_json::from_str(r#"{"features": null}"#).unwrap();
        assert_eq!(u.features, Patch::Null);
        assert!(u.testimonials.is_absent());

        let u: HomepageUpdate =
            serde_json::from_str(r#"{"hero": {"headline": "Hi"}}"#).unwrap();
        match u.hero {
            Patch::Value(h) => {
                assert_eq!(h.headline, "Hi");
                assert_eq!(h.primary_cta_url, "/menu");
            }
            other => panic!("expected hero value, got {:?}", other),
        }
    }

    #[test]
    fn apply_replaces_lists_wholesale() {
        let mut c = HomepageContent::defaults();
        let update: HomepageUpdate = serde_json::from_str(
            r#"{"features": [{"title": "Only", "description": "one"}], "testimonials": null}"#,
        )
        .unwrap();
        update.apply_to(&mut c);
        assert_eq!(c.features.len(), 1);
        assert_eq!(c.features[0].icon, "camera");
        assert_eq!(c.features[0].color, "blue");
        assert!(c.testimonials.is_empty());
        assert_eq!(c.demo_items.len(), 3);
    }

    #[test]
    fn null_hero_restores_default_hero() {
        let mut c = HomepageContent::defaults();
        c.hero.headline = "Changed".to_string();
        let update: HomepageUpdate = serde_json::from_str(r#"{"hero": null}"#).unwrap();
        update.apply_to(&mut c);
        assert_eq!(c.hero, HeroContent::default());
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let update: HomepageUpdate = serde_json::from_str(
            r#"{"testimonials": [
                {"name": "A", "title": "T", "rating": 0, "quote": "q"},
                {"name": "B", "title": "T", "rating": 5, "quote": "q"},
                {"name": "C", "title": "T", "rating": 6, "quote": "q"}
            ]}"#,
        )
        .unwrap();
        let errors = update.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("testimonials[0]"));
        assert!(errors[1].contains("testimonials[2]"));
    }
}
