//! Rating and review garnish for the details screen
//!
//! The catalog carries no rating data, so the details screen decorates a
//! work with a random star rating and canned reviews biased toward it.

use rand::Rng;

const REVIEW_TEXTS: [&str; 7] = [
    "An amazing read! Highly recommended.",
    "Quite an insightful book, with a few slow parts.",
    "A must-read for enthusiasts. Engaging and informative.",
    "Well-written and thought-provoking.",
    "Not my favorite, but it had some good points.",
    "Not the best.",
    "Could be better.",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub stars: u8,
    pub text: String,
}

#[derive(Clone, Default)]
pub struct ReviewService;

impl ReviewService {
    pub fn random_rating(&self) -> u8 {
        rand::thread_rng().gen_range(1..=5)
    }

    pub fn random_page_count(&self) -> u32 {
        rand::thread_rng().gen_range(100..=1000)
    }

    /// 3-5 reviews drawn from the canned pool: favorable texts for high
    /// ratings, unfavorable ones for low.
    pub fn reviews_for(&self, rating: u8) -> Vec<Review> {
        let mut rng = rand::thread_rng();
        let count = rng.gen_range(3..=5);
        (0..count)
            .map(|_| {
                let index = if rating >= 4 {
                    rng.gen_range(0..=2)
                } else if rating == 3 {
                    rng.gen_range(1..=4)
                } else {
                    rng.gen_range(4..=6)
                };
                Review {
                    stars: rating,
                    text: REVIEW_TEXTS[index].to_string(),
                }
            })
            .collect()
    }

    /// Five-star label, e.g. `★★★☆☆`.
    pub fn star_label(&self, rating: u8) -> String {
        let filled = usize::from(rating.min(5));
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}
