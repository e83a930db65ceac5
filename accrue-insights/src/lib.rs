//! accrue-insights: batch reward pipeline and category recommendations

pub mod pipeline;
pub mod recommend;

pub use pipeline::{calculate_all, calculate_history};
pub use recommend::{
    CardStatus, CategoryCardInsight, CategoryGroup, CategoryRecommendation, GroupMember,
    USE_RATE_WINDOW, generate_category_recommendations,
};
