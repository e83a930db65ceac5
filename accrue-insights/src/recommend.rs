//! Category recommendations: ranks cards within user-defined category
//! groups by their effective reward rate over the most recent period.

use std::collections::BTreeMap;

use accrue_core::{CreditCard, RewardCalculation, Settings};
use serde::{Deserialize, Serialize};

/// A card earns `use` when its rate is within this fraction of the best
/// non-avoided rate in the group.
pub const USE_RATE_WINDOW: f64 = 0.9;

/// A user-defined spending category ("Dining out", "Travel") that compares
/// whole cards and/or specific subcategory bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    pub members: Vec<GroupMember>,
}

/// One group member: a whole card, or one band of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub card_id: String,
    /// `None` compares the whole card; `Some` compares just that band.
    #[serde(default)]
    pub subcategory_id: Option<String>,
}

/// Verdict for one card within a group. Declaration order is ranking
/// order: `use` sorts ahead of `consider`, which sorts ahead of `avoid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Use,
    Consider,
    Avoid,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Use => "use",
            CardStatus::Consider => "consider",
            CardStatus::Avoid => "avoid",
        }
    }
}

/// Per-card figures within one category group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCardInsight {
    pub card_id: String,
    pub card_name: String,
    pub status: CardStatus,
    /// Dollars earned per eligible dollar spent (0 when nothing eligible).
    pub reward_rate: f64,
    /// Normalized at the settings passed to the recommendation run, not
    /// the settings stored with the calculation.
    pub reward_earned_dollars: f64,
    pub eligible_spend: f64,
    /// Card-wide room left under the cap; `None` when no cap configured.
    pub headroom_to_maximum: Option<f64>,
    /// Spend still needed to clear the card minimum; `None` when no
    /// positive minimum is configured.
    pub minimum_remaining: Option<f64>,
}

/// The recommendation output for one category group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecommendation {
    pub group_id: String,
    pub group_name: String,
    pub insights: Vec<CategoryCardInsight>,
}

impl CategoryRecommendation {
    /// One-line recap: the group's top pick and field size.
    pub fn summary(&self) -> String {
        match self.insights.first() {
            Some(best) => format!(
                "{}: {} {} at {:.2}% back ({} compared)",
                self.group_name,
                best.status.as_str(),
                best.card_name,
                best.reward_rate * 100.0,
                self.insights.len(),
            ),
            None => format!("{}: no cards resolved", self.group_name),
        }
    }
}

enum Scope {
    WholeCard,
    Bands(Vec<String>),
}

struct Resolved<'a> {
    card: &'a CreditCard,
    calc: &'a RewardCalculation,
    eligible_spend: f64,
    reward_dollars: f64,
    rate: f64,
    headroom: Option<f64>,
    capped_out: bool,
}

/// Ranks cards per category group.
///
/// Algorithm (deterministic):
/// 1) Resolve each member to its card and that card's most recent
///    calculation; members without both are dropped. A whole-card member
///    overrides band members for the same card.
/// 2) Aggregate the referenced scope's eligible spend and raw reward
///    units, re-normalizing miles at the current settings.
/// 3) Status: `avoid` once the card-wide cap is reached; `use` when the
///    minimum is cleared and the rate is positive and within
///    [`USE_RATE_WINDOW`] of the group's best non-avoided rate;
///    `consider` otherwise.
/// 4) Sort by status, then rate descending, then dollars descending,
///    then card id. Groups that resolve no insights are omitted.
pub fn generate_category_recommendations(
    cards: &[CreditCard],
    calculations: &[RewardCalculation],
    groups: &[CategoryGroup],
    settings: &Settings,
) -> Vec<CategoryRecommendation> {
    groups
        .iter()
        .filter_map(|group| recommend_group(cards, calculations, group, settings))
        .collect()
}

fn recommend_group(
    cards: &[CreditCard],
    calculations: &[RewardCalculation],
    group: &CategoryGroup,
    settings: &Settings,
) -> Option<CategoryRecommendation> {
    let mut scopes: BTreeMap<&str, Scope> = BTreeMap::new();
    for member in &group.members {
        match &member.subcategory_id {
            None => {
                scopes.insert(member.card_id.as_str(), Scope::WholeCard);
            }
            Some(band_id) => match scopes.get_mut(member.card_id.as_str()) {
                Some(Scope::WholeCard) => {}
                Some(Scope::Bands(ids)) => {
                    if !ids.contains(band_id) {
                        ids.push(band_id.clone());
                    }
                }
                None => {
                    scopes.insert(member.card_id.as_str(), Scope::Bands(vec![band_id.clone()]));
                }
            },
        }
    }

    let resolved: Vec<Resolved> = scopes
        .iter()
        .filter_map(|(card_id, scope)| {
            let card = cards.iter().find(|c| c.id == *card_id)?;
            let calc = calculations
                .iter()
                .filter(|c| c.card_id == *card_id)
                .max_by_key(|c| c.period.start)?;
            Some(resolve_scope(card, calc, scope, settings))
        })
        .collect();
    if resolved.is_empty() {
        return None;
    }

    let best_rate = resolved
        .iter()
        .filter(|r| !r.capped_out)
        .map(|r| r.rate)
        .fold(0.0, f64::max);

    let mut insights: Vec<CategoryCardInsight> = resolved
        .into_iter()
        .map(|r| {
            let status = if r.capped_out {
                CardStatus::Avoid
            } else if r.calc.minimum_met && r.rate > 0.0 && r.rate >= USE_RATE_WINDOW * best_rate {
                CardStatus::Use
            } else {
                CardStatus::Consider
            };
            let minimum_remaining = r
                .card
                .minimum_spend
                .active_amount()
                .map(|minimum| (minimum - r.calc.total_spend).max(0.0));
            CategoryCardInsight {
                card_id: r.card.id.clone(),
                card_name: r.card.name.clone(),
                status,
                reward_rate: r.rate,
                reward_earned_dollars: r.reward_dollars,
                eligible_spend: r.eligible_spend,
                headroom_to_maximum: r.headroom,
                minimum_remaining,
            }
        })
        .collect();

    insights.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| b.reward_rate.total_cmp(&a.reward_rate))
            .then_with(|| b.reward_earned_dollars.total_cmp(&a.reward_earned_dollars))
            .then_with(|| a.card_id.cmp(&b.card_id))
    });

    Some(CategoryRecommendation {
        group_id: group.id.clone(),
        group_name: group.name.clone(),
        insights,
    })
}

fn resolve_scope<'a>(
    card: &'a CreditCard,
    calc: &'a RewardCalculation,
    scope: &Scope,
    settings: &Settings,
) -> Resolved<'a> {
    let (eligible_spend, raw_units) = match scope {
        Scope::WholeCard => (calc.eligible_spend, calc.reward_earned),
        Scope::Bands(ids) => calc
            .subcategories
            .iter()
            .filter(|row| ids.iter().any(|id| *id == row.subcategory_id))
            .fold((0.0, 0.0), |(eligible, raw), row| {
                (eligible + row.eligible_spend, raw + row.reward_earned)
            }),
    };
    let reward_dollars = card.program.to_dollars(raw_units, settings);
    let rate = if eligible_spend > 0.0 {
        reward_dollars / eligible_spend
    } else {
        0.0
    };
    // Headroom is card-wide: every band draws on the same cap.
    let headroom = card
        .maximum_spend
        .active_amount()
        .map(|cap| (cap - calc.eligible_spend_before_blocks).max(0.0));
    let capped_out = calc.maximum_spend_exceeded || headroom == Some(0.0);
    Resolved {
        card,
        calc,
        eligible_spend,
        reward_dollars,
        rate,
        headroom,
        capped_out,
    }
}
