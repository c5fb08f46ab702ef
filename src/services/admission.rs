//! Admission protocol: capacity check and food-claim allocation
//!
//! The two decision procedures that gate every registration attempt. Both
//! are pure: they take the event's declared limits and the current derived
//! aggregates and decide, without touching storage. The repository layer
//! re-asserts the same limits inside the write transaction, so these
//! checks exist to produce fast, specific rejections, not to carry the
//! correctness guarantee under concurrency.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::food::{FoodItem, MenuSelection};
use crate::utils::errors::{GatherBuddyError, Result};

/// Outcome of the capacity check for a prospective registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityDecision {
    Allowed,
    /// `spots_left` may be zero or negative when the event is already full
    Rejected { spots_left: i64 },
}

/// Decide whether a party of `1 + prospective_guest_count` fits within the
/// event's `max_attendees`, given the guest counts of all existing
/// registrations. A NULL `max_attendees` means unlimited attendance.
pub fn check_capacity(
    max_attendees: Option<i32>,
    existing_guest_counts: &[i32],
    prospective_guest_count: i32,
) -> CapacityDecision {
    let max = match max_attendees {
        Some(max) => max as i64,
        None => return CapacityDecision::Allowed,
    };

    let current_attendees: i64 = existing_guest_counts
        .iter()
        .map(|&gc| 1 + gc as i64)
        .sum();
    let new_attendees = 1 + prospective_guest_count as i64;

    if current_attendees + new_attendees <= max {
        CapacityDecision::Allowed
    } else {
        CapacityDecision::Rejected {
            spots_left: max - current_attendees,
        }
    }
}

/// Outcome of food-claim allocation for a prospective registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDecision {
    /// No food requirement applies: the event has no menu items, or every
    /// item is already exhausted. Any supplied selections are discarded.
    Waived,
    /// The validated claim set to persist with the registration
    Accepted(Vec<MenuSelection>),
}

/// Validate a prospective claim set against the event's menu items and the
/// quantities already claimed on them.
///
/// Rules, in order:
/// - an event without menu items has no food requirement;
/// - if every item is exhausted, the requirement is waived and selections
///   are dropped;
/// - otherwise at least one selection is required, each selection must name
///   a menu item of this event with a positive quantity, the combined
///   selected quantity must cover the whole party, and no item may be
///   pushed past its remaining quantity.
pub fn allocate_claims(
    items: &[FoodItem],
    claimed_totals: &HashMap<Uuid, i64>,
    selections: &[MenuSelection],
    party_size: i32,
) -> Result<ClaimDecision> {
    if items.is_empty() {
        return Ok(ClaimDecision::Waived);
    }

    let remaining: HashMap<Uuid, i64> = items
        .iter()
        .map(|item| {
            let claimed = claimed_totals.get(&item.id).copied().unwrap_or(0);
            (item.id, item.quantity as i64 - claimed)
        })
        .collect();

    let all_exhausted = remaining.values().all(|&r| r <= 0);
    if all_exhausted {
        return Ok(ClaimDecision::Waived);
    }

    if selections.is_empty() {
        return Err(GatherBuddyError::NoSelection);
    }

    let mut requested: HashMap<Uuid, i64> = HashMap::new();
    let mut total_selected: i64 = 0;
    for selection in selections {
        if !remaining.contains_key(&selection.menu_item_id) {
            return Err(GatherBuddyError::InvalidInput(format!(
                "menu item {} does not belong to this event",
                selection.menu_item_id
            )));
        }
        if selection.quantity < 1 {
            return Err(GatherBuddyError::InvalidInput(
                "menu claim quantity must be at least 1".to_string(),
            ));
        }
        *requested.entry(selection.menu_item_id).or_insert(0) += selection.quantity as i64;
        total_selected += selection.quantity as i64;
    }

    if total_selected < party_size as i64 {
        return Err(GatherBuddyError::InsufficientQuantity {
            required: party_size,
            selected: total_selected as i32,
        });
    }

    for (item_id, quantity) in &requested {
        let left = remaining[item_id];
        if *quantity > left {
            return Err(GatherBuddyError::ItemOvercommitted {
                item_id: *item_id,
                requested: *quantity as i32,
                remaining: left.max(0),
            });
        }
    }

    Ok(ClaimDecision::Accepted(selections.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use proptest::prelude::*;

    fn item(quantity: i32) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name_kk: "Бауырсақ".to_string(),
            name_en: Some("Baursak".to_string()),
            quantity,
            created_at: Utc::now(),
        }
    }

    fn select(item: &FoodItem, quantity: i32) -> MenuSelection {
        MenuSelection {
            menu_item_id: item.id,
            quantity,
        }
    }

    #[test]
    fn test_unlimited_capacity_always_allows() {
        assert_eq!(
            check_capacity(None, &[4, 4, 4], 4),
            CapacityDecision::Allowed
        );
    }

    #[test]
    fn test_capacity_exact_fit_allows() {
        // 2 existing parties of 1 + incoming party of 2 fills 4 exactly
        assert_eq!(check_capacity(Some(4), &[0, 0], 1), CapacityDecision::Allowed);
    }

    #[test]
    fn test_capacity_overflow_reports_spots_left() {
        // 3 attendees present, 2 spots left, party of 3 does not fit
        assert_eq!(
            check_capacity(Some(5), &[1, 0], 2),
            CapacityDecision::Rejected { spots_left: 2 }
        );
    }

    #[test]
    fn test_full_event_reports_zero_spots() {
        assert_eq!(
            check_capacity(Some(2), &[0, 0], 0),
            CapacityDecision::Rejected { spots_left: 0 }
        );
    }

    #[test]
    fn test_overfull_event_reports_negative_spots() {
        // Organizer lowered max_attendees after registrations existed
        assert_eq!(
            check_capacity(Some(2), &[1, 1], 0),
            CapacityDecision::Rejected { spots_left: -2 }
        );
    }

    #[test]
    fn test_no_menu_items_waives_requirement() {
        let decision = allocate_claims(&[], &HashMap::new(), &[], 3).unwrap();
        assert_eq!(decision, ClaimDecision::Waived);
    }

    #[test]
    fn test_exhausted_items_waive_requirement_and_drop_selections() {
        let a = item(3);
        let claimed = HashMap::from([(a.id, 3_i64)]);
        let selections = [select(&a, 1)];
        let decision = allocate_claims(&[a], &claimed, &selections, 1).unwrap();
        assert_eq!(decision, ClaimDecision::Waived);
    }

    #[test]
    fn test_empty_selection_rejected_while_items_available() {
        let a = item(3);
        let err = allocate_claims(&[a], &HashMap::new(), &[], 1).unwrap_err();
        assert_matches!(err, GatherBuddyError::NoSelection);
    }

    #[test]
    fn test_selection_must_cover_party() {
        let a = item(10);
        let selections = [select(&a, 2)];
        // Party of 4 (guest_count 3) with only 2 units selected
        let err = allocate_claims(&[a], &HashMap::new(), &selections, 4).unwrap_err();
        assert_matches!(
            err,
            GatherBuddyError::InsufficientQuantity {
                required: 4,
                selected: 2
            }
        );
    }

    #[test]
    fn test_overcommit_rejected() {
        let a = item(3);
        let claimed = HashMap::from([(a.id, 2_i64)]);
        let selections = [select(&a, 2)];
        let err = allocate_claims(&[a.clone()], &claimed, &selections, 1).unwrap_err();
        assert_matches!(
            err,
            GatherBuddyError::ItemOvercommitted {
                item_id,
                requested: 2,
                remaining: 1,
            } if item_id == a.id
        );
    }

    #[test]
    fn test_duplicate_selections_aggregate_before_overcommit_check() {
        let a = item(3);
        let selections = [select(&a, 2), select(&a, 2)];
        let err = allocate_claims(&[a], &HashMap::new(), &selections, 1).unwrap_err();
        assert_matches!(err, GatherBuddyError::ItemOvercommitted { requested: 4, .. });
    }

    #[test]
    fn test_foreign_item_rejected() {
        let a = item(3);
        let foreign = MenuSelection {
            menu_item_id: Uuid::new_v4(),
            quantity: 1,
        };
        let err = allocate_claims(&[a], &HashMap::new(), &[foreign], 1).unwrap_err();
        assert_matches!(err, GatherBuddyError::InvalidInput(_));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let a = item(3);
        let selections = [select(&a, 0)];
        let err = allocate_claims(&[a], &HashMap::new(), &selections, 1).unwrap_err();
        assert_matches!(err, GatherBuddyError::InvalidInput(_));
    }

    #[test]
    fn test_valid_selection_accepted() {
        let a = item(5);
        let b = item(5);
        let claimed = HashMap::from([(a.id, 2_i64)]);
        let selections = [select(&a, 2), select(&b, 1)];
        let decision =
            allocate_claims(&[a, b], &claimed, &selections, 2).unwrap();
        assert_matches!(decision, ClaimDecision::Accepted(claims) if claims.len() == 2);
    }

    #[test]
    fn test_partially_exhausted_event_still_requires_selection() {
        let a = item(3);
        let b = item(3);
        // Item a exhausted, item b still open: requirement stays in force
        let claimed = HashMap::from([(a.id, 3_i64)]);
        let err = allocate_claims(&[a, b], &claimed, &[], 1).unwrap_err();
        assert_matches!(err, GatherBuddyError::NoSelection);
    }

    proptest! {
        /// Admitting parties one at a time never exceeds capacity, and the
        /// first rejection reports the true spots left
        #[test]
        fn prop_sequential_admissions_never_exceed_capacity(
            max in 0_i32..60,
            guest_counts in prop::collection::vec(0_i32..6, 0..30),
        ) {
            let mut admitted: Vec<i32> = Vec::new();
            for gc in guest_counts {
                match check_capacity(Some(max), &admitted, gc) {
                    CapacityDecision::Allowed => admitted.push(gc),
                    CapacityDecision::Rejected { spots_left } => {
                        let current: i64 = admitted.iter().map(|&g| 1 + g as i64).sum();
                        prop_assert_eq!(spots_left, max as i64 - current);
                        prop_assert!(current + 1 + gc as i64 > max as i64);
                    }
                }
                let total: i64 = admitted.iter().map(|&g| 1 + g as i64).sum();
                prop_assert!(total <= max as i64);
            }
        }

        /// Accepted claim sets never push an item past its declared quantity
        #[test]
        fn prop_accepted_claims_fit_remaining(
            quantity in 1_i32..40,
            claimed in 0_i64..40,
            request in 1_i32..10,
        ) {
            let a = item(quantity);
            let claimed_map = HashMap::from([(a.id, claimed)]);
            let selections = [select(&a, request)];
            match allocate_claims(&[a], &claimed_map, &selections, 1) {
                Ok(ClaimDecision::Accepted(_)) => {
                    prop_assert!(claimed + request as i64 <= quantity as i64);
                }
                Ok(ClaimDecision::Waived) => {
                    prop_assert!(claimed >= quantity as i64);
                }
                Err(_) => {}
            }
        }
    }
}
