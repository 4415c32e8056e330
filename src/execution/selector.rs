//! Bid selection and price-floor enforcement.
//!
//! The one real decision in the system: given a collection's open bids and
//! an optional user floor, pick the bid to hit and the floor to submit with
//! the sale. Pure functions, no I/O.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use solana_sdk::native_token::LAMPORTS_PER_SOL;

use crate::market::models::CollectionBid;

/// The chosen bid plus the floor to pass to the sale builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidSelection {
    pub bid: CollectionBid,
    pub submission_floor_lamports: u64,
}

/// Why no bid was selected. Collections are skipped either way; the
/// variants only drive distinct log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidRejection {
    /// The collection had no bids at all.
    NoBids,
    /// Bids existed but none had unfilled capacity.
    NoneValid,
    /// Bids existed but none met the user-supplied floor.
    NoneAboveFloor,
}

impl std::fmt::Display for BidRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBids => write!(f, "no bids"),
            Self::NoneValid => write!(f, "no valid bids"),
            Self::NoneAboveFloor => write!(f, "no bids above minimum price"),
        }
    }
}

/// Select the best acceptable bid for a collection.
///
/// A bid is acceptable when it has unfilled capacity and its amount meets
/// the filter floor (the user floor, or 0 when none was given). The largest
/// amount wins; ties keep the first-encountered bid.
///
/// The submitted floor intentionally differs from the filter floor: a
/// user-supplied floor is passed through unchanged, while without one the
/// floor becomes 80% of the winning bid as slippage protection against the
/// bid moving between selection and execution.
pub fn select_best_bid(
    bids: &[CollectionBid],
    user_floor_lamports: Option<u64>,
) -> Result<BidSelection, BidRejection> {
    if bids.is_empty() {
        return Err(BidRejection::NoBids);
    }

    let filter_floor = user_floor_lamports.unwrap_or(0);

    let mut best: Option<&CollectionBid> = None;
    for bid in bids {
        if !bid.has_capacity() || bid.amount < filter_floor {
            continue;
        }
        // Strict comparison keeps the first-encountered bid on ties.
        match best {
            Some(current) if bid.amount <= current.amount => {}
            _ => best = Some(bid),
        }
    }

    let Some(bid) = best else {
        return Err(match user_floor_lamports {
            Some(_) => BidRejection::NoneAboveFloor,
            None => BidRejection::NoneValid,
        });
    };

    let submission_floor_lamports = match user_floor_lamports {
        Some(floor) => floor,
        None => eighty_percent(bid.amount),
    };

    Ok(BidSelection {
        bid: bid.clone(),
        submission_floor_lamports,
    })
}

/// Exact integer `floor(amount * 0.8)`.
fn eighty_percent(amount: u64) -> u64 {
    (u128::from(amount) * 4 / 5) as u64
}

/// Convert a SOL-denominated price to lamports, flooring any fractional
/// lamport. Returns `None` when the value does not fit in `u64`.
pub fn sol_to_lamports(sol: Decimal) -> Option<u64> {
    let lamports = sol.checked_mul(Decimal::from(LAMPORTS_PER_SOL))?;
    lamports.floor().to_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bid(address: &str, amount: u64, quantity: u64, filled: u64) -> CollectionBid {
        CollectionBid {
            address: address.to_string(),
            amount,
            quantity,
            filled_quantity: filled,
        }
    }

    fn sample_bids() -> Vec<CollectionBid> {
        vec![
            bid("a", 100, 5, 0),
            bid("b", 150, 3, 1),
            bid("c", 90, 2, 2),
        ]
    }

    #[test]
    fn test_highest_open_bid_wins_without_floor() {
        let bids = sample_bids();
        let selection = select_best_bid(&bids, None).unwrap();
        assert_eq!(selection.bid.address, "b");
        assert_eq!(selection.bid.amount, 150);
        // 80% of the winning bid, floored
        assert_eq!(selection.submission_floor_lamports, 120);
    }

    #[test]
    fn test_explicit_floor_preserved_not_recomputed() {
        let bids = sample_bids();
        let selection = select_best_bid(&bids, Some(140)).unwrap();
        assert_eq!(selection.bid.amount, 150);
        assert_eq!(selection.submission_floor_lamports, 140);
    }

    #[test]
    fn test_never_selects_consumed_bid() {
        let bids = vec![bid("a", 500, 2, 2), bid("b", 100, 1, 0)];
        let selection = select_best_bid(&bids, None).unwrap();
        assert_eq!(selection.bid.address, "b");
    }

    #[test]
    fn test_never_selects_below_floor() {
        let bids = sample_bids();
        let result = select_best_bid(&bids, Some(200));
        assert_eq!(result.unwrap_err(), BidRejection::NoneAboveFloor);
    }

    #[test]
    fn test_all_consumed_rejects_regardless_of_floor() {
        let bids = vec![bid("a", 100, 1, 1), bid("b", 200, 3, 3)];
        assert_eq!(
            select_best_bid(&bids, None).unwrap_err(),
            BidRejection::NoneValid
        );
        assert_eq!(
            select_best_bid(&bids, Some(50)).unwrap_err(),
            BidRejection::NoneAboveFloor
        );
    }

    #[test]
    fn test_empty_list_is_no_bids() {
        assert_eq!(select_best_bid(&[], None).unwrap_err(), BidRejection::NoBids);
        assert_eq!(
            select_best_bid(&[], Some(10)).unwrap_err(),
            BidRejection::NoBids
        );
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        let bids = vec![bid("first", 150, 2, 0), bid("second", 150, 2, 0)];
        let selection = select_best_bid(&bids, None).unwrap();
        assert_eq!(selection.bid.address, "first");
    }

    #[test]
    fn test_selector_is_pure() {
        let bids = sample_bids();
        let once = select_best_bid(&bids, None).unwrap();
        let twice = select_best_bid(&bids, None).unwrap();
        assert_eq!(once, twice);
        assert_eq!(bids, sample_bids());
    }

    #[test]
    fn test_eighty_percent_floors() {
        assert_eq!(eighty_percent(150), 120);
        assert_eq!(eighty_percent(153), 122);
        assert_eq!(eighty_percent(1), 0);
    }

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(sol_to_lamports(dec!(0.001)), Some(1_000_000));
        assert_eq!(sol_to_lamports(dec!(1)), Some(1_000_000_000));
        // Fractional lamports floor away
        assert_eq!(sol_to_lamports(dec!(0.0000000015)), Some(1));
    }
}
