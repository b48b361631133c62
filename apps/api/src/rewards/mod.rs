//! Fixed-percentage reward split across the top ten builders.
//!
//! Amounts are integer wei. Each slot gets `pool * bps / 10000` rounded
//! down; rounding dust and the shares of slots without a valid wallet stay
//! in `undistributed_wei`.

pub mod handlers;

use serde::{Serialize, Serializer};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::Profile;
use crate::store;
use crate::talent::TalentClient;

/// Share of the pool per rank, in basis points. Sums to 10000.
pub const DISTRIBUTION_BPS: [u32; 10] = [2500, 1800, 1400, 1100, 900, 700, 600, 500, 300, 200];
pub const BPS_DENOMINATOR: u128 = 10_000;
pub const REWARDED_BUILDERS: usize = DISTRIBUTION_BPS.len();
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const MNT_DECIMALS: u32 = 18;

/// Wei as a decimal string so JSON clients never lose precision.
fn wei_string<S: Serializer>(wei: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(wei)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub rank: usize,
    pub percentage: f64,
    #[serde(serialize_with = "wei_string")]
    pub amount_wei: u128,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Split {
    #[serde(serialize_with = "wei_string")]
    pub pool_wei: u128,
    pub shares: Vec<Share>,
    #[serde(serialize_with = "wei_string")]
    pub undistributed_wei: u128,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBuilder {
    pub rank: usize,
    pub profile_id: Uuid,
    pub name: String,
    pub score: i32,
    /// `None` when neither the store nor Talent Protocol has a valid address.
    pub wallet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payout {
    pub rank: usize,
    pub wallet: Option<String>,
    pub name: Option<String>,
    pub score: Option<i32>,
    pub percentage: f64,
    #[serde(serialize_with = "wei_string")]
    pub amount_wei: u128,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionPlan {
    #[serde(serialize_with = "wei_string")]
    pub pool_wei: u128,
    pub payouts: Vec<Payout>,
    #[serde(serialize_with = "wei_string")]
    pub undistributed_wei: u128,
}

fn share_of(pool_wei: u128, bps: u32) -> u128 {
    // floor(pool * bps / 10000) without the intermediate product.
    let bps = u128::from(bps);
    (pool_wei / BPS_DENOMINATOR) * bps + (pool_wei % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR
}

fn percentage(bps: u32) -> f64 {
    f64::from(bps) / 100.0
}

pub fn split(pool_wei: u128) -> [u128; 10] {
    DISTRIBUTION_BPS.map(|bps| share_of(pool_wei, bps))
}

pub fn describe_split(pool_wei: u128) -> Split {
    let amounts = split(pool_wei);
    let shares = amounts
        .iter()
        .zip(DISTRIBUTION_BPS)
        .enumerate()
        .map(|(i, (&amount_wei, bps))| Share {
            rank: i + 1,
            percentage: percentage(bps),
            amount_wei,
            amount: format_units(amount_wei, MNT_DECIMALS),
        })
        .collect();
    Split {
        pool_wei,
        shares,
        undistributed_wei: pool_wei - amounts.iter().sum::<u128>(),
    }
}

/// One payout per rank. `builders` must be ordered by rank.
pub fn plan(pool_wei: u128, builders: &[RankedBuilder]) -> DistributionPlan {
    let amounts = split(pool_wei);
    let mut paid = 0u128;
    let payouts = amounts
        .iter()
        .zip(DISTRIBUTION_BPS)
        .enumerate()
        .map(|(i, (&share, bps))| {
            let builder = builders.get(i);
            let wallet = builder
                .and_then(|b| b.wallet.clone())
                .filter(|w| is_valid_wallet(w));
            let amount_wei = if wallet.is_some() { share } else { 0 };
            paid += amount_wei;
            Payout {
                rank: i + 1,
                wallet,
                name: builder.map(|b| b.name.clone()),
                score: builder.map(|b| b.score),
                percentage: percentage(bps),
                amount_wei,
                amount: format_units(amount_wei, MNT_DECIMALS),
            }
        })
        .collect();
    DistributionPlan {
        pool_wei,
        payouts,
        undistributed_wei: pool_wei - paid,
    }
}

/// `0x` followed by exactly 40 hex digits, not all zero.
pub fn is_valid_wallet(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
        && !s[2..].chars().all(|c| c == '0')
}

/// Fixed-point display of an integer amount, e.g. `1500000000000000000` at
/// 18 decimals is `1.5`. Whole amounts keep one fractional zero.
pub fn format_units(amount: u128, decimals: u32) -> String {
    let Some(base) = 10u128.checked_pow(decimals) else {
        return amount.to_string();
    };
    let whole = amount / base;
    let frac = amount % base;
    if decimals == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{frac}")
    }
}

pub fn parse_wei(raw: &str) -> Option<u128> {
    raw.trim().parse::<u128>().ok()
}

/// Top builders by score. A missing or malformed stored wallet is looked up
/// on Talent Protocol when a client is available.
pub async fn top_builders(
    db: &PgPool,
    talent: Option<&TalentClient>,
    limit: usize,
) -> Result<Vec<RankedBuilder>, sqlx::Error> {
    let rows = store::top_profiles(db, i64::try_from(limit).unwrap_or(i64::MAX)).await?;
    let mut builders = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        let profile = Profile::from_row(row);
        let mut wallet = profile.main_wallet.clone().filter(|w| is_valid_wallet(w));

        if wallet.is_none() {
            match talent {
                Some(talent) => match talent.wallet_for_profile(&profile.id.to_string()).await {
                    Ok(found) => {
                        wallet = found.filter(|w| is_valid_wallet(w));
                        debug!("Talent wallet for {}: {:?}", profile.label(), wallet);
                    }
                    Err(e) => warn!("Wallet lookup for {} failed: {e}", profile.label()),
                },
                None => debug!("No Talent client; {} keeps no wallet", profile.label()),
            }
        }

        builders.push(RankedBuilder {
            rank: i + 1,
            profile_id: profile.id,
            name: profile.label().to_string(),
            score: profile.builder_score,
            wallet,
        });
    }

    let with_wallet = builders.iter().filter(|b| b.wallet.is_some()).count();
    info!("{} top builders, {with_wallet} with wallets", builders.len());
    Ok(builders)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_MNT: u128 = 1_000_000_000_000_000_000;

    fn builder(rank: usize, wallet: Option<&str>) -> RankedBuilder {
        RankedBuilder {
            rank,
            profile_id: Uuid::from_u128(rank as u128),
            name: format!("builder-{rank}"),
            score: 100 - rank as i32,
            wallet: wallet.map(String::from),
        }
    }

    fn wallet(n: u8) -> String {
        format!("0x{}", format!("{n:02x}").repeat(20))
    }

    #[test]
    fn test_bps_sum_to_whole_pool() {
        assert_eq!(DISTRIBUTION_BPS.iter().sum::<u32>(), 10_000);
    }

    #[test]
    fn test_split_exact_pool() {
        let amounts = split(10_000);
        assert_eq!(amounts, [2500, 1800, 1400, 1100, 900, 700, 600, 500, 300, 200]);
        assert_eq!(describe_split(10_000).undistributed_wei, 0);
    }

    #[test]
    fn test_split_rounds_down_and_reports_dust() {
        let amounts = split(9_999);
        assert_eq!(amounts[0], 2499);
        assert_eq!(amounts[9], 199);
        let described = describe_split(9_999);
        assert_eq!(
            described.undistributed_wei,
            9_999 - amounts.iter().sum::<u128>()
        );
        assert!(described.undistributed_wei > 0);
    }

    #[test]
    fn test_split_handles_huge_pools() {
        let pool = u128::MAX;
        let amounts = split(pool);
        assert_eq!(amounts[0], pool / 4);
        assert!(amounts.iter().sum::<u128>() <= pool);
    }

    #[test]
    fn test_plan_withholds_shares_without_wallets() {
        let w1 = wallet(1);
        let builders = vec![
            builder(1, Some(&w1)),
            builder(2, None),
            builder(3, Some("not-a-wallet")),
        ];
        let plan = plan(ONE_MNT, &builders);
        assert_eq!(plan.payouts.len(), 10);
        assert_eq!(plan.payouts[0].wallet.as_deref(), Some(w1.as_str()));
        assert_eq!(plan.payouts[0].amount_wei, ONE_MNT / 4);
        assert_eq!(plan.payouts[0].amount, "0.25");
        assert_eq!(plan.payouts[1].amount_wei, 0);
        assert_eq!(plan.payouts[2].wallet, None);
        assert_eq!(plan.payouts[9].name, None);
        assert_eq!(plan.undistributed_wei, ONE_MNT - ONE_MNT / 4);
    }

    #[test]
    fn test_plan_withholds_zero_address_share() {
        let w1 = wallet(1);
        let builders = vec![builder(1, Some(&w1)), builder(2, Some(ZERO_ADDRESS))];
        let plan = plan(ONE_MNT, &builders);
        assert_eq!(plan.payouts[1].wallet, None);
        assert_eq!(plan.payouts[1].amount_wei, 0);
        assert_eq!(plan.payouts[1].name.as_deref(), Some("builder-2"));
        assert_eq!(plan.undistributed_wei, ONE_MNT - ONE_MNT / 4);
    }

    #[test]
    fn test_plan_full_roster_distributes_everything() {
        let wallets: Vec<String> = (1..=10).map(wallet).collect();
        let builders: Vec<RankedBuilder> = wallets
            .iter()
            .enumerate()
            .map(|(i, w)| builder(i + 1, Some(w)))
            .collect();
        let plan = plan(ONE_MNT, &builders);
        assert_eq!(plan.undistributed_wei, 0);
        assert_eq!(plan.payouts[1].percentage, 18.0);
        assert_eq!(plan.payouts[1].amount, "0.18");
    }

    #[test]
    fn test_is_valid_wallet() {
        assert!(is_valid_wallet("0xD0C8B09F1fc5B94B65B62847D9FF1A4aB13f9c25"));
        assert!(!is_valid_wallet("0xD0C8B09F1fc5B94B65B62847D9FF1A4aB13f9c2"));
        assert!(!is_valid_wallet("D0C8B09F1fc5B94B65B62847D9FF1A4aB13f9c2500"));
        assert!(!is_valid_wallet("0xZZC8B09F1fc5B94B65B62847D9FF1A4aB13f9c25"));
        assert!(!is_valid_wallet("alice.eth"));
        assert!(!is_valid_wallet(ZERO_ADDRESS));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0, 18), "0.0");
        assert_eq!(format_units(ONE_MNT, 18), "1.0");
        assert_eq!(format_units(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(42, 0), "42");
    }

    #[test]
    fn test_wei_serializes_as_string() {
        let json = serde_json::to_value(describe_split(ONE_MNT)).unwrap();
        assert_eq!(json["pool_wei"], "1000000000000000000");
        assert_eq!(json["shares"][0]["amount_wei"], "250000000000000000");
        assert_eq!(json["shares"][0]["amount"], "0.25");
    }

    #[test]
    fn test_parse_wei() {
        assert_eq!(parse_wei(" 1000 "), Some(1000));
        assert_eq!(parse_wei("-1"), None);
        assert_eq!(parse_wei("1e18"), None);
    }
}
