//! Summary figures shown above the list views.
//!
//! Everything here is derived from an entity list on demand, like the filtered and
//! paged views themselves.

use crate::entity::Filterable;
use chrono::Duration;
use portal_models::{Admission, AdmissionStatus, Payment, PaymentStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Record counts per key, in key order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally<K: Ord> {
    counts: BTreeMap<K, usize>,
    total: usize,
}

impl<K: Ord> Tally<K> {
    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(k, n)| (k, *n))
    }
}

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }
}

/// Counts `records` by the key `key_fn` extracts.
pub fn count_by<T, K, F>(records: &[T], key_fn: F) -> Tally<K>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut tally = Tally::default();
    for record in records {
        *tally.counts.entry(key_fn(record)).or_insert(0) += 1;
        tally.total += 1;
    }
    tally
}

/// Counts records per status.
pub fn status_breakdown<E: Filterable>(records: &[E]) -> Tally<E::Status> {
    count_by(records, |r| r.status())
}

/// Money totals for the billing screen, in minor units.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub paid_cents: i64,
    pub pending_cents: i64,
    pub refunded_cents: i64,
    pub failed_count: usize,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[Payment]) -> Self {
        payments.iter().fold(Self::default(), |mut acc, p| {
            match p.status {
                PaymentStatus::Paid => acc.paid_cents += p.amount_cents,
                PaymentStatus::Pending => acc.pending_cents += p.amount_cents,
                PaymentStatus::Refunded => acc.refunded_cents += p.amount_cents,
                PaymentStatus::Failed => acc.failed_count += 1,
            }
            acc
        })
    }

    /// Paid minus refunded.
    pub fn net_cents(&self) -> i64 {
        self.paid_cents - self.refunded_cents
    }
}

/// Ward occupancy figures.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmissionSummary {
    pub active: usize,
    pub discharged: usize,
    /// Mean length of stay over discharged admissions with a discharge time.
    pub average_stay: Option<Duration>,
}

impl AdmissionSummary {
    pub fn from_admissions(admissions: &[Admission]) -> Self {
        let breakdown = status_breakdown(admissions);
        let stays: Vec<Duration> = admissions
            .iter()
            .filter(|a| a.status == AdmissionStatus::Discharged)
            .filter_map(Admission::length_of_stay)
            .collect();

        let average_stay = match i32::try_from(stays.len()) {
            Ok(count) if count > 0 => {
                let total = stays.iter().fold(Duration::zero(), |acc, d| acc + *d);
                Some(total / count)
            }
            _ => None,
        };

        Self {
            active: breakdown.get(&AdmissionStatus::Active),
            discharged: breakdown.get(&AdmissionStatus::Discharged),
            average_stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admission, payment};
    use chrono::Duration;

    #[test]
    fn test_status_breakdown_counts_every_record() {
        let list = vec![
            admission(1, AdmissionStatus::Active, "A", 1),
            admission(2, AdmissionStatus::Discharged, "B", 2),
            admission(3, AdmissionStatus::Active, "C", 3),
        ];
        let tally = status_breakdown(&list);

        assert_eq!(tally.get(&AdmissionStatus::Active), 2);
        assert_eq!(tally.get(&AdmissionStatus::Discharged), 1);
        assert_eq!(tally.get(&AdmissionStatus::Cancelled), 0);
        assert_eq!(tally.total(), 3);

        let keys: Vec<_> = tally.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [AdmissionStatus::Active, AdmissionStatus::Discharged]);
    }

    #[test]
    fn test_payment_summary_totals_by_status() {
        let list = vec![
            payment(1, PaymentStatus::Paid, 12_000),
            payment(2, PaymentStatus::Paid, 3_050),
            payment(3, PaymentStatus::Pending, 4_000),
            payment(4, PaymentStatus::Refunded, 1_000),
            payment(5, PaymentStatus::Failed, 9_999),
        ];
        let summary = PaymentSummary::from_payments(&list);

        assert_eq!(summary.paid_cents, 15_050);
        assert_eq!(summary.pending_cents, 4_000);
        assert_eq!(summary.refunded_cents, 1_000);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.net_cents(), 14_050);
    }

    #[test]
    fn test_admission_summary_averages_discharged_stays() {
        let mut short = admission(1, AdmissionStatus::Discharged, "A", 10);
        short.discharged_at = Some(short.admitted_at + Duration::days(2));
        let mut long = admission(2, AdmissionStatus::Discharged, "B", 10);
        long.discharged_at = Some(long.admitted_at + Duration::days(6));
        let current = admission(3, AdmissionStatus::Active, "C", 1);

        let summary = AdmissionSummary::from_admissions(&[short, long, current]);

        assert_eq!(summary.active, 1);
        assert_eq!(summary.discharged, 2);
        assert_eq!(summary.average_stay, Some(Duration::days(4)));
        assert_eq!(AdmissionSummary::from_admissions(&[]).average_stay, None);
    }
}
