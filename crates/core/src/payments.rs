use std::collections::BTreeMap;

use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::policy::{Policy, PolicyId};
use crate::domain::quote::{Quote, QuoteId};

/// What a payment row may be attached to.
///
/// A quote also owns the payments filed against the policies it converted
/// into, so `linked_policies` lists those policy ids.
#[derive(Clone, Copy, Debug)]
pub enum PaymentTarget<'a> {
    Quote { quote: &'a Quote, linked_policies: &'a [&'a PolicyId] },
    Policy(&'a Policy),
}

impl PaymentTarget<'_> {
    fn matches(&self, payment: &PaymentRecord) -> bool {
        match self {
            Self::Quote { quote, linked_policies } => {
                payment.quote_id.as_ref() == Some(&quote.id)
                    || payment.policy_id.as_ref().is_some_and(|policy_id| {
                        quote.policy_id.as_ref() == Some(policy_id)
                            || linked_policies.contains(&policy_id)
                    })
            }
            Self::Policy(policy) => {
                payment.policy_id.as_ref() == Some(&policy.id)
                    || (policy.quote_id.is_some() && payment.quote_id == policy.quote_id)
            }
        }
    }
}

/// Status of the most recent payment row for `target`.
///
/// Rows are ordered by `completed_at`; rows without a timestamp rank below
/// timestamped rows and ties keep the later row.
pub fn latest_status_for(
    target: PaymentTarget<'_>,
    payments: &[PaymentRecord],
) -> Option<PaymentStatus> {
    payments
        .iter()
        .filter(|payment| target.matches(payment))
        .max_by_key(|payment| payment.completed_at)
        .map(|payment| payment.payment_status.clone())
}

/// Fill `payment_status` on policies whose row did not carry one.
pub fn attach_payment_status(policies: &mut [Policy], payments: &[PaymentRecord]) {
    for policy in policies.iter_mut().filter(|policy| policy.payment_status.is_none()) {
        policy.payment_status = latest_status_for(PaymentTarget::Policy(policy), payments);
    }
}

/// Fill `payment_status` on quotes whose row did not carry one, counting
/// payments made against the quote itself or any policy linked to it.
pub fn attach_quote_payment_status(
    quotes: &mut [Quote],
    policies: &[Policy],
    payments: &[PaymentRecord],
) {
    let mut policies_by_quote: BTreeMap<&QuoteId, Vec<&PolicyId>> = BTreeMap::new();
    for policy in policies {
        if let Some(quote_id) = &policy.quote_id {
            policies_by_quote.entry(quote_id).or_default().push(&policy.id);
        }
    }

    for quote in quotes.iter_mut().filter(|quote| quote.payment_status.is_none()) {
        let linked_policies =
            policies_by_quote.get(&quote.id).map(Vec::as_slice).unwrap_or_default();
        let target = PaymentTarget::Quote { quote: &*quote, linked_policies };
        let status = latest_status_for(target, payments);
        quote.payment_status = status;
    }
}
