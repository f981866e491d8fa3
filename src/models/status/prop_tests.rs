use super::*;
use proptest::prelude::*;

fn arb_donation_status() -> impl Strategy<Value = DonationStatus> {
    proptest::sample::select(DonationStatus::ALL.to_vec())
}

fn arb_order_status() -> impl Strategy<Value = OrderStatus> {
    proptest::sample::select(OrderStatus::ALL.to_vec())
}

proptest! {
    /// Terminal statuses never move anywhere
    #[test]
    fn prop_terminal_donation_statuses_are_final(from in arb_donation_status(), to in arb_donation_status()) {
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
    }

    #[test]
    fn prop_terminal_order_statuses_are_final(from in arb_order_status(), to in arb_order_status()) {
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
    }

    /// No status transitions to itself
    #[test]
    fn prop_no_self_transitions(d in arb_donation_status(), o in arb_order_status()) {
        prop_assert!(!d.can_transition_to(d));
        prop_assert!(!o.can_transition_to(o));
    }

    /// Parsing ignores case and surrounding whitespace
    #[test]
    fn prop_parse_ignores_case(status in arb_order_status(), upper in any::<bool>(), pad in 0usize..3) {
        let raw = if upper { status.as_str().to_uppercase() } else { status.as_str().to_string() };
        let padded = format!("{}{}{}", " ".repeat(pad), raw, " ".repeat(pad));
        prop_assert_eq!(padded.parse::<OrderStatus>().unwrap(), status);
    }

    /// Visible shoes are available exactly when stock is positive
    #[test]
    fn prop_shoe_status_matches_stock(quantity in 0i32..1000) {
        let status = ShoeStatus::Available.after_stock_change(quantity);
        prop_assert_eq!(status == ShoeStatus::Available, quantity > 0);
    }
}
